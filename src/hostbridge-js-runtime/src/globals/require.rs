use hostbridge_js_common::REQUIRE_MODULE;
use rquickjs::object::Property;
use rquickjs::{Ctx, Function, Module, Object};

pub fn setup(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    // The global `require` is the same function the `require` module exports, so
    // host type imports behave the same in both places.
    let require: Object = Module::import(ctx, REQUIRE_MODULE)?.finish()?;
    globals.prop(
        "require",
        Property::from(require.get::<_, Function>("require")?),
    )?;

    Ok(())
}
