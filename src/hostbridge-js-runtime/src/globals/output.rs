use rquickjs::object::Property;
use rquickjs::{Ctx, Function, Module, Object};

/// `print(text)` and `console.log(...values)`, both writing to stdout.
pub fn setup(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    let globals = ctx.globals();

    let io: Object = Module::import(ctx, "io")?.finish()?;
    globals.prop("print", Property::from(io.get::<_, Function>("print")?))?;

    let console: Object = Module::import(ctx, "console")?.finish()?;
    globals.prop("console", Property::from(console))?;

    Ok(())
}
