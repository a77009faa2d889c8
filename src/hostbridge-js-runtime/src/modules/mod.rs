use hostbridge_js_common::REQUIRE_MODULE;
use rquickjs::loader::{Loader, Resolver};
use rquickjs::{Ctx, Module, Result};

pub mod console;
pub mod io;
pub mod registry;
pub mod require;

/// Resolves and loads the built-in modules, which scripts import by bare name.
#[derive(Clone)]
pub struct NativeModuleLoader;

/// Declare the native module called `name`, if there is one.
fn declare_native<'js>(ctx: &Ctx<'js>, name: &str) -> Option<Result<Module<'js>>> {
    let ctx = ctx.clone();
    let module = match name {
        "io" => Module::declare_def::<io::js_io, _>(ctx, name),
        "console" => Module::declare_def::<console::js_console, _>(ctx, name),
        "registry" => Module::declare_def::<registry::js_registry, _>(ctx, name),
        REQUIRE_MODULE => Module::declare_def::<require::js_require, _>(ctx, name),
        _ => return None,
    };
    Some(module)
}

fn is_native(name: &str) -> bool {
    matches!(name, "io" | "console" | "registry" | REQUIRE_MODULE)
}

impl Resolver for NativeModuleLoader {
    fn resolve(&mut self, _ctx: &Ctx<'_>, base: &str, name: &str) -> Result<String> {
        if is_native(name) {
            Ok(name.to_string())
        } else {
            Err(rquickjs::Error::new_resolving(base, name))
        }
    }
}

impl Loader for NativeModuleLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, name: &str) -> Result<Module<'js>> {
        declare_native(ctx, name).unwrap_or_else(|| Err(rquickjs::Error::new_loading(name)))
    }
}
