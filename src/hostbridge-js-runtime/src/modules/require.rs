use rquickjs::context::EvalOptions;
use rquickjs::{Ctx, Function, Object, Promise, Result};

use crate::resolution::{FallthroughGuard, intercept_require};

/// Start a dynamic `import()` of `specifier` as if the calling script had written it,
/// so relative specifiers resolve against that script.
fn import_from_caller<'js>(ctx: &Ctx<'js>, specifier: String) -> Result<Promise<'js>> {
    let mut options = EvalOptions::default();
    // `require` is native and has no frame of its own, level 0 is the caller
    if let Some(caller) = ctx.script_or_module_name(0) {
        options.filename = Some(caller.to_string()?);
    }
    let import: Function = ctx.eval_with_options("(specifier) => import(specifier)", options)?;
    import.call((specifier,))
}

#[rquickjs::module(rename_vars = "camelCase", rename_types = "camelCase")]
#[allow(clippy::module_inception)]
pub mod require {
    use super::*;

    /// Returns the export record for `hosttypes/...` specifiers that bind, otherwise
    /// the module exports from a dynamic `import()`. For modules with top-level await
    /// the result is a promise that resolves to the module exports.
    #[rquickjs::function]
    pub fn require<'js>(ctx: Ctx<'js>, name: String) -> Result<Object<'js>> {
        if let Some(exports) = intercept_require(&ctx, &name)? {
            return Ok(exports);
        }

        let _guard = FallthroughGuard::enter(&ctx, &name)?;
        let promise = import_from_caller(&ctx, name)?;
        match promise.finish::<Object<'js>>() {
            Ok(result) => Ok(result),
            // the module is still waiting on something, hand out the promise instead
            Err(rquickjs::Error::WouldBlock) => Ok(promise.into_inner()),
            Err(err) => Err(err),
        }
    }

    // The default export is used when we do
    // ```js
    // import require from 'require'
    // ```
    // as opposed to a named export, which is used when we do
    // ```js
    // import { require } from 'require'
    // ```
    #[rquickjs::function]
    pub fn default<'js>(ctx: Ctx<'js>, name: String) -> Result<Object<'js>> {
        require(ctx, name)
    }
}
