use std::sync::Arc;

use anyhow::Context as _;
use rquickjs::prelude::Rest;
use rquickjs::{Ctx, Exception, Function, Value};
use serde::Serialize;
use serde::de::DeserializeOwned;

type RawHostFn = dyn for<'js> Fn(&Ctx<'js>, Rest<Value<'js>>) -> rquickjs::Result<Value<'js>>;

/// Closures can't name the `'js` lifetime shared by their argument and result
/// (https://github.com/rust-lang/rust/issues/97362), but they infer it when passed
/// through a function whose bound spells it out.
fn coerce_fn_signature<F>(f: F) -> F
where
    F: for<'js> Fn(Ctx<'js>, Rest<Value<'js>>) -> rquickjs::Result<Value<'js>>,
{
    f
}

/// Same as [`coerce_fn_signature`] for the borrowed-context closures stored in a
/// [`HostFunction`].
fn coerce_raw_fn<F>(f: F) -> F
where
    F: for<'js> Fn(&Ctx<'js>, Rest<Value<'js>>) -> rquickjs::Result<Value<'js>>,
{
    f
}

fn coerce_anyhow_fn<F>(f: F) -> F
where
    F: for<'js> Fn(&Ctx<'js>, Rest<Value<'js>>) -> anyhow::Result<Value<'js>>,
{
    f
}

/// A Rust closure exposed as a member of a [`HostType`](crate::HostType).
///
/// Cloning shares the closure. Every guest-side handle of a host type calls into the same
/// `Arc`, so scripts never own host functions.
#[derive(Clone)]
pub struct HostFunction {
    func: Arc<RawHostFn>,
}

impl HostFunction {
    /// A host function working on rquickjs values directly.
    ///
    /// Errors that are not already JS exceptions are thrown as `InternalError`s.
    pub fn new(
        func: impl for<'js> Fn(&Ctx<'js>, Rest<Value<'js>>) -> anyhow::Result<Value<'js>> + 'static,
    ) -> Self {
        let func = coerce_raw_fn(move |ctx, args| {
            func(ctx, args).map_err(|err| throw_host_error(ctx, err))
        });
        Self {
            func: Arc::new(func),
        }
    }

    /// A host function taking its arguments as a JSON array and returning JSON.
    pub fn new_json(func: impl Fn(String) -> anyhow::Result<String> + 'static) -> Self {
        Self::new(coerce_anyhow_fn(move |ctx, args| {
            let args = ctx
                .json_stringify(args.into_inner())?
                .map(|json| json.to_string())
                .transpose()?
                .context("Serializing host function arguments")?;
            let result = func(args).context("Calling host function")?;
            ctx.json_parse(result).context("Parsing host function result")
        }))
    }

    /// A host function over serde types, e.g. `|name: String| -> anyhow::Result<String>`.
    ///
    /// Arguments and result make a round trip through JSON.
    pub fn new_serde<Args: DeserializeOwned, Output: Serialize>(
        func: impl fn_traits::Fn<Args, Output = anyhow::Result<Output>> + 'static,
    ) -> Self {
        Self::new_json(move |args: String| -> anyhow::Result<String> {
            let args: Args =
                serde_json::from_str(&args).context("Deserializing arguments for host function")?;
            let output = func.call(args)?;
            serde_json::to_string(&output).context("Serializing output of host function")
        })
    }

    pub fn call<'js>(&self, ctx: &Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<Value<'js>> {
        (self.func)(ctx, args)
    }

    /// A JS function named `name` that calls this host function.
    pub(crate) fn to_js<'js>(&self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Function<'js>> {
        let this = self.clone();
        let func = coerce_fn_signature(move |ctx, args| this.call(&ctx, args));
        Function::new(ctx.clone(), func)?.with_name(name)
    }
}

fn throw_host_error(ctx: &Ctx<'_>, err: anyhow::Error) -> rquickjs::Error {
    match err.downcast::<rquickjs::Error>() {
        Ok(err) => err,
        Err(err) => Exception::throw_internal(ctx, &format!("Host function error: {err:#?}")),
    }
}
