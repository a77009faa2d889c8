use anyhow::anyhow;
use rquickjs::{CatchResultExt, Ctx};

/// Turns a rquickjs result into an anyhow one, taking the pending JS exception with it.
pub(crate) trait JsResultExt<T> {
    fn catch(self, ctx: &Ctx<'_>) -> anyhow::Result<T>;
}

impl<T> JsResultExt<T> for rquickjs::Result<T> {
    fn catch(self, ctx: &Ctx<'_>) -> anyhow::Result<T> {
        CatchResultExt::catch(self, ctx).map_err(|err| anyhow!("Runtime error: {err:#?}"))
    }
}

/// Flushes buffered script output when dropped.
pub(crate) struct FlushOnDrop;

impl Drop for FlushOnDrop {
    fn drop(&mut self) {
        crate::modules::io::io::flush();
    }
}

/// Runs a garbage collection cycle on the context when dropped, if enabled.
pub(crate) struct GcOnDrop<'js> {
    ctx: Option<Ctx<'js>>,
}

impl<'js> GcOnDrop<'js> {
    pub(crate) fn new(enabled: bool, ctx: &Ctx<'js>) -> Self {
        Self {
            ctx: enabled.then(|| ctx.clone()),
        }
    }
}

impl Drop for GcOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = &self.ctx {
            ctx.run_gc();
        }
    }
}
