mod globals;
mod guards;
mod handler;
pub mod host;
mod host_fn;
pub mod host_types;
mod metrics;
mod modules;
pub mod registry;
pub mod resolution;

use std::rc::Rc;

use anyhow::Context as _;
use hashbrown::HashMap;
use rquickjs::{Context, Runtime};
use tracing::{debug, instrument};

pub use crate::host::{Host, HostLookup};
pub use crate::host_fn::HostFunction;
pub use crate::host_types::{HostMember, HostType};
use crate::guards::{FlushOnDrop, GcOnDrop, JsResultExt as _};
use crate::handler::Handler;
use crate::host::HostModuleLoader;
use crate::host_types::HostTypeBinder;
use crate::modules::NativeModuleLoader;
use crate::resolution::HostTypeLoader;

/// A QuickJS runtime with its handlers and the host types its scripts can import.
pub struct JsRuntime {
    context: Context,
    handlers: HashMap<String, Handler>,
    host_type_loader: HostTypeLoader,
}

// SAFETY:
// `rquickjs::Context` only misses `Send` because it wraps a raw pointer.
// The `Rc`s shared by the loaders and the context userdata never escape the
// runtime, and every public method takes `&mut self`, so nothing is touched
// from two threads at once.
unsafe impl Send for JsRuntime {}

impl JsRuntime {
    /// Create a runtime whose file imports and host type lookups go through `host`.
    #[instrument(skip_all, level = "info")]
    pub fn new<H: Host + 'static>(host: H) -> anyhow::Result<Self> {
        let runtime = Runtime::new().context("Unable to initialize JS_RUNTIME")?;
        let context = Context::full(&runtime).context("Unable to create JS context")?;

        let host: Rc<dyn Host> = Rc::new(host);

        // The loaders go in before the globals, which import native modules.
        // Host type imports are redirected before the host sees them.
        let native_loader = NativeModuleLoader;
        let host_type_loader = HostTypeLoader::default();
        let module_loader = HostModuleLoader::new(host.clone());

        let loader = (native_loader, host_type_loader.clone(), module_loader);
        runtime.set_loader(loader.clone(), loader);

        context.with(|ctx| -> anyhow::Result<()> {
            // `require` reaches the binder and the loader state through the context userdata.
            HostTypeBinder::new(host).install(&ctx)?;
            host_type_loader.install(&ctx)?;

            globals::setup(&ctx).catch(&ctx)
        })?;

        Ok(Self {
            context,
            handlers: HashMap::new(),
            host_type_loader,
        })
    }

    /// Register a host type under a dotted path, e.g. `game.PlayerEntity`.
    ///
    /// Scripts import it as `hosttypes/game/PlayerEntity`. Registered types take precedence
    /// over [`Host::lookup_host_symbol`], and registering the same path again replaces it.
    pub fn register_host_type(
        &mut self,
        path: impl Into<String>,
        host_type: HostType,
    ) -> anyhow::Result<()> {
        let path = path.into();
        anyhow::ensure!(!path.is_empty(), "Host type path must not be empty");
        self.context.with(|ctx| {
            let binder = HostTypeBinder::from_ctx(&ctx).catch(&ctx)?;
            if binder.borrow_mut().insert(path.clone(), host_type).is_some() {
                debug!(path = %path, "replaced registered host type");
            }
            Ok(())
        })
    }

    /// TypeScript declarations for every host type registered with
    /// [`register_host_type`](Self::register_host_type).
    pub fn host_type_declarations(&mut self) -> anyhow::Result<String> {
        self.context.with(|ctx| {
            let binder = HostTypeBinder::from_ctx(&ctx).catch(&ctx)?;
            let registered = binder.borrow();
            Ok(host_types::declarations(
                registered.iter().map(|(path, ty)| (path.as_str(), ty)),
            ))
        })
    }

    /// Compile `handler_script` and register its `handler` export as `function_name`.
    ///
    /// `handler_dir` is the directory relative imports in the script resolve against.
    /// Scripts that don't export anything get `export { handler }` appended.
    #[instrument(skip_all, level = "info")]
    pub fn register_handler(
        &mut self,
        function_name: impl Into<String>,
        handler_script: impl Into<String>,
        handler_dir: impl Into<String>,
    ) -> anyhow::Result<()> {
        let function_name = function_name.into();
        let module_name = handler::module_name(&function_name, &handler_dir.into());
        let script = handler_script.into();

        let handler = self
            .context
            .with(|ctx| Handler::compile(&ctx, &module_name, &script))?;
        debug!(module = %module_name, "registered handler {function_name}");
        self.handlers.insert(function_name, handler);
        Ok(())
    }

    /// Call a registered handler with a JSON `event`, returning its result as JSON.
    ///
    /// Output is flushed afterwards, and a GC cycle runs if `run_gc` is set.
    pub fn run_handler(
        &mut self,
        function_name: String,
        event: String,
        run_gc: bool,
    ) -> anyhow::Result<String> {
        let handler = self
            .handlers
            .get(&function_name)
            .with_context(|| format!("No handler registered for function {function_name}"))?;

        let _flush = FlushOnDrop;
        self.context.with(|ctx| {
            let _gc = GcOnDrop::new(run_gc, &ctx);
            handler.call(&ctx, event)
        })
    }
}

impl Drop for JsRuntime {
    fn drop(&mut self) {
        modules::io::io::flush();
        // persistent values must go before the context does
        self.handlers.clear();
        self.host_type_loader.clear_pending();
    }
}
