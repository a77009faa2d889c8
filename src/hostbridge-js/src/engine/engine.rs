use std::collections::BTreeMap;

use anyhow::{Context as _, bail, ensure};
use hostbridge_js_runtime::{HostLookup, HostType, JsRuntime};
use tracing::{Level, instrument};

use super::metrics::{EngineMetricsGuard, EventHandlerMetricGuard};
use super::module_host::ModuleHost;
use crate::Script;
use crate::resolver::FileSystem;

/// A builder for an [`Engine`].
///
/// ```no_run
/// use hostbridge_js::{EngineBuilder, HostLookup, HostType, Script, embed_modules};
///
/// let mut engine = EngineBuilder::new()
///     .with_module_loader(embed_modules! {
///         "math.js" => @inline "export const add = (a, b) => a + b;",
///     })
///     .host_type("game.Limits", HostType::new().with_constant("MAX_PLAYERS", 20))
///     .with_symbol_lookup(|_path| HostLookup::NotFound)
///     .build()
///     .unwrap();
///
/// let handler = Script::from_content(
///     r#"
///     import { Limits } from "hosttypes/game/Limits";
///     function handler(event) {
///         return Limits.MAX_PLAYERS;
///     }
///     "#,
/// );
/// engine.add_handler("handler", handler).unwrap();
/// assert_eq!(engine.handle_event("handler", "{}".to_string(), None).unwrap(), "20");
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    host: ModuleHost,
    host_types: BTreeMap<String, HostType>,
}

impl EngineBuilder {
    /// Create a new EngineBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a file system for module resolution and loading.
    ///
    /// Enables JavaScript module imports using the provided [`FileSystem`] implementation.
    pub fn with_module_loader<Fs: FileSystem + Clone + Send + Sync + 'static>(
        mut self,
        file_system: Fs,
    ) -> Self {
        self.host.set_file_system(file_system);
        self
    }

    /// Make a host type importable as `hosttypes/<path with '/' for '.'>`.
    ///
    /// Types added here are found before the symbol lookup is asked.
    pub fn host_type(mut self, path: impl Into<String>, host_type: HostType) -> Self {
        self.host_types.insert(path.into(), host_type);
        self
    }

    /// Set the lookup used for host types that were not added with [`host_type`](Self::host_type).
    pub fn with_symbol_lookup(
        mut self,
        lookup: impl Fn(&str) -> HostLookup + Send + Sync + 'static,
    ) -> Self {
        self.host.set_symbol_lookup(lookup);
        self
    }

    /// Create the engine and its JavaScript runtime.
    #[instrument(err(Debug), skip_all, level=Level::INFO)]
    pub fn build(self) -> crate::Result<Engine> {
        let mut runtime = JsRuntime::new(self.host)?;
        for (path, host_type) in self.host_types {
            runtime
                .register_host_type(path.clone(), host_type)
                .with_context(|| format!("Registering host type {path}"))?;
        }
        Ok(Engine {
            runtime,
            handlers: BTreeMap::new(),
            _metric_guard: EngineMetricsGuard::new(),
        })
    }
}

/// A JavaScript runtime with handlers loaded, ready to handle events.
pub struct Engine {
    runtime: JsRuntime,
    handlers: BTreeMap<String, Script>,
    // metric drop guard to manage engine metric
    _metric_guard: EngineMetricsGuard,
}

impl Engine {
    /// Compile and register a handler. The script's imports are resolved right away,
    /// so a missing module or host type fails here.
    #[instrument(err(Debug), skip(self, script), level=Level::DEBUG)]
    pub fn add_handler<F>(&mut self, function_name: F, script: Script) -> crate::Result<()>
    where
        F: Into<String> + std::fmt::Debug,
    {
        let function_name = function_name.into();
        ensure!(!function_name.is_empty(), "Handler name must not be empty");
        if self.handlers.contains_key(&function_name) {
            bail!("Handler already exists for function name: {function_name}");
        }

        let path = script
            .base_path()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        self.runtime
            .register_handler(function_name.clone(), script.content(), path)?;

        self.handlers.insert(function_name, script);
        Ok(())
    }

    /// The names of the registered handlers.
    pub fn handlers(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Handles an event by calling the specified handler with the event data.
    ///
    /// `event` must be valid JSON. Garbage is collected after the call unless `gc` is `Some(false)`.
    #[instrument(err(Debug), skip(self, event, gc), level=Level::INFO)]
    pub fn handle_event<F>(
        &mut self,
        func_name: F,
        event: String,
        gc: Option<bool>,
    ) -> crate::Result<String>
    where
        F: Into<String> + std::fmt::Debug,
    {
        // check that this string is a valid JSON
        let _json_val: serde_json::Value =
            serde_json::from_str(&event).context("Event is not valid JSON")?;

        let should_gc = gc.unwrap_or(true);
        let func_name = func_name.into();
        ensure!(!func_name.is_empty(), "Handler name must not be empty");

        let _metric_guard = EventHandlerMetricGuard::new(&func_name, should_gc);

        self.runtime
            .run_handler(func_name.clone(), event, should_gc)
    }

    /// TypeScript declarations for the host types added to the builder.
    pub fn host_type_declarations(&mut self) -> crate::Result<String> {
        self.runtime.host_type_declarations()
    }
}
