use std::rc::Rc;

use anyhow::Result;
use rquickjs::loader::{Loader, Resolver};
use rquickjs::{Ctx, Module};
use tracing::debug;

use crate::host_types::HostType;

/// A trait representing the host environment for the JS runtime.
/// It provides native module resolution for ordinary files and the symbol
/// lookup behind `hosttypes/...` imports.
pub trait Host: Send + Sync {
    /// Resolve a module name to a module specifier (usually a path).
    /// The base is the directory of the module that is importing the module.
    fn resolve_module(&self, base: String, name: String) -> Result<String>;

    /// Obtain the module source code for a given module specifier.
    fn load_module(&self, name: String) -> Result<String>;

    /// Look up a host type by its dotted path, e.g. `game.PlayerEntity`.
    ///
    /// This is only consulted for types that were not registered on the runtime with
    /// [`JsRuntime::register_host_type`](crate::JsRuntime::register_host_type).
    fn lookup_host_symbol(&self, path: &str) -> HostLookup {
        let _ = path;
        HostLookup::NotFound
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn resolve_module(&self, base: String, name: String) -> Result<String> {
        (**self).resolve_module(base, name)
    }

    fn load_module(&self, name: String) -> Result<String> {
        (**self).load_module(name)
    }

    fn lookup_host_symbol(&self, path: &str) -> HostLookup {
        (**self).lookup_host_symbol(path)
    }
}

/// The outcome of a host symbol lookup.
///
/// Every variant other than `Found` ends up as the same "module not found" error in
/// script code; the distinction only shows in logs and metrics.
pub enum HostLookup {
    /// The host knows the type.
    Found(HostType),
    /// No type exists under the requested path.
    NotFound,
    /// The host failed while looking the type up, e.g. the type is not accessible.
    LookupError(String),
}

impl From<Option<HostType>> for HostLookup {
    fn from(value: Option<HostType>) -> Self {
        match value {
            Some(host_type) => HostLookup::Found(host_type),
            None => HostLookup::NotFound,
        }
    }
}

impl From<Result<Option<HostType>>> for HostLookup {
    fn from(value: Result<Option<HostType>>) -> Self {
        match value {
            Ok(found) => found.into(),
            Err(e) => HostLookup::LookupError(format!("{e:#}")),
        }
    }
}

impl core::fmt::Debug for HostLookup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HostLookup::Found(_) => f.debug_tuple("Found").finish(),
            HostLookup::NotFound => f.write_str("NotFound"),
            HostLookup::LookupError(reason) => f.debug_tuple("LookupError").field(reason).finish(),
        }
    }
}

/// Resolves and loads ordinary module files through a [`Host`].
///
/// Last in the loader chain: native modules and host type redirects are tried first.
#[derive(Clone)]
pub(crate) struct HostModuleLoader {
    host: Rc<dyn Host>,
}

impl HostModuleLoader {
    pub(crate) fn new(host: Rc<dyn Host>) -> Self {
        Self { host }
    }
}

impl Resolver for HostModuleLoader {
    fn resolve(&mut self, _ctx: &Ctx<'_>, base: &str, name: &str) -> rquickjs::Result<String> {
        // QuickJS passes the importing module, the host wants its directory
        let dir = base.rsplit_once('/').map_or(".", |(dir, _)| dir);
        match self.host.resolve_module(dir.to_string(), name.to_string()) {
            Ok(path) => Ok(path.replace('\\', "/")),
            Err(err) => {
                debug!(base, name, "{err:#}");
                Err(rquickjs::Error::new_resolving(base, name))
            }
        }
    }
}

impl Loader for HostModuleLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<Module<'js>> {
        match self.host.load_module(name.to_string()) {
            Ok(source) => Module::declare(ctx.clone(), name, source),
            Err(err) => {
                debug!(name, "{err:#}");
                Err(rquickjs::Error::new_loading(name))
            }
        }
    }
}
