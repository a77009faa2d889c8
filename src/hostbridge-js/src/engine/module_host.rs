use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use hostbridge_js_runtime::{Host, HostLookup};
use oxc_resolver::{ResolveOptions, ResolverGeneric};
use tracing::{Level, instrument};

use crate::resolver::FileSystem;

type ResolveFn = dyn Fn(&str, &str) -> anyhow::Result<String> + Send + Sync;
type LoadFn = dyn Fn(&str) -> anyhow::Result<String> + Send + Sync;
type SymbolLookupFn = dyn Fn(&str) -> HostLookup + Send + Sync;

/// The [`Host`] an [`Engine`](crate::Engine) hands to its runtime.
///
/// Without a module loader every file import fails to resolve. Without a symbol lookup
/// only the host types registered on the builder can be imported.
#[derive(Clone, Default)]
pub(crate) struct ModuleHost {
    resolve: Option<Arc<ResolveFn>>,
    load: Option<Arc<LoadFn>>,
    lookup: Option<Arc<SymbolLookupFn>>,
}

impl ModuleHost {
    pub(crate) fn set_file_system<Fs: FileSystem + Clone + Send + Sync + 'static>(
        &mut self,
        file_system: Fs,
    ) {
        let resolver = ResolverGeneric::new_with_file_system(
            file_system.clone(),
            ResolveOptions {
                extensions: vec![".js".into(), ".mjs".into()],
                condition_names: vec!["import".into(), "module".into()],
                ..Default::default()
            },
        );

        self.resolve = Some(Arc::new(move |base: &str, specifier: &str| {
            tracing::debug!(base = %base, specifier = %specifier, "Resolving module");
            let resolved = resolver.resolve(base, specifier).map_err(|e| {
                anyhow!("Failed to resolve module '{specifier}' from '{base}': {e:?}")
            })?;
            Ok(resolved.path().to_string_lossy().to_string())
        }));

        self.load = Some(Arc::new(move |path: &str| {
            tracing::debug!(path = %path, "Loading module");
            file_system
                .read_to_string(&PathBuf::from(path))
                .with_context(|| format!("Failed to read module '{path}'"))
        }));
    }

    pub(crate) fn set_symbol_lookup(
        &mut self,
        lookup: impl Fn(&str) -> HostLookup + Send + Sync + 'static,
    ) {
        self.lookup = Some(Arc::new(lookup));
    }
}

impl Host for ModuleHost {
    fn resolve_module(&self, base: String, name: String) -> anyhow::Result<String> {
        let resolve = self
            .resolve
            .as_ref()
            .context("No module loader has been set")?;
        resolve(&base, &name)
    }

    fn load_module(&self, name: String) -> anyhow::Result<String> {
        let load = self
            .load
            .as_ref()
            .context("No module loader has been set")?;
        load(&name)
    }

    #[instrument(skip(self), level = Level::DEBUG)]
    fn lookup_host_symbol(&self, path: &str) -> HostLookup {
        match &self.lookup {
            Some(lookup) => lookup(path),
            None => HostLookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed_modules;

    #[test]
    fn test_resolves_embedded_modules() {
        let mut host = ModuleHost::default();
        host.set_file_system(embed_modules! {
            "game/rules.js" => @inline "export const rules = [];",
        });

        let path = host
            .resolve_module("/".to_string(), "./game/rules".to_string())
            .unwrap();
        assert!(path.ends_with("game/rules.js"), "{path}");
        assert_eq!(host.load_module(path).unwrap(), "export const rules = [];");
    }

    #[test]
    fn test_without_file_system() {
        let host = ModuleHost::default();
        assert!(
            host.resolve_module("/".to_string(), "./math.js".to_string())
                .is_err()
        );
        assert!(host.load_module("/math.js".to_string()).is_err());
    }

    #[test]
    fn test_symbol_lookup() {
        let mut host = ModuleHost::default();
        assert!(matches!(
            host.lookup_host_symbol("game.PlayerEntity"),
            HostLookup::NotFound
        ));

        host.set_symbol_lookup(|path| match path {
            "game.Broken" => HostLookup::LookupError("boom".to_string()),
            _ => HostLookup::NotFound,
        });
        assert!(matches!(
            host.lookup_host_symbol("game.Broken"),
            HostLookup::LookupError(reason) if reason == "boom"
        ));
    }
}
