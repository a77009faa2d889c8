//! Routing of `hosttypes/...` specifiers through the two module systems.
//!
//! `require` binds host types directly (see [`intercept_require`]). ESM imports are
//! redirected: the resolve hook answers with the [`TRY_COMMON_JS`] sentinel, the same
//! `require` hook binds the record while the importer's base is still known, and the
//! loader declares a small module re-exporting that record.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, ensure};
use hashbrown::{HashMap, HashSet};
use hostbridge_js_common::TRY_COMMON_JS_TOKEN;
use rquickjs::loader::{Loader, Resolver};
use rquickjs::{Ctx, Exception, JsLifetime, Module, Object, Persistent, Result};
use tracing::debug;

mod esm;
mod require;
mod sentinel;

pub use esm::intercept_resolve;
pub use require::intercept_require;
pub use sentinel::{ResolvedUrl, TRY_COMMON_JS};

/// Separates the sentinel from the original specifier in a redirected module name.
const REDIRECT_SEPARATOR: char = '?';

/// `import.meta` key the bound record is handed to the redirected module under.
const RECORD_META_KEY: &str = "record";

/// Resolver and loader for `import` statements naming host types.
///
/// It also tracks the specifiers whose binding failed and are being handed to native
/// resolution, so that they are not intercepted a second time. It is stored as a
/// userdata in the context, install it with `install`.
#[derive(Clone, Default, JsLifetime)]
pub(crate) struct HostTypeLoader {
    falling_through: Rc<RefCell<HashSet<String>>>,
    /// Records bound during resolution, waiting for their module to be declared.
    pending: Rc<RefCell<HashMap<String, Persistent<Object<'static>>>>>,
}

impl HostTypeLoader {
    pub(crate) fn install(&self, ctx: &Ctx) -> anyhow::Result<()> {
        ensure!(
            ctx.userdata::<Self>().is_none(),
            "HostTypeLoader is already installed"
        );
        let Ok(None) = ctx.store_userdata(self.clone()) else {
            bail!("Failed to install HostTypeLoader");
        };
        Ok(())
    }

    pub(crate) fn from_ctx(ctx: &Ctx<'_>) -> Result<Self> {
        match ctx.userdata::<Self>() {
            Some(loader) => Ok(HostTypeLoader::clone(&loader)),
            None => Err(Exception::throw_internal(ctx, "HostTypeLoader not found")),
        }
    }

    /// Drop records that were bound but never loaded.
    ///
    /// They are persistent values, so this must run before the runtime is freed.
    pub(crate) fn clear_pending(&self) {
        self.pending.borrow_mut().clear();
    }

    fn is_falling_through(&self, specifier: &str) -> bool {
        self.falling_through.borrow().contains(specifier)
    }

    /// Bind `specifier` for an import from `base`.
    ///
    /// When binding fails the error is a plain resolving error, which hands the specifier
    /// to the file loaders with the importer's base, exactly as if it named a file.
    fn bind_redirect<'js>(&self, ctx: &Ctx<'js>, base: &str, specifier: &str) -> Result<String> {
        let Some(record) = intercept_require(ctx, specifier)? else {
            return Err(rquickjs::Error::new_resolving(base, specifier));
        };
        let name = redirected_name(specifier);
        self.pending
            .borrow_mut()
            .insert(name.clone(), Persistent::save(ctx, record));
        Ok(name)
    }
}

impl Resolver for HostTypeLoader {
    fn resolve<'js>(&mut self, ctx: &Ctx<'js>, base: &str, name: &str) -> Result<String> {
        if self.is_falling_through(name) {
            return Err(rquickjs::Error::new_resolving(base, name));
        }

        match intercept_resolve(name, base) {
            Some(url) if ResolvedUrl::is_try_common_js(&url) => self.bind_redirect(ctx, base, name),
            Some(url) => Ok(url.as_str().to_string()),
            None => Err(rquickjs::Error::new_resolving(base, name)),
        }
    }
}

impl Loader for HostTypeLoader {
    fn load<'js>(&mut self, ctx: &Ctx<'js>, name: &str) -> Result<Module<'js>> {
        let record = redirected_specifier(name).and_then(|_| self.pending.borrow_mut().remove(name));
        let Some(record) = record else {
            return Err(rquickjs::Error::new_loading(name));
        };
        let record = record.restore(ctx)?;
        let keys = record.keys::<String>().collect::<Result<Vec<_>>>()?;

        let module = Module::declare(ctx.clone(), name, record_module(&keys))?;
        module.meta()?.set(RECORD_META_KEY, record)?;

        metrics::counter!(crate::metrics::METRIC_HOST_TYPE_REDIRECTS).increment(1);
        debug!(module = name, "declared host type module");
        Ok(module)
    }
}

fn redirected_name(specifier: &str) -> String {
    format!("{TRY_COMMON_JS_TOKEN}{REDIRECT_SEPARATOR}{specifier}")
}

fn redirected_specifier(name: &str) -> Option<&str> {
    name.strip_prefix(TRY_COMMON_JS_TOKEN)?
        .strip_prefix(REDIRECT_SEPARATOR)
}

/// Source of the module standing in for a bound export record with the given keys.
///
/// The default export is the record itself. Every other key becomes a named export
/// through a local of our own, so any string is a valid export name.
fn record_module<S: AsRef<str>>(keys: &[S]) -> String {
    let mut source = format!(
        "const record = import.meta.{RECORD_META_KEY};\nexport default record;\n"
    );
    for (i, key) in keys.iter().map(AsRef::as_ref).enumerate() {
        if key == "default" {
            continue;
        }
        let quoted = serde_json::Value::from(key).to_string();
        source.push_str(&format!(
            "const __record_handle_{i} = record[{quoted}];\nexport {{ __record_handle_{i} as {quoted} }};\n"
        ));
    }
    source
}

/// Marks a specifier as being resolved natively for as long as the guard lives.
///
/// While marked, [`HostTypeLoader`] does not redirect it, so a failed bind cannot loop
/// back into the host type path.
pub(crate) struct FallthroughGuard {
    falling_through: Rc<RefCell<HashSet<String>>>,
    specifier: Option<String>,
}

impl FallthroughGuard {
    pub(crate) fn enter(ctx: &Ctx<'_>, specifier: &str) -> Result<Self> {
        let falling_through = HostTypeLoader::from_ctx(ctx)?.falling_through;
        // only the outermost guard for a specifier removes it again
        let inserted = falling_through.borrow_mut().insert(specifier.to_string());
        Ok(Self {
            falling_through,
            specifier: inserted.then(|| specifier.to_string()),
        })
    }
}

impl Drop for FallthroughGuard {
    fn drop(&mut self) {
        if let Some(specifier) = self.specifier.take() {
            self.falling_through.borrow_mut().remove(&specifier);
        }
    }
}
