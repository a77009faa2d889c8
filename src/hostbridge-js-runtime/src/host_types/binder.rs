use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, ensure};
use rquickjs::{Ctx, Exception, JsLifetime, Object};

use super::{HostType, HostTypeImport, HostTypePath, export_record};
use crate::host::{Host, HostLookup};

/// Why a classified specifier did not bind.
///
/// Never shown to scripts: a failed bind hands the specifier back to native resolution,
/// which reports it like any other missing module.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("host type `{0}` not found")]
    NotFound(HostTypePath),
    #[error("looking up host type `{path}` failed: {reason}")]
    Lookup { path: HostTypePath, reason: String },
    #[error("exposing host type `{path}` to scripts failed")]
    Wrap {
        path: HostTypePath,
        #[source]
        source: rquickjs::Error,
    },
}

impl BindError {
    /// Label used for the bind outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            BindError::NotFound(_) => "not_found",
            BindError::Lookup { .. } => "lookup_error",
            BindError::Wrap { .. } => "wrap_error",
        }
    }
}

/// Looks host types up and wraps them into export records.
///
/// This struct is stored as a userdata in the context, so that `require` can reach it
/// without holding on to the runtime. Install it with `install`.
#[derive(Clone, JsLifetime)]
pub(crate) struct HostTypeBinder {
    host: Rc<dyn Host>,
    registered: Rc<RefCell<BTreeMap<String, HostType>>>,
}

impl HostTypeBinder {
    pub(crate) fn new(host: Rc<dyn Host>) -> Self {
        Self {
            host,
            registered: Rc::default(),
        }
    }

    pub(crate) fn install(&self, ctx: &Ctx) -> anyhow::Result<()> {
        ensure!(
            ctx.userdata::<Self>().is_none(),
            "HostTypeBinder is already installed"
        );
        let Ok(None) = ctx.store_userdata(self.clone()) else {
            bail!("Failed to install HostTypeBinder");
        };
        Ok(())
    }

    pub(crate) fn from_ctx(ctx: &Ctx<'_>) -> rquickjs::Result<Self> {
        match ctx.userdata::<Self>() {
            Some(binder) => Ok(HostTypeBinder::clone(&binder)),
            None => Err(Exception::throw_internal(ctx, "HostTypeBinder not found")),
        }
    }

    pub(crate) fn borrow(&self) -> Ref<'_, BTreeMap<String, HostType>> {
        self.registered.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, BTreeMap<String, HostType>> {
        self.registered.borrow_mut()
    }

    /// Find the host type for `path`. Registered types shadow the host's own lookup,
    /// and the host is asked at most once.
    pub(crate) fn lookup(&self, path: &HostTypePath) -> Result<HostType, BindError> {
        if let Some(host_type) = self.borrow().get(path.as_str()) {
            return Ok(host_type.clone());
        }

        match self.host.lookup_host_symbol(path.as_str()) {
            HostLookup::Found(host_type) => Ok(host_type),
            HostLookup::NotFound => Err(BindError::NotFound(path.clone())),
            HostLookup::LookupError(reason) => Err(BindError::Lookup {
                path: path.clone(),
                reason,
            }),
        }
    }

    /// Look the import up and build its export record.
    pub(crate) fn bind<'js>(
        &self,
        ctx: &Ctx<'js>,
        import: &HostTypeImport,
    ) -> Result<Object<'js>, BindError> {
        let host_type = self.lookup(&import.path)?;

        export_record(ctx, &import.export_name, &host_type).map_err(|source| {
            if matches!(source, rquickjs::Error::Exception) {
                // drop the pending exception, the caller falls back to native resolution
                let _ = ctx.catch();
            }
            BindError::Wrap {
                path: import.path.clone(),
                source,
            }
        })
    }
}
