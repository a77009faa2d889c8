use rquickjs::{Ctx, Object};
use tracing::{debug, warn};

use crate::host_types::{BindError, HostTypeBinder, classify};
use crate::metrics::METRIC_HOST_TYPE_BINDS;

/// Hook run before native `require` resolution.
///
/// Returns the export record `{ <ExportName>: <handle> }` when `specifier` names a host
/// type that binds. `Ok(None)` means the caller must continue with native resolution,
/// either because the specifier is not a host type or because binding it failed.
///
/// Bind failures never surface here: they are logged and counted, and the script sees
/// whatever native resolution reports for the same specifier.
pub fn intercept_require<'js>(
    ctx: &Ctx<'js>,
    specifier: &str,
) -> rquickjs::Result<Option<Object<'js>>> {
    let Some(import) = classify(specifier) else {
        return Ok(None);
    };

    let binder = HostTypeBinder::from_ctx(ctx)?;
    match binder.bind(ctx, &import) {
        Ok(exports) => {
            metrics::counter!(METRIC_HOST_TYPE_BINDS, "outcome" => "bound").increment(1);
            debug!(specifier, path = %import.path, export = %import.export_name, "bound host type");
            Ok(Some(exports))
        }
        Err(err) => {
            metrics::counter!(METRIC_HOST_TYPE_BINDS, "outcome" => err.outcome()).increment(1);
            if let BindError::NotFound(_) = err {
                debug!(specifier, "{err}, falling back");
            } else {
                let err = anyhow::Error::from(err);
                warn!(specifier, "{err:#}, falling back");
            }
            Ok(None)
        }
    }
}
