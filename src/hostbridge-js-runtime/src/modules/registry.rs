use rquickjs::{Ctx, Exception, Result};

use crate::registry::{MESSAGE_REGISTRY, TrafficDirection};

#[rquickjs::module(rename_vars = "camelCase", rename_types = "camelCase")]
#[allow(clippy::module_inception)]
pub mod registry {
    use super::*;

    /// The message identifiers recorded for `direction`, in recording order.
    #[rquickjs::function]
    pub fn identifiers(ctx: Ctx<'_>, direction: String) -> Result<Vec<String>> {
        let direction: TrafficDirection = direction
            .parse()
            .map_err(|e| Exception::throw_type(&ctx, &format!("{e}")))?;
        Ok(MESSAGE_REGISTRY.identifiers(direction))
    }
}
