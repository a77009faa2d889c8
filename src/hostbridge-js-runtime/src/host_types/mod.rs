//! Host types: what the host exposes, how `hosttypes/...` specifiers name them, and how
//! they are bound into export records.

use std::collections::BTreeMap;

use rquickjs::{Ctx, Exception, Object};

use crate::host_fn::HostFunction;

mod binder;
mod declarations;
mod specifier;

pub(crate) use binder::HostTypeBinder;
pub use binder::BindError;
pub use declarations::declarations;
pub use specifier::{ExportName, HostTypeImport, HostTypePath, classify};

/// A member of a host type.
#[derive(Clone)]
pub enum HostMember {
    /// A function scripts can call, e.g. `PlayerEntity.describe("steve")`.
    Function(HostFunction),
    /// A value copied into the guest wrapper, e.g. `PlayerEntity.MAX_HEALTH`.
    Constant(serde_json::Value),
}

/// A type owned by the host environment.
///
/// Scripts see a plain object with one property per member. The object only holds
/// shared references to the host's functions, the type itself stays with the host.
#[derive(Clone, Default)]
pub struct HostType {
    members: BTreeMap<String, HostMember>,
}

impl HostType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function member.
    pub fn with_function(mut self, name: impl Into<String>, func: HostFunction) -> Self {
        self.members
            .insert(name.into(), HostMember::Function(func));
        self
    }

    /// Add a constant member.
    pub fn with_constant(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.members
            .insert(name.into(), HostMember::Constant(value.into()));
        self
    }

    /// The members of this type, ordered by name.
    pub fn members(&self) -> impl Iterator<Item = (&str, &HostMember)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Build the guest-visible handle for this type.
    pub(crate) fn to_js<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
        let handle = Object::new(ctx.clone())?;
        for (name, member) in self.members.iter() {
            match member {
                HostMember::Function(func) => {
                    handle.set(name.as_str(), func.to_js(ctx, name)?)?;
                }
                HostMember::Constant(value) => {
                    let json = serde_json::to_string(value).map_err(|e| {
                        Exception::throw_internal(ctx, &format!("Serializing {name}: {e}"))
                    })?;
                    handle.set(name.as_str(), ctx.json_parse(json)?)?;
                }
            }
        }
        Ok(handle)
    }
}

/// Build a fresh export record `{ <export_name>: <handle> }`.
pub(crate) fn export_record<'js>(
    ctx: &Ctx<'js>,
    export_name: &ExportName,
    host_type: &HostType,
) -> rquickjs::Result<Object<'js>> {
    let handle = host_type.to_js(ctx)?;
    let exports = Object::new(ctx.clone())?;
    exports.set(export_name.as_str(), handle)?;
    Ok(exports)
}
