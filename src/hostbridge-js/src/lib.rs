//! This crate embeds a JavaScript runtime whose scripts can import host types with
//! `hosttypes/...` specifiers, through both `require` and ESM `import`.
#![deny(dead_code, missing_docs, unused_mut)]
#![cfg_attr(not(any(test, debug_assertions)), warn(clippy::panic))]
#![cfg_attr(not(any(test, debug_assertions)), warn(clippy::expect_used))]
#![cfg_attr(not(any(test, debug_assertions)), warn(clippy::unwrap_used))]
#![cfg_attr(any(test, debug_assertions), allow(clippy::disallowed_macros))]

mod engine;
mod resolver;
mod script;

/// A JavaScript runtime with handlers loaded.
pub use engine::engine::Engine;
/// A builder for creating a new `Engine`
pub use engine::engine::EngineBuilder;
/// A function a host type exposes to scripts.
pub use hostbridge_js_runtime::HostFunction;
/// The outcome of looking up a host type.
pub use hostbridge_js_runtime::HostLookup;
/// A type owned by the host that scripts can import.
pub use hostbridge_js_runtime::HostType;
/// A member of a host type.
pub use hostbridge_js_runtime::HostMember;
/// The process-wide record of protocol message identifiers.
pub use hostbridge_js_runtime::registry::{MESSAGE_REGISTRY, MessageRegistry, TrafficDirection};
/// Module resolution and loading functionality.
pub use resolver::{FileMetadata, FileSystem, FileSystemEmbedded, ResolveError};
/// Types for working with JS script.
pub use script::Script;
/// The Result of an engine operation
pub type Result<T> = anyhow::Result<T>;
