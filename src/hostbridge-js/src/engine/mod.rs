/// The engine and its builder
#[allow(clippy::module_inception)]
pub(crate) mod engine;
/// Metric definitions for the engine
pub(crate) mod metrics;
/// The host the engine's runtime resolves modules and host types through
pub(crate) mod module_host;
