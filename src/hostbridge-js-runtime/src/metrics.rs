/*!
Metric names emitted by host type resolution
*/

// Counter, outcome of every bind attempt, labelled with `outcome`
pub(crate) static METRIC_HOST_TYPE_BINDS: &str = "host_type_binds_total";

// Counter, imports redirected from ESM to `require`
pub(crate) static METRIC_HOST_TYPE_REDIRECTS: &str = "host_type_redirects_total";
