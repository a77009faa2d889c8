use std::fmt;
use std::sync::Arc;

use hostbridge_js_common::TRY_COMMON_JS_TOKEN;
use spin::Lazy;

/// A location handed back by the ESM resolve hook.
#[derive(PartialEq, Eq)]
pub struct ResolvedUrl(String);

impl ResolvedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `url` is the [`TRY_COMMON_JS`] sentinel.
    ///
    /// This compares identity, a location that spells the same text is not the sentinel.
    pub fn is_try_common_js(url: &Arc<ResolvedUrl>) -> bool {
        Arc::ptr_eq(url, &TRY_COMMON_JS)
    }
}

impl fmt::Debug for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolvedUrl").field(&self.0).finish()
    }
}

/// The sentinel asking the runtime to retry a specifier through `require`.
/// Created once per process and never mutated.
pub static TRY_COMMON_JS: Lazy<Arc<ResolvedUrl>> =
    Lazy::new(|| Arc::new(ResolvedUrl::new(TRY_COMMON_JS_TOKEN)));
