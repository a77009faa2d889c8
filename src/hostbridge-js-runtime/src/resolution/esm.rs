use std::sync::Arc;

use tracing::trace;

use super::sentinel::{ResolvedUrl, TRY_COMMON_JS};
use crate::host_types::classify;

/// Resolve hook run before URL-based resolution of an `import` specifier.
///
/// Host type specifiers are never bound here. They get [`TRY_COMMON_JS`] back, which makes
/// the runtime retry the same specifier through the `require` hook, where binding and its
/// failure reporting live. `None` leaves the specifier to native resolution.
pub fn intercept_resolve(specifier: &str, parent: &str) -> Option<Arc<ResolvedUrl>> {
    let import = classify(specifier)?;
    trace!(specifier, parent, path = %import.path, "deferring host type import to require");
    Some(Arc::clone(&TRY_COMMON_JS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_types_get_the_sentinel() {
        let url = intercept_resolve("hosttypes/game/PlayerEntity", "/handler.js").unwrap();
        assert!(ResolvedUrl::is_try_common_js(&url));

        // even when the type will never bind
        let url = intercept_resolve("hosttypes/unknown/Nope", "/handler.js").unwrap();
        assert!(ResolvedUrl::is_try_common_js(&url));
    }

    #[test]
    fn test_other_specifiers_are_left_alone() {
        assert!(intercept_resolve("./local/helper.js", "/handler.js").is_none());
        assert!(intercept_resolve("hosttypes", "/handler.js").is_none());
        assert!(intercept_resolve("console", "/handler.js").is_none());
    }
}
