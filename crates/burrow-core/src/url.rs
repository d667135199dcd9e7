//! Helpers for the long URL stored in a record.

use std::borrow::Cow;

/// Scheme prepended to stored URLs that were shortened without one.
pub const DEFAULT_SCHEME: &str = "https://";

/// Returns `url` with [`DEFAULT_SCHEME`] prepended if it has no http(s) scheme.
pub fn with_default_scheme(url: &str) -> Cow<'_, str> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("{DEFAULT_SCHEME}{url}"))
    }
}
