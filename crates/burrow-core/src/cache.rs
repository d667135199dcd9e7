use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A volatile `code -> long URL` lookup layer.
///
/// Entries are an accelerator only; the repository stays the source of truth
/// for expiry. Implementations can use Redis, in-memory caches, or other
/// backends, and must honour the per-entry TTL passed to [`set_url`].
///
/// [`set_url`]: UrlCache::set_url
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the cached long URL.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the long URL, evicting it after `ttl`.
    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;

    /// Remove the cached entry.
    ///
    /// Returns whether an entry was present. A missing key is not an error.
    async fn del(&self, code: &ShortCode) -> Result<bool>;
}
