use async_trait::async_trait;
use burrow_core::cache::{Result, UrlCache};
use burrow_core::ShortCode;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    long_url: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was inserted with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Each entry carries its own TTL, so records resolved close to their
/// expiry leave the cache earlier than long-lived ones. Suitable for
/// single-node deployments.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding up to [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        MokaCacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> MokaCacheConfigBuilder {
        MokaCacheConfig::builder()
    }

    /// Number of live entries, after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "fetching long url from moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "cache hit in moka");
                Ok(Some(entry.long_url))
            }
            None => {
                trace!(code = %code, "cache miss in moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        trace!(code = %code, ttl_secs = ttl.as_secs(), "storing long url in moka cache");

        let entry = CachedUrl {
            long_url: long_url.to_owned(),
            ttl,
        };
        self.cache.insert(code.as_str().to_owned(), entry).await;
        debug!(code = %code, "cached long url in moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<bool> {
        trace!(code = %code, "removing long url from moka cache");

        let removed = self.cache.remove(code.as_str()).await.is_some();
        debug!(code = %code, removed, "removed long url from moka cache");
        Ok(removed)
    }
}

/// Configuration for creating a [`MokaUrlCache`] with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct MokaCacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_CAPACITY)]
    max_capacity: u64,
}

impl From<MokaCacheConfig> for MokaUrlCache {
    fn from(config: MokaCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        MokaUrlCache { cache }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache.set_url(&c, "https://example.com", HOUR).await.unwrap();

        assert_eq!(
            cache.get_url(&c).await.unwrap().as_deref(),
            Some("https://example.com")
        );
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.set_url(&c, "https://one.example", HOUR).await.unwrap();
        cache.set_url(&c, "https://two.example", HOUR).await.unwrap();

        assert_eq!(
            cache.get_url(&c).await.unwrap().as_deref(),
            Some("https://two.example")
        );
    }

    #[tokio::test]
    async fn del_reports_presence() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.set_url(&c, "https://example.com", HOUR).await.unwrap();

        assert!(cache.del(&c).await.unwrap());
        assert!(!cache.del(&c).await.unwrap());
        assert!(cache.get_url(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_their_own_ttl() {
        let cache = MokaUrlCache::new();
        let short_lived = code("short1");
        let long_lived = code("long01");

        cache
            .set_url(&short_lived, "https://short.example", Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&long_lived, "https://long.example", HOUR)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get_url(&short_lived).await.unwrap().is_none());
        assert!(cache.get_url(&long_lived).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn builder_sets_capacity() {
        let cache: MokaUrlCache = MokaUrlCache::builder().max_capacity(2).build().into();

        for i in 0..10 {
            cache
                .set_url(&code(&format!("code{i}")), "https://example.com", HOUR)
                .await
                .unwrap();
        }

        assert!(cache.entry_count().await <= 2);
    }

    #[tokio::test]
    async fn concurrent_access() {
        let cache = MokaUrlCache::new();
        let mut handles = vec![];

        for i in 0..10 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let c = code(&format!("code{i}"));
                let url = format!("https://example{i}.com");
                cache.set_url(&c, &url, HOUR).await.unwrap();
                cache.get_url(&c).await.unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let url = handle.await.unwrap();
            assert_eq!(url, Some(format!("https://example{i}.com")));
        }
    }
}
