use std::sync::Arc;

use crate::redirector::Redirector;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use burrow_core::{CacheTtlPolicy, Clock, Repository, ShortCode, SystemClock, UrlCache};
use tracing::{debug, trace, warn};

/// Service for handling URL redirects.
///
/// Composes a [`Repository`] with a [`UrlCache`] in a cache-aside lookup.
/// A cache hit is returned without consulting the repository, so the cache
/// TTL chosen by [`CacheTtlPolicy`] bounds how long a hit can outlive the
/// record's expiry. The repository stays the source of truth: a miss that
/// finds an expired record deletes it and reports [`RedirectorError::Expired`].
pub struct RedirectorService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    ttl_policy: CacheTtlPolicy,
    clock: Arc<dyn Clock>,
}

impl<R, C> Clone for RedirectorService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            ttl_policy: self.ttl_policy,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> std::fmt::Debug for RedirectorService<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectorService")
            .field("ttl_policy", &self.ttl_policy)
            .finish_non_exhaustive()
    }
}

impl<R: Repository, C: UrlCache> RedirectorService<R, C> {
    /// Creates a new RedirectorService with the given repository and cache.
    pub fn new(repository: R, cache: C) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(cache))
    }

    /// Creates a service over a repository and cache also used elsewhere.
    pub fn from_shared(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self {
            repository,
            cache,
            ttl_policy: CacheTtlPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl_policy(mut self, ttl_policy: CacheTtlPolicy) -> Self {
        self.ttl_policy = ttl_policy;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Cold path: reads the record from the repository and repopulates the cache.
    async fn load(&self, code: &ShortCode) -> Result<String> {
        let Some(record) = self.repository.find_by_code(code).await? else {
            debug!(code = %code, "short code not found");
            return Err(RedirectorError::NotFound(code.clone()));
        };

        let now = self.clock.now();
        if record.is_expired_at(now) {
            warn!(code = %code, "short code has expired, removing record");
            self.repository.delete(&record).await?;
            return Err(RedirectorError::Expired(code.clone()));
        }

        let ttl = self.ttl_policy.compute_ttl(record.expires_at, now);
        self.cache.set_url(code, &record.long_url, ttl).await?;
        debug!(code = %code, ttl_secs = ttl.as_secs(), "cached long url");

        Ok(record.long_url)
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache> Redirector for RedirectorService<R, C> {
    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "resolving short code");

        if let Some(long_url) = self.cache.get_url(code).await? {
            debug!(code = %code, "cache hit");
            return Ok(long_url);
        }

        debug!(code = %code, "cache miss");
        self.load(code).await
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<bool> {
        trace!(code = %code, "invalidating cache entry");
        let removed = self.cache.del(code).await?;
        debug!(code = %code, removed, "invalidated cache entry");
        Ok(removed)
    }
}
