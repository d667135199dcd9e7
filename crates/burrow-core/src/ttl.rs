//! Cache TTL policy for resolved records.

use jiff::Timestamp;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// TTL used for records that never expire, and the cap for all others.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Floor applied to records that are about to expire.
pub const MIN_TTL: Duration = Duration::from_secs(5 * 60);

/// Decides how long a resolved URL may stay in the cache.
///
/// The cache never outlives `default_ttl`, and tracks the record's expiry
/// for shorter-lived records. Records closer than `min_ttl` to their expiry
/// are still cached for `min_ttl`, so a cached value may be served for up
/// to `min_ttl` past the record's logical expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct CacheTtlPolicy {
    #[builder(default = DEFAULT_TTL)]
    default_ttl: Duration,
    #[builder(default = MIN_TTL)]
    min_ttl: Duration,
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CacheTtlPolicy {
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn min_ttl(&self) -> Duration {
        self.min_ttl
    }

    /// Computes the cache TTL for a record expiring at `expires_at`, as seen at `now`.
    pub fn compute_ttl(&self, expires_at: Option<Timestamp>, now: Timestamp) -> Duration {
        let Some(expires_at) = expires_at else {
            return self.default_ttl;
        };

        let secs_until_expiry = expires_at.duration_since(now).as_secs();
        match u64::try_from(secs_until_expiry) {
            Ok(secs) if secs >= self.min_ttl.as_secs() => {
                Duration::from_secs(secs).min(self.default_ttl)
            }
            _ => self.min_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn now() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    #[test]
    fn no_expiry_uses_default() {
        let policy = CacheTtlPolicy::default();
        assert_eq!(policy.compute_ttl(None, now()), DEFAULT_TTL);
    }

    #[test]
    fn about_to_expire_uses_min_ttl() {
        let policy = CacheTtlPolicy::default();
        let expires_at = now() + SignedDuration::from_mins(4);
        assert_eq!(
            policy.compute_ttl(Some(expires_at), now()),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn long_lived_is_capped_at_default() {
        let policy = CacheTtlPolicy::default();
        let expires_at = now() + SignedDuration::from_hours(48);
        assert_eq!(
            policy.compute_ttl(Some(expires_at), now()),
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn in_between_tracks_expiry() {
        let policy = CacheTtlPolicy::default();
        let expires_at = now() + SignedDuration::from_hours(2);
        assert_eq!(
            policy.compute_ttl(Some(expires_at), now()),
            Duration::from_secs(7_200)
        );
    }

    #[test]
    fn exactly_min_ttl_is_kept() {
        let policy = CacheTtlPolicy::default();
        let expires_at = now() + SignedDuration::from_secs(300);
        assert_eq!(
            policy.compute_ttl(Some(expires_at), now()),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn already_expired_uses_min_ttl() {
        let policy = CacheTtlPolicy::default();
        let expires_at = now() - SignedDuration::from_hours(1);
        assert_eq!(policy.compute_ttl(Some(expires_at), now()), MIN_TTL);
    }

    #[test]
    fn custom_policy() {
        let policy = CacheTtlPolicy::builder()
            .default_ttl(Duration::from_secs(600))
            .min_ttl(Duration::from_secs(10))
            .build();
        let expires_at = now() + SignedDuration::from_secs(30);
        assert_eq!(
            policy.compute_ttl(Some(expires_at), now()),
            Duration::from_secs(30)
        );
        assert_eq!(policy.compute_ttl(None, now()), Duration::from_secs(600));
    }
}
