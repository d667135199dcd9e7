use crate::error::{Result, ShortenerError};
use burrow_core::{Clock, Repository, ShortCode, StorageError, SystemClock, UrlRecord};
use burrow_generator::Generator;
use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

/// Number of candidate codes tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Validity applied when the caller does not ask for one.
pub const DEFAULT_VALID_FOR_DAYS: u32 = 1;

/// Tunables for [`CodeAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct AllocatorSettings {
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
    #[builder(default = DEFAULT_VALID_FOR_DAYS)]
    default_valid_for_days: u32,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AllocatorSettings {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn default_valid_for_days(&self) -> u32 {
        self.default_valid_for_days
    }
}

/// Hands out short codes that no valid record is using.
///
/// A candidate is taken from the generator and checked against the
/// repository. Free codes are saved directly. Codes whose record has expired
/// are reclaimed by deleting that exact record first. Codes held by a valid
/// record count as a collision, and so does a [`StorageError::Conflict`]
/// from `save`, which is how a concurrent allocation of the same code shows
/// up. Collisions are retried with a fresh candidate up to
/// [`AllocatorSettings::max_attempts`] times in total.
pub struct CodeAllocator<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: AllocatorSettings,
}

impl<R, G> Clone for CodeAllocator<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            settings: self.settings,
        }
    }
}

impl<R, G> std::fmt::Debug for CodeAllocator<R, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeAllocator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<R: Repository, G: Generator> CodeAllocator<R, G> {
    pub fn new(repository: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            repository,
            generator,
            clock: Arc::new(SystemClock),
            settings: AllocatorSettings::default(),
        }
    }

    /// Replaces the clock used for `created_at`, `expires_at` and expiry checks.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_settings(mut self, settings: AllocatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AllocatorSettings {
        &self.settings
    }

    /// Stores `long_url` under a newly allocated code.
    ///
    /// The record expires `valid_for_days` days after creation, or after the
    /// configured default when `None`. Fails with
    /// [`ShortenerError::AllocationExhausted`] if every attempt collided.
    pub async fn allocate(
        &self,
        long_url: impl Into<String>,
        valid_for_days: Option<u32>,
    ) -> Result<UrlRecord> {
        let long_url = long_url.into();
        let validity = validity(valid_for_days.unwrap_or(self.settings.default_valid_for_days));
        // reject validities past the timestamp range before touching the store
        expires_at(self.clock.now(), validity)?;

        let max_attempts = self.settings.max_attempts;
        for attempt in 1..=max_attempts {
            let code: ShortCode = self.generator.generate().into();

            if !self.claim(&code).await? {
                debug!(code = %code, attempt, "short code collision, retrying");
                continue;
            }

            let now = self.clock.now();
            let record = UrlRecord {
                code,
                long_url: long_url.clone(),
                created_at: now,
                expires_at: Some(expires_at(now, validity)?),
            };

            match self.repository.save(record).await {
                Ok(saved) => {
                    info!(code = %saved.code, attempt, "allocated short code");
                    return Ok(saved);
                }
                Err(StorageError::Conflict(code)) => {
                    warn!(code = %code, attempt, "short code taken concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        error!(attempts = max_attempts, "failed to allocate a unique short code");
        Err(ShortenerError::AllocationExhausted {
            attempts: max_attempts,
        })
    }

    /// Returns whether `code` can be used, reclaiming it when its record has expired.
    async fn claim(&self, code: &ShortCode) -> Result<bool> {
        match self.repository.find_by_code(code).await? {
            None => Ok(true),
            Some(existing) if existing.is_expired_at(self.clock.now()) => {
                info!(code = %code, "reusing expired short code");
                // false means another writer already replaced it; save settles who wins
                self.repository.delete(&existing).await?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }
}

fn validity(days: u32) -> SignedDuration {
    SignedDuration::from_hours(i64::from(days) * 24)
}

fn expires_at(now: Timestamp, validity: SignedDuration) -> Result<Timestamp> {
    now.checked_add(validity).map_err(|e| {
        ShortenerError::InvalidExpiration(format!("validity of {validity} is out of range: {e}"))
    })
}
