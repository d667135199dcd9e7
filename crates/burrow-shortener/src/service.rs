use crate::allocator::{AllocatorSettings, CodeAllocator};
use crate::error::{Result, ShortenerError};
use async_trait::async_trait;
use burrow_core::{Clock, Repository, ShortCode, UrlRecord};
use burrow_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info};

/// Parameters for creating a short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenParams {
    pub long_url: String,
    /// Days until the link expires. `None` uses the allocator default.
    pub valid_for_days: Option<u32>,
}

impl ShortenParams {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            valid_for_days: None,
        }
    }

    pub fn valid_for_days(mut self, days: u32) -> Self {
        self.valid_for_days = Some(days);
        self
    }
}

/// Write-side operations on short links.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Allocates a code for `params.long_url` and stores the record.
    async fn shorten(&self, params: ShortenParams) -> Result<UrlRecord>;

    /// Returns the stored record for `code`, whether or not it has expired.
    async fn details(&self, code: &ShortCode) -> Result<UrlRecord>;

    /// Removes the record for `code`.
    async fn delete(&self, code: &ShortCode) -> Result<()>;
}

/// A concrete implementation of the `Shortener` trait.
///
/// Allocation goes through a [`CodeAllocator`] sharing the same repository,
/// so collision checks and saves see the records `details` and `delete` see.
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    allocator: CodeAllocator<R, G>,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self::from_shared(Arc::new(repository), generator)
    }

    /// Creates a service over a repository that is also used elsewhere,
    /// typically by the redirector.
    pub fn from_shared(repository: Arc<R>, generator: G) -> Self {
        let allocator = CodeAllocator::new(Arc::clone(&repository), Arc::new(generator));
        Self {
            repository,
            allocator,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.allocator = self.allocator.with_clock(clock);
        self
    }

    pub fn with_settings(mut self, settings: AllocatorSettings) -> Self {
        self.allocator = self.allocator.with_settings(settings);
        self
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<UrlRecord> {
        let record = self
            .allocator
            .allocate(params.long_url, params.valid_for_days)
            .await?;
        info!(code = %record.code, long_url = %record.long_url, "created short link");
        Ok(record)
    }

    async fn details(&self, code: &ShortCode) -> Result<UrlRecord> {
        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.clone()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        if !self.repository.delete_by_code(code).await? {
            debug!(code = %code, "delete of unknown short code");
            return Err(ShortenerError::NotFound(code.clone()));
        }
        info!(code = %code, "deleted short link");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::ManualClock;
    use burrow_generator::SeqGenerator;
    use burrow_storage::InMemoryRepository;
    use jiff::{SignedDuration, Timestamp};

    fn base() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn service(clock: &ManualClock) -> ShortenerService<InMemoryRepository, SeqGenerator> {
        ShortenerService::new(
            InMemoryRepository::with_clock(clock.clone()),
            SeqGenerator::with_prefix("t"),
        )
        .with_clock(clock.clone())
    }

    #[tokio::test]
    async fn shorten_then_details() {
        let clock = ManualClock::new(base());
        let service = service(&clock);

        let created = service
            .shorten(ShortenParams::new("https://example.com").valid_for_days(7))
            .await
            .unwrap();
        let found = service.details(&created.code).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(
            found.expires_at,
            Some(base() + SignedDuration::from_hours(7 * 24))
        );
    }

    #[tokio::test]
    async fn sequential_codes_are_distinct() {
        let clock = ManualClock::new(base());
        let service = service(&clock);

        let first = service
            .shorten(ShortenParams::new("https://one.example"))
            .await
            .unwrap();
        let second = service
            .shorten(ShortenParams::new("https://two.example"))
            .await
            .unwrap();

        assert_eq!(first.code.as_str(), "t00000");
        assert_eq!(second.code.as_str(), "t00001");
    }

    #[tokio::test]
    async fn details_of_expired_record_is_still_returned() {
        let clock = ManualClock::new(base());
        let service = service(&clock);
        let created = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_hours(48));

        let found = service.details(&created.code).await.unwrap();
        assert!(found.is_expired_at(clock.now()));
    }

    #[tokio::test]
    async fn details_of_unknown_code() {
        let clock = ManualClock::new(base());
        let service = service(&clock);

        let err = service
            .details(&ShortCode::new_unchecked("nope01"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::NotFound(c) if c.as_str() == "nope01"));
    }

    #[tokio::test]
    async fn delete_removes_record_once() {
        let clock = ManualClock::new(base());
        let service = service(&clock);
        let created = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        service.delete(&created.code).await.unwrap();

        assert!(matches!(
            service.details(&created.code).await,
            Err(ShortenerError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&created.code).await,
            Err(ShortenerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn shared_repository_sees_new_records() {
        let clock = ManualClock::new(base());
        let repository = Arc::new(InMemoryRepository::with_clock(clock.clone()));
        let generator = SeqGenerator::with_prefix("s");
        let service = ShortenerService::from_shared(Arc::clone(&repository), generator)
            .with_clock(clock.clone());

        let created = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(
            repository.find_by_code(&created.code).await.unwrap(),
            Some(created)
        );
    }

    #[tokio::test]
    async fn works_as_trait_object() {
        let clock = ManualClock::new(base());
        let service: Arc<dyn Shortener> = Arc::new(service(&clock));

        let created = service
            .shorten(ShortenParams::new("https://example.com"))
            .await
            .unwrap();
        assert_eq!(service.details(&created.code).await.unwrap(), created);
    }
}
