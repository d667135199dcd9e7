use async_trait::async_trait;
use burrow_core::repository::{Repository, Result, UrlRecord};
use burrow_core::{Clock, ShortCode, StorageError, SystemClock};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
///
/// `save` holds the shard lock for the key while it checks the existing
/// record, so two concurrent saves under one code cannot both succeed.
#[derive(Clone)]
pub struct InMemoryRepository {
    storage: Arc<DashMap<String, UrlRecord>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("len", &self.storage.len())
            .finish()
    }
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arc::new(DashMap::with_capacity(capacity)),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a repository that judges record validity with `clock`.
    pub fn with_clock(clock: impl Clock) -> Self {
        Self {
            storage: Arc::new(DashMap::new()),
            clock: Arc::new(clock),
        }
    }

    /// Number of stored records, expired ones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, "looking up record in memory");
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, record: UrlRecord) -> Result<UrlRecord> {
        let now = self.clock.now();

        match self.storage.entry(record.code.as_str().to_owned()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired_at(now) {
                    return Err(StorageError::Conflict(record.code.to_string()));
                }
                // Expired entry: overwrite in place under the same shard lock.
                occupied.insert(record.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record.clone());
            }
        }

        Ok(record)
    }

    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.remove(code.as_str()).is_some())
    }

    async fn delete(&self, record: &UrlRecord) -> Result<bool> {
        Ok(self
            .storage
            .remove_if(record.code.as_str(), |_, stored| {
                stored.created_at == record.created_at
            })
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::ManualClock;
    use jiff::{SignedDuration, Timestamp};

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn record(c: &str, url: &str, created_at: Timestamp, expires_at: Option<Timestamp>) -> UrlRecord {
        UrlRecord {
            code: code(c),
            long_url: url.to_string(),
            created_at,
            expires_at,
        }
    }

    fn base() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    #[tokio::test]
    async fn save_and_find() {
        let repo = InMemoryRepository::new();
        let saved = repo
            .save(record("abc123", "https://example.com", base(), None))
            .await
            .unwrap();

        let found = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(found, saved);
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();
        assert!(repo.find_by_code(&code("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_returns_expired_records() {
        let clock = ManualClock::new(base());
        let repo = InMemoryRepository::with_clock(clock.clone());
        let expires_at = base() + SignedDuration::from_secs(10);
        repo.save(record("abc123", "https://example.com", base(), Some(expires_at)))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_mins(1));

        let found = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert!(found.is_expired_at(clock.now()));
    }

    #[tokio::test]
    async fn save_conflicts_with_valid_record() {
        let repo = InMemoryRepository::new();
        repo.save(record("abc123", "https://example.com", base(), None))
            .await
            .unwrap();

        let err = repo
            .save(record("abc123", "https://other.com", base(), None))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(c) if c == "abc123"));
    }

    #[tokio::test]
    async fn save_over_expired_record() {
        let clock = ManualClock::new(base());
        let repo = InMemoryRepository::with_clock(clock.clone());
        let expires_at = base() + SignedDuration::from_secs(10);
        repo.save(record("abc123", "https://old.com", base(), Some(expires_at)))
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(10));

        repo.save(record("abc123", "https://new.com", clock.now(), None))
            .await
            .unwrap();
        let found = repo.find_by_code(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(found.long_url, "https://new.com");
    }

    #[tokio::test]
    async fn delete_by_code() {
        let repo = InMemoryRepository::new();
        repo.save(record("abc123", "https://example.com", base(), None))
            .await
            .unwrap();

        assert!(repo.delete_by_code(&code("abc123")).await.unwrap());
        assert!(!repo.delete_by_code(&code("abc123")).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn delete_only_removes_the_same_record() {
        let clock = ManualClock::new(base());
        let repo = InMemoryRepository::with_clock(clock.clone());
        let stale = record(
            "abc123",
            "https://old.com",
            base(),
            Some(base() + SignedDuration::from_secs(1)),
        );
        repo.save(stale.clone()).await.unwrap();

        clock.advance(SignedDuration::from_secs(5));
        let fresh = record("abc123", "https://new.com", clock.now(), None);
        repo.save(fresh.clone()).await.unwrap();

        // the stale copy no longer matches what is stored
        assert!(!repo.delete(&stale).await.unwrap());
        assert_eq!(
            repo.find_by_code(&code("abc123")).await.unwrap(),
            Some(fresh.clone())
        );

        assert!(repo.delete(&fresh).await.unwrap());
        assert!(repo.find_by_code(&code("abc123")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_saves_under_one_code_admit_one_winner() {
        let repo = InMemoryRepository::new();
        let mut handles = vec![];

        for i in 0..16u32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.save(record(
                    "same01",
                    &format!("https://example{i}.com"),
                    Timestamp::now(),
                    None,
                ))
                .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, StorageError::Conflict(_))),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn concurrent_access() {
        let repo = InMemoryRepository::with_capacity(16);
        let mut handles = vec![];

        for i in 0..10u64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let r = record(
                    &format!("code{:02}", i),
                    &format!("https://example{}.com", i),
                    Timestamp::now(),
                    None,
                );
                repo.save(r).await.unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let found = repo
                .find_by_code(&code(&format!("code{:02}", i)))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(found.long_url, format!("https://example{}.com", i));
        }
    }
}
