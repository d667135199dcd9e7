use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The short code the record is stored under.
    pub code: ShortCode,
    /// The normalized target URL.
    pub long_url: String,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record expires, if ever.
    pub expires_at: Option<Timestamp>,
}

impl UrlRecord {
    /// Whether the record's validity window has passed at `now`.
    ///
    /// A record whose `expires_at` equals `now` is already expired.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// The durable keyed store for URL records.
///
/// Implementations return records as stored, including expired ones: the
/// decision to reclaim or clean up an expired record belongs to the caller.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Retrieves the record stored under `code`, expired or not.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Persists a new record and returns it as stored.
    ///
    /// Must fail with [`StorageError::Conflict`] when the code currently holds
    /// a record that is still valid. A successful save is visible to the next
    /// [`find_by_code`](Repository::find_by_code).
    async fn save(&self, record: UrlRecord) -> Result<UrlRecord>;

    /// Deletes whatever record is stored under `code`.
    /// Returns `true` if a record existed and was removed.
    async fn delete_by_code(&self, code: &ShortCode) -> Result<bool>;

    /// Deletes `record` only if it is still the one stored under its code
    /// (same `created_at`). Returns `true` if it was removed.
    async fn delete(&self, record: &UrlRecord) -> Result<bool>;
}
