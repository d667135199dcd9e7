use burrow_core::{ShortCode, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("no free short code found after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    #[error("short code not found: {0}")]
    NotFound(ShortCode),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
