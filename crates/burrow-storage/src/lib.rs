//! Repository implementations for Burrow URL records.

pub mod memory;
pub mod mysql;

pub use burrow_core::repository::{Repository, Result, UrlRecord};
pub use burrow_core::StorageError;
pub use memory::InMemoryRepository;
pub use mysql::{MySqlRepository, MIGRATOR};
