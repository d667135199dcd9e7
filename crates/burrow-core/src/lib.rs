//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the shared vocabulary used by both the shortener
//! (write path) and the redirector (read path): short codes, stored
//! records, the repository and cache contracts, and the expiry/TTL policy.

pub mod base62;
pub mod cache;
pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod ttl;
pub mod url;

pub use cache::UrlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, CoreError, StorageError};
pub use repository::{Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use ttl::CacheTtlPolicy;
