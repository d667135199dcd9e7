//! URL redirector read path.
//!
//! [`RedirectorService`] resolves short codes with a cache-aside lookup:
//! the cache answers hits directly, misses fall back to the repository and
//! repopulate the cache with a TTL bounded by the record's expiry.

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
