//! [`UrlCache`](burrow_core::UrlCache) implementations.

pub mod moka;
pub mod redis;

pub use burrow_core::cache::{Result, UrlCache};
pub use burrow_core::CacheError;
pub use self::moka::{MokaCacheConfig, MokaUrlCache};
pub use self::redis::RedisUrlCache;
