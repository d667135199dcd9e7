//! URL shortener write path.
//!
//! [`CodeAllocator`] hands out collision-free short codes, reclaiming codes
//! whose records have expired. [`ShortenerService`] wraps it together with
//! the lookup and delete operations behind the [`Shortener`] trait.

pub mod allocator;
pub mod error;
pub mod service;

pub use allocator::{AllocatorSettings, CodeAllocator};
pub use error::{Result, ShortenerError};
pub use service::{ShortenParams, Shortener, ShortenerService};
