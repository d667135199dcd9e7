use crate::Generator;
use burrow_core::base62;
use burrow_core::shortcode::GENERATED_LENGTH;
use burrow_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator using a sequential counter.
///
/// Produces base62 codes like "bw0000", "bw0001", ... left-padded to
/// [`GENERATED_LENGTH`] characters. Useful for local runs and tests where
/// predictable codes matter more than unguessability.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    ///
    /// The prefix must itself be base62 for the codes to be valid.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        let width = GENERATED_LENGTH.saturating_sub(self.prefix.len());
        let code = format!("{}{:0>width$}", self.prefix, base62::encode(count));
        ShortCode::new_unchecked(code)
    }
}
