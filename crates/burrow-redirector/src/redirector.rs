use crate::Result;
use async_trait::async_trait;
use burrow_core::ShortCode;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to its long URL.
    ///
    /// Fails with `NotFound` if no record exists and with `Expired` if the
    /// stored record is past its expiry.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Drops any cached entry for `code`. Returns whether one was present.
    async fn invalidate(&self, code: &ShortCode) -> Result<bool>;
}
