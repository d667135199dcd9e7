pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use burrow_core::ShortCode;

/// Trait for generating candidate short codes.
///
/// Implementations are pure generators that don't interact with storage:
/// a generated code may collide with an existing record, and the caller
/// is responsible for checking it against the repository.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates the next candidate code.
    fn generate(&self) -> Self::Output;
}
