use crate::Generator;
use burrow_core::base62;
use burrow_core::shortcode::{GENERATED_LENGTH, MAX_LENGTH, MIN_LENGTH};
use burrow_core::ShortCode;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};

/// Draws fixed-length codes uniformly from the base62 alphabet.
///
/// The randomness source is injected so production code can use an
/// OS-seeded CSPRNG while tests pass a seeded one. Only
/// cryptographically secure generators are accepted, keeping codes
/// unguessable.
#[derive(Debug)]
pub struct RandomGenerator<R> {
    rng: Mutex<R>,
    length: usize,
}

impl RandomGenerator<StdRng> {
    /// Creates a generator backed by a `StdRng` seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: RngCore + CryptoRng + Send + 'static> RandomGenerator<R> {
    /// Creates a generator producing [`GENERATED_LENGTH`]-character codes.
    pub fn new(rng: R) -> Self {
        Self::with_length(rng, GENERATED_LENGTH)
    }

    /// Creates a generator producing codes of `length` characters.
    ///
    /// `length` is clamped to the range a [`ShortCode`] accepts.
    pub fn with_length(rng: R, length: usize) -> Self {
        Self {
            rng: Mutex::new(rng),
            length: length.clamp(MIN_LENGTH, MAX_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl<R: RngCore + CryptoRng + Send + 'static> Generator for RandomGenerator<R> {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let mut rng = self.rng.lock();
        let code: String = (0..self.length)
            .map(|_| base62::symbol(rng.random_range(0..base62::ALPHABET.len())))
            .collect();
        ShortCode::new_unchecked(code)
    }
}
