//! Disposable containers for integration tests.
//!
//! Tests using these fixtures need a reachable Docker daemon.

pub mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};
