//! Error types for throttle construction.

use thiserror::Error;

/// Main error type for throttle-pool operations.
///
/// Construction is the only fallible surface: a non-blocking probe that
/// finds the window full returns `false`, which is a normal outcome rather
/// than an error.
#[derive(Error, Debug)]
pub enum ThrottleError {
    /// Rejected configuration (non-positive rate limit or period)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for throttle-pool operations.
pub type Result<T> = std::result::Result<T, ThrottleError>;
