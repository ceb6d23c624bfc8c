//! Common error types for TubeLoop
//!
//! The session distinguishes configuration problems (wrong or missing
//! settings, rejected up front) from fetch problems (network, HTTP, or
//! response-shape failures when loading playlist contents).

use thiserror::Error;

/// Common result type for TubeLoop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TubeLoop crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote playlist fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),
}
