//! Error types for tubeloop-player
//!
//! Defines service-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the tubeloop-player service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playlist fetch errors
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Startup wiring errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using tubeloop-player Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<tubeloop_common::Error> for Error {
    fn from(err: tubeloop_common::Error) -> Self {
        match err {
            tubeloop_common::Error::Config(msg) => Error::Config(msg),
            tubeloop_common::Error::Fetch(msg) => Error::Fetch(msg),
        }
    }
}
