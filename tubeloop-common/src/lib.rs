//! # TubeLoop Common Library
//!
//! Shared code for the TubeLoop playback session service including:
//! - Event types (SessionEvent enum, player command/event wire types)
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
