//! # TubeLoop Player Library (tubeloop-player)
//!
//! Continuous playlist playback session with timed ad interleaving.
//!
//! **Purpose:** Fetch remote playlist contents, rotate through playlists and
//! their videos, interrupt main playback with ads on a fixed cadence, and
//! provide the HTTP/SSE control interface the playback widget connects to.
//!
//! **Architecture:** Single-task session engine fed by one message queue;
//! widgets receive commands and report events over HTTP.

pub mod api;
pub mod error;
pub mod playback;
pub mod state;
pub mod youtube;

pub use error::{Error, Result};
pub use state::SharedState;
