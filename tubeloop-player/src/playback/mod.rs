//! Playback session engine and supporting state machines

pub mod cursor;
pub mod engine;
pub mod scheduler;

pub use cursor::PlaybackCursor;
pub use engine::{SessionEngine, SessionMessage};
pub use scheduler::AdScheduler;
