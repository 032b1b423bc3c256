//! Glossa Time - Playback scheduling
//!
//! This crate implements the per-animation playback scheduler:
//! - Stopped / Playing / Paused state machine
//! - Frame loop at the payload's frame rate, scaled by playback speed
//! - Wrap-around looping until paused or torn down
//! - Single-operation cancellation of the pending tick

pub mod scheduler;
pub mod state;

pub use scheduler::*;
pub use state::*;
