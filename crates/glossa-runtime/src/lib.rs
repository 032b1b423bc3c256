//! Glossa Runtime - Caption-synchronized avatar engine
//!
//! On every video time update the engine:
//! 1. Finds the active caption segment
//! 2. Restyles the caption segments
//! 3. Looks up the segment's gloss in the animation cache
//! 4. Shows a loading placeholder while the fetch is in flight
//! 5. Loads the resolved payload into the segment's scheduler
//! 6. Starts playback

pub mod config;
pub mod engine;
pub mod logging;
pub mod synchronizer;
pub mod video;

pub use config::*;
pub use engine::*;
pub use logging::*;
pub use synchronizer::*;
pub use video::*;
