//! Glossa Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every Glossa crate:
//! - Media time (video playback position)
//! - Caption segments and the timeline that orders them
//! - Animation payloads and their quality tiers
//! - Playback speed and engine configuration
//! - Error types

pub mod config;
pub mod error;
pub mod payload;
pub mod segment;
pub mod speed;
pub mod tier;
pub mod time;

pub use config::*;
pub use error::*;
pub use payload::*;
pub use segment::*;
pub use speed::*;
pub use tier::*;
pub use time::*;
