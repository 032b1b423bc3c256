//! Glossa Visual - Tiered pose rendering
//!
//! Turns one animation payload plus a frame index into draw calls on a
//! surface. Rendering never advances time: the same payload and frame index
//! always produce the same draw-call sequence.
//!
//! # Tier Ladder
//!
//! - RealPose: recorded landmarks, hand skeleton, motion trail
//! - LinguisticApprox: analytic trajectory from the movement class
//! - Fingerspelling: current letter plus a progress strip
//! - Basic: coarse location with a small periodic offset
//! - Error: fixed error glyph and a short reason

pub mod hand;
pub mod palette;
pub mod renderer;
pub mod surface;
pub mod trajectory;

pub use hand::*;
pub use palette::*;
pub use renderer::*;
pub use surface::*;
pub use trajectory::*;
