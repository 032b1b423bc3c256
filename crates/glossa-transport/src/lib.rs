//! Glossa Transport - Pose data providers
//!
//! This crate provides:
//! - The `PoseProvider` seam the animation cache fetches through
//! - The JSON wire format for animation payloads
//! - An HTTP provider for the pose generation service
//! - An offline lexicon provider

pub mod http;
pub mod lexicon;
pub mod provider;
pub mod wire;

pub use http::*;
pub use lexicon::*;
pub use provider::*;
pub use wire::{decode_payload, LEGACY_DEFAULT_FPS};
