//! Glossa Test Harness - End-to-end playback validation
//!
//! This crate provides:
//! - A scripted pose provider with request accounting
//! - A recording segment host
//! - Payload builders
//! - End-to-end caption playback scenarios

pub mod harness;
pub mod integration;

pub use harness::*;
pub use integration::*;
