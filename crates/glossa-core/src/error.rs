//! Error types for Glossa
//!
//! A caption time with no active segment is not an error: it is reported as
//! `None` by [`crate::Timeline::active_at`].

use thiserror::Error;

use crate::Tier;

/// Core Glossa errors
///
/// `Clone` so one fetch outcome can be handed to every coalesced waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GlossaError {
    // Provider errors
    #[error("Fetch failed for gloss {gloss:?}: {reason}")]
    FetchFailure { gloss: String, reason: String },

    #[error("Malformed {tier} payload: {reason}")]
    MalformedPayload { tier: Tier, reason: String },

    // Playback errors
    #[error("Invalid playback speed: {0}")]
    InvalidSpeed(f64),

    // Input errors
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GlossaError {
    /// Build a fetch failure for a gloss
    pub fn fetch(gloss: impl Into<String>, reason: impl ToString) -> Self {
        GlossaError::FetchFailure {
            gloss: gloss.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a malformed-payload error for a tier
    pub fn malformed(tier: Tier, reason: impl Into<String>) -> Self {
        GlossaError::MalformedPayload {
            tier,
            reason: reason.into(),
        }
    }

    /// Short human-readable reason, suitable for the error visual
    pub fn short_reason(&self) -> String {
        match self {
            GlossaError::FetchFailure { reason, .. } => reason.clone(),
            GlossaError::MalformedPayload { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for Glossa operations
pub type GlossaResult<T> = Result<T, GlossaError>;
