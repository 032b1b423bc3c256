//! Caption segments and the per-video timeline
//!
//! A timeline is loaded once per video and is immutable afterwards. Segments
//! are taken in transcript order; overlaps are not rejected, the earliest
//! listed match wins.

use serde::{Deserialize, Serialize};

use crate::{GlossaError, GlossaResult, MediaTime};

/// One time-bounded caption unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Start time in seconds (inclusive)
    pub start: f64,
    /// End time in seconds (inclusive)
    pub end: f64,
    /// Gloss token, the animation lookup key
    pub gloss: String,
    /// Translated caption text
    #[serde(default)]
    pub text: String,
}

impl CaptionSegment {
    pub fn new(start: f64, end: f64, gloss: impl Into<String>, text: impl Into<String>) -> Self {
        CaptionSegment {
            start,
            end,
            gloss: gloss.into(),
            text: text.into(),
        }
    }

    /// Inclusive on both ends
    #[inline]
    pub fn contains(&self, t: MediaTime) -> bool {
        self.start <= t.0 && t.0 <= self.end
    }

    /// Do two segments show the same sign and caption?
    pub fn same_content(&self, other: &CaptionSegment) -> bool {
        self.gloss == other.gloss && self.text == other.text
    }

    fn check(&self, index: usize) -> GlossaResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(GlossaError::InvalidTranscript(format!(
                "segment {index} has a non-finite bound"
            )));
        }
        if self.end < self.start {
            return Err(GlossaError::InvalidTranscript(format!(
                "segment {index} ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Bare(Vec<CaptionSegment>),
    Wrapped { segments: Vec<CaptionSegment> },
}

/// Ordered caption segments of one video
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    segments: Vec<CaptionSegment>,
}

impl Timeline {
    /// Build a timeline, rejecting segments that cannot be matched against
    pub fn new(segments: Vec<CaptionSegment>) -> GlossaResult<Self> {
        for (index, segment) in segments.iter().enumerate() {
            segment.check(index)?;
        }
        Ok(Timeline { segments })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a transcript: either a bare array of segments or `{"segments": [...]}`
    pub fn from_json(json: &str) -> GlossaResult<Self> {
        let document: TranscriptDocument = serde_json::from_str(json)
            .map_err(|e| GlossaError::InvalidTranscript(e.to_string()))?;
        let segments = match document {
            TranscriptDocument::Bare(segments) => segments,
            TranscriptDocument::Wrapped { segments } => segments,
        };
        Self::new(segments)
    }

    /// Index of the segment active at `t`, first match in list order
    pub fn active_at(&self, t: MediaTime) -> Option<usize> {
        if !t.is_valid() {
            return None;
        }
        self.segments.iter().position(|s| s.contains(t))
    }

    pub fn get(&self, index: usize) -> Option<&CaptionSegment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[CaptionSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
