//! Animation payloads - one gloss worth of avatar motion
//!
//! A payload is a tagged union over quality tiers. Recorded tiers replay
//! their frames; synthetic tiers derive geometry analytically from the
//! frame index. Only `Error` carries nothing to draw.

use std::time::Duration;

use crate::{GlossaError, GlossaResult, PlaybackSpeed, Tier};

/// Frame budget for synthetic tiers that declare none
pub const SYNTHETIC_FALLBACK_FRAMES: u32 = 60;

/// Frame rate used when a payload's own rate is unusable
pub const DEFAULT_FPS: f32 = 30.0;

/// One landmark in normalized coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    /// Horizontal position in [0, 1]
    pub x: f32,
    /// Vertical position in [0, 1]
    pub y: f32,
    /// Marker radius in pixels
    pub radius: Option<f32>,
    /// Detection confidence in [0, 1]
    pub confidence: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark {
            x,
            y,
            radius: None,
            confidence: None,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// All landmarks of one recorded frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        PoseFrame { landmarks }
    }
}

/// Movement class of an approximated sign
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementClass {
    Circular,
    Forward,
    Upward,
    Downward,
    Wave,
    Static,
}

impl MovementClass {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "circular" => Some(MovementClass::Circular),
            "forward" => Some(MovementClass::Forward),
            "upward" => Some(MovementClass::Upward),
            "downward" => Some(MovementClass::Downward),
            "wave" => Some(MovementClass::Wave),
            "static" => Some(MovementClass::Static),
            _ => None,
        }
    }
}

/// Coarse body location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Location {
    Head,
    #[default]
    Chest,
    Side,
}

impl Location {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "head" | "face" | "chin" => Some(Location::Head),
            "chest" | "torso" => Some(Location::Chest),
            "side" => Some(Location::Side),
            _ => None,
        }
    }
}

/// Coarse movement for the last-resort tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BasicMovement {
    Wave,
    Circular,
    #[default]
    Static,
}

impl BasicMovement {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "wave" => Some(BasicMovement::Wave),
            "circular" => Some(BasicMovement::Circular),
            "static" => Some(BasicMovement::Static),
            _ => None,
        }
    }
}

/// Linguistic properties an approximate trajectory is derived from
#[derive(Clone, Debug, PartialEq)]
pub struct LinguisticProps {
    pub movement: MovementClass,
    /// Sign complexity in [0, 1]; widens the trajectory
    pub complexity: f32,
    pub location: Location,
    pub handshape: Option<String>,
}

impl LinguisticProps {
    pub fn new(movement: MovementClass, location: Location) -> Self {
        LinguisticProps {
            movement,
            complexity: 0.5,
            location,
            handshape: None,
        }
    }
}

/// Animation data for one gloss
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationPayload {
    RealPose {
        frames: Vec<PoseFrame>,
        frame_count: u32,
        fps: f32,
        data_source: String,
    },
    LinguisticApprox {
        props: LinguisticProps,
        frame_count: u32,
        fps: f32,
    },
    Fingerspelling {
        letters: Vec<char>,
        frame_count: u32,
        fps: f32,
    },
    Basic {
        movement: BasicMovement,
        location: Location,
        frame_count: u32,
        fps: f32,
    },
    Error {
        reason: String,
    },
}

impl AnimationPayload {
    /// Last-resort payload used in place of malformed data
    pub fn basic_fallback() -> Self {
        AnimationPayload::Basic {
            movement: BasicMovement::Static,
            location: Location::Chest,
            frame_count: SYNTHETIC_FALLBACK_FRAMES,
            fps: DEFAULT_FPS,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        AnimationPayload::Error {
            reason: reason.into(),
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            AnimationPayload::RealPose { .. } => Tier::RealPose,
            AnimationPayload::LinguisticApprox { .. } => Tier::LinguisticApprox,
            AnimationPayload::Fingerspelling { .. } => Tier::Fingerspelling,
            AnimationPayload::Basic { .. } => Tier::Basic,
            AnimationPayload::Error { .. } => Tier::Error,
        }
    }

    /// Frames in one loop, `None` for `Error`
    ///
    /// Recorded tiers are bounded by what was recorded; synthetic tiers with
    /// no declared budget use [`SYNTHETIC_FALLBACK_FRAMES`]. Fingerspelling
    /// is stretched to show every letter for at least one frame. Never
    /// `Some(0)`.
    pub fn frame_count(&self) -> Option<u32> {
        match self {
            AnimationPayload::RealPose {
                frames,
                frame_count,
                ..
            } => {
                let recorded = frames.len() as u32;
                let declared = if *frame_count == 0 {
                    recorded
                } else {
                    (*frame_count).min(recorded)
                };
                (declared > 0).then_some(declared)
            }
            AnimationPayload::Fingerspelling {
                letters,
                frame_count,
                ..
            } => {
                // At least one frame per letter
                let letter_count = letters.len() as u32;
                if *frame_count > 0 {
                    Some((*frame_count).max(letter_count))
                } else if letters.is_empty() {
                    None
                } else {
                    Some(letter_count)
                }
            }
            AnimationPayload::LinguisticApprox { frame_count, .. }
            | AnimationPayload::Basic { frame_count, .. } => {
                if *frame_count == 0 {
                    Some(SYNTHETIC_FALLBACK_FRAMES)
                } else {
                    Some(*frame_count)
                }
            }
            AnimationPayload::Error { .. } => None,
        }
    }

    /// Declared frame rate if it is usable, `None` for `Error`
    pub fn fps(&self) -> Option<f32> {
        let fps = match self {
            AnimationPayload::RealPose { fps, .. }
            | AnimationPayload::LinguisticApprox { fps, .. }
            | AnimationPayload::Fingerspelling { fps, .. }
            | AnimationPayload::Basic { fps, .. } => *fps,
            AnimationPayload::Error { .. } => return None,
        };
        (fps.is_finite() && fps > 0.0).then_some(fps)
    }

    /// Can a frame loop run against this payload?
    pub fn is_playable(&self) -> bool {
        self.frame_count().is_some() && self.fps().is_some()
    }

    /// Delay between two frames at `speed`, `None` when not playable
    pub fn frame_interval(&self, speed: PlaybackSpeed) -> Option<Duration> {
        self.frame_count()?;
        let fps = self.fps()? as f64;
        Some(Duration::from_secs_f64(1.0 / fps / speed.multiplier()))
    }

    /// Check that the payload carries the geometry its tier promises
    pub fn validate(&self) -> GlossaResult<()> {
        let tier = self.tier();
        if tier != Tier::Error && self.fps().is_none() {
            return Err(GlossaError::malformed(tier, "frame rate must be positive"));
        }

        match self {
            AnimationPayload::RealPose { frames, .. } => {
                if frames.is_empty() {
                    return Err(GlossaError::malformed(tier, "no recorded frames"));
                }
                if let Some(i) = frames.iter().position(|f| f.landmarks.is_empty()) {
                    return Err(GlossaError::malformed(tier, format!("frame {i} has no landmarks")));
                }
                let all_finite = frames
                    .iter()
                    .flat_map(|f| f.landmarks.iter())
                    .all(Landmark::is_finite);
                if !all_finite {
                    return Err(GlossaError::malformed(tier, "non-finite landmark coordinate"));
                }
            }
            AnimationPayload::Fingerspelling { letters, .. } => {
                if letters.is_empty() {
                    return Err(GlossaError::malformed(tier, "no letters to spell"));
                }
            }
            AnimationPayload::LinguisticApprox { props, .. } => {
                if !props.complexity.is_finite() {
                    return Err(GlossaError::malformed(tier, "non-finite complexity"));
                }
            }
            AnimationPayload::Basic { .. } | AnimationPayload::Error { .. } => {}
        }
        Ok(())
    }

    /// Replace malformed data with the basic fallback
    ///
    /// Returns the payload to render and the defect that was repaired, if any.
    pub fn into_renderable(self) -> (AnimationPayload, Option<GlossaError>) {
        match self.validate() {
            Ok(()) => (self, None),
            Err(defect) => (AnimationPayload::basic_fallback(), Some(defect)),
        }
    }
}
