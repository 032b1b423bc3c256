//! Payload wire format
//!
//! Providers answer with a JSON object tagged by `tier`:
//!
//! ```json
//! { "tier": "real_pose", "frameCount": 30, "fps": 30, "dataSource": "wlasl",
//!   "frames": [[{ "x": 0.5, "y": 0.4, "confidence": 0.9 }, [0.52, 0.41, 4]]] }
//! ```
//!
//! The dataset renderer's older untagged shape, `{ "frames": [[[x, y, r]]], "fps": n }`,
//! is still accepted and decoded as `RealPose`.
//!
//! Bodies that are not a payload at all are fetch failures. Payloads whose
//! tier is recognised but whose geometry is unusable are `MalformedPayload`.

use serde::Deserialize;
use serde_json::Value;

use glossa_core::{
    AnimationPayload, BasicMovement, GlossaError, GlossaResult, Landmark, LinguisticProps, Location,
    MovementClass, PoseFrame, Tier, DEFAULT_FPS,
};

/// Frame rate of the legacy dataset shape when it declares none
pub const LEGACY_DEFAULT_FPS: f32 = 24.0;

/// Data source recorded for legacy payloads
const LEGACY_DATA_SOURCE: &str = "dataset";

#[derive(Debug, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
enum TieredWire {
    RealPose(RealPoseWire),
    LinguisticApprox(LinguisticWire),
    Fingerspelling(SpellingWire),
    Basic(BasicWire),
    Error(ErrorWire),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RealPoseWire {
    #[serde(default)]
    frames: Option<Vec<FrameWire>>,
    #[serde(default)]
    frame_count: u32,
    #[serde(default)]
    fps: Option<f32>,
    #[serde(default)]
    data_source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinguisticWire {
    #[serde(default)]
    movement: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    complexity: Option<f32>,
    #[serde(default)]
    handshape: Option<String>,
    #[serde(default)]
    frame_count: u32,
    #[serde(default)]
    fps: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpellingWire {
    #[serde(default)]
    letters: Option<LettersWire>,
    #[serde(default)]
    frame_count: u32,
    #[serde(default)]
    fps: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasicWire {
    #[serde(default)]
    movement: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    frame_count: u32,
    #[serde(default)]
    fps: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    #[serde(default, alias = "message")]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct LegacyWire {
    frames: Vec<FrameWire>,
    #[serde(default)]
    fps: Option<f32>,
}

/// Letters as a word or as a list of one-character strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LettersWire {
    Word(String),
    List(Vec<String>),
}

/// A frame as a bare landmark list or wrapped in an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameWire {
    Landmarks(Vec<LandmarkWire>),
    Wrapped { landmarks: Vec<LandmarkWire> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandmarkWire {
    Object {
        x: f32,
        y: f32,
        #[serde(default)]
        radius: Option<f32>,
        #[serde(default, alias = "visibility")]
        confidence: Option<f32>,
    },
    Array(Vec<f32>),
}

impl LandmarkWire {
    fn into_landmark(self) -> GlossaResult<Landmark> {
        match self {
            LandmarkWire::Object {
                x,
                y,
                radius,
                confidence,
            } => Ok(Landmark {
                x,
                y,
                radius,
                confidence,
            }),
            LandmarkWire::Array(values) => match values.as_slice() {
                [x, y] => Ok(Landmark::new(*x, *y)),
                [x, y, r, ..] => Ok(Landmark::new(*x, *y).with_radius(*r)),
                _ => Err(GlossaError::malformed(
                    Tier::RealPose,
                    format!("landmark needs at least 2 coordinates, got {}", values.len()),
                )),
            },
        }
    }
}

impl FrameWire {
    fn into_frame(self) -> GlossaResult<PoseFrame> {
        let landmarks = match self {
            FrameWire::Landmarks(landmarks) | FrameWire::Wrapped { landmarks } => landmarks,
        };
        landmarks
            .into_iter()
            .map(LandmarkWire::into_landmark)
            .collect::<GlossaResult<Vec<_>>>()
            .map(PoseFrame::new)
    }
}

fn decode_frames(frames: Vec<FrameWire>) -> GlossaResult<Vec<PoseFrame>> {
    frames.into_iter().map(FrameWire::into_frame).collect()
}

fn decode_letters(letters: LettersWire) -> Vec<char> {
    match letters {
        LettersWire::Word(word) => word.chars().filter(|c| !c.is_whitespace()).collect(),
        LettersWire::List(list) => list.iter().filter_map(|s| s.chars().next()).collect(),
    }
}

impl TieredWire {
    fn into_payload(self) -> GlossaResult<AnimationPayload> {
        match self {
            TieredWire::RealPose(wire) => {
                let frames = wire
                    .frames
                    .ok_or_else(|| GlossaError::malformed(Tier::RealPose, "missing frames"))?;
                Ok(AnimationPayload::RealPose {
                    frames: decode_frames(frames)?,
                    frame_count: wire.frame_count,
                    fps: wire.fps.unwrap_or(DEFAULT_FPS),
                    data_source: wire.data_source.unwrap_or_default(),
                })
            }
            TieredWire::LinguisticApprox(wire) => {
                let tag = wire
                    .movement
                    .ok_or_else(|| GlossaError::malformed(Tier::LinguisticApprox, "missing movement"))?;
                let movement = MovementClass::from_tag(&tag).ok_or_else(|| {
                    GlossaError::malformed(Tier::LinguisticApprox, format!("unknown movement {tag:?}"))
                })?;
                let location = wire
                    .location
                    .as_deref()
                    .and_then(Location::from_tag)
                    .unwrap_or_default();
                let mut props = LinguisticProps::new(movement, location);
                if let Some(complexity) = wire.complexity {
                    props.complexity = complexity;
                }
                props.handshape = wire.handshape;
                Ok(AnimationPayload::LinguisticApprox {
                    props,
                    frame_count: wire.frame_count,
                    fps: wire.fps.unwrap_or(DEFAULT_FPS),
                })
            }
            TieredWire::Fingerspelling(wire) => {
                let letters = wire
                    .letters
                    .ok_or_else(|| GlossaError::malformed(Tier::Fingerspelling, "missing letters"))?;
                Ok(AnimationPayload::Fingerspelling {
                    letters: decode_letters(letters),
                    frame_count: wire.frame_count,
                    fps: wire.fps.unwrap_or(DEFAULT_FPS),
                })
            }
            TieredWire::Basic(wire) => Ok(AnimationPayload::Basic {
                movement: wire
                    .movement
                    .as_deref()
                    .and_then(BasicMovement::from_tag)
                    .unwrap_or_default(),
                location: wire
                    .location
                    .as_deref()
                    .and_then(Location::from_tag)
                    .unwrap_or_default(),
                frame_count: wire.frame_count,
                fps: wire.fps.unwrap_or(DEFAULT_FPS),
            }),
            TieredWire::Error(wire) => Ok(AnimationPayload::error(wire.reason)),
        }
    }
}

impl LegacyWire {
    fn into_payload(self) -> GlossaResult<AnimationPayload> {
        let frames = decode_frames(self.frames)?;
        Ok(AnimationPayload::RealPose {
            frame_count: frames.len() as u32,
            frames,
            fps: self.fps.unwrap_or(LEGACY_DEFAULT_FPS),
            data_source: LEGACY_DATA_SOURCE.to_string(),
        })
    }
}

/// Decode a provider response body for `gloss`
pub fn decode_payload(gloss: &str, body: &[u8]) -> GlossaResult<AnimationPayload> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| GlossaError::fetch(gloss, format!("undecodable body: {e}")))?;

    if value.get("tier").is_some() {
        let wire: TieredWire = serde_json::from_value(value)
            .map_err(|e| GlossaError::fetch(gloss, format!("unrecognised payload: {e}")))?;
        wire.into_payload()
    } else if value.get("frames").is_some() {
        let wire: LegacyWire = serde_json::from_value(value)
            .map_err(|e| GlossaError::fetch(gloss, format!("unrecognised legacy payload: {e}")))?;
        wire.into_payload()
    } else {
        Err(GlossaError::fetch(gloss, "response is not an animation payload"))
    }
}
