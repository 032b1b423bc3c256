//! Analytic geometry for the synthetic tiers
//!
//! All positions are normalized to [0, 1] and are pure functions of the
//! frame index, so re-rendering a frame always lands on the same spot.

use std::f32::consts::TAU;

use glossa_core::{BasicMovement, LinguisticProps, Location, MovementClass};

/// Base trajectory radius before complexity scaling
const APPROX_RADIUS: f32 = 0.12;

/// Horizontal amplitude of the basic wave
const BASIC_WAVE_AMPLITUDE: f32 = 0.05;

/// Phase step of the basic wave per frame
const BASIC_WAVE_STEP: f32 = 0.4;

/// Radius of the basic circular movement
const BASIC_CIRCLE_RADIUS: f32 = 0.03;

/// Normalized anchor of a coarse body location
pub fn location_anchor(location: Location) -> (f32, f32) {
    match location {
        Location::Head => (0.5, 0.28),
        Location::Chest => (0.5, 0.55),
        Location::Side => (0.72, 0.55),
    }
}

/// Playback progress in [0, 1) for a frame of a loop
#[inline]
pub fn progress(frame_index: u32, total_frames: u32) -> f32 {
    if total_frames == 0 {
        return 0.0;
    }
    (frame_index % total_frames) as f32 / total_frames as f32
}

/// Approximate hand position for a linguistically described sign
pub fn linguistic_position(props: &LinguisticProps, frame_index: u32, total_frames: u32) -> (f32, f32) {
    let p = progress(frame_index, total_frames);
    let (cx, cy) = location_anchor(props.location);
    let r = APPROX_RADIUS * (0.5 + props.complexity.clamp(0.0, 1.0));

    let (x, y) = match props.movement {
        MovementClass::Circular => (cx + r * (TAU * p).cos(), cy + r * (TAU * p).sin()),
        MovementClass::Forward => (cx - r + 2.0 * r * p, cy),
        MovementClass::Upward => (cx, cy + r - 2.0 * r * p),
        MovementClass::Downward => (cx, cy - r + 2.0 * r * p),
        MovementClass::Wave => (cx + 0.5 * r * (3.0 * TAU * p).sin(), cy),
        MovementClass::Static => (cx, cy),
    };
    (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
}

/// Heuristic hand position for the basic tier
pub fn basic_position(
    movement: BasicMovement,
    location: Location,
    frame_index: u32,
    total_frames: u32,
) -> (f32, f32) {
    let (bx, by) = location_anchor(location);
    let frame = if total_frames == 0 {
        0
    } else {
        frame_index % total_frames
    };

    match movement {
        BasicMovement::Wave => (bx + BASIC_WAVE_AMPLITUDE * (frame as f32 * BASIC_WAVE_STEP).sin(), by),
        BasicMovement::Circular => {
            let angle = TAU * progress(frame, total_frames);
            (
                bx + BASIC_CIRCLE_RADIUS * angle.cos(),
                by + BASIC_CIRCLE_RADIUS * angle.sin(),
            )
        }
        BasicMovement::Static => (bx, by),
    }
}

/// Position in a fingerspelled word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellingCursor {
    /// Letter being shown
    pub current: usize,
    /// Frames each letter is held for
    pub frames_per_letter: u32,
}

/// Which letter a frame shows, `None` when there are no letters
pub fn spelling_cursor(letter_count: usize, frame_index: u32, total_frames: u32) -> Option<SpellingCursor> {
    if letter_count == 0 {
        return None;
    }
    let total = total_frames.max(1);
    let frames_per_letter = (total / letter_count as u32).max(1);
    let frame = frame_index % total;
    let current = ((frame / frames_per_letter) as usize).min(letter_count - 1);
    Some(SpellingCursor {
        current,
        frames_per_letter,
    })
}
