//! Pose Renderer - one payload frame onto one surface
//!
//! `render_frame` always clears first and then draws the tier, the progress
//! bar and the quality badge. It keeps no per-frame state: advancing frames
//! is the playback scheduler's job.

use glossa_core::{
    AnimationPayload, BasicMovement, Landmark, LinguisticProps, Location, PoseFrame, Tier,
};
use tracing::debug;

use crate::{
    basic_position, is_hand_skeleton, linguistic_position, spelling_cursor, Point, RenderStyle,
    Surface, HAND_CONNECTIONS, TRAIL_ANCHOR, TRAIL_LENGTH,
};

/// Landmark radius when the payload gives none
pub const DEFAULT_LANDMARK_RADIUS: f32 = 5.0;

/// Landmarks below this confidence are drawn dimmed
pub const LOW_CONFIDENCE: f32 = 0.3;

/// Longest error reason shown on the surface
const MAX_REASON_CHARS: usize = 40;

const PROGRESS_HEIGHT: f32 = 4.0;
const BADGE_WIDTH: f32 = 56.0;
const BADGE_HEIGHT: f32 = 16.0;
const BADGE_MARGIN: f32 = 6.0;

/// Renders animation payloads tier by tier
#[derive(Debug, Clone, Default)]
pub struct PoseRenderer {
    style: RenderStyle,
}

impl PoseRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: RenderStyle) {
        self.style = style;
    }

    /// Clear `surface` and draw frame `frame_index` of `payload`
    ///
    /// Payloads missing the geometry their tier promises are drawn with the
    /// basic heuristic instead. Never panics.
    pub fn render_frame(&self, payload: &AnimationPayload, frame_index: u32, surface: &mut dyn Surface) {
        surface.clear(self.style.palette.background);

        match payload.validate() {
            Ok(()) => self.draw_payload(payload, frame_index, surface),
            Err(defect) => {
                debug!("Rendering basic fallback: {}", defect);
                self.draw_payload(&AnimationPayload::basic_fallback(), frame_index, surface);
            }
        }
    }

    /// Placeholder shown while a gloss is being fetched
    pub fn render_loading(&self, gloss: &str, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let (w, h) = surface.size();

        surface.clear(palette.background);
        surface.fill_text(gloss, Point::new(w * 0.5, h * 0.4), h * 0.12, palette.text);
        surface.fill_text("Loading animation", Point::new(w * 0.5, h * 0.6), h * 0.06, palette.text.faded(0.7));
        for i in 0..3 {
            let center = Point::new(w * (0.45 + 0.05 * i as f32), h * 0.7);
            surface.fill_circle(center, 3.0 * self.style.marker_scale, palette.marker.faded(0.4 + 0.2 * i as f32));
        }
        self.draw_progress(0, 0, surface);
    }

    fn draw_payload(&self, payload: &AnimationPayload, frame_index: u32, surface: &mut dyn Surface) {
        let total = payload.frame_count().unwrap_or(0);
        let frame = if total == 0 { 0 } else { frame_index % total };

        match payload {
            AnimationPayload::RealPose { frames, .. } => self.draw_real_pose(frames, frame, surface),
            AnimationPayload::LinguisticApprox { props, .. } => {
                self.draw_linguistic(props, frame, total, surface)
            }
            AnimationPayload::Fingerspelling { letters, .. } => {
                self.draw_fingerspelling(letters, frame, total, surface)
            }
            AnimationPayload::Basic {
                movement, location, ..
            } => self.draw_basic(*movement, *location, frame, total, surface),
            AnimationPayload::Error { reason } => self.draw_error(reason, surface),
        }

        self.draw_progress(frame, total, surface);
        self.draw_badge(payload.tier(), surface);
    }

    fn draw_real_pose(&self, frames: &[PoseFrame], frame: u32, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let scale = self.style.marker_scale;
        let (w, h) = surface.size();
        let to_px = |lm: &Landmark| Point::new(lm.x * w, lm.y * h);

        let frame = frame as usize;
        let Some(current) = frames.get(frame) else {
            return;
        };

        // Motion trail, oldest first; no wrap-around into the previous loop
        let anchor = TRAIL_ANCHOR.index();
        let first = frame.saturating_sub(TRAIL_LENGTH);
        let trail: Vec<Point> = frames[first..=frame]
            .iter()
            .filter_map(|f| f.landmarks.get(anchor).map(to_px))
            .collect();
        let segments = trail.len().saturating_sub(1).max(1) as f32;
        for (i, pair) in trail.windows(2).enumerate() {
            let fade = (i + 1) as f32 / segments;
            surface.stroke_line(pair[0], pair[1], 2.0 * scale, palette.trail.faded(fade));
        }

        if is_hand_skeleton(current.landmarks.len()) {
            for (a, b) in HAND_CONNECTIONS.iter() {
                let from = to_px(&current.landmarks[a.index()]);
                let to = to_px(&current.landmarks[b.index()]);
                surface.stroke_line(from, to, 2.0 * scale, palette.bone);
            }
        }

        for lm in &current.landmarks {
            let radius = lm.radius.unwrap_or(DEFAULT_LANDMARK_RADIUS) * scale;
            let color = match lm.confidence {
                Some(c) if c < LOW_CONFIDENCE => palette.landmark.faded(0.35),
                _ => palette.landmark,
            };
            surface.fill_circle(to_px(lm), radius, color);
        }
    }

    fn draw_linguistic(&self, props: &LinguisticProps, frame: u32, total: u32, surface: &mut dyn Surface) {
        let (w, h) = surface.size();
        let (x, y) = linguistic_position(props, frame, total);
        let radius = 10.0 * self.style.marker_scale;
        surface.fill_circle(Point::new(x * w, y * h), radius, self.style.palette.marker);
    }

    fn draw_fingerspelling(&self, letters: &[char], frame: u32, total: u32, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let (w, h) = surface.size();
        let Some(cursor) = spelling_cursor(letters.len(), frame, total) else {
            return;
        };

        let glyph = letters[cursor.current].to_string();
        surface.fill_text(&glyph, Point::new(w * 0.5, h * 0.42), h * 0.4, palette.text);

        // Letter strip: done / current / pending
        let strip_width = w * 0.8;
        let cell = strip_width / letters.len() as f32;
        let gap = (cell * 0.1).min(4.0);
        let top = h * 0.78;
        for i in 0..letters.len() {
            let color = if i < cursor.current {
                palette.strip_done
            } else if i == cursor.current {
                palette.strip_current
            } else {
                palette.strip_pending
            };
            let origin = Point::new(w * 0.1 + i as f32 * cell, top);
            surface.fill_rect(origin, (cell - gap).max(1.0), h * 0.06, color);
        }
    }

    fn draw_basic(&self, movement: BasicMovement, location: Location, frame: u32, total: u32, surface: &mut dyn Surface) {
        let (w, h) = surface.size();
        let (x, y) = basic_position(movement, location, frame, total);
        let radius = 12.0 * self.style.marker_scale;
        surface.fill_circle(Point::new(x * w, y * h), radius, self.style.palette.marker.faded(0.8));
    }

    fn draw_error(&self, reason: &str, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let (w, h) = surface.size();
        let (cx, cy) = (w * 0.5, h * 0.4);
        let arm = h.min(w) * 0.12;
        let width = 4.0 * self.style.marker_scale;

        surface.stroke_line(Point::new(cx - arm, cy - arm), Point::new(cx + arm, cy + arm), width, palette.error);
        surface.stroke_line(Point::new(cx - arm, cy + arm), Point::new(cx + arm, cy - arm), width, palette.error);

        let shown: String = reason.chars().take(MAX_REASON_CHARS).collect();
        let shown = if shown.is_empty() { "Animation unavailable".to_string() } else { shown };
        surface.fill_text(&shown, Point::new(cx, h * 0.72), h * 0.06, palette.text);
    }

    fn draw_progress(&self, frame: u32, total: u32, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let (w, h) = surface.size();
        let top = h - PROGRESS_HEIGHT;

        surface.fill_rect(Point::new(0.0, top), w, PROGRESS_HEIGHT, palette.progress_track);
        if total > 0 {
            let filled = w * (frame as f32 / total as f32);
            surface.fill_rect(Point::new(0.0, top), filled, PROGRESS_HEIGHT, palette.progress_fill);
        }
    }

    fn draw_badge(&self, tier: Tier, surface: &mut dyn Surface) {
        let palette = &self.style.palette;
        let origin = Point::new(BADGE_MARGIN, BADGE_MARGIN);

        surface.fill_rect(origin, BADGE_WIDTH, BADGE_HEIGHT, palette.badge(tier));
        surface.fill_text(
            tier.badge(),
            Point::new(origin.x + BADGE_WIDTH * 0.5, origin.y + BADGE_HEIGHT * 0.5),
            BADGE_HEIGHT * 0.7,
            palette.text,
        );
    }
}
