//! Test doubles for the engine's external interfaces

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use glossa_core::{AnimationPayload, GlossaResult, Landmark, PoseFrame};
use glossa_runtime::{SegmentHost, SegmentStyle};
use glossa_transport::{LexiconProvider, PoseProvider, ProviderFuture};
use glossa_visual::{DrawCommand, HandJoint, Palette, RecordingSurface, SharedSurface, Surface};

// ============================================================================
// SCRIPTED PROVIDER
// ============================================================================

/// Pose provider with scripted answers and a request log
///
/// Per gloss, queued answers are served first, then a fixed payload if one
/// is set, then whatever the built-in lexicon synthesises.
pub struct ScriptedProvider {
    delay: Duration,
    queued: Mutex<HashMap<String, VecDeque<GlossaResult<AnimationPayload>>>>,
    fixed: Mutex<HashMap<String, AnimationPayload>>,
    lexicon: LexiconProvider,
    requests: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            queued: Mutex::new(HashMap::new()),
            fixed: Mutex::new(HashMap::new()),
            lexicon: LexiconProvider::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Serve `result` for the next request of `gloss`
    pub fn enqueue(&self, gloss: &str, result: GlossaResult<AnimationPayload>) {
        self.queued
            .lock()
            .entry(gloss.to_string())
            .or_default()
            .push_back(result);
    }

    /// Serve `payload` for every request of `gloss` without a queued answer
    pub fn set_payload(&self, gloss: &str, payload: AnimationPayload) {
        self.fixed.lock().insert(gloss.to_string(), payload);
    }

    /// Every requested gloss, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self, gloss: &str) -> usize {
        self.requests.lock().iter().filter(|g| *g == gloss).count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().len()
    }

    fn answer(&self, gloss: &str) -> GlossaResult<AnimationPayload> {
        self.requests.lock().push(gloss.to_string());

        if let Some(result) = self.queued.lock().get_mut(gloss).and_then(VecDeque::pop_front) {
            return result;
        }
        if let Some(payload) = self.fixed.lock().get(gloss) {
            return Ok(payload.clone());
        }
        Ok(self.lexicon.synthesize(gloss))
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseProvider for ScriptedProvider {
    fn fetch<'a>(&'a self, gloss: &'a str) -> ProviderFuture<'a> {
        let result = self.answer(gloss);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

// ============================================================================
// RECORDING HOST
// ============================================================================

/// Segment host that hands out recording surfaces and remembers styles
pub struct RecordingHost {
    width: f32,
    height: f32,
    styles: Mutex<HashMap<usize, SegmentStyle>>,
    surfaces: Mutex<HashMap<usize, Arc<Mutex<RecordingSurface>>>>,
    without_surface: Mutex<Vec<usize>>,
}

impl RecordingHost {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            styles: Mutex::new(HashMap::new()),
            surfaces: Mutex::new(HashMap::new()),
            without_surface: Mutex::new(Vec::new()),
        }
    }

    /// Segment `index` gets no drawing surface
    pub fn remove_surface(&self, index: usize) {
        self.without_surface.lock().push(index);
        self.surfaces.lock().remove(&index);
    }

    pub fn style(&self, index: usize) -> Option<SegmentStyle> {
        self.styles.lock().get(&index).copied()
    }

    /// Indices styled anything but hidden, ascending
    pub fn visible(&self) -> Vec<usize> {
        let mut visible: Vec<usize> = self
            .styles
            .lock()
            .iter()
            .filter(|(_, style)| **style != SegmentStyle::Hidden)
            .map(|(index, _)| *index)
            .collect();
        visible.sort_unstable();
        visible
    }

    /// Recording behind a segment's surface, if one was handed out
    pub fn recording(&self, index: usize) -> Option<Arc<Mutex<RecordingSurface>>> {
        self.surfaces.lock().get(&index).cloned()
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(300.0, 300.0)
    }
}

impl SegmentHost for RecordingHost {
    fn set_segment_style(&self, index: usize, style: SegmentStyle) {
        self.styles.lock().insert(index, style);
    }

    fn surface(&self, index: usize) -> Option<SharedSurface> {
        if self.without_surface.lock().contains(&index) {
            return None;
        }
        let mut surfaces = self.surfaces.lock();
        let surface = surfaces
            .entry(index)
            .or_insert_with(|| RecordingSurface::shared(self.width, self.height));
        Some(surface.clone())
    }
}

// ============================================================================
// PAYLOADS AND INSPECTION
// ============================================================================

/// Recorded hand pose drifting left to right
pub fn real_pose_payload(frame_count: u32, fps: f32) -> AnimationPayload {
    let frames = (0..frame_count)
        .map(|i| {
            let drift = 0.3 * i as f32 / frame_count.max(1) as f32;
            PoseFrame::new(
                (0..HandJoint::count())
                    .map(|j| Landmark::new(0.3 + drift + 0.01 * j as f32, 0.4 + 0.01 * j as f32))
                    .collect(),
            )
        })
        .collect();

    AnimationPayload::RealPose {
        frames,
        frame_count,
        fps,
        data_source: "harness".to_string(),
    }
}

/// Frame index of every rendered frame, recovered from the progress bar
///
/// Assumes the standard palette.
pub fn rendered_frames(surface: &RecordingSurface, total_frames: u32) -> Vec<u32> {
    let fill = Palette::standard().progress_fill;
    let (width, _) = surface.size();

    surface
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Rect {
                width: filled,
                color,
                ..
            } if *color == fill => Some((filled / width * total_frames as f32).round() as u32),
            _ => None,
        })
        .collect()
}

/// Let spawned tasks run without advancing time
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
