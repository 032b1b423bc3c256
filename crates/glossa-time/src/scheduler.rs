//! Playback Scheduler - drives one animation's frame loop
//!
//! Each scheduler owns its payload, frame counter, timer task and surface
//! handle; instances share nothing. Every loop carries the epoch it was
//! started under, and pause/reset/load/teardown bump the epoch, so a tick
//! that wakes after cancellation sees a stale epoch and neither draws nor
//! advances.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use glossa_core::{AnimationPayload, PlaybackSpeed};
use glossa_visual::{PoseRenderer, RenderStyle, SharedSurface};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::{PlaybackState, PlaybackStatus};

struct Inner {
    payload: Option<Arc<AnimationPayload>>,
    state: PlaybackState,
    surface: SharedSurface,
    renderer: PoseRenderer,
    /// Bumped on every cancellation
    epoch: u64,
    task: Option<JoinHandle<()>>,
    disposed: bool,
}

impl Inner {
    fn cancel_loop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn render_current(&self) {
        let Some(payload) = self.payload.as_deref() else {
            return;
        };
        let mut surface = self.surface.lock();
        self.renderer
            .render_frame(payload, self.state.frame_index, &mut *surface);
    }

    fn is_current(&self, epoch: u64) -> bool {
        !self.disposed && self.epoch == epoch && self.state.is_playing()
    }

    fn next_interval(&self, epoch: u64) -> Option<Duration> {
        if !self.is_current(epoch) {
            return None;
        }
        self.payload.as_ref()?.frame_interval(self.state.speed)
    }

    /// Render the current frame, then advance. `false` ends the loop.
    fn tick(&mut self, epoch: u64) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        let Some(frame_count) = self.payload.as_ref().and_then(|p| p.frame_count()) else {
            return false;
        };
        self.render_current();
        self.state.advance(frame_count);
        true
    }
}

/// Per-animation playback scheduler
///
/// Cheap to clone; clones drive the same instance.
#[derive(Clone)]
pub struct PlaybackScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackScheduler {
    /// Create a stopped scheduler with nothing loaded
    pub fn new(surface: SharedSurface, renderer: PoseRenderer, speed: PlaybackSpeed) -> Self {
        PlaybackScheduler {
            inner: Arc::new(Mutex::new(Inner {
                payload: None,
                state: PlaybackState::new(speed),
                surface,
                renderer,
                epoch: 0,
                task: None,
                disposed: false,
            })),
        }
    }

    /// Install a payload: stops any running loop and renders frame 0
    pub fn load(&self, payload: Arc<AnimationPayload>) {
        let mut inner = self.inner.lock();
        if inner.disposed {
            debug!("Ignoring {} payload for disposed scheduler", payload.tier());
            return;
        }
        inner.cancel_loop();
        inner.payload = Some(payload);
        inner.state.rewind();
        inner.render_current();
    }

    /// Stop, drop the payload and show the loading placeholder for `gloss`
    pub fn show_loading(&self, gloss: &str) {
        let mut inner = self.inner.lock();
        if inner.disposed {
            return;
        }
        inner.cancel_loop();
        inner.payload = None;
        inner.state.rewind();

        let inner = &*inner;
        let mut surface = inner.surface.lock();
        inner.renderer.render_loading(gloss, &mut *surface);
    }

    /// Start the frame loop. No-op without a playable payload or when
    /// already playing.
    pub fn play(&self) {
        let mut inner = self.inner.lock();
        if inner.disposed || inner.state.is_playing() {
            return;
        }
        let playable = inner.payload.as_ref().is_some_and(|p| p.is_playable());
        if !playable {
            debug!("Nothing playable loaded, staying {:?}", inner.state.status);
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, playback not started");
            return;
        };

        inner.cancel_loop();
        inner.state.status = PlaybackStatus::Playing;
        let epoch = inner.epoch;
        let shared = Arc::downgrade(&self.inner);
        inner.task = Some(runtime.spawn(run_frame_loop(shared, epoch)));
    }

    /// Stop advancing and cancel the pending tick. Idempotent.
    pub fn pause(&self) {
        let mut inner = self.inner.lock();
        inner.cancel_loop();
        if inner.state.is_playing() {
            inner.state.status = PlaybackStatus::Paused;
        }
    }

    /// Pause, rewind to frame 0 and render it
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.cancel_loop();
        inner.state.rewind();
        if !inner.disposed {
            inner.render_current();
        }
    }

    /// Applies from the next scheduled tick; the frame index is kept
    pub fn set_speed(&self, speed: PlaybackSpeed) {
        self.inner.lock().state.speed = speed;
    }

    /// Applies from the next rendered frame
    pub fn set_style(&self, style: RenderStyle) {
        self.inner.lock().renderer.set_style(style);
    }

    /// Pause for good: no later call draws onto the surface again
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        inner.cancel_loop();
        inner.state.rewind();
        inner.payload = None;
        inner.disposed = true;
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.inner.lock().state
    }

    pub fn payload(&self) -> Option<Arc<AnimationPayload>> {
        self.inner.lock().payload.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }
}

impl fmt::Debug for PlaybackScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PlaybackScheduler")
            .field("state", &inner.state)
            .field("tier", &inner.payload.as_ref().map(|p| p.tier()))
            .field("disposed", &inner.disposed)
            .finish()
    }
}

fn next_interval(shared: &Weak<Mutex<Inner>>, epoch: u64) -> Option<Duration> {
    shared.upgrade()?.lock().next_interval(epoch)
}

fn tick(shared: &Weak<Mutex<Inner>>, epoch: u64) -> bool {
    match shared.upgrade() {
        Some(inner) => inner.lock().tick(epoch),
        None => false,
    }
}

/// Deadlines accumulate from the loop start so timing does not drift; a
/// late wake-up fires the overdue ticks back to back, in order.
async fn run_frame_loop(shared: Weak<Mutex<Inner>>, epoch: u64) {
    let mut deadline = Instant::now();
    loop {
        let Some(interval) = next_interval(&shared, epoch) else {
            return;
        };
        deadline += interval;
        sleep_until(deadline).await;
        if !tick(&shared, epoch) {
            return;
        }
    }
}
