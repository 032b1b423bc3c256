//! Caption Timeline Synchronizer
//!
//! Maps each video time update to the active caption segment and drives the
//! cache, renderer and schedulers for it. Never waits on the provider: a
//! cache miss shows the loading placeholder and the resolved payload is
//! loaded by a background task. The task keeps running while its segment
//! stays visible; it only starts playback if the segment is still active.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use glossa_cache::{AnimationCache, Lookup, PendingFetch};
use glossa_core::{AnimationPayload, EngineConfig, MediaTime, Timeline};
use glossa_time::PlaybackScheduler;
use glossa_visual::{PoseRenderer, RenderStyle, SharedSurface};

/// Visual state of one caption segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentStyle {
    /// Highlighted, avatar playing
    Active,
    /// Visible in neutral styling
    Inactive,
    Hidden,
}

/// The page (or test double) that owns the caption segments' containers
pub trait SegmentHost: Send + Sync {
    fn set_segment_style(&self, index: usize, style: SegmentStyle);

    /// Drawing surface of a segment, `None` if it has none
    fn surface(&self, index: usize) -> Option<SharedSurface>;
}

/// What a time update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new segment became active
    Entered(usize),
    /// The active segment is unchanged
    Continued(usize),
    /// The active segment ended with no replacement
    Left,
    /// Nothing active before or after
    Idle,
}

/// Drives caption styling and avatar playback from video time
pub struct CaptionSynchronizer {
    timeline: Timeline,
    config: EngineConfig,
    style: RenderStyle,
    cache: AnimationCache,
    host: Arc<dyn SegmentHost>,
    active: Option<usize>,
    /// Most recently active segment; stays visible after it ends
    last_active: Option<usize>,
    players: HashMap<usize, PlaybackScheduler>,
    /// Active segment as seen by resolution tasks
    playing: Arc<Mutex<Option<usize>>>,
    /// Pending payload resolutions, per segment
    resolving: HashMap<usize, JoinHandle<()>>,
}

impl CaptionSynchronizer {
    pub fn new(config: EngineConfig, cache: AnimationCache, host: Arc<dyn SegmentHost>) -> Self {
        CaptionSynchronizer {
            timeline: Timeline::empty(),
            style: RenderStyle::from_config(&config),
            config,
            cache,
            host,
            active: None,
            last_active: None,
            players: HashMap::new(),
            playing: Arc::new(Mutex::new(None)),
            resolving: HashMap::new(),
        }
    }

    /// Replace the timeline; all playback is torn down first
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.teardown();
        self.timeline = timeline;
        self.restyle();
    }

    /// Handle one video time update
    pub fn on_time_update(&mut self, t: MediaTime) -> SyncOutcome {
        if !self.config.active {
            return SyncOutcome::Idle;
        }
        if !t.is_valid() {
            debug!("Ignoring invalid video time {:?}", t);
            return SyncOutcome::Idle;
        }

        match (self.active, self.timeline.active_at(t)) {
            (Some(current), Some(found)) if current == found || self.same_content(current, found) => {
                SyncOutcome::Continued(current)
            }
            (_, Some(found)) => {
                self.enter(found);
                SyncOutcome::Entered(found)
            }
            (Some(_), None) => {
                self.leave();
                SyncOutcome::Left
            }
            (None, None) => SyncOutcome::Idle,
        }
    }

    /// Apply a new configuration to the synchronizer and every live player
    pub fn apply_config(&mut self, config: EngineConfig) {
        let had_avatar = self.config.show_avatar && self.config.active;
        self.style = RenderStyle::from_config(&config);
        self.config = config;

        for player in self.players.values() {
            player.set_style(self.style);
            player.set_speed(self.config.animation_speed_default);
        }

        if !self.config.active {
            debug!("Engine deactivated");
            self.teardown();
            for index in 0..self.timeline.len() {
                self.host.set_segment_style(index, SegmentStyle::Hidden);
            }
            return;
        }

        if !self.config.show_avatar {
            self.cancel_resolutions();
            self.teardown_players();
        }
        self.restyle();

        if !had_avatar && self.config.show_avatar {
            if let Some(index) = self.active {
                self.start_animation(index);
            }
        }
    }

    /// Pause and discard every live player; the timeline is kept
    pub fn teardown(&mut self) {
        self.cancel_resolutions();
        self.teardown_players();
        self.set_active(None);
        self.last_active = None;
    }

    #[inline]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn player(&self, index: usize) -> Option<PlaybackScheduler> {
        self.players.get(&index).cloned()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &AnimationCache {
        &self.cache
    }

    fn same_content(&self, a: usize, b: usize) -> bool {
        match (self.timeline.get(a), self.timeline.get(b)) {
            (Some(a), Some(b)) => a.same_content(b),
            _ => false,
        }
    }

    fn enter(&mut self, index: usize) {
        let previous = self.set_active(Some(index));
        if let Some(player) = previous.and_then(|prev| self.players.get(&prev)) {
            player.pause();
        }

        self.last_active = Some(index);
        self.restyle();

        if self.config.show_avatar {
            self.start_animation(index);
        }
    }

    fn leave(&mut self) {
        let previous = self.set_active(None);
        if let Some(player) = previous.and_then(|prev| self.players.get(&prev)) {
            player.pause();
        }
        self.restyle();
    }

    /// Update the active segment, returning the previous one
    ///
    /// Resolution tasks observe the change before any player is paused.
    fn set_active(&mut self, index: Option<usize>) -> Option<usize> {
        *self.playing.lock() = index;
        std::mem::replace(&mut self.active, index)
    }

    fn style_for(&self, index: usize) -> SegmentStyle {
        if self.active == Some(index) {
            SegmentStyle::Active
        } else if self.config.show_all_captions || self.last_active == Some(index) {
            SegmentStyle::Inactive
        } else {
            SegmentStyle::Hidden
        }
    }

    /// Push every segment's style to the host; hidden segments lose their
    /// player and any pending resolution
    fn restyle(&mut self) {
        for index in 0..self.timeline.len() {
            let style = self.style_for(index);
            self.host.set_segment_style(index, style);
            if style == SegmentStyle::Hidden {
                if let Some(task) = self.resolving.remove(&index) {
                    task.abort();
                }
                if let Some(player) = self.players.remove(&index) {
                    player.teardown();
                }
            }
        }
    }

    fn start_animation(&mut self, index: usize) {
        let Some(gloss) = self.timeline.get(index).map(|s| s.gloss.clone()) else {
            return;
        };
        let Some(player) = self.player_for(index) else {
            debug!("Segment {} has no surface, skipping animation", index);
            return;
        };

        match self.cache.lookup(&gloss) {
            Lookup::Ready(payload) => {
                debug!("Playing cached {} animation for {:?}", payload.tier(), gloss);
                player.load(payload);
                player.play();
            }
            Lookup::Pending(pending) => {
                // Re-entered before the earlier resolution landed: it will start playback
                if self.resolving.get(&index).is_some_and(|task| !task.is_finished()) {
                    return;
                }
                player.show_loading(&gloss);
                if let Some(task) = self.spawn_resolution(index, pending, player) {
                    self.resolving.insert(index, task);
                }
            }
        }
    }

    fn player_for(&mut self, index: usize) -> Option<PlaybackScheduler> {
        if let Some(player) = self.players.get(&index) {
            return Some(player.clone());
        }
        let surface = self.host.surface(index)?;
        let player = PlaybackScheduler::new(
            surface,
            PoseRenderer::new(self.style),
            self.config.animation_speed_default,
        );
        self.players.insert(index, player.clone());
        Some(player)
    }

    fn spawn_resolution(
        &self,
        index: usize,
        pending: PendingFetch,
        player: PlaybackScheduler,
    ) -> Option<JoinHandle<()>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, {:?} stays on its placeholder", pending.gloss());
            return None;
        };

        let playing = Arc::clone(&self.playing);
        Some(runtime.spawn(async move {
            let gloss = pending.gloss().to_string();
            let payload = match pending.wait().await {
                Ok(payload) => payload,
                Err(err) => Arc::new(AnimationPayload::error(err.short_reason())),
            };

            // Held across load so a segment change cannot interleave
            let active = playing.lock();
            player.load(payload);
            if *active == Some(index) {
                player.play();
            } else {
                debug!("Segment for {:?} no longer active, loaded paused", gloss);
            }
        }))
    }

    fn cancel_resolutions(&mut self) {
        for (_, task) in self.resolving.drain() {
            task.abort();
        }
    }

    fn teardown_players(&mut self) {
        for (_, player) in self.players.drain() {
            player.teardown();
        }
    }
}

impl Drop for CaptionSynchronizer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::CaptionSegment;
    use glossa_transport::LexiconProvider;
    use glossa_visual::RecordingSurface;

    #[derive(Default)]
    struct TestHost {
        styles: Mutex<HashMap<usize, SegmentStyle>>,
        surfaces: Mutex<HashMap<usize, Arc<Mutex<RecordingSurface>>>>,
    }

    impl TestHost {
        fn style(&self, index: usize) -> Option<SegmentStyle> {
            self.styles.lock().get(&index).copied()
        }
    }

    impl SegmentHost for TestHost {
        fn set_segment_style(&self, index: usize, style: SegmentStyle) {
            self.styles.lock().insert(index, style);
        }

        fn surface(&self, index: usize) -> Option<SharedSurface> {
            let mut surfaces = self.surfaces.lock();
            let surface = surfaces
                .entry(index)
                .or_insert_with(|| RecordingSurface::shared(200.0, 200.0));
            Some(surface.clone())
        }
    }

    fn synchronizer(config: EngineConfig) -> (CaptionSynchronizer, Arc<TestHost>) {
        let host = Arc::new(TestHost::default());
        let cache = AnimationCache::new(Arc::new(LexiconProvider::new()));
        let mut sync = CaptionSynchronizer::new(config, cache, host.clone());
        sync.set_timeline(
            Timeline::new(vec![
                CaptionSegment::new(0.0, 2.0, "HELLO", "Hello"),
                CaptionSegment::new(2.0, 4.0, "YES", "Yes"),
                CaptionSegment::new(5.0, 6.0, "PLEASE", "Please"),
            ])
            .unwrap(),
        );
        (sync, host)
    }

    fn at(secs: f64) -> MediaTime {
        MediaTime::from_secs_f64(secs)
    }

    #[tokio::test]
    async fn test_enter_continue_leave() {
        let (mut sync, _) = synchronizer(EngineConfig::default());

        assert_eq!(sync.on_time_update(at(0.5)), SyncOutcome::Entered(0));
        assert_eq!(sync.on_time_update(at(1.5)), SyncOutcome::Continued(0));
        // Shared boundary: first listed match wins
        assert_eq!(sync.on_time_update(at(2.0)), SyncOutcome::Continued(0));
        assert_eq!(sync.on_time_update(at(2.5)), SyncOutcome::Entered(1));
        assert_eq!(sync.on_time_update(at(4.5)), SyncOutcome::Left);
        assert_eq!(sync.on_time_update(at(4.7)), SyncOutcome::Idle);
        assert_eq!(sync.active_index(), None);
    }

    #[tokio::test]
    async fn test_styles_without_show_all() {
        let (mut sync, host) = synchronizer(EngineConfig::default());
        assert_eq!(host.style(0), Some(SegmentStyle::Hidden));

        sync.on_time_update(at(1.0));
        sync.on_time_update(at(3.0));
        assert_eq!(host.style(0), Some(SegmentStyle::Hidden));
        assert_eq!(host.style(1), Some(SegmentStyle::Active));

        sync.on_time_update(at(4.5));
        assert_eq!(host.style(1), Some(SegmentStyle::Inactive));
        assert_eq!(host.style(2), Some(SegmentStyle::Hidden));
        assert!(sync.player(0).is_none());
        assert!(!sync.player(1).unwrap().snapshot().is_playing());
    }

    #[tokio::test]
    async fn test_styles_with_show_all() {
        let config = EngineConfig {
            show_all_captions: true,
            ..EngineConfig::default()
        };
        let (mut sync, host) = synchronizer(config);
        assert_eq!(host.style(2), Some(SegmentStyle::Inactive));

        sync.on_time_update(at(1.0));
        sync.on_time_update(at(3.0));

        assert_eq!(host.style(0), Some(SegmentStyle::Inactive));
        assert_eq!(host.style(1), Some(SegmentStyle::Active));
        assert_eq!(sync.player_count(), 2);
        assert!(!sync.player(0).unwrap().snapshot().is_playing());
    }

    #[tokio::test]
    async fn test_show_avatar_off_still_styles() {
        let config = EngineConfig {
            show_avatar: false,
            ..EngineConfig::default()
        };
        let (mut sync, host) = synchronizer(config);

        assert_eq!(sync.on_time_update(at(1.0)), SyncOutcome::Entered(0));

        assert_eq!(host.style(0), Some(SegmentStyle::Active));
        assert_eq!(sync.player_count(), 0);
        assert_eq!(sync.cache().stats().misses, 0);
        assert!(host.surfaces.lock().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_tears_down() {
        let (mut sync, host) = synchronizer(EngineConfig::default());
        sync.on_time_update(at(1.0));
        let player = sync.player(0).unwrap();

        sync.apply_config(EngineConfig {
            active: false,
            ..EngineConfig::default()
        });

        assert!(player.is_disposed());
        assert_eq!(sync.player_count(), 0);
        assert_eq!(host.style(0), Some(SegmentStyle::Hidden));
        assert_eq!(sync.on_time_update(at(1.0)), SyncOutcome::Idle);
    }

    #[tokio::test]
    async fn test_invalid_time_is_ignored() {
        let (mut sync, _) = synchronizer(EngineConfig::default());
        sync.on_time_update(at(1.0));

        assert_eq!(sync.on_time_update(at(f64::NAN)), SyncOutcome::Idle);
        assert_eq!(sync.active_index(), Some(0));
    }
}
