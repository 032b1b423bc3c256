//! Avatar Engine - wires the cache, synchronizer and video clock together

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use glossa_cache::{AnimationCache, CacheStats};
use glossa_core::{EngineConfig, GlossaResult, MediaTime, Timeline};
use glossa_time::PlaybackScheduler;
use glossa_transport::PoseProvider;

use crate::{CaptionSynchronizer, PositionReceiver, RuntimeConfig, SegmentHost, SyncOutcome};

struct EngineInner {
    sync: Mutex<CaptionSynchronizer>,
    cache: AnimationCache,
    video_id: Mutex<Option<String>>,
}

/// Caption-synchronized sign avatar engine
///
/// Cheap to clone; clones drive the same engine.
#[derive(Clone)]
pub struct AvatarEngine {
    inner: Arc<EngineInner>,
}

impl AvatarEngine {
    pub fn new(config: EngineConfig, provider: Arc<dyn PoseProvider>, host: Arc<dyn SegmentHost>) -> Self {
        Self::with_cache(config, AnimationCache::new(provider), host)
    }

    /// Engine over an existing cache
    pub fn with_cache(config: EngineConfig, cache: AnimationCache, host: Arc<dyn SegmentHost>) -> Self {
        let sync = CaptionSynchronizer::new(config, cache.clone(), host);
        AvatarEngine {
            inner: Arc::new(EngineInner {
                sync: Mutex::new(sync),
                cache,
                video_id: Mutex::new(None),
            }),
        }
    }

    /// Engine fetching over HTTP as configured
    pub fn from_config(config: &RuntimeConfig, host: Arc<dyn SegmentHost>) -> GlossaResult<Self> {
        config.validate()?;
        let provider = config.provider.http_provider()?;
        Ok(Self::new(config.engine.clone(), Arc::new(provider), host))
    }

    /// Switch to a video's transcript
    ///
    /// A different video identity starts a new session: live playback is torn
    /// down and the cache cleared before the timeline is replaced.
    pub fn load_video(&self, video_id: &str, timeline: Timeline) {
        let mut sync = self.inner.sync.lock();
        let mut current = self.inner.video_id.lock();

        if current.as_deref() != Some(video_id) {
            info!("Loading video {:?} with {} caption segments", video_id, timeline.len());
            sync.teardown();
            self.inner.cache.clear();
            *current = Some(video_id.to_string());
        } else {
            debug!("Reloading transcript for video {:?}", video_id);
        }
        sync.set_timeline(timeline);
    }

    pub fn apply_config(&self, config: EngineConfig) {
        self.inner.sync.lock().apply_config(config);
    }

    pub fn on_time_update(&self, t: MediaTime) -> SyncOutcome {
        self.inner.sync.lock().on_time_update(t)
    }

    /// Follow a video clock until it is dropped
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, mut positions: PositionReceiver) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            loop {
                let t = *positions.borrow_and_update();
                engine.on_time_update(t);
                if positions.changed().await.is_err() {
                    debug!("Video clock closed, engine loop exiting");
                    break;
                }
            }
        })
    }

    /// Stop all playback; the timeline and cache are kept
    pub fn teardown(&self) {
        self.inner.sync.lock().teardown();
    }

    pub fn cache(&self) -> &AnimationCache {
        &self.inner.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub fn video_id(&self) -> Option<String> {
        self.inner.video_id.lock().clone()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.inner.sync.lock().active_index()
    }

    /// Scheduler of a visible segment
    pub fn player(&self, index: usize) -> Option<PlaybackScheduler> {
        self.inner.sync.lock().player(index)
    }

    pub fn config(&self) -> EngineConfig {
        self.inner.sync.lock().config().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::CaptionSegment;
    use glossa_transport::LexiconProvider;
    use glossa_visual::{RecordingSurface, SharedSurface};
    use std::time::Duration;

    use crate::{SegmentStyle, VideoClock};

    struct SurfaceHost;

    impl SegmentHost for SurfaceHost {
        fn set_segment_style(&self, _index: usize, _style: SegmentStyle) {}

        fn surface(&self, _index: usize) -> Option<SharedSurface> {
            Some(RecordingSurface::shared(100.0, 100.0))
        }
    }

    fn engine() -> AvatarEngine {
        AvatarEngine::new(
            EngineConfig::default(),
            Arc::new(LexiconProvider::new()),
            Arc::new(SurfaceHost),
        )
    }

    fn timeline(gloss: &str) -> Timeline {
        Timeline::new(vec![CaptionSegment::new(1.0, 3.0, gloss, "")]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_video_clears_cache() {
        let engine = engine();
        engine.load_video("a", timeline("HELLO"));
        engine.cache().fetch("HELLO").await.unwrap();

        engine.load_video("a", timeline("HELLO"));
        assert!(engine.cache().contains("HELLO"));

        engine.load_video("b", timeline("HELLO"));
        assert!(engine.cache().is_empty());
        assert_eq!(engine.video_id().as_deref(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_loop_follows_clock() {
        let engine = engine();
        engine.load_video("a", timeline("HELLO"));
        let clock = VideoClock::new();
        let task = engine.spawn(clock.subscribe());

        clock.set_position(MediaTime::from_secs_f64(1.5));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(engine.active_index(), Some(0));
        assert!(engine.player(0).unwrap().snapshot().is_playing());

        clock.set_position(MediaTime::from_secs_f64(3.5));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(engine.active_index(), None);

        drop(clock);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_video_tears_down_players() {
        let engine = engine();
        engine.load_video("a", timeline("HELLO"));
        engine.on_time_update(MediaTime::from_secs_f64(2.0));
        let player = engine.player(0).unwrap();

        engine.load_video("b", timeline("YES"));

        assert!(player.is_disposed());
        assert!(engine.player(0).is_none());
    }
}
