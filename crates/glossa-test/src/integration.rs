//! End-to-end Integration Test Suite
//!
//! Drives a full engine (cache, synchronizer, schedulers, renderer) from
//! video time against a scripted provider and recording surfaces:
//! - Caption sweep: one fetch, playback while active, neutral after
//! - Frame loop timing at the payload's frame rate
//! - Error payloads: glyph shown, no frame loop
//! - Repeated glosses served from the cache

use std::sync::Arc;
use std::time::Duration;

use glossa_core::{CaptionSegment, EngineConfig, MediaTime, Timeline};
use glossa_runtime::{AvatarEngine, SyncOutcome};

use crate::{RecordingHost, ScriptedProvider};

// ============================================================================
// HARNESS
// ============================================================================

/// An engine wired to test doubles
pub struct IntegrationHarness {
    pub engine: AvatarEngine,
    pub provider: Arc<ScriptedProvider>,
    pub host: Arc<RecordingHost>,
}

impl IntegrationHarness {
    pub fn new(config: EngineConfig, provider: ScriptedProvider) -> Self {
        let provider = Arc::new(provider);
        let host = Arc::new(RecordingHost::default());
        let engine = AvatarEngine::new(config, provider.clone(), host.clone());
        Self { engine, provider, host }
    }

    /// Harness with default configuration and an instant provider
    pub fn standard() -> Self {
        Self::new(EngineConfig::default(), ScriptedProvider::new())
    }

    /// Load a transcript of `(start, end, gloss)` triples
    pub fn load(&self, video_id: &str, segments: &[(f64, f64, &str)]) {
        let segments = segments
            .iter()
            .map(|(start, end, gloss)| CaptionSegment::new(*start, *end, *gloss, gloss.to_lowercase()))
            .collect();
        match Timeline::new(segments) {
            Ok(timeline) => self.engine.load_video(video_id, timeline),
            Err(err) => panic!("bad test transcript: {err}"),
        }
    }

    pub fn at(&self, secs: f64) -> SyncOutcome {
        self.engine.on_time_update(MediaTime::from_secs_f64(secs))
    }

    /// Play the video from `from` to `to` in real time, one update per `step`
    ///
    /// Returns every outcome other than `Continued` and `Idle`, with its time.
    pub async fn sweep(&self, from: f64, to: f64, step: Duration) -> Vec<(f64, SyncOutcome)> {
        let mut transitions = Vec::new();
        let mut t = from;
        while t <= to {
            let outcome = self.at(t);
            if matches!(outcome, SyncOutcome::Entered(_) | SyncOutcome::Left) {
                transitions.push((t, outcome));
            }
            tokio::time::sleep(step).await;
            t += step.as_secs_f64();
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{real_pose_payload, rendered_frames, settle};
    use glossa_core::{AnimationPayload, GlossaError, PlaybackSpeed, Tier};
    use glossa_runtime::SegmentStyle;
    use glossa_time::PlaybackStatus;

    const STEP: Duration = Duration::from_millis(250);

    #[tokio::test(start_paused = true)]
    async fn test_caption_sweep_fetches_once() {
        let harness = IntegrationHarness::standard();
        harness.load("video", &[(2.0, 5.0, "HELLO")]);

        let transitions = harness.sweep(0.0, 10.0, STEP).await;

        assert_eq!(transitions, vec![(2.0, SyncOutcome::Entered(0)), (5.25, SyncOutcome::Left)]);
        assert_eq!(harness.provider.request_count("HELLO"), 1);
        assert_eq!(harness.host.style(0), Some(SegmentStyle::Inactive));

        let player = harness.engine.player(0).unwrap();
        assert_eq!(player.snapshot().status, PlaybackStatus::Paused);
        assert_eq!(player.payload().unwrap().tier(), Tier::LinguisticApprox);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_shows_loading_then_plays() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_millis(300));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 10.0, "HELLO")]);

        assert_eq!(harness.at(1.0), SyncOutcome::Entered(0));
        let surface = harness.host.recording(0).unwrap();
        assert!(surface.lock().last_frame_texts().contains(&"HELLO"));
        assert!(harness.engine.player(0).unwrap().payload().is_none());

        tokio::time::sleep(Duration::from_millis(400)).await;

        let player = harness.engine.player(0).unwrap();
        assert!(player.snapshot().is_playing());
        assert!(surface.lock().clear_count() > 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_pose_loop_at_declared_rate() {
        let provider = ScriptedProvider::new();
        provider.set_payload("HELLO", real_pose_payload(30, 30.0));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 60.0, "HELLO")]);

        harness.at(1.0);
        settle().await;
        let player = harness.engine.player(0).unwrap();
        assert!(player.snapshot().is_playing());
        let surface = harness.host.recording(0).unwrap();
        surface.lock().take_commands();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        settle().await;

        assert_eq!(player.snapshot().frame_index, 0);
        assert_eq!(rendered_frames(&surface.lock(), 30), (0..30).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_payload_never_starts_loop() {
        let provider = ScriptedProvider::new();
        provider.set_payload("XYZ", AnimationPayload::error("sign not found"));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 10.0, "XYZ")]);

        harness.at(1.0);
        settle().await;
        let surface = harness.host.recording(0).unwrap();
        let frames_drawn = surface.lock().clear_count();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let player = harness.engine.player(0).unwrap();
        assert_eq!(player.snapshot().status, PlaybackStatus::Stopped);
        let surface = surface.lock();
        assert_eq!(surface.clear_count(), frames_drawn);
        assert!(surface.last_frame_texts().contains(&"sign not found"));
        assert!(surface.last_frame_texts().contains(&"ERROR"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_gloss_hits_cache() {
        let harness = IntegrationHarness::standard();
        harness.load("video", &[(1.0, 2.0, "YES"), (5.0, 6.0, "YES")]);

        let transitions = harness.sweep(0.0, 7.0, STEP).await;

        assert_eq!(transitions.len(), 4);
        assert_eq!(harness.provider.request_count("YES"), 1);
        assert_eq!(harness.engine.cache_stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_shows_error_and_retries() {
        let provider = ScriptedProvider::new();
        provider.enqueue("HELLO", Err(GlossaError::fetch("HELLO", "connection refused")));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(1.0, 2.0, "HELLO"), (4.0, 5.0, "HELLO")]);

        harness.at(1.5);
        settle().await;
        let first = harness.host.recording(0).unwrap();
        assert!(first.lock().last_frame_texts().contains(&"connection refused"));

        harness.at(3.0);
        harness.at(4.5);
        settle().await;

        assert_eq!(harness.provider.request_count("HELLO"), 2);
        let player = harness.engine.player(1).unwrap();
        assert!(player.snapshot().is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_change_drops_late_resolution() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_secs(1));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("first", &[(0.0, 10.0, "HELLO")]);

        harness.at(1.0);
        let surface = harness.host.recording(0).unwrap();
        let player = harness.engine.player(0).unwrap();
        let draws = surface.lock().commands().len();

        harness.load("second", &[(0.0, 10.0, "PLEASE")]);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(player.is_disposed());
        assert_eq!(surface.lock().commands().len(), draws);
        assert!(harness.engine.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_before_resolution_replaces_placeholder() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_millis(800));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 0.5, "HELLO")]);

        assert_eq!(harness.at(0.2), SyncOutcome::Entered(0));
        assert_eq!(harness.at(0.7), SyncOutcome::Left);
        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;

        assert_eq!(harness.host.style(0), Some(SegmentStyle::Inactive));
        let player = harness.engine.player(0).unwrap();
        assert_eq!(player.payload().unwrap().tier(), Tier::LinguisticApprox);
        assert!(!player.snapshot().is_playing());
        let surface = harness.host.recording(0).unwrap();
        assert!(!surface.lock().last_frame_texts().contains(&"Loading animation"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentering_while_pending_plays_on_resolution() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_millis(800));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 0.5, "HELLO"), (1.0, 2.0, "HELLO")]);

        harness.at(0.2);
        harness.at(0.7);
        // Same gloss on a new segment resolves through the same fetch
        assert_eq!(harness.at(1.2), SyncOutcome::Entered(1));
        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(harness.provider.request_count("HELLO"), 1);
        assert!(harness.engine.player(1).unwrap().snapshot().is_playing());
        assert!(harness.engine.player(0).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeking_back_into_pending_segment_plays_it() {
        let provider = ScriptedProvider::new().with_delay(Duration::from_millis(800));
        let harness = IntegrationHarness::new(EngineConfig::default(), provider);
        harness.load("video", &[(0.0, 0.5, "HELLO")]);

        harness.at(0.2);
        harness.at(0.7);
        assert_eq!(harness.at(0.3), SyncOutcome::Entered(0));
        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(harness.provider.request_count("HELLO"), 1);
        assert!(harness.engine.player(0).unwrap().snapshot().is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_all_runs_players_independently() {
        let config = EngineConfig {
            show_all_captions: true,
            animation_speed_default: PlaybackSpeed::Double,
            ..EngineConfig::default()
        };
        let harness = IntegrationHarness::new(config, ScriptedProvider::new());
        harness.load("video", &[(0.0, 1.0, "HELLO"), (2.0, 3.0, "YES")]);

        let transitions = harness.sweep(0.0, 2.5, STEP).await;

        assert_eq!(transitions.len(), 3);
        assert_eq!(harness.host.visible(), vec![0, 1]);
        assert_eq!(harness.host.style(1), Some(SegmentStyle::Active));

        let first = harness.engine.player(0).unwrap().snapshot();
        let second = harness.engine.player(1).unwrap().snapshot();
        assert_eq!(first.status, PlaybackStatus::Paused);
        assert!(second.is_playing());
        assert_eq!(second.speed, PlaybackSpeed::Double);
    }

    #[tokio::test(start_paused = true)]
    async fn test_segment_without_surface_still_styles() {
        let harness = IntegrationHarness::standard();
        harness.host.remove_surface(0);
        harness.load("video", &[(0.0, 10.0, "HELLO")]);

        assert_eq!(harness.at(1.0), SyncOutcome::Entered(0));

        assert_eq!(harness.host.style(0), Some(SegmentStyle::Active));
        assert!(harness.engine.player(0).is_none());
        assert_eq!(harness.provider.total_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggling_avatar_restarts_active_segment() {
        let harness = IntegrationHarness::standard();
        harness.load("video", &[(0.0, 10.0, "HELLO")]);
        harness.at(1.0);
        settle().await;

        harness.engine.apply_config(EngineConfig {
            show_avatar: false,
            ..EngineConfig::default()
        });
        assert!(harness.engine.player(0).is_none());
        assert_eq!(harness.host.style(0), Some(SegmentStyle::Active));

        harness.engine.apply_config(EngineConfig::default());
        let player = harness.engine.player(0).unwrap();
        assert!(player.snapshot().is_playing());
        assert_eq!(harness.provider.request_count("HELLO"), 1);
    }
}
