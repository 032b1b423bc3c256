//! Playback state of one animation instance

use glossa_core::PlaybackSpeed;

/// Scheduler state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Frame counter, status and speed of one animation instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    pub frame_index: u32,
    pub status: PlaybackStatus,
    pub speed: PlaybackSpeed,
}

impl PlaybackState {
    pub fn new(speed: PlaybackSpeed) -> Self {
        PlaybackState {
            frame_index: 0,
            status: PlaybackStatus::Stopped,
            speed,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Step to the next frame, wrapping at `frame_count`
    #[inline]
    pub fn advance(&mut self, frame_count: u32) {
        if frame_count == 0 {
            return;
        }
        self.frame_index = (self.frame_index + 1) % frame_count;
    }

    /// Back to frame 0, stopped
    pub fn rewind(&mut self) {
        self.frame_index = 0;
        self.status = PlaybackStatus::Stopped;
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(PlaybackSpeed::Normal)
    }
}
