//! Video time source

use std::time::Duration;

use tokio::sync::watch;

use glossa_core::MediaTime;

/// Receiving end of a [`VideoClock`]
pub type PositionReceiver = watch::Receiver<MediaTime>;

/// Publishes the video playback position
///
/// Every position change wakes subscribers; intermediate positions may be
/// skipped by a slow subscriber, which only ever sees the latest one.
#[derive(Debug)]
pub struct VideoClock {
    tx: watch::Sender<MediaTime>,
}

impl VideoClock {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(MediaTime::ZERO);
        VideoClock { tx }
    }

    pub fn subscribe(&self) -> PositionReceiver {
        self.tx.subscribe()
    }

    #[inline]
    pub fn position(&self) -> MediaTime {
        *self.tx.borrow()
    }

    /// Publish a new position (seeks included)
    pub fn set_position(&self, t: MediaTime) {
        self.tx.send_replace(t);
    }

    /// Move the position forward by `step`
    pub fn advance(&self, step: Duration) -> MediaTime {
        let next = self.position() + step;
        self.set_position(next);
        next
    }
}

impl Default for VideoClock {
    fn default() -> Self {
        Self::new()
    }
}
