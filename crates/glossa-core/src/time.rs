//! Media time - the video playback position
//!
//! Caption segments are authored in seconds; the video time source reports
//! its position in seconds. `MediaTime` wraps that position so it cannot be
//! confused with frame counts or wall-clock durations.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Video playback position in seconds
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MediaTime(pub f64);

impl MediaTime {
    pub const ZERO: MediaTime = MediaTime(0.0);

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        MediaTime(secs)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        MediaTime(millis as f64 / 1000.0)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// A NaN or infinite position carries no usable ordering
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite()
    }
}

impl Add<Duration> for MediaTime {
    type Output = MediaTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        MediaTime(self.0 + rhs.as_secs_f64())
    }
}

impl Sub<MediaTime> for MediaTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: MediaTime) -> Self::Output {
        let diff = self.0 - rhs.0;
        if diff.is_finite() && diff > 0.0 {
            Duration::from_secs_f64(diff)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for MediaTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}s)", self.0)
    }
}
