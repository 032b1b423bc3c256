//! Playback speed multipliers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GlossaError;

/// Allowed animation speed multipliers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackSpeed {
    /// All speeds, slowest first
    pub fn all() -> &'static [PlaybackSpeed] {
        &[
            PlaybackSpeed::Half,
            PlaybackSpeed::Normal,
            PlaybackSpeed::OneAndHalf,
            PlaybackSpeed::Double,
        ]
    }

    #[inline]
    pub fn multiplier(self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndHalf => 1.5,
            PlaybackSpeed::Double => 2.0,
        }
    }
}

impl TryFrom<f64> for PlaybackSpeed {
    type Error = GlossaError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PlaybackSpeed::all()
            .iter()
            .copied()
            .find(|speed| (speed.multiplier() - value).abs() < 1e-9)
            .ok_or(GlossaError::InvalidSpeed(value))
    }
}

impl From<PlaybackSpeed> for f64 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.multiplier()
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_accepts_known_multipliers() {
        assert_eq!(PlaybackSpeed::try_from(0.5), Ok(PlaybackSpeed::Half));
        assert_eq!(PlaybackSpeed::try_from(2.0), Ok(PlaybackSpeed::Double));
    }

    #[test]
    fn test_try_from_rejects_other_values() {
        assert_eq!(
            PlaybackSpeed::try_from(3.0),
            Err(GlossaError::InvalidSpeed(3.0))
        );
        assert!(PlaybackSpeed::try_from(0.0).is_err());
    }

    #[test]
    fn test_serde_as_number() {
        let speed: PlaybackSpeed = serde_json::from_str("1.5").unwrap();
        assert_eq!(speed, PlaybackSpeed::OneAndHalf);
        assert_eq!(serde_json::to_string(&speed).unwrap(), "1.5");
        assert!(serde_json::from_str::<PlaybackSpeed>("0.75").is_err());
    }
}
