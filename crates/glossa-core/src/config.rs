//! Engine configuration
//!
//! Threaded explicitly into the synchronizer and renderer; nothing reads it
//! from global state.

use serde::{Deserialize, Serialize};

use crate::PlaybackSpeed;

/// Reference avatar size; marker sizes scale relative to it
pub const DEFAULT_AVATAR_SIZE: u32 = 200;

/// Engine configuration (rendering cosmetics + caption visibility)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Is the engine reacting to video time at all?
    pub active: bool,
    /// Draw avatar animations (captions are styled either way)
    pub show_avatar: bool,
    /// Avatar size in pixels
    pub avatar_size: u32,
    /// Use the high-contrast palette
    pub high_contrast: bool,
    /// Keep every caption segment visible with inactive styling
    pub show_all_captions: bool,
    /// Playback speed of every animation instance
    pub animation_speed_default: PlaybackSpeed,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            active: true,
            show_avatar: true,
            avatar_size: DEFAULT_AVATAR_SIZE,
            high_contrast: false,
            show_all_captions: false,
            animation_speed_default: PlaybackSpeed::Normal,
        }
    }
}

impl EngineConfig {
    /// Marker scale relative to the reference avatar size
    pub fn marker_scale(&self) -> f32 {
        if self.avatar_size == 0 {
            return 1.0;
        }
        self.avatar_size as f32 / DEFAULT_AVATAR_SIZE as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"highContrast": true, "animationSpeedDefault": 2.0}"#)
                .unwrap();

        assert!(config.high_contrast);
        assert_eq!(config.animation_speed_default, PlaybackSpeed::Double);
        assert!(config.active);
        assert_eq!(config.avatar_size, DEFAULT_AVATAR_SIZE);
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let result = serde_json::from_str::<EngineConfig>(r#"{"animationSpeedDefault": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_marker_scale() {
        let mut config = EngineConfig::default();
        assert!((config.marker_scale() - 1.0).abs() < f32::EPSILON);

        config.avatar_size = 400;
        assert!((config.marker_scale() - 2.0).abs() < f32::EPSILON);

        config.avatar_size = 0;
        assert!((config.marker_scale() - 1.0).abs() < f32::EPSILON);
    }
}
