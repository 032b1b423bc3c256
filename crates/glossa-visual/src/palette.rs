//! Colors and sizing derived from the engine configuration

use glossa_core::{EngineConfig, Tier};

use crate::Color;

/// Colors used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub landmark: Color,
    pub bone: Color,
    pub trail: Color,
    pub marker: Color,
    pub text: Color,
    pub strip_done: Color,
    pub strip_current: Color,
    pub strip_pending: Color,
    pub progress_track: Color,
    pub progress_fill: Color,
    pub error: Color,
}

impl Palette {
    pub fn standard() -> Self {
        Self {
            background: Color::rgb(17, 17, 17),
            landmark: Color::rgb(255, 255, 255),
            bone: Color::rgb(120, 180, 255),
            trail: Color::rgba(255, 200, 80, 160),
            marker: Color::rgb(80, 220, 160),
            text: Color::rgb(240, 240, 240),
            strip_done: Color::rgb(90, 160, 90),
            strip_current: Color::rgb(255, 200, 80),
            strip_pending: Color::rgb(70, 70, 70),
            progress_track: Color::rgb(50, 50, 50),
            progress_fill: Color::rgb(120, 180, 255),
            error: Color::rgb(230, 80, 80),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            background: Color::rgb(0, 0, 0),
            landmark: Color::rgb(255, 255, 0),
            bone: Color::rgb(255, 255, 255),
            trail: Color::rgb(0, 255, 255),
            marker: Color::rgb(255, 255, 0),
            text: Color::rgb(255, 255, 255),
            strip_done: Color::rgb(255, 255, 255),
            strip_current: Color::rgb(255, 255, 0),
            strip_pending: Color::rgb(90, 90, 90),
            progress_track: Color::rgb(90, 90, 90),
            progress_fill: Color::rgb(255, 255, 0),
            error: Color::rgb(255, 0, 0),
        }
    }

    /// Badge background for a quality tier
    pub fn badge(&self, tier: Tier) -> Color {
        match tier {
            Tier::RealPose => Color::rgb(40, 160, 80),
            Tier::LinguisticApprox => Color::rgb(60, 120, 200),
            Tier::Fingerspelling => Color::rgb(170, 110, 200),
            Tier::Basic => Color::rgb(150, 150, 150),
            Tier::Error => self.error,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Cosmetic rendering options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub palette: Palette,
    /// Multiplier applied to marker and line sizes
    pub marker_scale: f32,
}

impl RenderStyle {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            palette: if config.high_contrast {
                Palette::high_contrast()
            } else {
                Palette::standard()
            },
            marker_scale: config.marker_scale(),
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: Palette::standard(),
            marker_scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_follows_config() {
        let config = EngineConfig {
            high_contrast: true,
            avatar_size: 100,
            ..EngineConfig::default()
        };
        let style = RenderStyle::from_config(&config);

        assert_eq!(style.palette, Palette::high_contrast());
        assert!((style.marker_scale - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_error_badge_uses_error_color() {
        let palette = Palette::standard();
        assert_eq!(palette.badge(Tier::Error), palette.error);
    }
}
