//! Runtime configuration
//!
//! ```json
//! {
//!   "engine": { "showAllCaptions": true, "animationSpeedDefault": 1.5 },
//!   "provider": { "endpoint": "http://localhost:5000/generate-avatar", "timeout": "5s" },
//!   "logging": { "filter": "glossa=debug", "json": false }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use glossa_core::{EngineConfig, GlossaError, GlossaResult};
use glossa_transport::{HttpPoseProvider, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

use crate::LoggingConfig;

/// Pose data provider settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Pose generation endpoint
    pub endpoint: String,
    /// Request timeout, e.g. `"5s"` or `"750ms"`
    #[serde(deserialize_with = "parse_duration", serialize_with = "format_duration")]
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// HTTP provider for these settings
    pub fn http_provider(&self) -> GlossaResult<HttpPoseProvider> {
        HttpPoseProvider::new(self.endpoint.clone(), self.timeout)
    }
}

/// Everything the runtime needs to start
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> GlossaResult<Self> {
        let config: RuntimeConfig =
            serde_json::from_str(json).map_err(|e| GlossaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> GlossaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| GlossaError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> GlossaResult<()> {
        if self.provider.endpoint.trim().is_empty() {
            return Err(GlossaError::InvalidConfig("provider endpoint is empty".into()));
        }
        if self.provider.timeout.is_zero() {
            return Err(GlossaError::InvalidConfig("provider timeout must be positive".into()));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(GlossaError::InvalidConfig("logging filter is empty".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> GlossaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GlossaError::InvalidConfig(e.to_string()))
    }
}

fn parse_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

fn format_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}
