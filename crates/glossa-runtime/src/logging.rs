//! Tracing subscriber setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use glossa_core::{GlossaError, GlossaResult};

/// Log output settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` if set, else the configured directive
    pub fn env_filter(&self) -> GlossaResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .map_err(|e| GlossaError::InvalidConfig(format!("log filter {:?}: {}", self.filter, e))),
        }
    }
}

/// Install the global tracing subscriber
///
/// Fails with `InvalidConfig` if the filter does not parse or a subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> GlossaResult<()> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| GlossaError::InvalidConfig(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let config = LoggingConfig {
            filter: "glossa=debug".into(),
            json: true,
        };

        // May already be installed by another test in this binary
        let _ = init_tracing(&config);
        let err = init_tracing(&config).unwrap_err();

        assert!(matches!(err, GlossaError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_filter_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "glossa=notalevel".into(),
            json: false,
        };

        assert!(matches!(config.env_filter(), Err(GlossaError::InvalidConfig(_))));
    }
}
