//! Logging configuration and initialization.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ConfigSource;
use crate::constants::{CONFIG_LOGGING_FORMAT_KEY, CONFIG_LOGGING_LEVEL_KEY};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Read `logging.level` and `logging.format`, falling back to defaults.
    #[must_use]
    pub fn from_config(config: &dyn ConfigSource) -> Self {
        let defaults = Self::default();
        Self {
            level: config
                .get_string(CONFIG_LOGGING_LEVEL_KEY)
                .unwrap_or(defaults.level),
            format: config
                .get_string(CONFIG_LOGGING_FORMAT_KEY)
                .unwrap_or(defaults.format),
        }
    }

    /// Override the level, e.g. from a `-v` flag.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let result = match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).try_init(),
            _ => fmt().with_env_filter(filter).try_init(),
        };
        if result.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_from_config_defaults() {
        let logging = LoggingConfig::from_config(&Config::new());
        assert_eq!(logging, LoggingConfig::default());
    }

    #[test]
    fn test_from_config_values() {
        let config = Config::new()
            .with("logging.level", "debug")
            .with("logging.format", "json");
        let logging = LoggingConfig::from_config(&config);
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let logging = LoggingConfig::default().with_level("warn");
        logging.init();
        logging.init();
    }
}
