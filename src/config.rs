//! Configuration
//!
//! TigerStyle: Flat dotted keys, one lookup shape for every consumer.
//!
//! The selector and the drivers only ever ask for a string by key, such as
//! `storage.es1.driver`. [`Config`] builds that flat view from a TOML file:
//!
//! ```toml
//! [analyzer.flow]
//! backend = "es1"
//!
//! [storage.es1]
//! driver = "elasticsearch"
//! host = "127.0.0.1:9200"
//! ```
//!
//! Environment variables prefixed with `FLOWSTORE_` override file values.
//! The rest of the name is lowercased and `__` separates levels, so
//! `FLOWSTORE_ANALYZER__FLOW__BACKEND=es2` sets `analyzer.flow.backend`.
//! A single `_` is kept: `FLOWSTORE_STORAGE__MY_ES__DRIVER` sets
//! `storage.my_es.driver`. Variables whose name or value is not valid
//! UTF-8 are skipped.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::constants::{CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR};

// =============================================================================
// ConfigSource
// =============================================================================

/// Read-only key-value configuration lookups.
pub trait ConfigSource: Send + Sync {
    /// Get a value by dotted key.
    fn get_string(&self, key: &str) -> Option<String>;

    /// All keys, sorted.
    fn keys(&self) -> Vec<String>;

    /// Get a boolean value. Unparseable values read as `None`.
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get_string(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    /// Get a comma separated list. Empty items are dropped.
    fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_string(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// Config
// =============================================================================

/// In-memory dotted-key configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Parse TOML text into flat dotted keys.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML.
    pub fn parse_toml(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = text.parse()?;
        let mut config = Self::new();
        flatten_table("", &table, &mut config.values);
        Ok(config)
    }

    /// Load a TOML file and apply `FLOWSTORE_*` environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse_toml(&text)?.with_env_overrides(env_vars());
        tracing::debug!(path = %path.display(), keys = config.values.len(), "loaded configuration");
        Ok(config)
    }

    /// Configuration built from `FLOWSTORE_*` process variables only.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().with_env_overrides(env_vars())
    }

    /// Apply overrides from `FLOWSTORE_*` variables.
    #[must_use]
    pub fn with_env_overrides(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(CONFIG_ENV_PREFIX) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let key = rest.to_ascii_lowercase().replace(CONFIG_ENV_SEPARATOR, ".");
            tracing::debug!(%key, "configuration overridden from environment");
            self.values.insert(key, value);
        }
        self
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for Config {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Process variables, skipping any that are not valid UTF-8.
fn env_vars() -> impl Iterator<Item = (String, String)> {
    env::vars_os().filter_map(|(name, value)| {
        Some((name.into_string().ok()?, value.into_string().ok()?))
    })
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&key, inner, out),
            toml::Value::Array(items) => {
                let joined: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
                out.insert(key, joined.join(","));
            }
            scalar => {
                if let Some(text) = scalar_to_string(scalar) {
                    out.insert(key, text);
                }
            }
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
        [analyzer.flow]
        backend = "es1"

        [storage.es1]
        driver = "elasticsearch"
        port = 9200
        bulk = true

        [etcd]
        servers = ["http://10.0.0.1:2379", "http://10.0.0.2:2379"]
    "#;

    #[test]
    fn test_parse_flattens_tables() {
        let config = Config::parse_toml(SAMPLE).unwrap();

        assert_eq!(config.get_string("analyzer.flow.backend").as_deref(), Some("es1"));
        assert_eq!(config.get_string("storage.es1.driver").as_deref(), Some("elasticsearch"));
        assert_eq!(config.get_string("storage.es1.port").as_deref(), Some("9200"));
        assert_eq!(config.get_bool("storage.es1.bulk"), Some(true));
        assert_eq!(config.get_string("storage.es1"), None);
    }

    #[test]
    fn test_arrays_become_lists() {
        let config = Config::parse_toml(SAMPLE).unwrap();
        assert_eq!(
            config.get_string_list("etcd.servers"),
            vec!["http://10.0.0.1:2379", "http://10.0.0.2:2379"]
        );
        assert!(config.get_string_list("etcd.missing").is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::parse_toml(SAMPLE).unwrap().with_env_overrides(vec![
            ("FLOWSTORE_ANALYZER__FLOW__BACKEND".to_string(), "graph1".to_string()),
            ("FLOWSTORE_STORAGE__GRAPH1__DRIVER".to_string(), "orientdb".to_string()),
            ("FLOWSTORE_".to_string(), "ignored".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ]);

        assert_eq!(config.get_string("analyzer.flow.backend").as_deref(), Some("graph1"));
        assert_eq!(config.get_string("storage.graph1.driver").as_deref(), Some("orientdb"));
        assert_eq!(config.get_string("path"), None);
    }

    #[test]
    fn test_env_override_keeps_single_underscore() {
        let config = Config::new().with_env_overrides(vec![(
            "FLOWSTORE_STORAGE__MY_ES__DRIVER".to_string(),
            "elasticsearch".to_string(),
        )]);

        assert_eq!(config.keys(), vec!["storage.my_es.driver"]);
        assert_eq!(config.get_string("storage.my_es.driver").as_deref(), Some("elasticsearch"));
        assert_eq!(config.get_string("storage.my.es.driver"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_skips_non_utf8_environment() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("FLOWSTORE_TEST_BINARY_VALUE", OsStr::from_bytes(&[0xff, 0xfe]));
        env::set_var("FLOWSTORE_STORAGE__UTF8_ES__DRIVER", "orientdb");

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let loaded = Config::load(file.path());
        let from_env = Config::from_env();

        env::remove_var("FLOWSTORE_TEST_BINARY_VALUE");
        env::remove_var("FLOWSTORE_STORAGE__UTF8_ES__DRIVER");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.get_string("storage.es1.driver").as_deref(), Some("elasticsearch"));
        assert_eq!(loaded.get_string("storage.utf8_es.driver").as_deref(), Some("orientdb"));
        assert_eq!(loaded.get_string("test_binary_value"), None);
        assert_eq!(from_env.get_string("storage.utf8_es.driver").as_deref(), Some("orientdb"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse_toml("[storage\ndriver = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.get_string("storage.es1.driver").as_deref(), Some("elasticsearch"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/flowstore.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/flowstore.toml"));
    }

    #[test]
    fn test_get_bool_variants() {
        let config = Config::new()
            .with("a", "yes")
            .with("b", "0")
            .with("c", "maybe");
        assert_eq!(config.get_bool("a"), Some(true));
        assert_eq!(config.get_bool("b"), Some(false));
        assert_eq!(config.get_bool("c"), None);
        assert_eq!(config.get_bool("d"), None);
    }
}
