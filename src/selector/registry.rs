//! Driver Registry
//!
//! TigerStyle: Driver kinds map to constructors, filled once at startup.
//!
//! ```rust,ignore
//! let registry = DriverRegistry::new()
//!     .with_driver("elasticsearch", Arc::new(ElasticSearchDriver::default()))?
//!     .with_driver("orientdb", Arc::new(OrientDbDriver::default()))?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::RegistryError;
use crate::config::ConfigSource;
use crate::constants::{CONFIG_STORAGE_PREFIX, DRIVER_MEMORY};
use crate::coordination::CoordinationClient;
use crate::storage::{FlowStorage, StorageResult};

// =============================================================================
// DriverContext
// =============================================================================

/// What a driver gets to build one backend.
#[derive(Clone, Copy)]
pub struct DriverContext<'a> {
    backend: &'a str,
    config: &'a dyn ConfigSource,
    coordination: Option<&'a Arc<dyn CoordinationClient>>,
}

impl<'a> DriverContext<'a> {
    /// Create a context for one backend identity.
    #[must_use]
    pub fn new(
        backend: &'a str,
        config: &'a dyn ConfigSource,
        coordination: Option<&'a Arc<dyn CoordinationClient>>,
    ) -> Self {
        Self {
            backend,
            config,
            coordination,
        }
    }

    /// Backend identity being built.
    #[must_use]
    pub fn backend(&self) -> &'a str {
        self.backend
    }

    /// Shared configuration.
    #[must_use]
    pub fn config(&self) -> &'a dyn ConfigSource {
        self.config
    }

    /// Shared coordination client, if the process has one.
    #[must_use]
    pub fn coordination(&self) -> Option<&'a Arc<dyn CoordinationClient>> {
        self.coordination
    }

    /// Key of a setting in this backend's section, `storage.<backend>.<name>`.
    #[must_use]
    pub fn backend_key(&self, name: &str) -> String {
        format!("{CONFIG_STORAGE_PREFIX}.{}.{name}", self.backend)
    }

    /// Value of a setting in this backend's section.
    #[must_use]
    pub fn backend_value(&self, name: &str) -> Option<String> {
        self.config.get_string(&self.backend_key(name))
    }
}

impl fmt::Debug for DriverContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverContext")
            .field("backend", &self.backend)
            .field("coordination", &self.coordination)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// StorageDriver
// =============================================================================

/// Constructor of one engine family.
///
/// Drivers read whatever extra settings they need through the context,
/// under their backend's section.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Engine family named in connection errors, e.g. `ElasticSearch`.
    fn family(&self) -> &str;

    /// Build a ready-to-start storage for the context's backend.
    async fn connect(&self, ctx: DriverContext<'_>) -> StorageResult<Box<dyn FlowStorage>>;
}

// =============================================================================
// DriverRegistry
// =============================================================================

/// Driver kinds known to the selector.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn StorageDriver>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver for a kind.
    ///
    /// # Errors
    /// Fails for an empty kind, the reserved `memory` kind, or a kind that
    /// already has a driver.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        driver: Arc<dyn StorageDriver>,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(RegistryError::EmptyKind);
        }
        if kind == DRIVER_MEMORY {
            return Err(RegistryError::ReservedKind(kind));
        }
        if self.drivers.contains_key(&kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }

        tracing::debug!(%kind, family = driver.family(), "registered storage driver");
        self.drivers.insert(kind, driver);
        Ok(())
    }

    /// Register a driver, builder style.
    ///
    /// # Errors
    /// Same as [`DriverRegistry::register`].
    pub fn with_driver(
        mut self,
        kind: impl Into<String>,
        driver: Arc<dyn StorageDriver>,
    ) -> Result<Self, RegistryError> {
        self.register(kind, driver)?;
        Ok(self)
    }

    /// Driver registered for a kind.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&Arc<dyn StorageDriver>> {
        self.drivers.get(kind)
    }

    /// True if a driver is registered for the kind.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.drivers.contains_key(kind)
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.drivers.iter().map(|(kind, d)| (kind, d.family())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dst::SimConfig;
    use crate::selector::SimDriver;

    fn sim(family: &str) -> Arc<dyn StorageDriver> {
        Arc::new(SimDriver::new(family, SimConfig::with_seed(1)))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = DriverRegistry::new()
            .with_driver("orientdb", sim("OrientDB"))
            .unwrap()
            .with_driver("elasticsearch", sim("ElasticSearch"))
            .unwrap();

        assert_eq!(registry.kinds(), vec!["elasticsearch", "orientdb"]);
        assert!(registry.contains("orientdb"));
        assert_eq!(registry.get("elasticsearch").unwrap().family(), "ElasticSearch");
        assert!(registry.get("mongodb").is_none());
    }

    #[test]
    fn test_memory_kind_is_reserved() {
        let err = DriverRegistry::new()
            .with_driver("memory", sim("Memory"))
            .unwrap_err();
        assert_eq!(err, RegistryError::ReservedKind("memory".to_string()));
    }

    #[test]
    fn test_empty_and_duplicate_kinds() {
        let mut registry = DriverRegistry::new();
        assert_eq!(registry.register("", sim("X")), Err(RegistryError::EmptyKind));

        registry.register("orientdb", sim("OrientDB")).unwrap();
        assert_eq!(
            registry.register("orientdb", sim("OrientDB")),
            Err(RegistryError::AlreadyRegistered("orientdb".to_string()))
        );
    }

    #[test]
    fn test_context_backend_keys() {
        let config = Config::new().with("storage.es1.host", "10.0.0.1:9200");
        let ctx = DriverContext::new("es1", &config, None);

        assert_eq!(ctx.backend_key("host"), "storage.es1.host");
        assert_eq!(ctx.backend_value("host").as_deref(), Some("10.0.0.1:9200"));
        assert_eq!(ctx.backend_value("port"), None);
        assert!(ctx.coordination().is_none());
    }
}
