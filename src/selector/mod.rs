//! Selector - Backend Name to Live Storage
//!
//! TigerStyle: Stateless, fail-fast selection at startup.
//!
//! # Flow
//!
//! ```text
//! backend name ──► storage.<name>.driver ──┬─ "memory"    ──► Selection::Disabled
//!                                          ├─ registered  ──► driver.connect()
//!                                          │                    ├─ Ok  ──► Selection::Active
//!                                          │                    └─ Err ──► SelectError::Connect
//!                                          └─ otherwise   ──► SelectError::UnsupportedDriver
//! ```
//!
//! Nothing is cached between calls. Each successful selection hands the
//! caller a fresh handle, and nothing is retried.

mod error;
mod registry;
mod sim;

use std::fmt;
use std::sync::Arc;

pub use error::{RegistryError, SelectError};
pub use registry::{DriverContext, DriverRegistry, StorageDriver};
pub use sim::SimDriver;

use crate::config::ConfigSource;
use crate::constants::{
    CONFIG_DRIVER_SUFFIX, CONFIG_FLOW_BACKEND_KEY, CONFIG_STORAGE_PREFIX, DRIVER_MEMORY,
};
use crate::coordination::CoordinationClient;
use crate::storage::{DisabledStorage, FlowStorage};

// =============================================================================
// Selection
// =============================================================================

/// Successful outcome of a selection.
pub enum Selection {
    /// A constructed storage, ready for `start()`
    Active {
        /// Backend identity
        backend: String,
        /// The live handle, owned by the caller
        storage: Box<dyn FlowStorage>,
    },
    /// Driver is `memory`: flow storage is intentionally off
    Disabled {
        /// Backend identity
        backend: String,
    },
}

impl Selection {
    /// Backend identity this outcome is for.
    #[must_use]
    pub fn backend(&self) -> &str {
        match self {
            Self::Active { backend, .. } | Self::Disabled { backend } => backend,
        }
    }

    /// True if storage is intentionally off.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled { .. })
    }

    /// The live handle, or `None` when disabled.
    #[must_use]
    pub fn into_storage(self) -> Option<Box<dyn FlowStorage>> {
        match self {
            Self::Active { storage, .. } => Some(storage),
            Self::Disabled { .. } => None,
        }
    }

    /// The live handle, or a [`DisabledStorage`] whose operations fail with
    /// the "no storage backend configured" sentinel.
    #[must_use]
    pub fn into_storage_or_disabled(self) -> Box<dyn FlowStorage> {
        self.into_storage().unwrap_or_else(|| Box::new(DisabledStorage))
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active { backend, .. } => f
                .debug_struct("Active")
                .field("backend", backend)
                .finish_non_exhaustive(),
            Self::Disabled { backend } => {
                f.debug_struct("Disabled").field("backend", backend).finish()
            }
        }
    }
}

// =============================================================================
// DriverResolution
// =============================================================================

/// What a backend's driver setting resolves to, without connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverResolution {
    /// Driver is `memory`
    Disabled {
        /// Backend identity
        backend: String,
    },
    /// Driver kind has a registered driver
    Registered {
        /// Backend identity
        backend: String,
        /// Driver kind from configuration
        driver: String,
        /// Engine family of the registered driver
        family: String,
    },
    /// Driver kind is empty or unknown
    Unsupported {
        /// Backend identity
        backend: String,
        /// Driver kind from configuration
        driver: String,
    },
}

impl DriverResolution {
    /// Backend identity this resolution is for.
    #[must_use]
    pub fn backend(&self) -> &str {
        match self {
            Self::Disabled { backend }
            | Self::Registered { backend, .. }
            | Self::Unsupported { backend, .. } => backend,
        }
    }

    /// Driver kind as configured (`memory` when disabled).
    #[must_use]
    pub fn driver(&self) -> &str {
        match self {
            Self::Disabled { .. } => DRIVER_MEMORY,
            Self::Registered { driver, .. } | Self::Unsupported { driver, .. } => driver,
        }
    }
}

// =============================================================================
// StorageSelector
// =============================================================================

/// Resolves backend identities to live storage handles.
///
/// Holds only immutable collaborators, so one selector can serve
/// concurrent selections for distinct backends.
#[derive(Clone)]
pub struct StorageSelector {
    config: Arc<dyn ConfigSource>,
    registry: DriverRegistry,
    coordination: Option<Arc<dyn CoordinationClient>>,
}

impl StorageSelector {
    /// Create a selector over a configuration and a driver registry.
    #[must_use]
    pub fn new(config: Arc<dyn ConfigSource>, registry: DriverRegistry) -> Self {
        Self {
            config,
            registry,
            coordination: None,
        }
    }

    /// Share a coordination client with drivers.
    #[must_use]
    pub fn with_coordination(mut self, client: Arc<dyn CoordinationClient>) -> Self {
        self.coordination = Some(client);
        self
    }

    /// Registered drivers.
    #[must_use]
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Configuration key holding a backend's driver kind.
    #[must_use]
    pub fn driver_key(backend: &str) -> String {
        format!("{CONFIG_STORAGE_PREFIX}.{backend}.{CONFIG_DRIVER_SUFFIX}")
    }

    /// Configured driver kind of a backend, empty if unset.
    #[must_use]
    pub fn driver_kind(&self, backend: &str) -> String {
        self.config
            .get_string(&Self::driver_key(backend))
            .unwrap_or_default()
    }

    /// Backend named by `analyzer.flow.backend`, empty if unset.
    #[must_use]
    pub fn default_backend(&self) -> String {
        self.config
            .get_string(CONFIG_FLOW_BACKEND_KEY)
            .unwrap_or_default()
    }

    /// Classify a backend's driver without connecting.
    #[must_use]
    pub fn resolve_driver(&self, backend: &str) -> DriverResolution {
        let driver = self.driver_kind(backend);
        let backend = backend.to_string();

        if driver == DRIVER_MEMORY {
            return DriverResolution::Disabled { backend };
        }
        match self.registry.get(&driver) {
            Some(registered) => DriverResolution::Registered {
                backend,
                family: registered.family().to_string(),
                driver,
            },
            None => DriverResolution::Unsupported { backend, driver },
        }
    }

    /// Build the storage configured for a backend.
    ///
    /// # Errors
    /// [`SelectError::UnsupportedDriver`] when the driver kind is empty or
    /// unknown, [`SelectError::Connect`] when the driver fails.
    pub async fn select(&self, backend: &str) -> Result<Selection, SelectError> {
        let driver_kind = self.driver_kind(backend);

        if driver_kind == DRIVER_MEMORY {
            tracing::debug!(backend, "flow storage disabled");
            return Ok(Selection::Disabled {
                backend: backend.to_string(),
            });
        }

        let Some(driver) = self.registry.get(&driver_kind) else {
            tracing::warn!(backend, driver = %driver_kind, "unsupported flow backend driver");
            return Err(SelectError::UnsupportedDriver {
                driver: driver_kind,
                backend: backend.to_string(),
            });
        };

        let ctx = DriverContext::new(backend, self.config.as_ref(), self.coordination.as_ref());
        let storage = driver.connect(ctx).await.map_err(|source| {
            tracing::warn!(backend, family = driver.family(), error = %source, "storage driver failed");
            SelectError::Connect {
                family: driver.family().to_string(),
                backend: backend.to_string(),
                source,
            }
        })?;

        tracing::info!("Using {} as storage", backend);
        Ok(Selection::Active {
            backend: backend.to_string(),
            storage,
        })
    }

    /// Build the storage of the backend named by `analyzer.flow.backend`.
    ///
    /// # Errors
    /// Same as [`StorageSelector::select`].
    pub async fn select_default(&self) -> Result<Selection, SelectError> {
        self.select(&self.default_backend()).await
    }
}

impl fmt::Debug for StorageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSelector")
            .field("registry", &self.registry)
            .field("coordination", &self.coordination)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dst::SimConfig;
    use crate::storage::StorageError;

    fn registry() -> DriverRegistry {
        DriverRegistry::new()
            .with_driver("orientdb", Arc::new(SimDriver::new("OrientDB", SimConfig::with_seed(1))))
            .unwrap()
    }

    fn selector(config: Config) -> StorageSelector {
        StorageSelector::new(Arc::new(config), registry())
    }

    #[test]
    fn test_driver_key() {
        assert_eq!(StorageSelector::driver_key("es1"), "storage.es1.driver");
    }

    #[test]
    fn test_resolve_driver() {
        let selector = selector(
            Config::new()
                .with("storage.none1.driver", "memory")
                .with("storage.graph1.driver", "orientdb")
                .with("storage.bad1.driver", "mongodb"),
        );

        assert_eq!(
            selector.resolve_driver("none1"),
            DriverResolution::Disabled {
                backend: "none1".to_string()
            }
        );
        assert_eq!(
            selector.resolve_driver("graph1"),
            DriverResolution::Registered {
                backend: "graph1".to_string(),
                driver: "orientdb".to_string(),
                family: "OrientDB".to_string(),
            }
        );
        assert_eq!(selector.resolve_driver("bad1").driver(), "mongodb");
        assert_eq!(selector.resolve_driver("unset").driver(), "");
    }

    #[tokio::test]
    async fn test_missing_driver_is_unsupported() {
        let err = selector(Config::new()).select("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            SelectError::UnsupportedDriver { ref driver, ref backend } if driver.is_empty() && backend == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_disabled_selection_yields_sentinel_handle() {
        let selection = selector(Config::new().with("storage.none1.driver", "memory"))
            .select("none1")
            .await
            .unwrap();
        assert!(selection.is_disabled());
        assert_eq!(selection.backend(), "none1");

        let storage = selection.into_storage_or_disabled();
        let err = storage.store_flows(&[]).await.unwrap_err();
        assert_eq!(err, StorageError::NoStorageConfigured);
    }

    #[tokio::test]
    async fn test_select_default_uses_flow_backend_key() {
        let selector = selector(
            Config::new()
                .with("analyzer.flow.backend", "graph1")
                .with("storage.graph1.driver", "orientdb"),
        );

        let selection = selector.select_default().await.unwrap();
        assert_eq!(selection.backend(), "graph1");
        assert!(selection.into_storage().is_some());
    }

    #[tokio::test]
    async fn test_each_selection_is_independent() {
        let selector = selector(Config::new().with("storage.graph1.driver", "orientdb"));

        let first = selector.select("graph1").await.unwrap().into_storage().unwrap();
        let second = selector.select("graph1").await.unwrap().into_storage().unwrap();
        first.start().await;
        second.start().await;

        let flow = crate::flow::Flow::new("node", "Ethernet");
        first.store_flows(&[flow]).await.unwrap();

        let seen = second
            .search_flows(&crate::filters::SearchQuery::all())
            .await
            .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn test_selection_debug_hides_handle() {
        let selection = Selection::Disabled {
            backend: "none1".to_string(),
        };
        assert_eq!(format!("{selection:?}"), "Disabled { backend: \"none1\" }");
    }
}
