//! `SimDriver` - Simulated Engine Driver
//!
//! `TigerStyle`: Stands in for a remote engine under test.
//!
//! Builds [`SimFlowStorage`] handles. Connection failures come from the
//! fault injector (`connect` operation) or from setting
//! `storage.<backend>.unreachable = true`.

use std::sync::Arc;

use async_trait::async_trait;

use super::registry::{DriverContext, StorageDriver};
use crate::dst::{DeterministicRng, FaultConfig, FaultInjector, SimConfig};
use crate::storage::{FlowStorage, SimFlowStorage, StorageError, StorageResult};

/// Driver producing in-memory storage with a chosen engine family name.
#[derive(Debug)]
pub struct SimDriver {
    family: String,
    fault_injector: Arc<FaultInjector>,
}

impl SimDriver {
    /// Create a driver reporting the given engine family.
    #[must_use]
    pub fn new(family: impl Into<String>, config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        Self {
            family: family.into(),
            fault_injector: Arc::new(FaultInjector::new(rng.fork())),
        }
    }

    /// Add fault configuration. Faults apply to connect and to every
    /// storage built afterwards, use an operation filter to narrow them.
    ///
    /// # Panics
    /// Panics if the fault injector is already shared.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        Arc::get_mut(&mut self.fault_injector)
            .expect("cannot add faults after driver is shared")
            .register(config);
        self
    }

    /// Get fault injector for inspection.
    #[must_use]
    pub fn fault_injector(&self) -> &Arc<FaultInjector> {
        &self.fault_injector
    }
}

#[async_trait]
impl StorageDriver for SimDriver {
    fn family(&self) -> &str {
        &self.family
    }

    async fn connect(&self, ctx: DriverContext<'_>) -> StorageResult<Box<dyn FlowStorage>> {
        if ctx.config().get_bool(&ctx.backend_key("unreachable")) == Some(true) {
            return Err(StorageError::connection(format!(
                "no reachable server for backend '{}'",
                ctx.backend()
            )));
        }
        if let Some(fault_type) = self.fault_injector.should_inject("connect") {
            return Err(StorageError::connection(format!("{fault_type} during connect")));
        }

        tracing::debug!(backend = ctx.backend(), family = %self.family, "sim driver connected");
        Ok(Box::new(SimFlowStorage::with_fault_injector(Arc::clone(
            &self.fault_injector,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dst::FaultType;
    use crate::filters::SearchQuery;

    #[tokio::test]
    async fn test_connect_builds_working_storage() {
        let driver = SimDriver::new("OrientDB", SimConfig::with_seed(3));
        let config = Config::new();

        let storage = driver
            .connect(DriverContext::new("graph1", &config, None))
            .await
            .unwrap();
        storage.start().await;
        assert!(storage.search_flows(&SearchQuery::all()).await.unwrap().is_empty());
        storage.stop().await;
    }

    #[tokio::test]
    async fn test_unreachable_setting() {
        let driver = SimDriver::new("ElasticSearch", SimConfig::with_seed(3));
        let config = Config::new().with("storage.es1.unreachable", "true");

        let err = driver
            .connect(DriverContext::new("es1", &config, None))
            .await
            .err()
            .unwrap();
        assert_eq!(
            err,
            StorageError::connection("no reachable server for backend 'es1'")
        );
    }

    #[tokio::test]
    async fn test_connect_fault() {
        let driver = SimDriver::new("ElasticSearch", SimConfig::with_seed(3))
            .with_faults(FaultConfig::new(FaultType::DbConnectionFail, 1.0).with_filter("connect"));
        let config = Config::new();

        let result = driver.connect(DriverContext::new("es1", &config, None)).await;
        assert!(matches!(result, Err(StorageError::Connection { .. })));
        assert_eq!(driver.fault_injector().total_injections(), 1);
    }
}
