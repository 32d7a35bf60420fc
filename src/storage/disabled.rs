//! DisabledStorage - Storage Turned Off
//!
//! Stand-in handle for a backend whose driver is `memory`. Every store and
//! search fails with [`StorageError::NoStorageConfigured`].

use async_trait::async_trait;

use super::backend::FlowStorage;
use super::error::{StorageError, StorageResult};
use crate::filters::{Filter, SearchQuery};
use crate::flow::{Flow, FlowSet, MetricsByFlow, RawPacketsByFlow};

/// Handle returned in place of a real backend when storage is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStorage;

#[async_trait]
impl FlowStorage for DisabledStorage {
    async fn start(&self) {}

    async fn store_flows(&self, flows: &[Flow]) -> StorageResult<()> {
        tracing::trace!(count = flows.len(), "dropping flows, storage disabled");
        Err(StorageError::NoStorageConfigured)
    }

    async fn search_flows(&self, _query: &SearchQuery) -> StorageResult<FlowSet> {
        Err(StorageError::NoStorageConfigured)
    }

    async fn search_metrics(
        &self,
        _query: &SearchQuery,
        _metric_filter: Option<&Filter>,
    ) -> StorageResult<MetricsByFlow> {
        Err(StorageError::NoStorageConfigured)
    }

    async fn search_raw_packets(
        &self,
        _query: &SearchQuery,
        _packet_filter: Option<&Filter>,
    ) -> StorageResult<RawPacketsByFlow> {
        Err(StorageError::NoStorageConfigured)
    }

    async fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_operation_returns_sentinel() {
        let storage = DisabledStorage;
        storage.start().await;

        let flows = vec![Flow::new("node-1", "Ethernet")];
        assert_eq!(
            storage.store_flows(&flows).await,
            Err(StorageError::NoStorageConfigured)
        );
        assert_eq!(
            storage.search_flows(&SearchQuery::all()).await,
            Err(StorageError::NoStorageConfigured)
        );
        assert!(storage
            .search_metrics(&SearchQuery::all(), None)
            .await
            .unwrap_err()
            .is_not_configured());
        assert!(storage
            .search_raw_packets(&SearchQuery::all(), None)
            .await
            .unwrap_err()
            .is_not_configured());

        storage.stop().await;
    }

    #[test]
    fn test_usable_as_trait_object_outside_runtime() {
        let storage: Box<dyn FlowStorage> = Box::new(DisabledStorage);
        let err = tokio_test::block_on(storage.search_flows(&SearchQuery::all())).unwrap_err();
        assert_eq!(err.to_string(), "No storage backend has been configured");
    }
}
