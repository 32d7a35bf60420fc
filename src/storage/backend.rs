//! Flow Storage Trait
//!
//! TigerStyle: One contract for every flow storage engine.
//!
//! # Lifecycle
//!
//! `start()` then any number of stores and searches then `stop()`. Each is
//! called at most once per handle. Calling them out of order is left to the
//! backend.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::filters::{Filter, SearchQuery};
use crate::flow::{Flow, FlowSet, MetricsByFlow, RawPacketsByFlow};

/// Abstract storage backend for network flows.
///
/// TigerStyle: All operations are async, return explicit errors.
///
/// Implementations must be safe to share between independent call sites
/// once started.
#[async_trait]
pub trait FlowStorage: Send + Sync {
    /// Begin accepting work (open connections, start flushers).
    ///
    /// Startup failures are reported by later calls.
    async fn start(&self);

    /// Persist a batch of flows.
    ///
    /// On error the batch is not guaranteed to be persisted, in whole or
    /// in part.
    async fn store_flows(&self, flows: &[Flow]) -> StorageResult<()>;

    /// Get flows matching a query.
    async fn search_flows(&self, query: &SearchQuery) -> StorageResult<FlowSet>;

    /// Get metrics of the flows matching a query, keyed by flow UUID.
    ///
    /// Metrics for one flow are in time order.
    async fn search_metrics(
        &self,
        query: &SearchQuery,
        metric_filter: Option<&Filter>,
    ) -> StorageResult<MetricsByFlow>;

    /// Get raw packets of the flows matching a query, keyed by flow UUID.
    async fn search_raw_packets(
        &self,
        query: &SearchQuery,
        packet_filter: Option<&Filter>,
    ) -> StorageResult<RawPacketsByFlow>;

    /// Release resources and flush pending state.
    ///
    /// Blocks until shutdown is complete. Failures are logged, not returned.
    async fn stop(&self);
}
