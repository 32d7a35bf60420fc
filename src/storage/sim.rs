//! `SimFlowStorage` - In-Memory Flow Storage for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! Keeps the latest version of each flow, the history of its update
//! metrics and every raw packet it carried. Searches evaluate filters
//! directly instead of translating them into a query language.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::FlowStorage;
use super::error::{StorageError, StorageResult};
use crate::constants::{SEARCH_RESULTS_COUNT_MAX, STORE_BATCH_COUNT_MAX};
use crate::dst::{DeterministicRng, FaultConfig, FaultInjector, FaultType, SimConfig};
use crate::filters::{Filter, Getter, SearchQuery};
use crate::flow::{Flow, FlowMetric, FlowSet, MetricsByFlow, RawPackets, RawPacketsByFlow};

/// Default sort field when a query asks for sorting without naming one
const SORT_FIELD_DEFAULT: &str = "Last";

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Default)]
struct SimState {
    /// Latest version of each flow, by UUID
    flows: HashMap<String, Flow>,
    /// Update metrics of each flow in arrival order
    metrics: HashMap<String, Vec<FlowMetric>>,
    /// Raw packets of each flow in arrival order
    packets: HashMap<String, RawPackets>,
}

impl SimState {
    /// Flows matching the query filter, deduplicated, sorted and paginated.
    fn matching_flows(&self, query: &SearchQuery) -> Vec<Flow> {
        let mut flows: Vec<&Flow> = self.flows.values().filter(|f| query.matches(*f)).collect();

        // Stable base order so results never depend on hash order
        flows.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.uuid.cmp(&b.uuid)));

        if query.dedup {
            let mut seen: HashSet<String> = HashSet::new();
            flows.retain(|f| f.tracking_id.is_empty() || seen.insert(f.tracking_id.clone()));
        }

        if query.sort {
            let field = if query.sort_by.is_empty() {
                SORT_FIELD_DEFAULT
            } else {
                query.sort_by.as_str()
            };
            flows.sort_by(|a, b| query.sort_order.apply(compare_field(*a, *b, field)));
        }

        let (from, to) = match query.pagination_range {
            Some(range) => (range.from, range.to),
            None => (0, SEARCH_RESULTS_COUNT_MAX),
        };
        let to = to.min(from.saturating_add(SEARCH_RESULTS_COUNT_MAX));

        flows
            .into_iter()
            .skip(from)
            .take(to.saturating_sub(from))
            .cloned()
            .collect()
    }
}

/// Compare two values on one field, integers first, then strings.
fn compare_field(a: &dyn Getter, b: &dyn Getter, field: &str) -> Ordering {
    match (a.get_field_i64(field), b.get_field_i64(field)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.get_field_string(field).cmp(&b.get_field_string(field)),
    }
}

// =============================================================================
// SimFlowStorage
// =============================================================================

/// In-memory flow storage backend for testing.
///
/// `TigerStyle`:
/// - Deterministic via `DeterministicRng`
/// - Fault injection via `FaultInjector`
/// - Thread-safe with `RwLock`
#[derive(Debug, Clone)]
pub struct SimFlowStorage {
    state: Arc<RwLock<SimState>>,
    fault_injector: Arc<FaultInjector>,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl SimFlowStorage {
    /// Create a new `SimFlowStorage` with given config.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        Self::with_fault_injector(Arc::new(FaultInjector::new(rng.fork())))
    }

    /// Create a new `SimFlowStorage` sharing an existing fault injector.
    #[must_use]
    pub fn with_fault_injector(fault_injector: Arc<FaultInjector>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SimState::default())),
            fault_injector,
            started: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add fault configuration.
    ///
    /// # Panics
    /// Panics if the fault injector is already shared.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        Arc::get_mut(&mut self.fault_injector)
            .expect("cannot add faults after storage is shared")
            .register(config);
        self
    }

    /// Get fault injector for inspection.
    #[must_use]
    pub fn fault_injector(&self) -> &Arc<FaultInjector> {
        &self.fault_injector
    }

    /// True between `start()` and `stop()`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started.load(AtomicOrdering::SeqCst) && !self.stopped.load(AtomicOrdering::SeqCst)
    }

    /// Number of distinct flows stored.
    pub async fn flow_count(&self) -> usize {
        self.state.read().await.flows.len()
    }

    fn ensure_running(&self) -> StorageResult<()> {
        if !self.started.load(AtomicOrdering::SeqCst) {
            return Err(StorageError::internal("storage not started"));
        }
        if self.stopped.load(AtomicOrdering::SeqCst) {
            return Err(StorageError::internal("storage stopped"));
        }
        Ok(())
    }

    fn maybe_inject_fault(&self, operation: &str) -> StorageResult<()> {
        let Some(fault_type) = self.fault_injector.should_inject(operation) else {
            return Ok(());
        };
        let message = format!("{fault_type} during {operation}");
        Err(match fault_type {
            FaultType::StorageWriteFail => StorageError::write(message),
            FaultType::StorageReadFail => StorageError::read(message),
            FaultType::DbQueryTimeout => StorageError::query(message),
            FaultType::DbConnectionFail | FaultType::NetworkTimeout => {
                StorageError::simulated_fault(message)
            }
        })
    }
}

#[async_trait]
impl FlowStorage for SimFlowStorage {
    async fn start(&self) {
        if self.started.swap(true, AtomicOrdering::SeqCst) {
            tracing::warn!("sim flow storage started twice");
            return;
        }
        tracing::debug!("sim flow storage started");
    }

    #[tracing::instrument(skip(self, flows), fields(count = flows.len()))]
    async fn store_flows(&self, flows: &[Flow]) -> StorageResult<()> {
        self.ensure_running()?;
        self.maybe_inject_fault("store")?;

        if flows.len() > STORE_BATCH_COUNT_MAX {
            return Err(StorageError::validation(format!(
                "batch of {} flows exceeds max {}",
                flows.len(),
                STORE_BATCH_COUNT_MAX
            )));
        }
        if let Some(flow) = flows.iter().find(|f| f.uuid.is_empty()) {
            return Err(StorageError::validation(format!(
                "flow on node '{}' has no uuid",
                flow.node_tid
            )));
        }

        let mut state = self.state.write().await;
        for flow in flows {
            if let Some(metric) = &flow.last_update_metric {
                state
                    .metrics
                    .entry(flow.uuid.clone())
                    .or_default()
                    .push(metric.clone());
            }

            if !flow.last_raw_packets.is_empty() {
                let packets = state.packets.entry(flow.uuid.clone()).or_default();
                packets.link_type = flow.link_type;
        packets.raw_packets.extend(flow.last_raw_packets.iter().cloned());
            }

            let mut stored = flow.clone();
            stored.last_raw_packets.clear();
            state.flows.insert(flow.uuid.clone(), stored);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, query))]
    async fn search_flows(&self, query: &SearchQuery) -> StorageResult<FlowSet> {
        self.ensure_running()?;
        self.maybe_inject_fault("search_flows")?;

        let state = self.state.read().await;
        Ok(FlowSet {
            flows: state.matching_flows(query),
        })
    }

    #[tracing::instrument(skip(self, query, metric_filter))]
    async fn search_metrics(
        &self,
        query: &SearchQuery,
        metric_filter: Option<&Filter>,
    ) -> StorageResult<MetricsByFlow> {
        self.ensure_running()?;
        self.maybe_inject_fault("search_metrics")?;

        let state = self.state.read().await;
        let mut result = MetricsByFlow::new();
        for flow in state.matching_flows(query) {
            let Some(history) = state.metrics.get(&flow.uuid) else {
                continue;
            };
            let mut metrics: Vec<FlowMetric> = history
                .iter()
                .filter(|m| metric_filter.map_or(true, |f| f.eval(*m)))
                .cloned()
                .collect();
            if metrics.is_empty() {
                continue;
            }
            metrics.sort_by_key(|m| (m.start, m.last));
            result.insert(flow.uuid, metrics);
        }

        Ok(result)
    }

    #[tracing::instrument(skip(self, query, packet_filter))]
    async fn search_raw_packets(
        &self,
        query: &SearchQuery,
        packet_filter: Option<&Filter>,
    ) -> StorageResult<RawPacketsByFlow> {
        self.ensure_running()?;
        self.maybe_inject_fault("search_raw_packets")?;

        let state = self.state.read().await;
        let mut result = RawPacketsByFlow::new();
        for flow in state.matching_flows(query) {
            let Some(stored) = state.packets.get(&flow.uuid) else {
                continue;
            };
            let raw_packets: Vec<_> = stored
                .raw_packets
                .iter()
                .filter(|p| packet_filter.map_or(true, |f| f.eval(*p)))
                .cloned()
                .collect();
            if raw_packets.is_empty() {
                continue;
            }
            result.insert(
                flow.uuid,
                RawPackets {
                    link_type: stored.link_type,
                    raw_packets,
                },
            );
        }

        Ok(result)
    }

    async fn stop(&self) {
        if self.stopped.swap(true, AtomicOrdering::SeqCst) {
            tracing::warn!("sim flow storage stopped twice");
            return;
        }
        let flows = self.state.read().await.flows.len();
        tracing::debug!(flows, "sim flow storage stopped");
    }
}

// =============================================================================
// Tests
// =============================================================================
