//! FaultInjector - Probabilistic Fault Injection
//!
//! TigerStyle: Explicit fault injection for chaos testing.

use std::collections::HashMap;
use std::sync::Mutex;

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Types of faults that can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    /// Store operation fails
    StorageWriteFail,
    /// Search operation fails
    StorageReadFail,
    /// Driver cannot reach the database
    DbConnectionFail,
    /// Query timeout
    DbQueryTimeout,
    /// Connection timeout
    NetworkTimeout,
}

impl FaultType {
    /// Get the fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::DbConnectionFail => "db_connection_fail",
            Self::DbQueryTimeout => "db_query_timeout",
            Self::NetworkTimeout => "network_timeout",
        }
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a specific fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        // Precondition
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {}], got {}",
            DST_FAULT_PROBABILITY_MAX,
            probability
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Set operation filter (fault only applies to matching operations).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set maximum number of injections.
    ///
    /// # Panics
    /// Panics if `max` is zero.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }
}

/// Fault injector for simulation testing.
///
/// TigerStyle:
/// - Explicit fault registration
/// - Deterministic through RNG
/// - Interior mutability for sharing via Arc
#[derive(Debug)]
pub struct FaultInjector {
    rng: Mutex<DeterministicRng>,
    configs: Vec<FaultConfig>,
    injection_counts: Mutex<HashMap<FaultType, u64>>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            configs: Vec::new(),
            injection_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fault configuration.
    ///
    /// Registration must happen before sharing via Arc.
    pub fn register(&mut self, config: FaultConfig) {
        self.injection_counts
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(config.fault_type)
            .or_insert(0);
        self.configs.push(config);
    }

    /// Register a fault configuration, builder style.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.register(config);
        self
    }

    /// Check if a fault should be injected for the given operation.
    ///
    /// Returns the fault type if one should be injected, None otherwise.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        let mut counts = self
            .injection_counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for config in &self.configs {
            if let Some(ref filter) = config.operation_filter {
                if !operation.contains(filter.as_str()) {
                    continue;
                }
            }

            let count = counts.entry(config.fault_type).or_insert(0);
            if config.max_injections.is_some_and(|max| *count >= max) {
                continue;
            }

            if rng.next_bool(config.probability) {
                *count += 1;
                tracing::debug!(fault = %config.fault_type, operation, "injecting fault");
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Number of injections of one fault type so far.
    #[must_use]
    pub fn injection_count(&self, fault_type: FaultType) -> u64 {
        self.injection_counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&fault_type)
            .copied()
            .unwrap_or(0)
    }

    /// Get total number of injections.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.injection_counts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_faults_registered() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        assert_eq!(injector.should_inject("store"), None);
        assert_eq!(injector.total_injections(), 0);
    }

    #[test]
    fn test_operation_filter() {
        let injector = FaultInjector::new(DeterministicRng::new(42))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("store"));

        assert_eq!(injector.should_inject("search_flows"), None);
        assert_eq!(
            injector.should_inject("store"),
            Some(FaultType::StorageWriteFail)
        );
    }

    #[test]
    fn test_max_injections() {
        let injector = FaultInjector::new(DeterministicRng::new(42)).with_fault(
            FaultConfig::new(FaultType::DbConnectionFail, 1.0).with_max_injections(2),
        );

        assert!(injector.should_inject("connect").is_some());
        assert!(injector.should_inject("connect").is_some());
        assert!(injector.should_inject("connect").is_none());
        assert_eq!(injector.injection_count(FaultType::DbConnectionFail), 2);
    }

    #[test]
    fn test_same_seed_same_injections() {
        let build = || {
            FaultInjector::new(DeterministicRng::new(99))
                .with_fault(FaultConfig::new(FaultType::StorageReadFail, 0.5))
        };
        let a = build();
        let b = build();

        for _ in 0..50 {
            assert_eq!(a.should_inject("search"), b.should_inject("search"));
        }
    }

    #[test]
    #[should_panic(expected = "probability must be in")]
    fn test_probability_out_of_range() {
        let _ = FaultConfig::new(FaultType::NetworkTimeout, 1.5);
    }
}
