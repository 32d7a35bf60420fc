//! DST - Deterministic Simulation Testing
//!
//! Seeded randomness and fault injection for the simulated flow backend.
//!
//! # Usage
//!
//! ```rust
//! use flowstore::dst::{DeterministicRng, FaultConfig, FaultInjector, FaultType};
//!
//! let injector = FaultInjector::new(DeterministicRng::new(42))
//!     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("store"));
//!
//! assert_eq!(injector.should_inject("store"), Some(FaultType::StorageWriteFail));
//! assert_eq!(injector.should_inject("search_flows"), None);
//! ```
//!
//! Run with explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod config;
mod fault;
mod rng;

pub use config::SimConfig;
pub use fault::{FaultConfig, FaultInjector, FaultType};
pub use rng::DeterministicRng;
