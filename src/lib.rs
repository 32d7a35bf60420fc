//! Flowstore - Pluggable Flow Storage
//!
//! One storage contract for network flow records, and a selector that picks
//! the engine behind it from configuration at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               StorageSelector                │
//! │  storage.<backend>.driver → DriverRegistry   │
//! ├─────────────────────────────────────────────┤
//! │  FlowStorage trait      │ start/store/search │
//! │  DisabledStorage        │ driver = memory    │
//! │  SimFlowStorage         │ DST, in-memory     │
//! ├─────────────────────────────────────────────┤
//! │  Config │ Coordination client │ Logging      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use flowstore::config::Config;
//! use flowstore::dst::SimConfig;
//! use flowstore::selector::{DriverRegistry, SimDriver, StorageSelector};
//! use flowstore::storage::FlowStorage;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new()
//!     .with("analyzer.flow.backend", "graph1")
//!     .with("storage.graph1.driver", "orientdb");
//! let registry = DriverRegistry::new()
//!     .with_driver("orientdb", Arc::new(SimDriver::new("OrientDB", SimConfig::with_seed(42))))?;
//!
//! let selector = StorageSelector::new(Arc::new(config), registry);
//! let storage = selector.select_default().await?.into_storage_or_disabled();
//! storage.start().await;
//! storage.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod coordination;
pub mod dst;
pub mod filters;
pub mod flow;
pub mod logging;
pub mod selector;
pub mod storage;

// Re-export common types
pub use config::{Config, ConfigError, ConfigSource};
pub use coordination::{CoordinationClient, StaticCoordinationClient};
pub use filters::{Filter, SearchQuery};
pub use flow::{Flow, FlowMetric, FlowSet, RawPacket, RawPackets};
pub use selector::{
    DriverContext, DriverRegistry, DriverResolution, Selection, SelectError, StorageDriver,
    StorageSelector,
};
pub use storage::{DisabledStorage, FlowStorage, StorageError, StorageResult};
