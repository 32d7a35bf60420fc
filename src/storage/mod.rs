//! Storage - Flow Storage Contract and Implementations
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FlowStorage Trait                        │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                     ↑                      ↑
//!          │                     │                      │
//! ┌────────┴────────┐  ┌─────────┴────────┐  ┌──────────┴────────┐
//! │ SimFlowStorage  │  │ DisabledStorage  │  │ remote drivers    │
//! │   (testing)     │  │ (storage off)    │  │ (registered)      │
//! └─────────────────┘  └──────────────────┘  └───────────────────┘
//! ```
//!
//! Remote engines (document stores, graph databases) live outside this
//! crate and plug in through [`crate::selector::StorageDriver`].

mod backend;
mod disabled;
mod error;
mod sim;

pub use backend::FlowStorage;
pub use disabled::DisabledStorage;
pub use error::{StorageError, StorageResult};
pub use sim::SimFlowStorage;
