//! Last-known-value cache for fleet samples
//!
//! ## Design
//!
//! - **Trait-based**: `StatsStore` lets the collector and query server share
//!   any implementation, and tests substitute their own
//! - **Async**: all operations are async so the lock never blocks a runtime
//!   thread
//! - **No eviction**: entries live until overwritten by the same name
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use fleetstats::{EndpointClass, StatsSample};
//! use fleetstats::storage::{MemoryStore, StatsStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
//! store.put(EndpointClass::Uploader, "u1".into(), StatsSample::new(5, 500)).await;
//! assert!(store.is_populated().await);
//! # }
//! ```

pub mod backend;
pub mod memory;

pub use backend::{FleetSnapshot, StatsStore};
pub use memory::MemoryStore;
