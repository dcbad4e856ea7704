//! In-memory store (process lifetime only)
//!
//! Holds both class mappings behind a single `RwLock`. Readers share the
//! lock and only hold it long enough to clone; writers take it exclusively
//! for one insert.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use super::backend::{FleetSnapshot, StatsStore};
use crate::{EndpointClass, StatsSample};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<FleetSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn put(&self, class: EndpointClass, name: String, sample: StatsSample) {
        let mut inner = self.inner.write().await;
        trace!("storing {class} sample for {name}");
        inner.class_mut(class).insert(name, sample);
    }

    async fn get(&self, class: EndpointClass, name: &str) -> Option<StatsSample> {
        let inner = self.inner.read().await;
        inner.class(class).get(name).cloned()
    }

    async fn snapshot(&self) -> FleetSnapshot {
        self.inner.read().await.clone()
    }

    async fn is_populated(&self) -> bool {
        !self.inner.read().await.is_empty()
    }
}
