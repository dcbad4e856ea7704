//! API shared state

use std::sync::Arc;

use crate::storage::StatsStore;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Store the collector writes into; handlers only ever snapshot it
    pub store: Arc<dyn StatsStore>,
}

impl ApiState {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }
}
