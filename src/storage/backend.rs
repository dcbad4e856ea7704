//! Store trait definition
//!
//! This module defines the `StatsStore` trait and the `FleetSnapshot` value
//! it hands out to readers.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{EndpointClass, StatsSample};

/// Latest known sample per endpoint name, one mapping per class
///
/// Entries are never removed; a name keeps its last successful sample until a
/// newer one replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub uploaders: HashMap<String, StatsSample>,
    pub viewers: HashMap<String, StatsSample>,
}

impl FleetSnapshot {
    pub fn class(&self, class: EndpointClass) -> &HashMap<String, StatsSample> {
        match class {
            EndpointClass::Uploader => &self.uploaders,
            EndpointClass::Viewer => &self.viewers,
        }
    }

    pub fn class_mut(&mut self, class: EndpointClass) -> &mut HashMap<String, StatsSample> {
        match class {
            EndpointClass::Uploader => &mut self.uploaders,
            EndpointClass::Viewer => &mut self.viewers,
        }
    }

    /// True until the first sample has ever been stored
    pub fn is_empty(&self) -> bool {
        self.uploaders.is_empty() && self.viewers.is_empty()
    }

    /// Number of endpoints across both classes
    pub fn len(&self) -> usize {
        self.uploaders.len() + self.viewers.len()
    }

    /// Iterate over every entry, uploaders first
    pub fn iter(&self) -> impl Iterator<Item = (EndpointClass, &String, &StatsSample)> {
        self.uploaders
            .iter()
            .map(|(name, sample)| (EndpointClass::Uploader, name, sample))
            .chain(
                self.viewers
                    .iter()
                    .map(|(name, sample)| (EndpointClass::Viewer, name, sample)),
            )
    }
}

/// Trait for the last-known-value cache shared by the collector and the
/// query server
///
/// ## Thread Safety
///
/// Implementations own their synchronization and must be `Send + Sync` as
/// they are shared between the scheduler task and every request handler.
///
/// ## Consistency
///
/// - `put` replaces a single entry atomically. Writes for different names are
///   independent; there are no cross-key transactions.
/// - `snapshot` returns a copy of both mappings taken under one shared lock,
///   so no entry in it mixes fields of two writes.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Replace the sample stored for `name` in `class`
    async fn put(&self, class: EndpointClass, name: String, sample: StatsSample);

    /// Latest sample for a single endpoint, if one was ever stored
    async fn get(&self, class: EndpointClass, name: &str) -> Option<StatsSample>;

    /// Copy of both class mappings
    async fn snapshot(&self) -> FleetSnapshot;

    /// Whether any sample has ever been stored
    async fn is_populated(&self) -> bool {
        !self.snapshot().await.is_empty()
    }
}
