//! Collector - discovers the fleet and fans out one fetch per endpoint
//!
//! ## Cycle
//!
//! ```text
//! discover(uploader) ─┐
//!                     ├─> fetch_one × N (concurrent) ─> put() per success
//! discover(viewer)  ──┘                 │
//!                                       └─ completion barrier ─> CycleReport
//! ```
//!
//! A class whose discovery fails is skipped for this cycle; the other class
//! still runs. Each endpoint fails independently and keeps its previous
//! sample in the store.

pub mod error;
pub mod fetch;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::discovery::Discovery;
use crate::storage::StatsStore;
use crate::{Endpoint, EndpointClass, StatsSample};

pub use error::CollectError;
pub use fetch::{StatsFetcher, decode_sample};

/// Outcome of one collection cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Endpoints returned by discovery across both classes
    pub discovered: usize,

    /// Samples written to the store
    pub stored: usize,

    /// Endpoints that failed to fetch or decode
    pub failed: usize,

    /// Endpoints rejected because their response looked aggregated
    pub misrouted: usize,

    /// Classes whose discovery failed this cycle
    pub skipped_classes: Vec<EndpointClass>,
}

pub struct Collector {
    discovery: Arc<dyn Discovery>,
    store: Arc<dyn StatsStore>,
    fetcher: StatsFetcher,
}

impl Collector {
    pub fn new(
        discovery: Arc<dyn Discovery>,
        store: Arc<dyn StatsStore>,
        fetcher: StatsFetcher,
    ) -> Self {
        Self {
            discovery,
            store,
            fetcher,
        }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Current endpoints for one class
    pub async fn discover(&self, class: EndpointClass) -> Result<Vec<Endpoint>, CollectError> {
        let endpoints = self.discovery.discover(class).await?;
        debug!("discovered {} {class} endpoints", endpoints.len());
        Ok(endpoints)
    }

    /// Fetch one endpoint and commit the sample on success
    pub async fn collect_one(&self, endpoint: &Endpoint) -> Result<StatsSample, CollectError> {
        info!("about to collect from {}", endpoint.name);

        let sample = self.fetcher.fetch_one(endpoint).await?;
        self.store
            .put(endpoint.class, endpoint.name.clone(), sample.clone())
            .await;

        info!(
            "got {} files on {}",
            sample.upload_stats.num_files, endpoint.name
        );
        Ok(sample)
    }

    /// Fetch every endpoint concurrently and wait for the whole batch
    pub async fn fan_out(&self, endpoints: &[Endpoint]) -> Vec<Result<StatsSample, CollectError>> {
        join_all(endpoints.iter().map(|endpoint| self.collect_one(endpoint))).await
    }

    /// One full discover → fan-out → store pass over both classes
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let mut endpoints = vec![];
        let mut skipped_classes = vec![];

        for class in EndpointClass::ALL {
            match self.discover(class).await {
                Ok(found) => endpoints.extend(found),
                Err(e) => {
                    warn!("skipping {class} collection this cycle: {e}");
                    skipped_classes.push(class);
                }
            }
        }

        let results = self.fan_out(&endpoints).await;

        let mut stored = 0;
        let mut failed = 0;
        let mut misrouted = 0;
        for (endpoint, result) in endpoints.iter().zip(&results) {
            match result {
                Ok(_) => stored += 1,
                Err(e) if e.is_misrouted() => {
                    error!(
                        "rejected stats from {} ({}): {e}; check which service this address belongs to",
                        endpoint.name, endpoint.address
                    );
                    misrouted += 1;
                }
                Err(e) => {
                    warn!("could not collect stats from {}: {e}", endpoint.name);
                    failed += 1;
                }
            }
        }

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            discovered: endpoints.len(),
            stored,
            failed,
            misrouted,
            skipped_classes,
        };

        debug!(
            "cycle finished: {} discovered, {} stored, {} failed, {} misrouted",
            report.discovered, report.stored, report.failed, report.misrouted
        );

        report
    }
}
