//! Reduction of a fleet snapshot into the served view

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::storage::FleetSnapshot;
use crate::{StatsSample, StatsTotals, StatsVersions};

/// No sample has been stored yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Requested stats before it was collected")]
pub struct NotReady;

/// Counters summed across the fleet
///
/// Each leaf reports `u64` counters; the sums are kept in `u128` so that no
/// fleet of in-memory samples can overflow them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetTotals {
    #[serde(rename = "numfiles")]
    pub num_files: u128,
    #[serde(rename = "totalsize")]
    pub total_size: u128,
}

impl FleetTotals {
    fn add(&mut self, totals: &StatsTotals) {
        self.num_files += u128::from(totals.num_files);
        self.total_size += u128::from(totals.total_size);
    }
}

/// Fleet-wide totals plus the per-endpoint samples they were computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedView {
    pub uploaders: HashMap<String, StatsSample>,
    pub viewers: HashMap<String, StatsSample>,
    #[serde(rename = "uploadstats")]
    pub upload_stats: FleetTotals,
    #[serde(rename = "versioninfo")]
    pub version_info: StatsVersions,
}

impl AggregatedView {
    /// Sum both class mappings and pick a representative version
    ///
    /// The version comes from the first entry seen, uploaders before viewers.
    /// Within a class the order is whatever the map yields, so a fleet running
    /// mixed versions may report any one of them.
    pub fn from_snapshot(snapshot: FleetSnapshot) -> Result<Self, NotReady> {
        let mut version_info = None;
        let mut totals = FleetTotals::default();

        for (_, _, sample) in snapshot.iter() {
            if version_info.is_none() {
                version_info = Some(sample.version_info.clone());
            }
            totals.add(&sample.upload_stats);
        }

        let version_info = version_info.ok_or(NotReady)?;
        let FleetSnapshot { uploaders, viewers } = snapshot;

        Ok(Self {
            uploaders,
            viewers,
            upload_stats: totals,
            version_info,
        })
    }
}
