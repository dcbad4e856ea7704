pub mod actors;
pub mod aggregate;
pub mod api;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod storage;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The two disjoint groups of worker instances in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
    Uploader,
    Viewer,
}

impl EndpointClass {
    pub const ALL: [EndpointClass; 2] = [EndpointClass::Uploader, EndpointClass::Viewer];

    /// Path segment a leaf of this class serves its stats under.
    pub fn stats_path(&self) -> &'static str {
        match self {
            EndpointClass::Uploader => "stats",
            EndpointClass::Viewer => "statsdown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::Uploader => "uploader",
            EndpointClass::Viewer => "viewer",
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A worker instance as reported by discovery for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub address: String,
    pub class: EndpointClass,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>, class: EndpointClass) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            class,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsTotals {
    #[serde(rename = "numfiles")]
    pub num_files: u64,
    #[serde(rename = "totalsize")]
    pub total_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsVersions {
    pub version: String,
    #[serde(rename = "gitrevision")]
    pub git_revision: String,
}

/// One report from a single leaf endpoint.
///
/// Counters are the absolute totals the leaf reported. Every field besides
/// `uploadstats` and `versioninfo` is kept verbatim in `extra` and served back
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSample {
    #[serde(rename = "uploadstats", default)]
    pub upload_stats: StatsTotals,
    #[serde(rename = "versioninfo", default)]
    pub version_info: StatsVersions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatsSample {
    pub fn new(num_files: u64, total_size: u64) -> Self {
        Self {
            upload_stats: StatsTotals {
                num_files,
                total_size,
            },
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>, git_revision: impl Into<String>) -> Self {
        self.version_info = StatsVersions {
            version: version.into(),
            git_revision: git_revision.into(),
        };
        self
    }
}
