use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

use crate::discovery::{Discovery, FileDiscovery, InstanceEntry, Inventory, StaticDiscovery};

const DEFAULT_INTERVAL_SECS: u64 = 30;

const DEFAULT_TIMEOUT_SECS: u64 = 600;

const DEFAULT_LEAF_PORT: u16 = 8080;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Address the query server listens on
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    #[serde(default)]
    pub collection: CollectionConfig,

    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CollectionConfig {
    /// Seconds between cycles
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Seconds before a single leaf request is abandoned
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Port every leaf serves its stats on
    #[serde(default = "default_leaf_port")]
    pub leaf_port: u16,
}

impl CollectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
            leaf_port: default_leaf_port(),
        }
    }
}

/// Where the fleet inventory comes from
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DiscoveryConfig {
    /// Instances listed inline
    Static {
        #[serde(default)]
        uploaders: Vec<InstanceEntry>,
        #[serde(default)]
        viewers: Vec<InstanceEntry>,
    },

    /// Inventory file re-read on every cycle
    File { path: PathBuf },
}

impl DiscoveryConfig {
    pub fn build(&self) -> Arc<dyn Discovery> {
        match self {
            DiscoveryConfig::Static { uploaders, viewers } => {
                Arc::new(StaticDiscovery::new(Inventory {
                    uploaders: uploaders.clone(),
                    viewers: viewers.clone(),
                }))
            }
            DiscoveryConfig::File { path } => Arc::new(FileDiscovery::new(path.clone())),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_leaf_port() -> u16 {
    DEFAULT_LEAF_PORT
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .context("Invalid configuration file provided!")
        .inspect(|config| trace!("loaded config: {config:?}"))
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("could not read {path}"))?;
    parse_config(&file_content)
}
