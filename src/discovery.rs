//! Discovery of the live fleet
//!
//! The orchestration platform that owns the worker instances is reached
//! through the `Discovery` trait. Two implementations ship with the crate:
//!
//! - `StaticDiscovery`: a fixed inventory, usually taken from the config file
//! - `FileDiscovery`: an inventory file that is re-read on every call, so an
//!   external process can rewrite it as instances come and go

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

use crate::{Endpoint, EndpointClass};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not read inventory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid inventory {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("discovery source unavailable: {0}")]
    Unavailable(String),
}

/// Source of the current `(name, address)` pairs for a class
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self, class: EndpointClass) -> Result<Vec<Endpoint>, DiscoveryError>;
}

/// A single instance entry in an inventory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceEntry {
    pub name: String,
    pub address: String,
}

/// Instances per class, as found in the config file or an inventory file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub uploaders: Vec<InstanceEntry>,
    #[serde(default)]
    pub viewers: Vec<InstanceEntry>,
}

impl Inventory {
    pub fn endpoints(&self, class: EndpointClass) -> Vec<Endpoint> {
        let entries = match class {
            EndpointClass::Uploader => &self.uploaders,
            EndpointClass::Viewer => &self.viewers,
        };

        entries
            .iter()
            .map(|entry| Endpoint::new(entry.name.clone(), entry.address.clone(), class))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    inventory: Inventory,
}

impl StaticDiscovery {
    pub fn new(inventory: Inventory) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn discover(&self, class: EndpointClass) -> Result<Vec<Endpoint>, DiscoveryError> {
        Ok(self.inventory.endpoints(class))
    }
}

#[derive(Debug, Clone)]
pub struct FileDiscovery {
    path: PathBuf,
}

impl FileDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Inventory, DiscoveryError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DiscoveryError::Io {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&content).map_err(|source| DiscoveryError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl Discovery for FileDiscovery {
    async fn discover(&self, class: EndpointClass) -> Result<Vec<Endpoint>, DiscoveryError> {
        let inventory = self.load().await?;
        let endpoints = inventory.endpoints(class);
        trace!(
            "found {} {class} instances in {}",
            endpoints.len(),
            self.path.display()
        );
        Ok(endpoints)
    }
}
