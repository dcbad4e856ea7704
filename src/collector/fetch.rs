//! Single-endpoint fetch and decode

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde_json::Value;
use tracing::{instrument, trace};

use super::error::CollectError;
use crate::{Endpoint, StatsSample};

/// Keys that only an aggregated view carries
const AGGREGATE_FIELDS: [&str; 2] = ["uploaders", "viewers"];

/// HTTP client for leaf stats endpoints
///
/// One client is shared by every fetch of every cycle. Requests time out
/// after the duration given at construction.
#[derive(Debug, Clone)]
pub struct StatsFetcher {
    client: reqwest::Client,
    leaf_port: u16,
}

impl StatsFetcher {
    pub fn new(leaf_port: u16, timeout: Duration) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, leaf_port })
    }

    /// Stats URL for an endpoint
    ///
    /// An address that already names a port (`10.0.0.1:9000`) is used as is;
    /// otherwise the leaf port is appended.
    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!(
            "http://{}/{}",
            self.authority(&endpoint.address),
            endpoint.class.stats_path()
        )
    }

    fn authority(&self, address: &str) -> String {
        if address.parse::<SocketAddr>().is_ok() {
            return address.to_string();
        }

        match address.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{ip}]:{}", self.leaf_port),
            _ => format!("{address}:{}", self.leaf_port),
        }
    }

    /// Request, decode and validate one endpoint's stats
    #[instrument(skip_all, fields(endpoint = %endpoint.name, class = %endpoint.class))]
    pub async fn fetch_one(&self, endpoint: &Endpoint) -> Result<StatsSample, CollectError> {
        let url = self.url_for(endpoint);
        trace!("requesting stats from {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CollectError::Status(response.status()));
        }

        let body = response.bytes().await?;
        decode_sample(&body)
    }
}

/// Decode a leaf response body, rejecting bodies that look aggregated
///
/// `uploaders`/`viewers` keys that are `null` or empty objects are dropped;
/// anything else under those keys rejects the whole sample.
pub fn decode_sample(body: &[u8]) -> Result<StatsSample, CollectError> {
    let mut sample: StatsSample = serde_json::from_slice(body)?;

    for field in AGGREGATE_FIELDS {
        if let Some(value) = sample.extra.remove(field)
            && is_populated(&value)
        {
            return Err(CollectError::Misrouted { field });
        }
    }

    Ok(sample)
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
