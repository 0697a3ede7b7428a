//! Multi-source aggregation.
//!
//! One fetch per configured endpoint, issued concurrently and joined
//! all-or-nothing: a single endpoint failure aborts the whole aggregate.
//! Output order is the configured endpoint order, never fetch-completion
//! order, and every record carries the provenance of the endpoint it came
//! from. "Primary" is purely positional (index 0) and re-evaluated on every
//! call, so reordering the configuration changes which source is primary on
//! the next fetch.

use futures::future::try_join_all;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use veriscope_core::config::EndpointConfig;
use veriscope_core::types::{AttestationRecord, AttestationValue};
use veriscope_core::{shorten_cid, Error, Result};

use crate::wire;

/// HTTP client over the attestation endpoint protocol.
pub struct AttestationClient {
    http: reqwest::Client,
}

impl AttestationClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { http })
    }

    /// Use a caller-configured HTTP client.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch every configured endpoint's attestations for `cid` and flatten
    /// them into one provenance-tagged collection.
    pub async fn fetch_all_attestations(
        &self,
        endpoints: &[EndpointConfig],
        cid: &str,
    ) -> Result<Vec<AttestationRecord>> {
        debug!(
            cid = %shorten_cid(cid),
            endpoints = endpoints.len(),
            "fetching attestations"
        );
        let fetches = endpoints
            .iter()
            .map(|endpoint| self.fetch_endpoint_attestations(endpoint, cid));
        let decoded = try_join_all(fetches).await?;

        let mut records = Vec::new();
        for (index, (endpoint, entries)) in endpoints.iter().zip(decoded).enumerate() {
            for (key, value) in entries {
                records.push(AttestationRecord {
                    key,
                    value,
                    source_endpoint: Some(endpoint.url.clone()),
                    source_name: Some(endpoint.name.clone()),
                    is_primary_source: index == 0,
                });
            }
        }
        Ok(records)
    }

    /// Fetch the CID lists of every configured endpoint, de-duplicated
    /// first-seen in configured order.
    pub async fn fetch_all_cids(&self, endpoints: &[EndpointConfig]) -> Result<Vec<String>> {
        let fetches = endpoints
            .iter()
            .map(|endpoint| self.fetch_endpoint_cids(endpoint));
        let lists = try_join_all(fetches).await?;

        let mut seen = HashSet::new();
        let mut cids = Vec::new();
        for list in lists {
            for cid in list {
                if seen.insert(cid.clone()) {
                    cids.push(cid);
                }
            }
        }
        Ok(cids)
    }

    async fn fetch_endpoint_attestations(
        &self,
        endpoint: &EndpointConfig,
        cid: &str,
    ) -> Result<Vec<(String, AttestationValue)>> {
        let url = format!("{}/v1/c/{}", endpoint.url, cid);
        let bytes = self.get_bytes(&url).await?;
        wire::decode_attestation_map(&bytes)
    }

    async fn fetch_endpoint_cids(&self, endpoint: &EndpointConfig) -> Result<Vec<String>> {
        let url = format!("{}/v1/cids", endpoint.url);
        let bytes = self.get_bytes(&url).await?;
        wire::decode_cid_list(&bytes)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(status.to_string()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
