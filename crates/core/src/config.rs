//! Endpoint configuration.
//!
//! The engine reads an ordered snapshot of endpoints per aggregate call;
//! persistence and editing belong to the embedding application. The first
//! endpoint in configured order is the primary source, re-evaluated on every
//! fetch.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single attestation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Human-readable display name.
    pub name: String,
    /// Base URL, without a trailing slash.
    pub url: String,
}

/// An ordered endpoint collection. Index 0 is the primary source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointSet {
    pub endpoints: Vec<EndpointConfig>,
}

impl EndpointSet {
    pub fn new(endpoints: Vec<EndpointConfig>) -> Self {
        Self { endpoints }
    }

    /// Load an endpoint set from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let set = toml::from_str(&content)?;
        Ok(set)
    }

    /// The primary endpoint, purely positional.
    pub fn primary(&self) -> Option<&EndpointConfig> {
        self.endpoints.first()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Built-in defaults used when no configuration has been persisted yet.
    pub fn default_set() -> Self {
        Self::new(vec![
            EndpointConfig {
                name: "Field Archive".to_string(),
                url: "https://archive.attest.example.org".to_string(),
            },
            EndpointConfig {
                name: "Newsroom Mirror".to_string(),
                url: "https://newsroom.attest.example.org".to_string(),
            },
        ])
    }
}
