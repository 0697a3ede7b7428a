//! Shared error taxonomy.
//!
//! Only fetch-path failures (transport, wire decoding) and canonical encoding
//! failures surface as errors. Cryptographic and anchoring failures are
//! classified into verification states by the verify layer and never become
//! `Err` values.

use thiserror::Error;

/// Error type shared across the Veriscope crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or non-2xx response from an attestation endpoint.
    /// Aborts the whole aggregate fetch.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed wire payload at the decode boundary.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Canonical encoding failed on malformed input.
    #[error("encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
