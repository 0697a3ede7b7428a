//! Core types and content addressing for the Veriscope attestation engine.
//!
//! This crate provides the foundation shared by the verification and fetch
//! layers:
//! - **Content Addressing**: canonical DAG-CBOR encoding and CIDv1 derivation
//! - **Data Model**: attestations, signature envelopes, timestamp proofs and
//!   provenance-tagged records
//! - **Configuration**: ordered endpoint sets with a positional primary
//! - **Errors**: the shared error taxonomy for fetch and encode failures

pub mod cid;
pub mod config;
pub mod error;
pub mod ipld;
pub mod logging;
pub mod types;

pub use cid::{address_of, shorten_cid, ContentAddress, HashFn, DAG_CBOR_CODEC};
pub use config::{EndpointConfig, EndpointSet};
pub use error::{Error, Result};
pub use ipld::{address_of_value, canonical_encode, cid_to_ipld, CID_TAG};
pub use types::{
    signed_payload, Attestation, AttestationRecord, AttestationValue, SignatureEnvelope,
    TimestampProof, TimestampWrapper,
};
