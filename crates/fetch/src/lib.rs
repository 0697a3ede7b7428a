//! Multi-source attestation fetching for Veriscope.
//!
//! This crate owns the HTTP protocol against attestation endpoints and the
//! strict wire-decode boundary. Transport and decoding failures are the only
//! hard errors in the system; everything downstream degrades gracefully.

pub mod client;
pub mod wire;

pub use client::AttestationClient;
pub use wire::{decode_attestation_map, decode_cid_list};
