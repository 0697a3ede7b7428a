//! Attestation verification for Veriscope.
//!
//! This crate implements the verification engine:
//! - Content-hash checks against the address the caller is viewing
//! - Ed25519 signature verification with known-key classification
//! - Blockchain-anchored timestamp verification through an injected
//!   calendar-verifier capability, with a two-tier outcome cache
//!
//! The single entry point for the presentation layer is
//! [`Verifier::verify_data`], which always produces a [`VerificationResult`]
//! and never fails.

pub mod cache;
pub mod keys;
pub mod signature;
pub mod timestamp;
pub mod verifier;

pub use cache::{CacheEntry, TimestampProofCache, ENTRY_TTL, FRESH_WINDOW};
pub use keys::{KeyRegistry, KnownPublicKey, StaticKeyRing};
pub use signature::{verify_signature, SignatureCheck};
pub use timestamp::{
    AnchorError, AnchorVerifier, AnchorVerifyOptions, CalendarAttestation, CalendarAttestations,
    DetachedFileDigest, TimestampVerifier,
};
pub use verifier::{VerificationKind, VerificationResult, VerificationStatus, Verifier};
