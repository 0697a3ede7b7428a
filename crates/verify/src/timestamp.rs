//! Anchored timestamp verification.
//!
//! The proof math itself belongs to an external blockchain-anchoring
//! verifier, injected as the [`AnchorVerifier`] capability. This module owns
//! the orchestration around it: the structural guards, the integrity check
//! binding the proof to the signed claim, and the outcome cache. Anchoring
//! failures are never fatal to the caller; every completed attempt lands in
//! the cache, success or failure.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use veriscope_core::ipld::address_of_value;
use veriscope_core::types::{signed_payload, AttestationValue};

use crate::cache::TimestampProofCache;

/// SHA-256 detached-file descriptor handed to the anchoring verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedFileDigest {
    digest: [u8; 32],
}

impl DetachedFileDigest {
    /// Descriptor over the UTF-8 bytes of the anchored address's text form.
    /// Proofs are anchored on the text form of the address, not its binary
    /// form.
    pub fn from_message(msg: &str) -> Self {
        Self {
            digest: Sha256::digest(msg.as_bytes()).into(),
        }
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }
}

/// Options passed through to the anchoring verifier.
#[derive(Debug, Clone)]
pub struct AnchorVerifyOptions {
    /// Verify purely against remote calendar servers, without consulting a
    /// local chain node.
    pub skip_local_node: bool,
}

impl Default for AnchorVerifyOptions {
    fn default() -> Self {
        Self {
            skip_local_node: true,
        }
    }
}

/// One calendar server's anchoring attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarAttestation {
    /// Block height the proof anchors to.
    pub height: u64,
    /// Anchoring time reported by the calendar, Unix seconds.
    pub timestamp: u64,
}

/// Calendar server URL to its attestation. Empty means unverified.
pub type CalendarAttestations = BTreeMap<String, CalendarAttestation>;

/// Failure inside the anchoring verifier.
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("calendar protocol failure: {0}")]
    Protocol(String),
}

/// External blockchain-anchoring verifier.
///
/// Injected rather than reached through any ambient global, so the
/// timestamp path is testable with a fake.
#[async_trait]
pub trait AnchorVerifier: Send + Sync {
    async fn verify(
        &self,
        file: &DetachedFileDigest,
        proof: &[u8],
        options: &AnchorVerifyOptions,
    ) -> Result<CalendarAttestations, AnchorError>;
}

/// Verifies anchored timestamps, caching completed outcomes.
pub struct TimestampVerifier {
    cache: TimestampProofCache,
    anchor: Arc<dyn AnchorVerifier>,
}

impl TimestampVerifier {
    pub fn new(anchor: Arc<dyn AnchorVerifier>) -> Self {
        Self {
            cache: TimestampProofCache::new(),
            anchor,
        }
    }

    /// The outcome cache. Callers may probe it for freshness classification;
    /// writes stay internal to verification.
    pub fn cache(&self) -> &TimestampProofCache {
        &self.cache
    }

    /// Verify the anchored timestamp on `value`.
    ///
    /// Total: every failure mode degrades to `false`. Outcomes of completed
    /// attempts are cached under the text form of the anchored address; the
    /// structural guard (no proof at all) writes nothing since there is no
    /// address to key on.
    pub async fn verify(&self, value: &AttestationValue) -> bool {
        let Some(ots) = value.ots() else {
            return false;
        };

        let id = ots.msg.to_string();
        if let Some(entry) = self.cache.get(&id) {
            if entry.is_valid(SystemTime::now()) {
                debug!(id = %id, "reusing cached timestamp verification result");
                return entry.result;
            }
        }

        let payload = signed_payload(value.signature.as_ref(), &value.attestation);
        let recomputed = match address_of_value(&payload) {
            Ok(address) => address,
            Err(error) => {
                warn!(id = %id, %error, "failed to recompute anchored address");
                self.cache.put(&id, false, SystemTime::now());
                return false;
            }
        };

        // Compared in text form for compatibility with records written by
        // older encoders whose addresses differ structurally but render the
        // same text.
        if recomputed.to_string() != id {
            self.cache.put(&id, false, SystemTime::now());
            return false;
        }
        if recomputed != ots.msg {
            warn!(id = %id, "anchored address is text-equal but structurally unequal");
        }

        if ots.proof.is_empty() {
            self.cache.put(&id, false, SystemTime::now());
            return false;
        }

        let file = DetachedFileDigest::from_message(&id);
        let options = AnchorVerifyOptions::default();
        info!(id = %id, "verifying timestamp proof against calendar servers");
        let verified = match self.anchor.verify(&file, &ots.proof, &options).await {
            Ok(calendars) => !calendars.is_empty(),
            Err(error) => {
                debug!(id = %id, %error, "anchoring verifier failed");
                false
            }
        };
        self.cache.put(&id, verified, SystemTime::now());
        verified
    }
}
