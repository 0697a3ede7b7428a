//! Verification orchestration.
//!
//! [`Verifier::verify_data`] is the single entry point the presentation
//! layer calls: given a proof kind and a record it dispatches to the right
//! checker and classifies the raw outcome into a closed set of user-facing
//! states. It never fails: integrity and cryptographic problems degrade to
//! the most specific non-verified state available.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use veriscope_core::types::{AttestationRecord, AttestationValue};
use veriscope_core::{Error, Result};

use crate::cache::TimestampProofCache;
use crate::keys::KeyRegistry;
use crate::signature::{verify_signature, SignatureCheck};
use crate::timestamp::{AnchorVerifier, TimestampVerifier};

/// The proof kinds a record can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Hash,
    Signature,
    Timestamp,
}

impl FromStr for VerificationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hash" => Ok(VerificationKind::Hash),
            "signature" => Ok(VerificationKind::Signature),
            "timestamp" => Ok(VerificationKind::Timestamp),
            other => Err(Error::Decoding(format!(
                "unknown verification kind {other:?}"
            ))),
        }
    }
}

/// User-facing classification of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The proof checks out.
    Verified,
    /// No proof material to check.
    Unverified,
    /// Proof material exists but could not be confirmed.
    Present,
    /// The signature verifies under a key nobody has registered.
    UnknownKey,
    /// A very fresh previously-computed outcome was returned as-is.
    Cached,
}

/// The result of one [`Verifier::verify_data`] call.
///
/// `Cached` appears only for the timestamp kind and only carries a
/// previously computed boolean, never fresh proof data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_timestamp: Option<SystemTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
}

impl VerificationResult {
    fn status(status: VerificationStatus) -> Self {
        Self {
            status,
            cached_value: None,
            cache_timestamp: None,
            known_key: None,
            key_name: None,
        }
    }
}

/// Dispatches verification requests and classifies their outcomes.
pub struct Verifier {
    registry: Arc<dyn KeyRegistry>,
    timestamps: TimestampVerifier,
}

impl Verifier {
    pub fn new(registry: Arc<dyn KeyRegistry>, anchor: Arc<dyn AnchorVerifier>) -> Self {
        Self {
            registry,
            timestamps: TimestampVerifier::new(anchor),
        }
    }

    /// The timestamp outcome cache, shared by every verification this
    /// orchestrator runs.
    pub fn timestamp_cache(&self) -> &TimestampProofCache {
        self.timestamps.cache()
    }

    /// Verify one proof kind on one record.
    ///
    /// `selected_cid` is the address the caller is currently viewing; it only
    /// participates in the `hash` kind, which checks the *claimed* address
    /// against it without recomputing anything.
    pub async fn verify_data(
        &self,
        kind: VerificationKind,
        record: &AttestationRecord,
        selected_cid: Option<&str>,
    ) -> VerificationResult {
        match kind {
            VerificationKind::Hash => {
                let claimed = record.value.attestation.cid.to_string();
                let status = match selected_cid {
                    Some(selected) if claimed == selected => VerificationStatus::Verified,
                    _ => VerificationStatus::Unverified,
                };
                VerificationResult::status(status)
            }
            VerificationKind::Signature => {
                if record.value.signature.is_none() {
                    return VerificationResult::status(VerificationStatus::Unverified);
                }
                match verify_signature(&record.value, self.registry.as_ref()) {
                    Ok(check) => {
                        let status = match (check.valid, check.known_key) {
                            (true, true) => VerificationStatus::Verified,
                            (true, false) => VerificationStatus::UnknownKey,
                            (false, _) => VerificationStatus::Present,
                        };
                        VerificationResult {
                            status,
                            cached_value: None,
                            cache_timestamp: None,
                            known_key: Some(check.known_key),
                            key_name: check.key_name,
                        }
                    }
                    Err(error) => {
                        debug!(%error, "signature check errored, classifying as present");
                        VerificationResult::status(VerificationStatus::Present)
                    }
                }
            }
            VerificationKind::Timestamp => {
                let Some(ots) = record.value.ots() else {
                    return VerificationResult::status(VerificationStatus::Unverified);
                };

                // A very fresh outcome surfaces as an explicit cached state.
                // Older-but-valid entries flow through the verifier below and
                // are reused silently there.
                let id = ots.msg.to_string();
                if let Some(entry) = self.timestamps.cache().get(&id) {
                    if entry.is_fresh(SystemTime::now()) {
                        return VerificationResult {
                            status: VerificationStatus::Cached,
                            cached_value: Some(entry.result),
                            cache_timestamp: Some(entry.timestamp),
                            known_key: None,
                            key_name: None,
                        };
                    }
                }

                let status = if self.timestamps.verify(&record.value).await {
                    VerificationStatus::Verified
                } else {
                    VerificationStatus::Present
                };
                VerificationResult::status(status)
            }
        }
    }

    /// [`Verifier::verify_data`] keyed by the raw kind string. Unknown kinds
    /// classify as `unverified` rather than erroring.
    pub async fn verify_data_str(
        &self,
        kind: &str,
        record: &AttestationRecord,
        selected_cid: Option<&str>,
    ) -> VerificationResult {
        match kind.parse() {
            Ok(kind) => self.verify_data(kind, record, selected_cid).await,
            Err(_) => {
                debug!(kind, "unknown verification kind");
                VerificationResult::status(VerificationStatus::Unverified)
            }
        }
    }

    /// Run the signature check on its own, without state classification.
    pub fn verify_signature(&self, value: &AttestationValue) -> Result<SignatureCheck> {
        verify_signature(value, self.registry.as_ref())
    }

    /// Run the timestamp check on its own, without state classification.
    pub async fn verify_timestamp(&self, value: &AttestationValue) -> bool {
        self.timestamps.verify(value).await
    }
}
