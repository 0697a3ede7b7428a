//! Attestation data model.
//!
//! Attestations are immutable claims produced by external authorities and
//! fetched verbatim; nothing in this crate mutates them. Each record carries
//! the provenance stamped by the aggregator at fetch time.

use ciborium::value::Value;
use serde::{Deserialize, Serialize};

use crate::cid::ContentAddress;
use crate::ipld::cid_to_ipld;

/// An immutable claim about a content address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attestation {
    /// The content address the claim is about.
    #[serde(rename = "CID")]
    pub cid: ContentAddress,
    /// Opaque claim payload, kept in its decoded CBOR form.
    pub value: Value,
    /// Attribute label, e.g. `"caption"` or `"location"`.
    pub attribute: String,
    /// Whether the payload is encrypted at rest.
    pub encrypted: bool,
    /// Authority-supplied timestamp string.
    pub timestamp: String,
}

/// A detached signature over an attestation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEnvelope {
    /// The address the signer claims to have signed. Meaningful only when it
    /// equals the recomputed address of the attestation.
    pub msg: ContentAddress,
    /// Ed25519 signature bytes.
    pub sig: Vec<u8>,
    /// Ed25519 public key bytes.
    #[serde(rename = "pubKey")]
    pub pub_key: Vec<u8>,
}

/// A blockchain-anchored timestamp proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampProof {
    /// Serialized calendar proof.
    pub proof: Vec<u8>,
    /// Whether the proof has been upgraded to a complete attestation.
    pub upgraded: bool,
    /// The address the proof anchors. Meaningful only when it equals the
    /// recomputed address of the signed claim.
    pub msg: ContentAddress,
}

/// Wrapper carrying the optional anchored proof.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimestampWrapper {
    pub ots: Option<TimestampProof>,
}

/// A single attestation together with its proof material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationValue {
    pub attestation: Attestation,
    pub signature: Option<SignatureEnvelope>,
    pub timestamp: Option<TimestampWrapper>,
    pub version: String,
}

impl AttestationValue {
    /// The anchored timestamp proof, if any.
    pub fn ots(&self) -> Option<&TimestampProof> {
        self.timestamp.as_ref().and_then(|t| t.ots.as_ref())
    }
}

/// An attestation tagged with the source it was fetched from.
///
/// Created by the aggregator and read-only thereafter. The same key fetched
/// from two endpoints produces two distinct records, each with its own
/// provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    pub key: String,
    pub value: AttestationValue,
    pub source_endpoint: Option<String>,
    pub source_name: Option<String>,
    pub is_primary_source: bool,
}

impl Attestation {
    /// The IPLD form hashed for signature verification.
    pub fn to_ipld(&self) -> Value {
        Value::Map(vec![
            (Value::Text("CID".to_string()), cid_to_ipld(&self.cid)),
            (Value::Text("value".to_string()), self.value.clone()),
            (
                Value::Text("attribute".to_string()),
                Value::Text(self.attribute.clone()),
            ),
            (
                Value::Text("encrypted".to_string()),
                Value::Bool(self.encrypted),
            ),
            (
                Value::Text("timestamp".to_string()),
                Value::Text(self.timestamp.clone()),
            ),
        ])
    }
}

impl SignatureEnvelope {
    pub fn to_ipld(&self) -> Value {
        Value::Map(vec![
            (Value::Text("msg".to_string()), cid_to_ipld(&self.msg)),
            (Value::Text("sig".to_string()), Value::Bytes(self.sig.clone())),
            (
                Value::Text("pubKey".to_string()),
                Value::Bytes(self.pub_key.clone()),
            ),
        ])
    }
}

/// The IPLD form hashed for timestamp anchoring: the signature (or an
/// explicit null when absent) together with the attestation it covers.
pub fn signed_payload(signature: Option<&SignatureEnvelope>, attestation: &Attestation) -> Value {
    let signature_value = match signature {
        Some(envelope) => envelope.to_ipld(),
        None => Value::Null,
    };
    Value::Map(vec![
        (Value::Text("signature".to_string()), signature_value),
        (
            Value::Text("attestation".to_string()),
            attestation.to_ipld(),
        ),
    ])
}
