//! Wire decoding.
//!
//! Endpoint responses are DAG-CBOR. Decoding is strict: the payload either
//! validates into typed structures here at the boundary or the whole fetch
//! fails with a decoding error. The verify layer re-validates addresses
//! cryptographically; this layer only enforces shape.

use ciborium::value::Value;
use veriscope_core::types::{
    Attestation, AttestationValue, SignatureEnvelope, TimestampProof, TimestampWrapper,
};
use veriscope_core::{ContentAddress, Error, Result, CID_TAG};

/// Decode a per-CID response: a map from attestation key to its value.
/// Entry order follows the wire payload.
pub fn decode_attestation_map(bytes: &[u8]) -> Result<Vec<(String, AttestationValue)>> {
    let value: Value =
        ciborium::de::from_reader(bytes).map_err(|e| Error::Decoding(e.to_string()))?;
    let entries = into_map(value, "attestation map")?;
    entries
        .into_iter()
        .map(|(key, value)| {
            let key = into_text(key, "attestation key")?;
            let value = decode_attestation_value(value)?;
            Ok((key, value))
        })
        .collect()
}

/// Decode a CID-list response: an array of address strings.
pub fn decode_cid_list(bytes: &[u8]) -> Result<Vec<String>> {
    let value: Value =
        ciborium::de::from_reader(bytes).map_err(|e| Error::Decoding(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(Error::Decoding("CID list is not an array".to_string()));
    };
    items
        .into_iter()
        .map(|item| into_text(item, "CID list entry"))
        .collect()
}

fn decode_attestation_value(value: Value) -> Result<AttestationValue> {
    let mut fields = Fields::new(value, "attestation value")?;
    let attestation = decode_attestation(fields.require("attestation")?)?;
    let signature = match fields.take("signature") {
        None | Some(Value::Null) => None,
        Some(value) => Some(decode_signature(value)?),
    };
    let timestamp = match fields.take("timestamp") {
        None | Some(Value::Null) => None,
        Some(value) => Some(decode_timestamp_wrapper(value)?),
    };
    let version = into_text(fields.require("version")?, "version")?;
    Ok(AttestationValue {
        attestation,
        signature,
        timestamp,
        version,
    })
}

fn decode_attestation(value: Value) -> Result<Attestation> {
    let mut fields = Fields::new(value, "attestation")?;
    Ok(Attestation {
        cid: decode_content_address(fields.require("CID")?)?,
        value: fields.require("value")?,
        attribute: into_text(fields.require("attribute")?, "attribute")?,
        encrypted: into_bool(fields.require("encrypted")?, "encrypted")?,
        timestamp: into_text(fields.require("timestamp")?, "timestamp")?,
    })
}

fn decode_signature(value: Value) -> Result<SignatureEnvelope> {
    let mut fields = Fields::new(value, "signature")?;
    Ok(SignatureEnvelope {
        msg: decode_content_address(fields.require("msg")?)?,
        sig: into_bytes(fields.require("sig")?, "sig")?,
        pub_key: into_bytes(fields.require("pubKey")?, "pubKey")?,
    })
}

fn decode_timestamp_wrapper(value: Value) -> Result<TimestampWrapper> {
    let mut fields = Fields::new(value, "timestamp")?;
    let ots = match fields.take("ots") {
        None | Some(Value::Null) => None,
        Some(value) => Some(decode_timestamp_proof(value)?),
    };
    Ok(TimestampWrapper { ots })
}

fn decode_timestamp_proof(value: Value) -> Result<TimestampProof> {
    let mut fields = Fields::new(value, "ots")?;
    Ok(TimestampProof {
        proof: into_bytes(fields.require("proof")?, "proof")?,
        upgraded: into_bool(fields.require("upgraded")?, "upgraded")?,
        msg: decode_content_address(fields.require("msg")?)?,
    })
}

/// Addresses arrive as CBOR tag 42 over the identity-multibase-prefixed
/// binary form.
fn decode_content_address(value: Value) -> Result<ContentAddress> {
    let Value::Tag(tag, inner) = value else {
        return Err(Error::Decoding(
            "content address is not a tagged value".to_string(),
        ));
    };
    if tag != CID_TAG {
        return Err(Error::Decoding(format!(
            "unexpected CBOR tag {tag} for content address"
        )));
    }
    let bytes = into_bytes(*inner, "content address")?;
    match bytes.split_first() {
        Some((0x00, binary)) => ContentAddress::from_binary(binary),
        Some((prefix, _)) => Err(Error::Decoding(format!(
            "unexpected multibase prefix byte 0x{prefix:02x} in content address"
        ))),
        None => Err(Error::Decoding("empty content address".to_string())),
    }
}

struct Fields {
    name: &'static str,
    entries: Vec<(Value, Value)>,
}

impl Fields {
    fn new(value: Value, name: &'static str) -> Result<Self> {
        let entries = into_map(value, name)?;
        Ok(Self { name, entries })
    }

    fn take(&mut self, key: &str) -> Option<Value> {
        let index = self
            .entries
            .iter()
            .position(|(k, _)| matches!(k, Value::Text(text) if text == key))?;
        Some(self.entries.remove(index).1)
    }

    fn require(&mut self, key: &str) -> Result<Value> {
        self.take(key)
            .ok_or_else(|| Error::Decoding(format!("missing field {key:?} in {}", self.name)))
    }
}

fn into_map(value: Value, context: &str) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(Error::Decoding(format!(
            "{context} is not a map (got {other:?})"
        ))),
    }
}

fn into_text(value: Value, context: &str) -> Result<String> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(Error::Decoding(format!(
            "{context} is not a text string (got {other:?})"
        ))),
    }
}

fn into_bytes(value: Value, context: &str) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(bytes) => Ok(bytes),
        other => Err(Error::Decoding(format!(
            "{context} is not a byte string (got {other:?})"
        ))),
    }
}

fn into_bool(value: Value, context: &str) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(flag),
        other => Err(Error::Decoding(format!(
            "{context} is not a boolean (got {other:?})"
        ))),
    }
}
