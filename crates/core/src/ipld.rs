//! Canonical DAG-CBOR encoding.
//!
//! The canonical profile uses definite lengths, map keys sorted length-first
//! then bytewise over their encoded form, and content addresses embedded as
//! CBOR tag 42 over the identity-multibase-prefixed binary form. Field
//! insertion order at the API boundary never changes the encoded bytes.

use ciborium::value::Value;

use crate::cid::{address_of, ContentAddress, HashFn};
use crate::error::{Error, Result};

/// CBOR tag marking an embedded content address.
pub const CID_TAG: u64 = 42;

/// Deterministically encode `value` into canonical bytes.
pub fn canonical_encode(value: &Value) -> Result<Vec<u8>> {
    let canonical = canonicalize(value)?;
    let mut out = Vec::new();
    ciborium::ser::into_writer(&canonical, &mut out).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(out)
}

/// Canonically encode `value` and derive its content address.
pub fn address_of_value(value: &Value) -> Result<ContentAddress> {
    Ok(address_of(&canonical_encode(value)?, HashFn::Sha2_256))
}

/// Embed a content address as an IPLD link: tag 42 over the binary form
/// prefixed with the identity multibase byte.
pub fn cid_to_ipld(address: &ContentAddress) -> Value {
    let binary = address.to_bytes();
    let mut bytes = Vec::with_capacity(binary.len() + 1);
    bytes.push(0x00);
    bytes.extend_from_slice(&binary);
    Value::Tag(CID_TAG, Box::new(Value::Bytes(bytes)))
}

fn canonicalize(value: &Value) -> Result<Value> {
    match value {
        Value::Map(entries) => {
            let mut keyed: Vec<(Vec<u8>, Value, Value)> = Vec::with_capacity(entries.len());
            for (key, val) in entries {
                let key = canonicalize(key)?;
                let val = canonicalize(val)?;
                keyed.push((encode_term(&key)?, key, val));
            }
            // Length-first, then bytewise, over the encoded key.
            keyed.sort_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));
            for pair in keyed.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(Error::Encoding("duplicate map key".to_string()));
                }
            }
            Ok(Value::Map(
                keyed.into_iter().map(|(_, k, v)| (k, v)).collect(),
            ))
        }
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(canonicalize).collect::<Result<_>>()?,
        )),
        Value::Tag(tag, inner) => Ok(Value::Tag(*tag, Box::new(canonicalize(inner)?))),
        Value::Float(f) if !f.is_finite() => {
            Err(Error::Encoding("non-finite float is not encodable".to_string()))
        }
        other => Ok(other.clone()),
    }
}

fn encode_term(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(out)
}
