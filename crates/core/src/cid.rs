//! Content addressing.
//!
//! A [`ContentAddress`] is a CIDv1: a codec tag, a hash-function tag and the
//! digest of the canonically encoded value. Two values that canonically
//! encode to the same bytes under the same hash function always yield equal
//! addresses. Addresses compare by structural equality over their fields,
//! never by identity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Multicodec tag for DAG-CBOR encoded content.
pub const DAG_CBOR_CODEC: u64 = 0x71;

/// Hash functions supported for address derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFn {
    /// SHA2-256, multihash code 0x12.
    Sha2_256,
}

impl HashFn {
    /// Multihash function code.
    pub const fn code(self) -> u64 {
        match self {
            HashFn::Sha2_256 => 0x12,
        }
    }

    /// Digest length in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            HashFn::Sha2_256 => 32,
        }
    }

    /// Hash `bytes` with this function.
    pub fn digest(self, bytes: &[u8]) -> Vec<u8> {
        match self {
            HashFn::Sha2_256 => Sha256::digest(bytes).to_vec(),
        }
    }

    fn from_code(code: u64) -> Result<Self> {
        match code {
            0x12 => Ok(HashFn::Sha2_256),
            other => Err(Error::Decoding(format!(
                "unsupported multihash code 0x{other:x}"
            ))),
        }
    }
}

/// A CIDv1 content address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress {
    codec: u64,
    hash: HashFn,
    digest: Vec<u8>,
}

/// Derive the content address of already-canonical `bytes`.
///
/// Pure: the same input bytes and hash function always produce the same
/// address.
pub fn address_of(bytes: &[u8], hash: HashFn) -> ContentAddress {
    ContentAddress {
        codec: DAG_CBOR_CODEC,
        hash,
        digest: hash.digest(bytes),
    }
}

impl ContentAddress {
    /// Build an address from raw parts. The digest length must match the
    /// hash function.
    pub fn from_parts(codec: u64, hash: HashFn, digest: Vec<u8>) -> Result<Self> {
        if digest.len() != hash.digest_len() {
            return Err(Error::Decoding(format!(
                "digest length {} does not match hash function (expected {})",
                digest.len(),
                hash.digest_len()
            )));
        }
        Ok(Self { codec, hash, digest })
    }

    pub fn codec(&self) -> u64 {
        self.codec
    }

    pub fn hash_fn(&self) -> HashFn {
        self.hash
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Binary form: varint version 1, varint codec, then the multihash
    /// (varint code, varint length, digest).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.digest.len());
        write_varint(&mut out, 1);
        write_varint(&mut out, self.codec);
        write_varint(&mut out, self.hash.code());
        write_varint(&mut out, self.digest.len() as u64);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Parse the binary form produced by [`ContentAddress::to_bytes`].
    pub fn from_binary(bytes: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let version = read_varint(bytes, &mut pos)?;
        if version != 1 {
            return Err(Error::Decoding(format!(
                "unsupported content address version {version}"
            )));
        }
        let codec = read_varint(bytes, &mut pos)?;
        let hash = HashFn::from_code(read_varint(bytes, &mut pos)?)?;
        let len = read_varint(bytes, &mut pos)? as usize;
        let digest = bytes
            .get(pos..pos + len)
            .ok_or_else(|| Error::Decoding("truncated content address digest".to_string()))?
            .to_vec();
        if pos + len != bytes.len() {
            return Err(Error::Decoding(
                "trailing bytes after content address".to_string(),
            ));
        }
        Self::from_parts(codec, hash, digest)
    }
}

impl fmt::Display for ContentAddress {
    /// Canonical text form: multibase base32-lower, `b` prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", base32_encode(&self.to_bytes()))
    }
}

impl FromStr for ContentAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let encoded = s
            .strip_prefix('b')
            .ok_or_else(|| Error::Decoding(format!("unsupported multibase prefix in {s:?}")))?;
        Self::from_binary(&base32_decode(encoded)?)
    }
}

impl Serialize for ContentAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Abbreviate a content address string for log lines: `bafy…abcd`.
pub fn shorten_cid(s: &str) -> String {
    if s.len() <= 9 {
        return s.to_string();
    }
    format!("{}…{}", &s[..4], &s[s.len() - 4..])
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| Error::Decoding("truncated varint".to_string()))?;
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
        if shift >= 64 {
            return Err(Error::Decoding("varint overflow".to_string()));
        }
    }
}

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8 / 5 + 1);
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer = 0u32;
    let mut bits = 0u32;
    for c in s.chars() {
        let value = match c {
            'a'..='z' => c as u32 - 'a' as u32,
            '2'..='7' => c as u32 - '2' as u32 + 26,
            _ => {
                return Err(Error::Decoding(format!("invalid base32 character {c:?}")));
            }
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}
