//! Known public key registry.
//!
//! Key *knownness* is a labeling concern, orthogonal to cryptographic
//! validity: a signature can verify under a key nobody has registered, and a
//! registered key can sit on an invalid signature. Which keys are trusted is
//! external configuration; this module only reads it.

use serde::{Deserialize, Serialize};

/// A public key pre-registered with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPublicKey {
    /// Display name, e.g. the attesting organization.
    pub name: String,
    /// Hex-encoded Ed25519 public key.
    pub key: String,
}

/// Read-only lookup from a hex-encoded public key to its registration.
pub trait KeyRegistry: Send + Sync {
    fn lookup(&self, pub_key_hex: &str) -> Option<KnownPublicKey>;
}

/// In-memory registry backed by a fixed key list.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyRing {
    keys: Vec<KnownPublicKey>,
}

impl StaticKeyRing {
    pub fn new(keys: Vec<KnownPublicKey>) -> Self {
        Self { keys }
    }

    pub fn register(&mut self, name: impl Into<String>, key_hex: impl Into<String>) {
        self.keys.push(KnownPublicKey {
            name: name.into(),
            key: key_hex.into(),
        });
    }
}

impl KeyRegistry for StaticKeyRing {
    fn lookup(&self, pub_key_hex: &str) -> Option<KnownPublicKey> {
        self.keys
            .iter()
            .find(|k| k.key.eq_ignore_ascii_case(pub_key_hex))
            .cloned()
    }
}
