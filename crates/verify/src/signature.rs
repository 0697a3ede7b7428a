//! Detached signature verification.
//!
//! A signature is meaningful only when the address the signer claims to have
//! signed equals the recomputed address of the attestation itself. That
//! integrity check runs first and short-circuits the curve arithmetic.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use veriscope_core::ipld::address_of_value;
use veriscope_core::types::AttestationValue;
use veriscope_core::Result;

use crate::keys::KeyRegistry;

/// Outcome of a signature check. Validity and key knownness are orthogonal
/// facts and both are always reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    pub valid: bool,
    pub known_key: bool,
    pub key_name: Option<String>,
}

/// Verify the detached signature carried by `value`.
///
/// Failures inside the cryptographic primitive (wrong key length, malformed
/// signature, curve rejection) all map to `valid: false`; the only error this
/// function surfaces is a canonical-encoding failure while recomputing the
/// attestation address.
pub fn verify_signature(
    value: &AttestationValue,
    registry: &dyn KeyRegistry,
) -> Result<SignatureCheck> {
    let Some(envelope) = value.signature.as_ref() else {
        return Ok(SignatureCheck {
            valid: false,
            known_key: false,
            key_name: None,
        });
    };

    // Knownness is looked up regardless of the cryptographic outcome.
    let registration = registry.lookup(&hex::encode(&envelope.pub_key));
    let known_key = registration.is_some();
    let key_name = registration.map(|k| k.name);

    // A claimed-address mismatch is a cryptographic failure, not a format
    // error, and skips the expensive check.
    let recomputed = address_of_value(&value.attestation.to_ipld())?;
    if recomputed != envelope.msg {
        return Ok(SignatureCheck {
            valid: false,
            known_key,
            key_name,
        });
    }

    let valid = verify_ed25519(&envelope.pub_key, &envelope.msg.to_bytes(), &envelope.sig);
    Ok(SignatureCheck {
        valid,
        known_key,
        key_name,
    })
}

fn verify_ed25519(pub_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(pub_key) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying_key.verify(message, &signature).is_ok()
}
