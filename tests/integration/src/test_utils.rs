//! Test utilities: signing authorities, wire encoding and mock endpoints.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use ciborium::value::Value;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use veriscope_core::cid::{address_of, HashFn};
use veriscope_core::ipld::{address_of_value, cid_to_ipld};
use veriscope_core::types::{
    signed_payload, Attestation, AttestationValue, SignatureEnvelope, TimestampProof,
    TimestampWrapper,
};
use veriscope_verify::{
    AnchorError, AnchorVerifier, AnchorVerifyOptions, CalendarAttestation, CalendarAttestations,
    DetachedFileDigest,
};

/// Test fixture for an attesting authority with an Ed25519 keypair.
pub struct TestAuthority {
    pub signing_key: SigningKey,
}

impl TestAuthority {
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn pub_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Build a fully attested value: a claim about `subject`, signed by this
    /// authority, with a consistent anchored timestamp proof.
    pub fn attested_value(&self, subject: &[u8], caption: &str) -> AttestationValue {
        let attestation = Attestation {
            cid: address_of(subject, HashFn::Sha2_256),
            value: Value::Text(caption.to_string()),
            attribute: "caption".to_string(),
            encrypted: false,
            timestamp: "2024-05-01T12:00:00Z".to_string(),
        };
        let msg = address_of_value(&attestation.to_ipld()).unwrap();
        let signature = SignatureEnvelope {
            msg: msg.clone(),
            sig: self.signing_key.sign(&msg.to_bytes()).to_bytes().to_vec(),
            pub_key: self.signing_key.verifying_key().to_bytes().to_vec(),
        };
        let anchored_msg =
            address_of_value(&signed_payload(Some(&signature), &attestation)).unwrap();
        AttestationValue {
            attestation,
            signature: Some(signature),
            timestamp: Some(TimestampWrapper {
                ots: Some(TimestampProof {
                    proof: vec![0x00, 0x4f, 0x54, 0x53, 0x01],
                    upgraded: false,
                    msg: anchored_msg,
                }),
            }),
            version: "1.0".to_string(),
        }
    }
}

impl Default for TestAuthority {
    fn default() -> Self {
        Self::new()
    }
}

/// Anchoring verifier fake that counts external calls.
pub struct FakeCalendarVerifier {
    anchored: bool,
    calls: AtomicUsize,
}

impl FakeCalendarVerifier {
    pub fn new(anchored: bool) -> Arc<Self> {
        Arc::new(Self {
            anchored,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnchorVerifier for FakeCalendarVerifier {
    async fn verify(
        &self,
        _file: &DetachedFileDigest,
        _proof: &[u8],
        _options: &AnchorVerifyOptions,
    ) -> Result<CalendarAttestations, AnchorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.anchored {
            let mut calendars = CalendarAttestations::new();
            calendars.insert(
                "https://calendar.example.org".to_string(),
                CalendarAttestation {
                    height: 840_000,
                    timestamp: 1_714_500_000,
                },
            );
            Ok(calendars)
        } else {
            Err(AnchorError::Protocol("calendar unreachable".to_string()))
        }
    }
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn attestation_to_wire(attestation: &Attestation) -> Value {
    attestation.to_ipld()
}

fn signature_to_wire(signature: &SignatureEnvelope) -> Value {
    signature.to_ipld()
}

fn ots_to_wire(proof: &TimestampProof) -> Value {
    Value::Map(vec![
        (text("proof"), Value::Bytes(proof.proof.clone())),
        (text("upgraded"), Value::Bool(proof.upgraded)),
        (text("msg"), cid_to_ipld(&proof.msg)),
    ])
}

/// Re-encode a typed attestation value into its wire form.
pub fn attestation_value_to_wire(value: &AttestationValue) -> Value {
    let mut entries = vec![(text("attestation"), attestation_to_wire(&value.attestation))];
    if let Some(signature) = &value.signature {
        entries.push((text("signature"), signature_to_wire(signature)));
    }
    if let Some(wrapper) = &value.timestamp {
        let mut inner = Vec::new();
        if let Some(ots) = &wrapper.ots {
            inner.push((text("ots"), ots_to_wire(ots)));
        }
        entries.push((text("timestamp"), Value::Map(inner)));
    }
    entries.push((text("version"), text(&value.version)));
    Value::Map(entries)
}

/// Encode a key → attestation value map as response bytes.
pub fn encode_attestation_map(entries: &[(&str, &AttestationValue)]) -> Vec<u8> {
    let payload = Value::Map(
        entries
            .iter()
            .map(|(key, value)| (text(key), attestation_value_to_wire(value)))
            .collect(),
    );
    encode(&payload)
}

/// Encode a CID list as response bytes.
pub fn encode_cid_list(cids: &[&str]) -> Vec<u8> {
    encode(&Value::Array(cids.iter().map(|c| text(c)).collect()))
}

fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).unwrap();
    out
}

/// Start a mock attestation endpoint serving fixed response bytes.
/// Returns its base URL.
pub async fn start_endpoint(attestations: Vec<u8>, cids: Vec<u8>) -> String {
    let att_body = attestations.clone();
    let cid_body = cids.clone();
    let app = Router::new()
        .route(
            "/v1/c/:cid",
            get(move || {
                let body = att_body.clone();
                async move { body }
            }),
        )
        .route(
            "/v1/cids",
            get(move || {
                let body = cid_body.clone();
                async move { body }
            }),
        );
    serve(app).await
}

/// Start a mock endpoint that answers every request with a server error.
pub async fn start_failing_endpoint() -> String {
    let app = Router::new()
        .route(
            "/v1/c/:cid",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/v1/cids",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    url
}
