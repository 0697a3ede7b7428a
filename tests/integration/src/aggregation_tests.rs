//! Multi-endpoint aggregation over real HTTP round trips.

use crate::test_utils::*;
use veriscope_core::config::EndpointConfig;
use veriscope_core::Error;
use veriscope_fetch::AttestationClient;

fn endpoint(name: &str, url: &str) -> EndpointConfig {
    EndpointConfig {
        name: name.to_string(),
        url: url.to_string(),
    }
}

#[tokio::test]
async fn test_duplicate_keys_keep_per_source_records() {
    let authority = TestAuthority::new();
    let from_a = authority.attested_value(b"photo", "caption from A");
    let from_b = authority.attested_value(b"photo", "caption from B");

    let url_a = start_endpoint(
        encode_attestation_map(&[("caption", &from_a)]),
        encode_cid_list(&[]),
    )
    .await;
    let url_b = start_endpoint(
        encode_attestation_map(&[("caption", &from_b)]),
        encode_cid_list(&[]),
    )
    .await;

    let endpoints = [endpoint("A", &url_a), endpoint("B", &url_b)];
    let client = AttestationClient::new().unwrap();
    let records = client
        .fetch_all_attestations(&endpoints, "bafyphoto")
        .await
        .unwrap();

    // No de-duplication: one record per (endpoint, key).
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.key == "caption"));

    assert_eq!(records[0].source_name.as_deref(), Some("A"));
    assert_eq!(records[0].source_endpoint.as_deref(), Some(url_a.as_str()));
    assert!(records[0].is_primary_source);

    assert_eq!(records[1].source_name.as_deref(), Some("B"));
    assert!(!records[1].is_primary_source);
}

#[tokio::test]
async fn test_reordering_endpoints_moves_primary() {
    let authority = TestAuthority::new();
    let value = authority.attested_value(b"photo", "caption");
    let body = encode_attestation_map(&[("caption", &value)]);

    let url_a = start_endpoint(body.clone(), encode_cid_list(&[])).await;
    let url_b = start_endpoint(body, encode_cid_list(&[])).await;
    let client = AttestationClient::new().unwrap();

    let records = client
        .fetch_all_attestations(&[endpoint("A", &url_a), endpoint("B", &url_b)], "bafyphoto")
        .await
        .unwrap();
    assert!(records[0].is_primary_source);
    assert_eq!(records[0].source_name.as_deref(), Some("A"));

    // Primary is positional and re-evaluated per call.
    let records = client
        .fetch_all_attestations(&[endpoint("B", &url_b), endpoint("A", &url_a)], "bafyphoto")
        .await
        .unwrap();
    assert!(records[0].is_primary_source);
    assert_eq!(records[0].source_name.as_deref(), Some("B"));
}

#[tokio::test]
async fn test_output_follows_configured_order() {
    let authority = TestAuthority::new();
    let v1 = authority.attested_value(b"photo", "one");
    let v2 = authority.attested_value(b"photo", "two");
    let v3 = authority.attested_value(b"photo", "three");

    let url_a = start_endpoint(
        encode_attestation_map(&[("caption", &v1), ("location", &v2)]),
        encode_cid_list(&[]),
    )
    .await;
    let url_b = start_endpoint(
        encode_attestation_map(&[("caption", &v3)]),
        encode_cid_list(&[]),
    )
    .await;

    let client = AttestationClient::new().unwrap();
    let records = client
        .fetch_all_attestations(&[endpoint("A", &url_a), endpoint("B", &url_b)], "bafyphoto")
        .await
        .unwrap();

    let sources: Vec<_> = records
        .iter()
        .map(|r| (r.source_name.as_deref().unwrap(), r.key.as_str()))
        .collect();
    assert_eq!(
        sources,
        vec![("A", "caption"), ("A", "location"), ("B", "caption")]
    );
}

#[tokio::test]
async fn test_one_failing_endpoint_aborts_the_aggregate() {
    let authority = TestAuthority::new();
    let value = authority.attested_value(b"photo", "caption");
    let url_ok = start_endpoint(
        encode_attestation_map(&[("caption", &value)]),
        encode_cid_list(&[]),
    )
    .await;
    let url_bad = start_failing_endpoint().await;

    let client = AttestationClient::new().unwrap();
    let result = client
        .fetch_all_attestations(&[endpoint("A", &url_ok), endpoint("B", &url_bad)], "bafyphoto")
        .await;
    assert!(matches!(result, Err(Error::Network(_))));
}

#[tokio::test]
async fn test_malformed_payload_is_a_decoding_error() {
    let url = start_endpoint(vec![0xff, 0x13, 0x37], encode_cid_list(&[])).await;
    let client = AttestationClient::new().unwrap();
    let result = client
        .fetch_all_attestations(&[endpoint("A", &url)], "bafyphoto")
        .await;
    assert!(matches!(result, Err(Error::Decoding(_))));
}

#[tokio::test]
async fn test_cid_lists_merge_first_seen() {
    let url_a = start_endpoint(
        encode_attestation_map(&[]),
        encode_cid_list(&["bafyone", "bafytwo"]),
    )
    .await;
    let url_b = start_endpoint(
        encode_attestation_map(&[]),
        encode_cid_list(&["bafytwo", "bafythree"]),
    )
    .await;

    let client = AttestationClient::new().unwrap();
    let cids = client
        .fetch_all_cids(&[endpoint("A", &url_a), endpoint("B", &url_b)])
        .await
        .unwrap();
    assert_eq!(cids, vec!["bafyone", "bafytwo", "bafythree"]);
}
