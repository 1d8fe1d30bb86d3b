//! Token encoding at the session-record boundary.
//!
//! The policy layer stores encoded tokens in session records; these tests
//! pin the shapes that cross that boundary.

use peer_identity::{AuditToken, EncodingError, ENCODED_LEN};

fn sample() -> AuditToken {
    AuditToken {
        pid: 512,
        pid_generation: 0x00c0_ffee,
        uid: 501,
        gid: 20,
    }
}

#[test]
fn test_serde_roundtrip_for_session_records() {
    let token = sample();
    let json = serde_json::to_string(&token).unwrap();
    let back: AuditToken = serde_json::from_str(&json).unwrap();
    assert_eq!(token, back);
}

#[test]
fn test_serde_field_names_are_stable() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["pid"], 512);
    assert_eq!(json["pid_generation"], 0x00c0_ffee);
    assert_eq!(json["uid"], 501);
    assert_eq!(json["gid"], 20);
}

#[test]
fn test_display_matches_encoding_hex() {
    let token = sample();
    let rendered = token.to_string();
    assert_eq!(rendered, hex::encode(token.encode()));
    // Little-endian pid 512 leads the rendering.
    assert!(rendered.starts_with("0002"));
}

#[test]
fn test_truncated_record_is_rejected_whole() {
    let encoded = sample().encode();
    let result = AuditToken::decode(&encoded[..ENCODED_LEN - 1]);
    assert!(matches!(
        result,
        Err(EncodingError::MalformedEncoding {
            expected: ENCODED_LEN,
            actual,
        }) if actual == ENCODED_LEN - 1
    ));
}
