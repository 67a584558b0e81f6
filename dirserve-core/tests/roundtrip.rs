//! Roundtrip and rejection tests for the wire codec.
//!
//! Each `#[case]` is isolated — no shared state.

use dirserve_core::codec::{decode, encode, CodecError};
use dirserve_core::envelope::{CorrelationId, ReplyEnvelope, RequestEnvelope};
use rstest::rstest;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn minimal_request() -> RequestEnvelope {
    RequestEnvelope {
        id: CorrelationId::from("a1"),
        command: "get".to_string(),
        args: vec![json!("/x/y")],
    }
}

fn empty_args_request() -> RequestEnvelope {
    RequestEnvelope {
        id: CorrelationId::from("ping-7"),
        command: "get".to_string(),
        args: vec![],
    }
}

fn nested_args_request() -> RequestEnvelope {
    RequestEnvelope {
        id: CorrelationId::from("q-42"),
        command: "query".to_string(),
        args: vec![
            json!("shell"),
            json!({"path": "/bin/zsh", "flags": [1, 2, 3], "default": null}),
        ],
    }
}

fn unicode_request() -> RequestEnvelope {
    RequestEnvelope {
        id: CorrelationId::from("идентификатор-🚀"),
        command: "get".to_string(),
        args: vec![json!("/ユーザー/譲"), json!("émojis & spéçïal <>&\"'")],
    }
}

// ---------------------------------------------------------------------------
// Request roundtrips
// ---------------------------------------------------------------------------

#[rstest]
#[case("minimal", minimal_request())]
#[case("empty_args", empty_args_request())]
#[case("nested_args", nested_args_request())]
#[case("unicode", unicode_request())]
fn request_roundtrip(#[case] label: &str, #[case] request: RequestEnvelope) {
    let bytes = encode(&request).unwrap_or_else(|e| panic!("[{label}] encode failed: {e}"));
    let back: RequestEnvelope =
        decode(&bytes).unwrap_or_else(|e| panic!("[{label}] decode failed: {e}"));
    assert_eq!(request, back, "[{label}] roundtrip mismatch");
}

// ---------------------------------------------------------------------------
// Reply roundtrips
// ---------------------------------------------------------------------------

#[rstest]
#[case("single_string", ReplyEnvelope::single(CorrelationId::from("a1"), json!("v")))]
#[case("null_slot", ReplyEnvelope::single(CorrelationId::from("a2"), json!(null)))]
#[case(
    "array_slot",
    ReplyEnvelope::single(CorrelationId::from("a3"), json!([{"uid": 1001}, {"uid": 1002}]))
)]
fn reply_roundtrip(#[case] label: &str, #[case] reply: ReplyEnvelope) {
    let bytes = encode(&reply).unwrap_or_else(|e| panic!("[{label}] encode failed: {e}"));
    let back: ReplyEnvelope =
        decode(&bytes).unwrap_or_else(|e| panic!("[{label}] decode failed: {e}"));
    assert_eq!(reply, back, "[{label}] roundtrip mismatch");
    assert!(!back.results.is_empty(), "[{label}] empty results slot");
}

// ---------------------------------------------------------------------------
// Malformed input is rejected, never partially decoded
// ---------------------------------------------------------------------------

#[rstest]
#[case("not_json", b"probe the directory".as_slice())]
#[case("invalid_utf8", &[0x80, 0x81, 0x82])]
#[case("truncated", br#"{"id":"a1","command":"get","#.as_slice())]
#[case("missing_id", br#"{"command":"get","args":[]}"#.as_slice())]
#[case("missing_command", br#"{"id":"a1","args":[]}"#.as_slice())]
#[case("missing_args", br#"{"id":"a1","command":"get"}"#.as_slice())]
#[case("args_not_array", br#"{"id":"a1","command":"get","args":"/x/y"}"#.as_slice())]
#[case("wrong_root_type", br#"["id","command","args"]"#.as_slice())]
fn malformed_request_rejected(#[case] label: &str, #[case] bytes: &[u8]) {
    match decode::<RequestEnvelope>(bytes) {
        Err(CodecError::Malformed { .. }) => {}
        other => panic!("[{label}] expected malformed error, got {other:?}"),
    }
}
