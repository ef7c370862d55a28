//! Verify request building and response decoding against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Request bodies are compared as parsed JSON, not raw strings, to avoid false
//! negatives from field ordering.

use bytes::Bytes;
use jsonist_core::{decode, request, ErrorKind, HttpMethod, OutboundBody, RequestBody, ResponseMeta};

const URL: &str = "http://localhost:3000/items";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_headers(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

/// Depth of the first-element path through nested arrays.
fn nesting(value: &serde_json::Value) -> u64 {
    match value.as_array().and_then(|a| a.first()) {
        Some(inner) => 1 + nesting(inner),
        None => 1,
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());
        let headers = parse_headers(&case["headers"]);
        let body = case.get("body").cloned().map(RequestBody::Json);

        let req = request::build(method, request::parse_target(URL).unwrap(), body, &headers);
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url.as_str(), URL, "{name}: url");
        assert_eq!(req.headers, parse_headers(&case["expected_headers"]), "{name}: headers");

        match (req.body, case.get("expected_body")) {
            (None, None) => {}
            (Some(OutboundBody::Full(bytes)), Some(expected)) => {
                let sent: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
                assert_eq!(&sent, expected, "{name}: body");
            }
            (body, expected) => panic!("{name}: body {body:?}, expected {expected:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap().to_string();
        let result = decode(ResponseMeta::new(status), Bytes::from(body.clone()));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            let kind = match expected_error.as_str().unwrap() {
                "Http" => ErrorKind::Http,
                "Parse" => ErrorKind::Parse,
                other => panic!("{name}: unknown expected_error: {other}"),
            };
            assert_eq!(err.kind(), kind, "{name}: kind");
            assert_eq!(err.status_code(), Some(status), "{name}: status");
            assert_eq!(err.data().map(|d| d.as_ref()), Some(body.as_bytes()), "{name}: raw body");
            assert!(err.message().contains("JSON"), "{name}: message");
        } else {
            let reply = result.unwrap();
            assert_eq!(reply.response.status_code, status, "{name}: status");
            if case.get("expected_empty").is_some() {
                assert_eq!(reply.data, None, "{name}: data");
            } else if let Some(depth) = case.get("expected_depth") {
                assert_eq!(Some(nesting(reply.data.as_ref().unwrap())), depth.as_u64(), "{name}: depth");
            } else {
                assert_eq!(reply.data.as_ref(), Some(&case["expected_data"]), "{name}: data");
            }
        }
    }
}
