// crates/manidae-server/tests/rpc.rs
// ============================================================================
// Module: RPC Session Tests
// Description: End-to-end framed sessions against a live provider.
// Purpose: Verify multi-request dispatch, recovery, and clean shutdown.
// ============================================================================

//! ## Overview
//! Drives [`manidae_server::ProviderServer`] over in-memory streams with a
//! fully populated environment, covering every exposed method in one
//! session, recovery after malformed frames, and the EOF shutdown contract.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::io::Cursor;

use manidae_provider::ENV_ACTION;
use manidae_provider::ENV_CONNECTION_ID;
use manidae_provider::ENV_IDENTITY;
use manidae_provider::ENV_INSTANCE_ID;
use manidae_provider::ENV_INSTANCE_STATE;
use manidae_provider::EnvironmentSource;
use manidae_provider::ManidaeProvider;
use manidae_provider::parameter_env_name;
use manidae_server::METHOD_DATASOURCE_READ;
use manidae_server::METHOD_FUNCTION_CALL;
use manidae_server::METHOD_SCHEMA_GET;
use manidae_server::NoopRequestLog;
use manidae_server::ProviderServer;
use manidae_server::ProviderServerError;
use manidae_server::ServerConfig;
use serde_json::Value;
use serde_json::json;

/// Builds a server over an environment holding instance and parameter state.
fn populated_server() -> ProviderServer {
    let mut vars = BTreeMap::from([
        (ENV_INSTANCE_ID.to_owned(), "42".to_owned()),
        (ENV_CONNECTION_ID.to_owned(), "conn-7f".to_owned()),
        (ENV_IDENTITY.to_owned(), "bot@example.test".to_owned()),
        (ENV_ACTION.to_owned(), "deploy".to_owned()),
        (ENV_INSTANCE_STATE.to_owned(), "on".to_owned()),
    ]);
    vars.insert(parameter_env_name("region"), "us-east-1".to_owned());
    let provider = ManidaeProvider::new("1.0.0", EnvironmentSource::fixed(vars));
    ProviderServer::new(provider, ServerConfig::default(), Box::new(NoopRequestLog))
        .expect("valid server config")
}

/// Encodes one framed request payload.
fn frame(payload: &Value) -> Vec<u8> {
    let body = serde_json::to_vec(payload).expect("encode request");
    let mut bytes = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
    bytes.extend_from_slice(&body);
    bytes
}

/// Decodes every framed response from captured output bytes.
fn decode_frames(mut output: &[u8]) -> Vec<Value> {
    let mut frames = Vec::new();
    while !output.is_empty() {
        let text = std::str::from_utf8(output).expect("utf-8 output");
        let header_end = text.find("\r\n\r\n").expect("header terminator") + 4;
        let length = text[..header_end]
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length:"))
            .expect("length header")
            .trim()
            .parse::<usize>()
            .expect("numeric length");
        let body = &output[header_end..header_end + length];
        frames.push(serde_json::from_slice(body).expect("decode response"));
        output = &output[header_end + length..];
    }
    frames
}

#[test]
fn full_session_round_trips_every_method() {
    let server = populated_server();
    let mut input = Vec::new();
    input.extend_from_slice(&frame(&json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": METHOD_SCHEMA_GET,
    })));
    input.extend_from_slice(&frame(&json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": METHOD_DATASOURCE_READ,
        "params": {"type_name": "manidae_instance", "config": {}},
    })));
    input.extend_from_slice(&frame(&json!({
        "jsonrpc": "2.0",
        "id": 3,
        "method": METHOD_DATASOURCE_READ,
        "params": {
            "type_name": "manidae_parameter",
            "config": {"name": {"value": "region"}, "type": {"value": "string"}},
        },
    })));
    input.extend_from_slice(&frame(&json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": METHOD_FUNCTION_CALL,
        "params": {
            "name": "mapping_mac_address",
            "arguments": [{"number": "1"}, {"string": "test"}],
        },
    })));

    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve session");
    let responses = decode_frames(&output);
    assert_eq!(responses.len(), 4);

    let schema = &responses[0]["result"];
    assert_eq!(schema["type_name"], json!("manidae"));
    assert_eq!(schema["version"], json!("1.0.0"));

    let instance = &responses[1]["result"];
    assert_eq!(instance["diagnostics"], json!([]));
    assert_eq!(
        instance["state"],
        json!({
            "id": 42,
            "connection_id": "conn-7f",
            "identity": "bot@example.test",
            "action": "deploy",
            "state": "on",
            "start_count": 1,
        })
    );

    let parameter = &responses[2]["result"];
    assert_eq!(parameter["diagnostics"], json!([]));
    assert_eq!(parameter["state"]["value"], json!({"string": "us-east-1"}));
    assert_eq!(parameter["state"]["source"], json!("environment"));

    let call = &responses[3]["result"];
    assert_eq!(call["diagnostics"], json!([]));
    assert_eq!(call["result"], json!({"string": "f9:cc:b0:a8:cd:2b"}));
}

#[test]
fn resolution_failures_stay_inside_the_result_payload() {
    let server = populated_server();
    let input = frame(&json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": METHOD_DATASOURCE_READ,
        "params": {
            "type_name": "manidae_parameter",
            "config": {"name": {"value": "absent"}, "type": {"value": "string"}},
        },
    }));

    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve session");
    let responses = decode_frames(&output);

    let response = &responses[0];
    assert!(response.get("error").is_none());
    assert!(response["result"].get("state").is_none());
    assert_eq!(
        response["result"]["diagnostics"][0]["summary"],
        json!("Missing value")
    );
}

#[test]
fn malformed_frame_is_answered_and_stream_continues() {
    let server = populated_server();
    let mut input = b"Content-Length: 9\r\n\r\nnot json!".to_vec();
    input.extend_from_slice(&frame(&json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": METHOD_SCHEMA_GET,
    })));

    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve session");
    let responses = decode_frames(&output);
    assert_eq!(responses.len(), 2);

    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], json!(-32600));
    assert_eq!(responses[1]["id"], json!(2));
    assert_eq!(responses[1]["result"]["type_name"], json!("manidae"));
}

#[test]
fn session_ends_cleanly_on_eof() {
    let server = populated_server();
    let mut output = Vec::new();
    server.serve(Cursor::new(Vec::new()), &mut output).expect("clean shutdown");
    assert!(output.is_empty());
}

#[test]
fn truncated_frame_is_a_transport_error() {
    let server = populated_server();
    let mut output = Vec::new();
    let error = server
        .serve(Cursor::new(b"Content-Length: 50\r\n\r\n{\"jsonrpc\"".to_vec()), &mut output)
        .expect_err("short body");
    assert_eq!(
        error,
        ProviderServerError::Transport("stdio closed mid-frame".to_owned())
    );
}
