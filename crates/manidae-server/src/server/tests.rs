// crates/manidae-server/src/server/tests.rs
// ============================================================================
// Module: Plugin Server Tests
// Description: Unit tests for framing, dispatch, and telemetry wiring.
// Purpose: Verify protocol errors, payload diagnostics, and session survival.
// Dependencies: manidae-contract, manidae-provider, serde_json
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions on framed sessions."
)]

use std::collections::BTreeMap;
use std::io::BufReader;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;

use manidae_provider::EnvironmentSource;
use manidae_provider::ManidaeProvider;
use manidae_provider::parameter_env_name;
use serde_json::Value;
use serde_json::json;

use super::Frame;
use super::METHOD_DATASOURCE_READ;
use super::METHOD_FUNCTION_CALL;
use super::METHOD_SCHEMA_GET;
use super::ProviderServer;
use super::ProviderServerError;
use super::read_framed;
use super::write_framed;
use crate::config::ServerConfig;
use crate::telemetry::NoopRequestLog;
use crate::telemetry::RequestEvent;
use crate::telemetry::RequestLog;

/// Request log capturing one formatted line per event.
#[derive(Clone, Default)]
struct RecordingLog {
    /// Captured `method subject outcome` lines.
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingLog {
    /// Returns the captured event lines in record order.
    fn lines(&self) -> Vec<String> {
        self.events.lock().expect("event lock").clone()
    }
}

impl RequestLog for RecordingLog {
    fn record(&self, event: &RequestEvent<'_>) {
        let line = format!(
            "{} {} {}",
            event.method,
            event.subject.unwrap_or("-"),
            event.outcome.as_str()
        );
        self.events.lock().expect("event lock").push(line);
    }
}

/// Builds an environment source from literal name and value pairs.
fn env_with(pairs: &[(String, &str)]) -> EnvironmentSource {
    let map = pairs
        .iter()
        .map(|(name, value)| (name.clone(), (*value).to_owned()))
        .collect::<BTreeMap<_, _>>();
    EnvironmentSource::fixed(map)
}

/// Builds a server over the given environment with default limits.
fn server_with(env: EnvironmentSource) -> ProviderServer {
    ProviderServer::new(
        ManidaeProvider::new("0.0.0-test", env),
        ServerConfig::default(),
        Box::new(NoopRequestLog),
    )
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

/// Serves the given requests over an in-memory session.
fn roundtrip(server: &ProviderServer, requests: &[Value]) -> Vec<Value> {
    let mut input = Vec::new();
    for request in requests {
        input.extend_from_slice(&frame(request));
    }
    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve session");
    decode_frames(&output)
}

/// Builds a JSON-RPC 2.0 request payload.
fn request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

// ============================================================================
// SECTION: Framing
// ============================================================================

/// Verifies a body within the limit is returned whole.
#[test]
fn read_framed_returns_body_within_limit() {
    let mut reader = BufReader::new(Cursor::new(b"Content-Length: 2\r\n\r\nhi".to_vec()));
    let frame = read_framed(&mut reader, 16).expect("frame").expect("some frame");
    match frame {
        Frame::Body(body) => assert_eq!(body, b"hi"),
        Frame::Oversized {
            ..
        } => panic!("body fits the limit"),
    }
}

/// Verifies unrelated header lines are skipped.
#[test]
fn read_framed_ignores_extra_headers() {
    let input = b"Content-Type: application/json\r\nContent-Length: 4\r\n\r\ntrue".to_vec();
    let mut reader = BufReader::new(Cursor::new(input));
    let frame = read_framed(&mut reader, 16).expect("frame").expect("some frame");
    match frame {
        Frame::Body(body) => assert_eq!(body, b"true"),
        Frame::Oversized {
            ..
        } => panic!("body fits the limit"),
    }
}

/// Verifies EOF before any header byte ends the stream cleanly.
#[test]
fn read_framed_reports_clean_eof() {
    let mut reader = BufReader::new(Cursor::new(Vec::new()));
    assert!(read_framed(&mut reader, 16).expect("clean eof").is_none());
}

/// Verifies EOF inside a frame is a transport error.
#[test]
fn eof_inside_frame_is_a_transport_error() {
    let mut reader = BufReader::new(Cursor::new(b"Content-Length: 10\r\n\r\nhi".to_vec()));
    let error = read_framed(&mut reader, 16).expect_err("short body");
    assert_eq!(
        error,
        ProviderServerError::Transport("stdio closed mid-frame".to_owned())
    );

    let mut reader = BufReader::new(Cursor::new(b"Content-Length: 2\r\n".to_vec()));
    let error = read_framed(&mut reader, 16).expect_err("cut headers");
    assert_eq!(
        error,
        ProviderServerError::Transport("stdio closed mid-frame".to_owned())
    );
}

/// Verifies a frame without a length header is rejected.
#[test]
fn missing_length_is_a_transport_error() {
    let mut reader = BufReader::new(Cursor::new(b"X-Meta: 1\r\n\r\n".to_vec()));
    let error = read_framed(&mut reader, 16).expect_err("no length");
    assert_eq!(
        error,
        ProviderServerError::Transport("missing content length".to_owned())
    );
}

/// Verifies a non-numeric length header is rejected.
#[test]
fn malformed_length_is_a_transport_error() {
    let mut reader = BufReader::new(Cursor::new(b"Content-Length: abc\r\n\r\n".to_vec()));
    let error = read_framed(&mut reader, 16).expect_err("bad length");
    assert_eq!(
        error,
        ProviderServerError::Transport("invalid content length".to_owned())
    );
}

/// Verifies oversized bodies are drained and the stream stays aligned.
#[test]
fn oversized_bodies_are_drained_in_place() {
    let mut input = b"Content-Length: 10\r\n\r\n0123456789".to_vec();
    input.extend_from_slice(b"Content-Length: 2\r\n\r\nok");
    let mut reader = BufReader::new(Cursor::new(input));

    let first = read_framed(&mut reader, 4).expect("oversized frame").expect("some frame");
    match first {
        Frame::Oversized {
            declared,
        } => assert_eq!(declared, 10),
        Frame::Body(_) => panic!("body exceeds the limit"),
    }

    let second = read_framed(&mut reader, 4).expect("next frame").expect("some frame");
    match second {
        Frame::Body(body) => assert_eq!(body, b"ok"),
        Frame::Oversized {
            ..
        } => panic!("body fits the limit"),
    }

    assert!(read_framed(&mut reader, 4).expect("clean eof").is_none());
}

/// Verifies written frames carry the exact header shape.
#[test]
fn write_framed_emits_length_header() {
    let mut output = Vec::new();
    write_framed(&mut output, b"{}").expect("write frame");
    assert_eq!(output, b"Content-Length: 2\r\n\r\n{}");
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Verifies `schema/get` reports the full provider surface.
#[test]
fn schema_get_reports_the_full_surface() {
    let server = server_with(env_with(&[]));
    let responses = roundtrip(&server, &[request(1, METHOD_SCHEMA_GET, Value::Null)]);

    assert_eq!(responses.len(), 1);
    let response = &responses[0];
    assert_eq!(response["jsonrpc"], json!("2.0"));
    assert_eq!(response["id"], json!(1));
    assert!(response.get("error").is_none());

    let result = &response["result"];
    assert_eq!(result["type_name"], json!("manidae"));
    let names = result["data_sources"]
        .as_array()
        .expect("data source array")
        .iter()
        .map(|entry| entry["type_name"].clone())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![json!("manidae_instance"), json!("manidae_parameter")]);
    assert_eq!(result["functions"][0]["name"], json!("mapping_mac_address"));
}

/// Verifies a read resolves through the environment and reports no diagnostics.
#[test]
fn parameter_read_resolves_environment_values() {
    let key = parameter_env_name("region");
    let server = server_with(env_with(&[(key.clone(), "us-east-1")]));
    let params = json!({
        "type_name": "manidae_parameter",
        "config": {"name": {"value": "region"}, "type": {"value": "string"}},
    });
    let responses = roundtrip(&server, &[request(4, METHOD_DATASOURCE_READ, params)]);

    let result = &responses[0]["result"];
    assert_eq!(result["diagnostics"], json!([]));
    assert_eq!(result["state"]["name"], json!("region"));
    assert_eq!(result["state"]["value"], json!({"string": "us-east-1"}));
    assert_eq!(result["state"]["source"], json!("environment"));
    assert_eq!(result["state"]["environment_variable"], json!(key));
}

/// Verifies resolution failures ride the result payload, not the error field.
#[test]
fn parameter_read_carries_diagnostics_in_the_result() {
    let server = server_with(env_with(&[]));
    let params = json!({
        "type_name": "manidae_parameter",
        "config": {"name": {"value": "absent"}, "type": {"value": "string"}},
    });
    let responses = roundtrip(&server, &[request(5, METHOD_DATASOURCE_READ, params)]);

    let response = &responses[0];
    assert!(response.get("error").is_none());
    let result = &response["result"];
    assert!(result.get("state").is_none());
    assert_eq!(result["diagnostics"][0]["summary"], json!("Missing value"));
    let detail = result["diagnostics"][0]["detail"].as_str().expect("detail text");
    assert!(detail.contains(&parameter_env_name("absent")));
}

/// Verifies a call derives the documented address for id 1 in `test`.
#[test]
fn function_call_derives_the_documented_vector() {
    let server = server_with(env_with(&[]));
    let params = json!({
        "name": "mapping_mac_address",
        "arguments": [{"number": "1"}, {"string": "test"}],
    });
    let responses = roundtrip(&server, &[request(6, METHOD_FUNCTION_CALL, params)]);

    let result = &responses[0]["result"];
    assert_eq!(result["diagnostics"], json!([]));
    assert_eq!(result["result"], json!({"string": "f9:cc:b0:a8:cd:2b"}));
}

/// Verifies argument failures ride the result payload as diagnostics.
#[test]
fn function_call_reports_argument_diagnostics() {
    let server = server_with(env_with(&[]));
    let params = json!({"name": "mapping_mac_address", "arguments": []});
    let responses = roundtrip(&server, &[request(7, METHOD_FUNCTION_CALL, params)]);

    let result = &responses[0]["result"];
    assert!(result.get("result").is_none());
    assert_eq!(result["diagnostics"][0]["summary"], json!("Invalid argument"));
    assert_eq!(
        result["diagnostics"][0]["detail"],
        json!("expected 2 arguments, got 0")
    );
}

/// Verifies unregistered data sources are protocol errors, not diagnostics.
#[test]
fn unknown_data_source_is_rejected_at_the_protocol_layer() {
    let server = server_with(env_with(&[]));
    let params = json!({"type_name": "manidae_widget", "config": {}});
    let responses = roundtrip(&server, &[request(8, METHOD_DATASOURCE_READ, params)]);

    let response = &responses[0];
    assert!(response.get("result").is_none());
    assert_eq!(response["error"]["code"], json!(-32601));
    assert_eq!(response["error"]["message"], json!("unknown data source"));
}

/// Verifies unregistered functions are protocol errors, not diagnostics.
#[test]
fn unknown_function_is_rejected_at_the_protocol_layer() {
    let server = server_with(env_with(&[]));
    let params = json!({"name": "frobnicate", "arguments": []});
    let responses = roundtrip(&server, &[request(9, METHOD_FUNCTION_CALL, params)]);

    assert_eq!(responses[0]["error"]["code"], json!(-32601));
    assert_eq!(responses[0]["error"]["message"], json!("unknown function"));
}

/// Verifies malformed or absent read params are rejected.
#[test]
fn malformed_read_params_are_rejected() {
    let server = server_with(env_with(&[]));
    let responses = roundtrip(
        &server,
        &[
            request(10, METHOD_DATASOURCE_READ, json!({"config": {}})),
            json!({"jsonrpc": "2.0", "id": 11, "method": METHOD_DATASOURCE_READ}),
        ],
    );

    for response in &responses {
        assert_eq!(response["error"]["code"], json!(-32602));
        assert_eq!(response["error"]["message"], json!("invalid read params"));
    }
}

/// Verifies a non-2.0 envelope is rejected with the request id echoed.
#[test]
fn wrong_jsonrpc_version_is_rejected() {
    let server = server_with(env_with(&[]));
    let payload = json!({"jsonrpc": "1.0", "id": 12, "method": METHOD_SCHEMA_GET});
    let responses = roundtrip(&server, &[payload]);

    let response = &responses[0];
    assert_eq!(response["id"], json!(12));
    assert_eq!(response["error"]["code"], json!(-32600));
    assert_eq!(response["error"]["message"], json!("invalid json-rpc version"));
}

/// Verifies unsupported methods answer method-not-found.
#[test]
fn unknown_method_is_rejected() {
    let server = server_with(env_with(&[]));
    let responses = roundtrip(&server, &[request(13, "noop", Value::Null)]);

    assert_eq!(responses[0]["error"]["code"], json!(-32601));
    assert_eq!(responses[0]["error"]["message"], json!("method not found"));
}

/// Verifies undecodable bodies answer with a null id.
#[test]
fn undecodable_frames_answer_with_null_id() {
    let server = server_with(env_with(&[]));
    let mut output = Vec::new();
    server
        .serve(Cursor::new(b"Content-Length: 8\r\n\r\nnot json".to_vec()), &mut output)
        .expect("serve session");

    let responses = decode_frames(&output);
    let response = &responses[0];
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["error"]["code"], json!(-32600));
    assert_eq!(response["error"]["message"], json!("invalid json-rpc request"));
}

/// Verifies an oversized request is answered and the session continues.
#[test]
fn oversized_requests_do_not_end_the_session() {
    let log = RecordingLog::default();
    let server = ProviderServer::new(
        ManidaeProvider::new("0.0.0-test", env_with(&[])),
        ServerConfig {
            max_body_bytes: 64,
        },
        Box::new(log.clone()),
    )
    .expect("valid server config");

    let mut input = format!("Content-Length: 100\r\n\r\n{}", "x".repeat(100)).into_bytes();
    input.extend_from_slice(&frame(&request(14, METHOD_SCHEMA_GET, Value::Null)));
    let mut output = Vec::new();
    server.serve(Cursor::new(input), &mut output).expect("serve session");

    let responses = decode_frames(&output);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], json!(-32070));
    assert_eq!(responses[0]["error"]["message"], json!("request body too large"));
    assert_eq!(responses[1]["result"]["type_name"], json!("manidae"));

    assert_eq!(
        log.lines(),
        vec!["invalid - protocol_error".to_owned(), "schema/get - ok".to_owned()]
    );
}

/// Verifies log events carry registered subject labels and outcomes.
#[test]
fn request_log_labels_registered_subjects() {
    let key = parameter_env_name("region");
    let log = RecordingLog::default();
    let server = ProviderServer::new(
        ManidaeProvider::new("0.0.0-test", env_with(&[(key, "us-east-1")])),
        ServerConfig::default(),
        Box::new(log.clone()),
    )
    .expect("valid server config");

    let read = json!({
        "type_name": "manidae_parameter",
        "config": {"name": {"value": "region"}, "type": {"value": "string"}},
    });
    let missing = json!({
        "type_name": "manidae_parameter",
        "config": {"name": {"value": "absent"}, "type": {"value": "string"}},
    });
    let call = json!({
        "name": "mapping_mac_address",
        "arguments": [{"number": "1"}, {"string": "test"}],
    });
    roundtrip(
        &server,
        &[
            request(15, METHOD_DATASOURCE_READ, read),
            request(16, METHOD_DATASOURCE_READ, missing),
            request(17, METHOD_FUNCTION_CALL, call),
            request(18, "noop", Value::Null),
        ],
    );

    assert_eq!(
        log.lines(),
        vec![
            "datasource/read manidae_parameter ok".to_owned(),
            "datasource/read manidae_parameter diagnostics".to_owned(),
            "function/call mapping_mac_address ok".to_owned(),
            "other - protocol_error".to_owned(),
        ]
    );
}

/// Verifies configuration validation happens before serving.
#[test]
fn invalid_configuration_is_rejected_before_serving() {
    let error = ProviderServer::new(
        ManidaeProvider::new("0.0.0-test", env_with(&[])),
        ServerConfig {
            max_body_bytes: 0,
        },
        Box::new(NoopRequestLog),
    )
    .map(|_| ())
    .expect_err("zero limit");

    assert_eq!(
        error,
        ProviderServerError::Config(
            "invalid server configuration: max_body_bytes must be greater than zero".to_owned()
        )
    );
}
