// crates/manidae-server/src/server.rs
// ============================================================================
// Module: Plugin Server
// Description: Framed JSON-RPC 2.0 loop over stdio streams.
// Purpose: Dispatch schema, read, and call requests to the provider.
// Dependencies: manidae-contract, manidae-provider, serde, serde_json
// ============================================================================

//! ## Overview
//! [`ProviderServer`] reads `Content-Length`-framed JSON-RPC 2.0 requests
//! from one stream and writes framed responses to another, one request at a
//! time. Resolution diagnostics ride inside `datasource/read` and
//! `function/call` result payloads; JSON-RPC errors cover only protocol
//! violations. Oversized bodies are discarded without allocation beyond a
//! fixed scratch buffer and answered with an error so the session survives.
//! EOF between frames ends the loop cleanly; EOF inside a frame is a
//! transport error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use manidae_contract::Diagnostics;
use manidae_contract::DynamicValue;
use manidae_provider::ManidaeProvider;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::telemetry::RequestEvent;
use crate::telemetry::RequestLog;
use crate::telemetry::RequestOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC protocol version accepted and emitted.
const JSONRPC_VERSION: &str = "2.0";

/// Method returning the aggregated provider schema.
pub const METHOD_SCHEMA_GET: &str = "schema/get";

/// Method reading one data source.
pub const METHOD_DATASOURCE_READ: &str = "datasource/read";

/// Method calling one provider function.
pub const METHOD_FUNCTION_CALL: &str = "function/call";

/// Telemetry label for frames that never decoded into a request.
const LABEL_INVALID: &str = "invalid";

/// Telemetry label for recognized envelopes with unsupported methods.
const LABEL_OTHER: &str = "other";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal server errors ending the serve loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderServerError {
    /// Configuration rejected before serving.
    #[error("config error: {0}")]
    Config(String),
    /// Transport failure on the framed stream.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Builds a transport error with the given detail.
fn transport(message: &str) -> ProviderServerError {
    ProviderServerError::Transport(message.to_owned())
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success envelope.
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error envelope.
    fn failure(id: Value, code: i64, message: &str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.to_owned(),
            }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Parameters for `datasource/read`.
#[derive(Debug, Deserialize)]
struct ReadParams {
    /// Full data source type name.
    type_name: String,
    /// Host-marshaled configuration payload.
    #[serde(default)]
    config: Value,
}

/// Parameters for `function/call`.
#[derive(Debug, Deserialize)]
struct CallParams {
    /// Function name.
    name: String,
    /// Ordered positional arguments.
    #[serde(default)]
    arguments: Vec<DynamicValue>,
}

/// Result payload for `datasource/read`.
#[derive(Debug, Serialize)]
struct ReadResult {
    /// Resolved state when the read succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<Value>,
    /// Diagnostics accumulated during the read.
    diagnostics: Diagnostics,
}

/// Result payload for `function/call`.
#[derive(Debug, Serialize)]
struct CallResult {
    /// Function result when the call succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<DynamicValue>,
    /// Diagnostics accumulated during the call.
    diagnostics: Diagnostics,
}

/// Outcome of dispatching one decoded request.
struct Handled {
    /// Response to frame back to the host.
    response: JsonRpcResponse,
    /// Fixed telemetry label for the method.
    label: &'static str,
    /// Registered data source or function label, when one was addressed.
    subject: Option<&'static str>,
    /// Telemetry outcome classification.
    outcome: RequestOutcome,
}

impl Handled {
    /// Wraps a protocol-level rejection with no addressed subject.
    const fn protocol(response: JsonRpcResponse, label: &'static str) -> Self {
        Self {
            response,
            label,
            subject: None,
            outcome: RequestOutcome::ProtocolError,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Plugin server dispatching framed requests to one provider.
pub struct ProviderServer {
    /// Provider answering schema, read, and call requests.
    provider: ManidaeProvider,
    /// Validated runtime limits.
    config: ServerConfig,
    /// Sink receiving one event per served frame.
    log: Box<dyn RequestLog>,
}

impl ProviderServer {
    /// Builds a server after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderServerError::Config`] when the configuration fails
    /// validation.
    pub fn new(
        provider: ManidaeProvider,
        config: ServerConfig,
        log: Box<dyn RequestLog>,
    ) -> Result<Self, ProviderServerError> {
        config.validate().map_err(|error| ProviderServerError::Config(error.to_string()))?;
        Ok(Self {
            provider,
            config,
            log,
        })
    }

    /// Serves requests over the process stdio streams until EOF.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderServerError`] when the transport fails mid-frame.
    pub fn serve_stdio(&self) -> Result<(), ProviderServerError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.serve(stdin.lock(), &mut stdout)
    }

    /// Serves framed requests from `reader`, writing responses to `writer`.
    ///
    /// Returns cleanly when the reader reaches EOF between frames.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderServerError::Transport`] when a frame is cut short
    /// or a response cannot be written.
    pub fn serve(
        &self,
        reader: impl Read,
        writer: &mut impl Write,
    ) -> Result<(), ProviderServerError> {
        let mut reader = BufReader::new(reader);
        loop {
            let Some(frame) = read_framed(&mut reader, self.config.max_body_bytes)? else {
                return Ok(());
            };
            let (request_bytes, handled) = match frame {
                Frame::Oversized {
                    declared,
                } => (
                    declared,
                    Handled::protocol(
                        JsonRpcResponse::failure(Value::Null, -32070, "request body too large"),
                        LABEL_INVALID,
                    ),
                ),
                Frame::Body(bytes) => {
                    let length = bytes.len();
                    let handled = match serde_json::from_slice::<JsonRpcRequest>(&bytes) {
                        Ok(request) => self.handle_request(request),
                        Err(_) => Handled::protocol(
                            JsonRpcResponse::failure(
                                Value::Null,
                                -32600,
                                "invalid json-rpc request",
                            ),
                            LABEL_INVALID,
                        ),
                    };
                    (length, handled)
                }
            };
            let payload = serde_json::to_vec(&handled.response)
                .map_err(|_| transport("response serialization failed"))?;
            write_framed(writer, &payload)?;
            self.log.record(&RequestEvent {
                method: handled.label,
                subject: handled.subject,
                outcome: handled.outcome,
                request_bytes,
                response_bytes: payload.len(),
            });
        }
    }

    /// Dispatches one decoded request to the provider.
    fn handle_request(&self, request: JsonRpcRequest) -> Handled {
        if request.jsonrpc != JSONRPC_VERSION {
            return Handled::protocol(
                JsonRpcResponse::failure(request.id, -32600, "invalid json-rpc version"),
                LABEL_INVALID,
            );
        }
        match request.method.as_str() {
            METHOD_SCHEMA_GET => self.handle_schema(request.id),
            METHOD_DATASOURCE_READ => self.handle_read(request.id, request.params),
            METHOD_FUNCTION_CALL => self.handle_call(request.id, request.params),
            _ => Handled::protocol(
                JsonRpcResponse::failure(request.id, -32601, "method not found"),
                LABEL_OTHER,
            ),
        }
    }

    /// Answers `schema/get` with the aggregated provider schema.
    fn handle_schema(&self, id: Value) -> Handled {
        match serde_json::to_value(self.provider.provider_schema()) {
            Ok(value) => Handled {
                response: JsonRpcResponse::success(id, value),
                label: METHOD_SCHEMA_GET,
                subject: None,
                outcome: RequestOutcome::Ok,
            },
            Err(_) => Handled::protocol(
                JsonRpcResponse::failure(id, -32060, "serialization failed"),
                METHOD_SCHEMA_GET,
            ),
        }
    }

    /// Answers `datasource/read`, carrying diagnostics in the result.
    fn handle_read(&self, id: Value, params: Option<Value>) -> Handled {
        let params = params.unwrap_or(Value::Null);
        let Ok(params) = serde_json::from_value::<ReadParams>(params) else {
            return Handled::protocol(
                JsonRpcResponse::failure(id, -32602, "invalid read params"),
                METHOD_DATASOURCE_READ,
            );
        };
        let Some(source) = self.provider.data_source(&params.type_name) else {
            return Handled::protocol(
                JsonRpcResponse::failure(id, -32601, "unknown data source"),
                METHOD_DATASOURCE_READ,
            );
        };
        let subject = source.type_name();
        let (state, diagnostics) = match source.read(&params.config) {
            Ok(state) => (Some(state), Diagnostics::new()),
            Err(diagnostics) => (None, diagnostics),
        };
        let outcome = if diagnostics.is_empty() {
            RequestOutcome::Ok
        } else {
            RequestOutcome::Diagnostics
        };
        match serde_json::to_value(ReadResult {
            state,
            diagnostics,
        }) {
            Ok(value) => Handled {
                response: JsonRpcResponse::success(id, value),
                label: METHOD_DATASOURCE_READ,
                subject: Some(subject),
                outcome,
            },
            Err(_) => Handled::protocol(
                JsonRpcResponse::failure(id, -32060, "serialization failed"),
                METHOD_DATASOURCE_READ,
            ),
        }
    }

    /// Answers `function/call`, carrying diagnostics in the result.
    fn handle_call(&self, id: Value, params: Option<Value>) -> Handled {
        let params = params.unwrap_or(Value::Null);
        let Ok(params) = serde_json::from_value::<CallParams>(params) else {
            return Handled::protocol(
                JsonRpcResponse::failure(id, -32602, "invalid call params"),
                METHOD_FUNCTION_CALL,
            );
        };
        let Some(function) = self.provider.function(&params.name) else {
            return Handled::protocol(
                JsonRpcResponse::failure(id, -32601, "unknown function"),
                METHOD_FUNCTION_CALL,
            );
        };
        let subject = function.name();
        let (result, diagnostics) = match function.call(&params.arguments) {
            Ok(result) => (Some(result), Diagnostics::new()),
            Err(diagnostics) => (None, diagnostics),
        };
        let outcome = if diagnostics.is_empty() {
            RequestOutcome::Ok
        } else {
            RequestOutcome::Diagnostics
        };
        match serde_json::to_value(CallResult {
            result,
            diagnostics,
        }) {
            Ok(value) => Handled {
                response: JsonRpcResponse::success(id, value),
                label: METHOD_FUNCTION_CALL,
                subject: Some(subject),
                outcome,
            },
            Err(_) => Handled::protocol(
                JsonRpcResponse::failure(id, -32060, "serialization failed"),
                METHOD_FUNCTION_CALL,
            ),
        }
    }
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// One framed request read from the stream.
#[derive(Debug)]
enum Frame {
    /// Complete body within the configured limit.
    Body(Vec<u8>),
    /// Declared length exceeded the limit; the body was discarded.
    Oversized {
        /// Length the header declared.
        declared: usize,
    },
}

/// Reads one framed payload using `Content-Length` headers.
///
/// Returns `Ok(None)` on EOF before any header byte. Oversized bodies are
/// drained from the stream and reported as [`Frame::Oversized`] so the
/// session can continue.
///
/// # Errors
///
/// Returns [`ProviderServerError::Transport`] on malformed headers or EOF
/// inside a frame.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<Option<Frame>, ProviderServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    let mut in_frame = false;
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line).map_err(|_| transport("stdio read failed"))?;
        if bytes == 0 {
            if in_frame {
                return Err(transport("stdio closed mid-frame"));
            }
            return Ok(None);
        }
        in_frame = true;
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| transport("invalid content length"))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length.ok_or_else(|| transport("missing content length"))?;
    if len > max_body_bytes {
        discard_exact(reader, len)?;
        return Ok(Some(Frame::Oversized {
            declared: len,
        }));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|_| transport("stdio closed mid-frame"))?;
    Ok(Some(Frame::Body(buf)))
}

/// Drains exactly `len` bytes from the reader through a fixed scratch buffer.
///
/// # Errors
///
/// Returns [`ProviderServerError::Transport`] when the stream ends early.
fn discard_exact(
    reader: &mut BufReader<impl Read>,
    len: usize,
) -> Result<(), ProviderServerError> {
    let mut remaining = len;
    let mut scratch = [0u8; 8192];
    while remaining > 0 {
        let chunk = remaining.min(scratch.len());
        reader
            .read_exact(&mut scratch[..chunk])
            .map_err(|_| transport("stdio closed mid-frame"))?;
        remaining -= chunk;
    }
    Ok(())
}

/// Writes one framed payload using `Content-Length` headers.
///
/// # Errors
///
/// Returns [`ProviderServerError::Transport`] when the write fails.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), ProviderServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer.write_all(header.as_bytes()).map_err(|_| transport("stdio write failed"))?;
    writer.write_all(payload).map_err(|_| transport("stdio write failed"))?;
    writer.flush().map_err(|_| transport("stdio write failed"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
