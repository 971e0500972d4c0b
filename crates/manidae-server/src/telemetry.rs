// crates/manidae-server/src/telemetry.rs
// ============================================================================
// Module: Request Telemetry
// Description: Observability hooks for served plugin requests.
// Purpose: Record per-request events without hard metric dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One [`RequestEvent`] is recorded per served frame. The interface is
//! intentionally dependency-light so deployments can plug in a metrics
//! backend without redesign. Labels come from fixed server constants only;
//! untrusted request text never reaches the sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

// ============================================================================
// SECTION: Event Labels
// ============================================================================

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Request succeeded with no diagnostics.
    Ok,
    /// Request completed but carried resolution diagnostics.
    Diagnostics,
    /// Request was rejected at the protocol layer.
    ProtocolError,
}

impl RequestOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Diagnostics => "diagnostics",
            Self::ProtocolError => "protocol_error",
        }
    }
}

/// Telemetry payload for one served request.
///
/// # Invariants
/// - `subject` is `None` unless a registered data source or function was
///   addressed.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEvent<'a> {
    /// Method label, or `invalid` for undecodable frames.
    pub method: &'a str,
    /// Registered data source or function label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<&'a str>,
    /// Outcome classification.
    pub outcome: RequestOutcome,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink receiving one event per served request.
pub trait RequestLog: Send + Sync {
    /// Records a request event.
    fn record(&self, event: &RequestEvent<'_>);
}

/// Request log writing JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrRequestLog;

impl RequestLog for StderrRequestLog {
    fn record(&self, event: &RequestEvent<'_>) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{payload}");
        }
    }
}

/// No-op request log for tests and embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRequestLog;

impl RequestLog for NoopRequestLog {
    fn record(&self, _event: &RequestEvent<'_>) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
