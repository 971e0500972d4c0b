// crates/manidae-server/src/lib.rs
// ============================================================================
// Module: Manidae Server Library
// Description: Stdio JSON-RPC plugin server for the Manidae provider.
// Purpose: Expose provider schema, reads, and calls over a framed transport.
// Dependencies: manidae-contract, manidae-provider, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The server speaks JSON-RPC 2.0 over stdio with `Content-Length` framing.
//! Three methods are exposed: `schema/get`, `datasource/read`, and
//! `function/call`. Resolution diagnostics travel inside result payloads;
//! JSON-RPC errors are reserved for protocol violations such as malformed
//! envelopes, unknown methods, and oversized frames. The loop is
//! single-threaded and synchronous; EOF on the request stream is a clean
//! shutdown.
//!
//! Security posture: framed input is untrusted; body sizes are bounded
//! before allocation and handling never panics across the boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::DEFAULT_MAX_BODY_BYTES;
pub use config::MAX_BODY_BYTES_LIMIT;
pub use config::ServerConfig;
pub use config::ServerConfigError;
pub use server::METHOD_DATASOURCE_READ;
pub use server::METHOD_FUNCTION_CALL;
pub use server::METHOD_SCHEMA_GET;
pub use server::ProviderServer;
pub use server::ProviderServerError;
pub use telemetry::NoopRequestLog;
pub use telemetry::RequestEvent;
pub use telemetry::RequestLog;
pub use telemetry::RequestOutcome;
pub use telemetry::StderrRequestLog;
