// crates/manidae-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: Runtime limits for the stdio plugin server.
// Purpose: Validate transport limits before any frame is read.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The server carries no configuration file; [`ServerConfig`] holds the one
//! runtime limit, the maximum framed body size, with defaults that work
//! unmodified. [`ServerConfig::validate`] fails closed on out-of-range
//! values before the server touches the stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum framed body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Hard upper bound accepted for `max_body_bytes`.
pub const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when server configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerConfigError {
    /// Configuration value is outside the accepted range.
    #[error("invalid server configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Runtime configuration for the stdio plugin server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Maximum framed body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Validates the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`ServerConfigError::Invalid`] when `max_body_bytes` is zero
    /// or exceeds [`MAX_BODY_BYTES_LIMIT`].
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ServerConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_owned(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ServerConfigError::Invalid(format!(
                "max_body_bytes must not exceed {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
