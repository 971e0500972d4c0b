// crates/manidae-provider/src/env_key.rs
// ============================================================================
// Module: Parameter Key Derivation
// Description: Derivation of environment variable names for parameters.
// Purpose: Map parameter names to collision-resistant environment keys.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Parameter names are arbitrary UTF-8 and cannot be used as environment
//! variable names directly. Each name is mapped to a fixed-shape key: the
//! `MANIDAE_PARAMETER_` prefix followed by the lowercase hex SHA-256 digest
//! of the name bytes. The mapping is pure, so equal names always resolve to
//! the same variable and distinct names are collision-resistant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Key Derivation
// ============================================================================

/// Prefix shared by all derived parameter environment variable names.
pub const PARAMETER_ENV_PREFIX: &str = "MANIDAE_PARAMETER_";

/// Derives the environment variable name for a parameter name.
///
/// The result is always the prefix followed by 64 lowercase hex characters.
#[must_use]
pub fn parameter_env_name(parameter_name: &str) -> String {
    let digest = Sha256::digest(parameter_name.as_bytes());
    let mut name = String::with_capacity(PARAMETER_ENV_PREFIX.len() + digest.len() * 2);
    name.push_str(PARAMETER_ENV_PREFIX);
    name.push_str(&hex_encode(&digest));
    name
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
