// crates/manidae-provider/src/mac_address.rs
// ============================================================================
// Module: MAC Address Function
// Description: Deterministic MAC address derivation from namespace and id.
// Purpose: Expose the mapping_mac_address provider function.
// Dependencies: bigdecimal, manidae-contract, sha2, thiserror
// ============================================================================

//! ## Overview
//! `mapping_mac_address(id, namespace)` hashes `namespace + "|" + decimal(id)`
//! with SHA-256 and renders the first six digest bytes as colon-joined
//! lowercase hex octets. The id must be an integer-valued number; the
//! function is otherwise pure and deterministic, so equal inputs always map
//! to the same address.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use manidae_contract::AttrType;
use manidae_contract::Diagnostic;
use manidae_contract::Diagnostics;
use manidae_contract::DynamicValue;
use manidae_contract::FunctionParameter;
use manidae_contract::FunctionSignature;
use manidae_contract::ProviderFunction;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Function name advertised to the host.
pub const MAC_FUNCTION_NAME: &str = "mapping_mac_address";

/// Errors raised when MAC derivation arguments are rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MacAddressError {
    /// Wrong number of positional arguments.
    #[error("expected {expected} arguments, got {actual}")]
    Arity {
        /// Declared parameter count.
        expected: usize,
        /// Received argument count.
        actual: usize,
    },
    /// Id argument is null or unknown.
    #[error("id is required")]
    IdRequired,
    /// Id argument is not an integer-valued number.
    #[error("id must be an integer number")]
    IdNotInteger,
    /// Namespace argument is null or unknown.
    #[error("namespace is required")]
    NamespaceRequired,
    /// Namespace argument is not a string.
    #[error("namespace must be a string")]
    NamespaceNotString,
}

impl MacAddressError {
    /// Returns the stable diagnostic summary for this error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Arity { .. }
            | Self::IdRequired
            | Self::IdNotInteger
            | Self::NamespaceRequired
            | Self::NamespaceNotString => "Invalid argument",
        }
    }
}

impl From<MacAddressError> for Diagnostic {
    fn from(error: MacAddressError) -> Self {
        Self::new(error.summary(), error.to_string())
    }
}

impl From<MacAddressError> for Diagnostics {
    fn from(error: MacAddressError) -> Self {
        Self::from(Diagnostic::from(error))
    }
}

// ============================================================================
// SECTION: Derivation
// ============================================================================

/// Derives the deterministic MAC address for an id and namespace.
///
/// # Errors
///
/// Returns [`MacAddressError::IdNotInteger`] when the id has a fractional
/// part.
pub fn derive_mac_address(id: &BigDecimal, namespace: &str) -> Result<String, MacAddressError> {
    if !id.is_integer() {
        return Err(MacAddressError::IdNotInteger);
    }
    let canonical_id = id.with_scale(0);
    let payload = format!("{namespace}|{canonical_id}");
    let digest = Sha256::digest(payload.as_bytes());
    let octets: Vec<String> = digest[..6].iter().map(|byte| format!("{byte:02x}")).collect();
    Ok(octets.join(":"))
}

// ============================================================================
// SECTION: Provider Function
// ============================================================================

/// Provider function deriving deterministic MAC addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingMacAddressFunction;

impl MappingMacAddressFunction {
    /// Creates the function.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProviderFunction for MappingMacAddressFunction {
    fn name(&self) -> &'static str {
        MAC_FUNCTION_NAME
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            name: MAC_FUNCTION_NAME.to_owned(),
            summary: "Derive a deterministic MAC address from a namespace and numeric identifier."
                .to_owned(),
            parameters: vec![
                FunctionParameter {
                    name: "id".to_owned(),
                    attr_type: AttrType::Number,
                },
                FunctionParameter {
                    name: "namespace".to_owned(),
                    attr_type: AttrType::String,
                },
            ],
            return_type: AttrType::String,
        }
    }

    fn call(&self, arguments: &[DynamicValue]) -> Result<DynamicValue, Diagnostics> {
        if arguments.len() != 2 {
            return Err(MacAddressError::Arity {
                expected: 2,
                actual: arguments.len(),
            }
            .into());
        }
        let id = match &arguments[0] {
            DynamicValue::Number(id) => id,
            DynamicValue::Null | DynamicValue::Unknown => {
                return Err(MacAddressError::IdRequired.into());
            }
            DynamicValue::Bool(_) | DynamicValue::String(_) => {
                return Err(MacAddressError::IdNotInteger.into());
            }
        };
        let namespace = match &arguments[1] {
            DynamicValue::String(namespace) => namespace,
            DynamicValue::Null | DynamicValue::Unknown => {
                return Err(MacAddressError::NamespaceRequired.into());
            }
            DynamicValue::Bool(_) | DynamicValue::Number(_) => {
                return Err(MacAddressError::NamespaceNotString.into());
            }
        };
        let mac = derive_mac_address(id, namespace)?;
        Ok(DynamicValue::String(mac))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
