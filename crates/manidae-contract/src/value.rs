// crates/manidae-contract/src/value.rs
// ============================================================================
// Module: Attribute Values
// Description: Tri-state attribute values exchanged with the host runtime.
// Purpose: Model host-marshaled values as closed tagged enums.
// Dependencies: bigdecimal, serde
// ============================================================================

//! ## Overview
//! Host runtimes marshal every attribute in one of three states: explicitly
//! null, unknown (not yet resolved by the host), or known with a typed
//! payload. Scalar attributes are modeled by [`StringAttr`] and
//! [`NumberAttr`]; dynamically typed attributes by [`DynamicValue`]. Numeric
//! payloads are arbitrary-precision decimals and travel as decimal strings so
//! no fixed-width float representation ever enters the pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Decimal Encoding
// ============================================================================

/// Serde adapter rendering decimals as exact decimal strings on the wire.
mod decimal_text {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use serde::de::Error as DeError;

    /// Serializes a decimal as its plain decimal string rendering.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the underlying serializer.
    pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Deserializes a decimal from its decimal string rendering.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the payload is not a string or
    /// does not parse as a decimal literal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        BigDecimal::from_str(&text)
            .map_err(|error| DeError::custom(format!("invalid decimal literal {text:?}: {error}")))
    }
}

// ============================================================================
// SECTION: String Attributes
// ============================================================================

/// Tri-state string attribute.
///
/// Serialized as `"null"`, `"unknown"`, or `{"value": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringAttr {
    /// Attribute is not configured.
    #[default]
    Null,
    /// Attribute value has not been resolved by the host yet.
    Unknown,
    /// Known string payload.
    Value(String),
}

impl StringAttr {
    /// Returns the known payload, if any.
    #[must_use]
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Returns true when the attribute is explicitly null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true when the attribute is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<String> for StringAttr {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for StringAttr {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}

// ============================================================================
// SECTION: Number Attributes
// ============================================================================

/// Tri-state arbitrary-precision number attribute.
///
/// Serialized as `"null"`, `"unknown"`, or `{"value": "<decimal>"}` with the
/// payload rendered as a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberAttr {
    /// Attribute is not configured.
    #[default]
    Null,
    /// Attribute value has not been resolved by the host yet.
    Unknown,
    /// Known decimal payload.
    Value(#[serde(with = "decimal_text")] BigDecimal),
}

impl NumberAttr {
    /// Returns the known payload, if any.
    #[must_use]
    pub const fn as_value(&self) -> Option<&BigDecimal> {
        match self {
            Self::Value(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Returns true when the attribute is explicitly null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true when the attribute is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<BigDecimal> for NumberAttr {
    fn from(value: BigDecimal) -> Self {
        Self::Value(value)
    }
}

// ============================================================================
// SECTION: Dynamic Values
// ============================================================================

/// Dynamically typed attribute value.
///
/// Serialized as `"null"`, `"unknown"`, `{"bool": true}`, `{"string": "..."}`,
/// or `{"number": "<decimal>"}`. The variant set is closed: any other payload
/// shape is a decode error, never a silent coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicValue {
    /// Attribute is not configured.
    #[default]
    Null,
    /// Attribute value has not been resolved by the host yet.
    Unknown,
    /// Known boolean payload.
    Bool(bool),
    /// Known string payload.
    String(String),
    /// Known arbitrary-precision decimal payload.
    Number(#[serde(with = "decimal_text")] BigDecimal),
}

impl DynamicValue {
    /// Returns true when the attribute is explicitly null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true when the attribute is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns a stable label describing the payload shape.
    ///
    /// Used in diagnostic detail text when a value has an unsupported shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Unknown => "unknown",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Number(_) => "number",
        }
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<BigDecimal> for DynamicValue {
    fn from(value: BigDecimal) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
