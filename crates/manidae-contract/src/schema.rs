// crates/manidae-contract/src/schema.rs
// ============================================================================
// Module: Schema Declarations
// Description: Schema shapes advertised to the host during negotiation.
// Purpose: Describe attributes, nested blocks, and function signatures.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Before any read is issued, the host fetches the provider schema: the
//! provider type name, one [`Schema`] per data source, and one
//! [`FunctionSignature`] per provider function. Attribute declarations carry
//! a value type, a behavior mode, and end-user documentation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Attribute Declarations
// ============================================================================

/// Value types an attribute or function parameter can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrType {
    /// UTF-8 string value.
    String,
    /// Arbitrary-precision decimal value.
    Number,
    /// Signed 64-bit integer value.
    Int64,
    /// Dynamically typed value resolved at read time.
    Dynamic,
}

/// Behavior modes for schema attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrMode {
    /// Practitioner must configure the attribute.
    Required,
    /// Practitioner may configure the attribute.
    Optional,
    /// Provider populates the attribute during read.
    Computed,
}

/// Declaration of a single schema attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Attribute name as configured by the practitioner.
    pub name: String,
    /// Value type the attribute carries.
    #[serde(rename = "type")]
    pub attr_type: AttrType,
    /// Behavior mode for the attribute.
    pub mode: AttrMode,
    /// End-user documentation for the attribute.
    pub description: String,
}

impl AttributeSchema {
    /// Declares a required attribute.
    #[must_use]
    pub fn required(name: &str, attr_type: AttrType, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            attr_type,
            mode: AttrMode::Required,
            description: description.to_owned(),
        }
    }

    /// Declares an optional attribute.
    #[must_use]
    pub fn optional(name: &str, attr_type: AttrType, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            attr_type,
            mode: AttrMode::Optional,
            description: description.to_owned(),
        }
    }

    /// Declares a computed attribute.
    #[must_use]
    pub fn computed(name: &str, attr_type: AttrType, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            attr_type,
            mode: AttrMode::Computed,
            description: description.to_owned(),
        }
    }
}

// ============================================================================
// SECTION: Block Declarations
// ============================================================================

/// Nesting modes for schema blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// At most one block instance.
    Single,
    /// Zero or more ordered block instances.
    List,
}

/// Declaration of a nested configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSchema {
    /// Block name as configured by the practitioner.
    pub name: String,
    /// Nesting mode for the block.
    pub kind: BlockKind,
    /// End-user documentation for the block.
    pub description: String,
    /// Attributes declared inside the block.
    pub attributes: Vec<AttributeSchema>,
}

// ============================================================================
// SECTION: Schema Roots
// ============================================================================

/// Schema for a provider or a single data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// End-user documentation for the schema root.
    pub description: String,
    /// Top-level attribute declarations.
    pub attributes: Vec<AttributeSchema>,
    /// Nested block declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockSchema>,
}

/// Schema entry for a single data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSchema {
    /// Full data source type name, including the provider prefix.
    pub type_name: String,
    /// Data source schema.
    pub schema: Schema,
}

/// Complete schema payload advertised during negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Provider type name used as the prefix for data source names.
    pub type_name: String,
    /// Provider build version.
    pub version: String,
    /// Provider-level configuration schema.
    pub provider: Schema,
    /// Schemas for every data source, ordered by type name.
    pub data_sources: Vec<DataSourceSchema>,
    /// Signatures for every provider function, ordered by name.
    pub functions: Vec<FunctionSignature>,
}

// ============================================================================
// SECTION: Function Signatures
// ============================================================================

/// Declaration of a positional function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Parameter name used in diagnostics.
    pub name: String,
    /// Value type the parameter accepts.
    #[serde(rename = "type")]
    pub attr_type: AttrType,
}

/// Signature of a provider function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name as invoked by the practitioner.
    pub name: String,
    /// End-user documentation for the function.
    pub summary: String,
    /// Ordered positional parameters.
    pub parameters: Vec<FunctionParameter>,
    /// Value type of the function result.
    pub return_type: AttrType,
}
