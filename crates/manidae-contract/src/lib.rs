// crates/manidae-contract/src/lib.rs
// ============================================================================
// Module: Manidae Contract Library
// Description: Wire-level value, diagnostic, and schema shapes for Manidae.
// Purpose: Provide the closed type system shared by the provider and server.
// Dependencies: bigdecimal, serde, serde_json
// ============================================================================

//! ## Overview
//! The contract library defines the types exchanged between the Manidae
//! provider and the host runtime that drives it. Attribute values are closed
//! tagged enums with explicit null and unknown states, numbers travel as
//! arbitrary-precision decimals rendered to decimal strings, and failures are
//! reported as [`Diagnostics`] payloads rather than process aborts.
//!
//! Security posture: payloads cross a trust boundary from the host runtime;
//! decoding rejects unrecognized shapes instead of guessing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod diagnostic;
pub mod schema;
pub mod source;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use diagnostic::Diagnostic;
pub use diagnostic::Diagnostics;
pub use schema::AttrMode;
pub use schema::AttrType;
pub use schema::AttributeSchema;
pub use schema::BlockKind;
pub use schema::BlockSchema;
pub use schema::DataSourceSchema;
pub use schema::FunctionParameter;
pub use schema::FunctionSignature;
pub use schema::ProviderSchema;
pub use schema::Schema;
pub use source::DataSource;
pub use source::ProviderFunction;
pub use value::DynamicValue;
pub use value::NumberAttr;
pub use value::StringAttr;
