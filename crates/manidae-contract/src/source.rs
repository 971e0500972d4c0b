// crates/manidae-contract/src/source.rs
// ============================================================================
// Module: Plugin Interfaces
// Description: Traits implemented by data sources and provider functions.
// Purpose: Define the seam between protocol plumbing and resolution logic.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The server dispatches host requests through these traits. A
//! [`DataSource`] resolves read-only state from a host-marshaled
//! configuration payload; a [`ProviderFunction`] computes a pure value from
//! positional arguments. Both report failures as [`Diagnostics`] carried in
//! the response payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::diagnostic::Diagnostics;
use crate::schema::FunctionSignature;
use crate::schema::Schema;
use crate::value::DynamicValue;

// ============================================================================
// SECTION: Data Sources
// ============================================================================

/// Read-only data source exposed through the plugin protocol.
pub trait DataSource {
    /// Returns the full data source type name, including the provider prefix.
    fn type_name(&self) -> &'static str;

    /// Declares the data source schema advertised during negotiation.
    fn schema(&self) -> Schema;

    /// Resolves data source state from a host-marshaled configuration.
    ///
    /// # Errors
    ///
    /// Returns the accumulated [`Diagnostics`] when resolution fails. Errors
    /// never cross the protocol boundary as process aborts.
    fn read(&self, config: &Value) -> Result<Value, Diagnostics>;
}

// ============================================================================
// SECTION: Provider Functions
// ============================================================================

/// Pure provider function exposed through the plugin protocol.
pub trait ProviderFunction {
    /// Returns the function name as invoked by the practitioner.
    fn name(&self) -> &'static str;

    /// Declares the function signature advertised during negotiation.
    fn signature(&self) -> FunctionSignature;

    /// Computes the function result from positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Diagnostics`] when an argument is missing or malformed.
    fn call(&self, arguments: &[DynamicValue]) -> Result<DynamicValue, Diagnostics>;
}
