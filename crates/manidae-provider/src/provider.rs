// crates/manidae-provider/src/provider.rs
// ============================================================================
// Module: Provider Registry
// Description: Provider root aggregating data sources and functions.
// Purpose: Route reads and calls by name and assemble the full schema.
// Dependencies: manidae-contract, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ManidaeProvider`] owns every data source and provider function and is
//! the single entry point the server dispatches through. Routing is by
//! exact type or function name; unrecognized names produce diagnostics that
//! list the supported surface instead of failing opaquely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use manidae_contract::DataSource;
use manidae_contract::DataSourceSchema;
use manidae_contract::Diagnostic;
use manidae_contract::Diagnostics;
use manidae_contract::DynamicValue;
use manidae_contract::ProviderFunction;
use manidae_contract::ProviderSchema;
use manidae_contract::Schema;
use serde_json::Value;
use thiserror::Error;

use crate::environment::EnvironmentSource;
use crate::instance::INSTANCE_TYPE_NAME;
use crate::instance::InstanceDataSource;
use crate::mac_address::MAC_FUNCTION_NAME;
use crate::mac_address::MappingMacAddressFunction;
use crate::parameter::PARAMETER_TYPE_NAME;
use crate::parameter::ParameterDataSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provider type name, used as the prefix for data source names.
pub const PROVIDER_TYPE_NAME: &str = "manidae";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a request names surface the provider does not have.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Requested data source type is not registered.
    #[error(
        "unsupported data source {type_name:?} (supported: {INSTANCE_TYPE_NAME:?}, \
         {PARAMETER_TYPE_NAME:?})"
    )]
    UnknownDataSource {
        /// Requested type name.
        type_name: String,
    },
    /// Requested function is not registered.
    #[error("unsupported function {name:?} (supported: {MAC_FUNCTION_NAME:?})")]
    UnknownFunction {
        /// Requested function name.
        name: String,
    },
}

impl ProviderError {
    /// Returns the stable diagnostic summary for this error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::UnknownDataSource { .. } => "Unknown data source",
            Self::UnknownFunction { .. } => "Unknown function",
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(error: ProviderError) -> Self {
        Self::new(error.summary(), error.to_string())
    }
}

impl From<ProviderError> for Diagnostics {
    fn from(error: ProviderError) -> Self {
        Self::from(Diagnostic::from(error))
    }
}

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Provider root holding every registered data source and function.
#[derive(Debug, Clone)]
pub struct ManidaeProvider {
    /// Build version advertised in the schema payload.
    version: String,
    /// Parameter data source.
    parameter: ParameterDataSource,
    /// Instance context data source.
    instance: InstanceDataSource,
    /// MAC address derivation function.
    mac_address: MappingMacAddressFunction,
}

impl ManidaeProvider {
    /// Creates a provider over the given environment.
    #[must_use]
    pub fn new(version: impl Into<String>, env: EnvironmentSource) -> Self {
        Self {
            version: version.into(),
            parameter: ParameterDataSource::new(env.clone()),
            instance: InstanceDataSource::new(env),
            mac_address: MappingMacAddressFunction,
        }
    }

    /// Returns the advertised build version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Looks up a data source by its full type name.
    #[must_use]
    pub fn data_source(&self, type_name: &str) -> Option<&dyn DataSource> {
        match type_name {
            INSTANCE_TYPE_NAME => Some(&self.instance),
            PARAMETER_TYPE_NAME => Some(&self.parameter),
            _ => None,
        }
    }

    /// Looks up a provider function by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&dyn ProviderFunction> {
        match name {
            MAC_FUNCTION_NAME => Some(&self.mac_address),
            _ => None,
        }
    }

    /// Reads a data source, routing by type name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownDataSource`] as diagnostics when the
    /// type name is not registered, and the data source's own diagnostics
    /// when the read fails.
    pub fn read_data_source(
        &self,
        type_name: &str,
        config: &Value,
    ) -> Result<Value, Diagnostics> {
        let source = self
            .data_source(type_name)
            .ok_or_else(|| {
                Diagnostics::from(ProviderError::UnknownDataSource {
                    type_name: type_name.to_owned(),
                })
            })?;
        source.read(config)
    }

    /// Calls a provider function, routing by name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownFunction`] as diagnostics when the
    /// name is not registered, and the function's own diagnostics when the
    /// call fails.
    pub fn call_function(
        &self,
        name: &str,
        arguments: &[DynamicValue],
    ) -> Result<DynamicValue, Diagnostics> {
        let function = self.function(name).ok_or_else(|| {
            Diagnostics::from(ProviderError::UnknownFunction {
                name: name.to_owned(),
            })
        })?;
        function.call(arguments)
    }

    /// Assembles the complete schema payload for negotiation.
    #[must_use]
    pub fn provider_schema(&self) -> ProviderSchema {
        ProviderSchema {
            type_name: PROVIDER_TYPE_NAME.to_owned(),
            version: self.version.clone(),
            provider: Schema {
                description: "Resolves parameters and instance context from environment \
                              variables."
                    .to_owned(),
                attributes: Vec::new(),
                blocks: Vec::new(),
            },
            data_sources: vec![
                DataSourceSchema {
                    type_name: INSTANCE_TYPE_NAME.to_owned(),
                    schema: self.instance.schema(),
                },
                DataSourceSchema {
                    type_name: PARAMETER_TYPE_NAME.to_owned(),
                    schema: self.parameter.schema(),
                },
            ],
            functions: vec![self.mac_address.signature()],
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
