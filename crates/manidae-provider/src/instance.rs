// crates/manidae-provider/src/instance.rs
// ============================================================================
// Module: Instance Data Source
// Description: Read-only data source for Manidae instance context.
// Purpose: Resolve instance identity and state from fixed environment keys.
// Dependencies: manidae-contract, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `manidae_instance` data source reads the five fixed `MANIDAE_*`
//! variables in declared order, short-circuiting at the first missing or
//! invalid one. The instance state must be `on` or `off` (case-insensitive
//! after trimming) and derives `start_count`: 1 when on, 0 when off. The
//! result is a fresh snapshot per read with no retained state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use manidae_contract::AttrType;
use manidae_contract::AttributeSchema;
use manidae_contract::DataSource;
use manidae_contract::Diagnostic;
use manidae_contract::Diagnostics;
use manidae_contract::Schema;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::environment::EnvironmentSource;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Data source type name advertised to the host.
pub const INSTANCE_TYPE_NAME: &str = "manidae_instance";

/// Variable holding the numeric instance identifier.
pub const ENV_INSTANCE_ID: &str = "MANIDAE_INSTANCE_ID";

/// Variable holding the connection identifier.
pub const ENV_CONNECTION_ID: &str = "MANIDAE_CONNECTION_ID";

/// Variable holding the caller identity.
pub const ENV_IDENTITY: &str = "MANIDAE_IDENTITY";

/// Variable holding the requested action.
pub const ENV_ACTION: &str = "MANIDAE_ACTION";

/// Variable holding the instance power state.
pub const ENV_INSTANCE_STATE: &str = "MANIDAE_INSTANCE_STATE";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when instance context cannot be derived.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InstanceError {
    /// State value is neither `on` nor `off`.
    #[error("MANIDAE_INSTANCE_STATE must be either \"on\" or \"off\"")]
    InvalidState,
}

impl InstanceError {
    /// Returns the stable diagnostic summary for this error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::InvalidState => "Invalid instance state",
        }
    }
}

impl From<InstanceError> for Diagnostic {
    fn from(error: InstanceError) -> Self {
        Self::new(error.summary(), error.to_string())
    }
}

// ============================================================================
// SECTION: Instance State
// ============================================================================

/// Power state of the Manidae instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    /// Instance is running.
    On,
    /// Instance is stopped.
    Off,
}

impl InstanceState {
    /// Parses a state value, trimming and ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::InvalidState`] for anything other than `on`
    /// or `off`.
    pub fn parse(raw: &str) -> Result<Self, InstanceError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(InstanceError::InvalidState),
        }
    }

    /// Returns the derived start count: 1 when on, 0 when off.
    #[must_use]
    pub const fn start_count(self) -> i64 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }

    /// Returns the canonical lowercase state label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

// ============================================================================
// SECTION: Instance Context
// ============================================================================

/// Snapshot of instance context resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceContext {
    /// Numeric instance identifier.
    pub id: i64,
    /// Connection identifier.
    pub connection_id: String,
    /// Caller identity.
    pub identity: String,
    /// Requested action.
    pub action: String,
    /// Instance power state.
    pub state: InstanceState,
    /// Derived start count.
    pub start_count: i64,
}

// ============================================================================
// SECTION: Data Source
// ============================================================================

/// Read-only data source resolving instance context.
#[derive(Debug, Clone)]
pub struct InstanceDataSource {
    /// Environment the context is read from.
    env: EnvironmentSource,
}

impl InstanceDataSource {
    /// Creates the data source over the given environment.
    #[must_use]
    pub const fn new(env: EnvironmentSource) -> Self {
        Self {
            env,
        }
    }

    /// Reads the instance context, stopping at the first failure.
    ///
    /// Variables are checked in declared order: id, connection id, identity,
    /// action, state.
    ///
    /// # Errors
    ///
    /// Returns the diagnostic for the first missing or invalid variable.
    pub fn read_context(&self) -> Result<InstanceContext, Diagnostic> {
        let id = self.env.required_id(ENV_INSTANCE_ID)?;
        let connection_id = self.env.required_string(ENV_CONNECTION_ID)?;
        let identity = self.env.required_string(ENV_IDENTITY)?;
        let action = self.env.required_string(ENV_ACTION)?;
        let raw_state = self.env.required_string(ENV_INSTANCE_STATE)?;
        let state = InstanceState::parse(&raw_state)?;
        Ok(InstanceContext {
            id,
            connection_id,
            identity,
            action,
            state,
            start_count: state.start_count(),
        })
    }
}

impl DataSource for InstanceDataSource {
    fn type_name(&self) -> &'static str {
        INSTANCE_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema {
            description: "Reads Manidae instance context from environment variables.".to_owned(),
            attributes: vec![
                AttributeSchema::computed(
                    "id",
                    AttrType::Int64,
                    "Instance ID from `MANIDAE_INSTANCE_ID` (must be a non-negative integer).",
                ),
                AttributeSchema::computed(
                    "connection_id",
                    AttrType::String,
                    "Connection ID from `MANIDAE_CONNECTION_ID`.",
                ),
                AttributeSchema::computed(
                    "identity",
                    AttrType::String,
                    "Identity from `MANIDAE_IDENTITY`.",
                ),
                AttributeSchema::computed(
                    "action",
                    AttrType::String,
                    "Action from `MANIDAE_ACTION`.",
                ),
                AttributeSchema::computed(
                    "state",
                    AttrType::String,
                    "Instance state from `MANIDAE_INSTANCE_STATE` (`on` or `off`).",
                ),
                AttributeSchema::computed(
                    "start_count",
                    AttrType::Int64,
                    "Derived from `state`: `1` when `on`, otherwise `0`.",
                ),
            ],
            blocks: Vec::new(),
        }
    }

    fn read(&self, _config: &Value) -> Result<Value, Diagnostics> {
        let context = self.read_context().map_err(Diagnostics::from)?;
        serde_json::to_value(&context).map_err(|error| {
            Diagnostics::from(Diagnostic::new(
                "Invalid configuration",
                format!("failed to encode {INSTANCE_TYPE_NAME} state: {error}"),
            ))
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
