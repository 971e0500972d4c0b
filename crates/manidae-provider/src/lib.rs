// crates/manidae-provider/src/lib.rs
// ============================================================================
// Module: Manidae Provider Library
// Description: Data sources and functions resolving Manidae platform context.
// Purpose: Resolve parameters and instance context from environment variables.
// Dependencies: bigdecimal, manidae-contract, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! The provider library implements the Manidae resolution pipeline: parameter
//! values read from hashed environment variable keys with typed defaults and
//! validation, instance context read from fixed `MANIDAE_*` variables, and
//! the deterministic MAC address derivation function. Every component reads
//! through an [`EnvironmentSource`] so tests inject fixed environments
//! instead of mutating process state.
//!
//! Security posture: environment values are untrusted input; parsing and
//! validation fail closed with diagnostics instead of panicking.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod env_key;
pub mod environment;
pub mod instance;
pub mod mac_address;
pub mod parameter;
pub mod provider;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env_key::PARAMETER_ENV_PREFIX;
pub use env_key::parameter_env_name;
pub use environment::EnvError;
pub use environment::EnvironmentSource;
pub use instance::ENV_ACTION;
pub use instance::ENV_CONNECTION_ID;
pub use instance::ENV_IDENTITY;
pub use instance::ENV_INSTANCE_ID;
pub use instance::ENV_INSTANCE_STATE;
pub use instance::INSTANCE_TYPE_NAME;
pub use instance::InstanceContext;
pub use instance::InstanceDataSource;
pub use instance::InstanceError;
pub use instance::InstanceState;
pub use mac_address::MAC_FUNCTION_NAME;
pub use mac_address::MacAddressError;
pub use mac_address::MappingMacAddressFunction;
pub use mac_address::derive_mac_address;
pub use parameter::OptionConfig;
pub use parameter::PARAMETER_TYPE_NAME;
pub use parameter::ParameterConfig;
pub use parameter::ParameterDataSource;
pub use parameter::ParameterError;
pub use parameter::ParameterState;
pub use parameter::ParameterType;
pub use parameter::ParameterValue;
pub use parameter::ValidationConfig;
pub use parameter::ValueOrigin;
pub use parameter::parse_parameter_value;
pub use parameter::resolve_parameter_type;
pub use parameter::resolve_parameter_value;
pub use parameter::validate_parameter_value;
pub use provider::ManidaeProvider;
pub use provider::PROVIDER_TYPE_NAME;
pub use provider::ProviderError;
