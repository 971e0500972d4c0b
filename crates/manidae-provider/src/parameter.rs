// crates/manidae-provider/src/parameter.rs
// ============================================================================
// Module: Parameter Data Source
// Description: Parameter resolution from hashed environment variable keys.
// Purpose: Resolve typed, validated parameter values with default fallback.
// Dependencies: bigdecimal, manidae-contract, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `manidae_parameter` data source resolves one configuration value per
//! read: the effective type comes from the declaration or the default's
//! shape, the environment key is derived from the parameter name, and the
//! value comes from the environment when the key is present (raw presence,
//! empty string included) or from the type-coerced default otherwise. A
//! validation pass enforces numeric bounds and string option membership.
//! Every stage before validation stops at its first error; validation may
//! accumulate several diagnostics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use manidae_contract::AttrType;
use manidae_contract::AttributeSchema;
use manidae_contract::BlockKind;
use manidae_contract::BlockSchema;
use manidae_contract::DataSource;
use manidae_contract::Diagnostic;
use manidae_contract::Diagnostics;
use manidae_contract::DynamicValue;
use manidae_contract::NumberAttr;
use manidae_contract::Schema;
use manidae_contract::StringAttr;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::env_key::parameter_env_name;
use crate::environment::EnvironmentSource;

// ============================================================================
// SECTION: Parameter Types
// ============================================================================

/// Data source type name advertised to the host.
pub const PARAMETER_TYPE_NAME: &str = "manidae_parameter";

/// Effective parameter type resolved from declaration or default shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Value resolves to a string.
    String,
    /// Value resolves to an arbitrary-precision decimal.
    Number,
}

impl ParameterType {
    /// Returns the canonical lowercase type label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }
}

/// Origin of a resolved parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrigin {
    /// Value came from the derived environment variable.
    Environment,
    /// Value came from the configured default.
    Default,
}

impl ValueOrigin {
    /// Returns the origin label used in parse failure details.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Environment => "environment variable",
            Self::Default => "`default`",
        }
    }
}

/// Resolved parameter value, always known and type-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// Resolved string value.
    String(String),
    /// Resolved decimal value.
    Number(BigDecimal),
}

impl ParameterValue {
    /// Returns the effective type matching this value's shape.
    #[must_use]
    pub const fn parameter_type(&self) -> ParameterType {
        match self {
            Self::String(_) => ParameterType::String,
            Self::Number(_) => ParameterType::Number,
        }
    }

    /// Converts the value into its dynamic wire form.
    #[must_use]
    pub fn into_dynamic(self) -> DynamicValue {
        match self {
            Self::String(value) => DynamicValue::String(value),
            Self::Number(value) => DynamicValue::Number(value),
        }
    }
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Host-marshaled configuration for one parameter read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    /// Parameter name used to derive the environment key.
    #[serde(default)]
    pub name: StringAttr,
    /// Optional human-friendly display name, echoed unchanged.
    #[serde(default)]
    pub display_name: StringAttr,
    /// Optional human-friendly description, echoed unchanged.
    #[serde(default)]
    pub description: StringAttr,
    /// Optional explicit type declaration.
    #[serde(default, rename = "type")]
    pub declared_type: StringAttr,
    /// Optional default value used when the environment key is absent.
    #[serde(default)]
    pub default: DynamicValue,
    /// Numeric validation block; both bounds null when absent.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Ordered string option blocks.
    #[serde(default, rename = "option")]
    pub options: Vec<OptionConfig>,
}

/// Numeric validation bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Inclusive minimum bound.
    #[serde(default)]
    pub min: NumberAttr,
    /// Inclusive maximum bound.
    #[serde(default)]
    pub max: NumberAttr,
}

/// Single allowed-value option entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionConfig {
    /// Optional human-friendly option label.
    #[serde(default)]
    pub name: StringAttr,
    /// Allowed value literal.
    #[serde(default)]
    pub value: StringAttr,
}

/// Resolved parameter state emitted after a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterState {
    /// Internal identifier, same as the name.
    pub id: String,
    /// Parameter name.
    pub name: String,
    /// Echoed display name.
    pub display_name: StringAttr,
    /// Echoed description.
    pub description: StringAttr,
    /// Effective parameter type.
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Echoed default value.
    pub default: DynamicValue,
    /// Resolved value.
    pub value: DynamicValue,
    /// Derived environment variable name.
    pub environment_variable: String,
    /// Origin of the resolved value.
    pub source: ValueOrigin,
    /// Echoed validation bounds.
    pub validation: ValidationConfig,
    /// Echoed option entries.
    #[serde(rename = "option")]
    pub options: Vec<OptionConfig>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving or validating a parameter.
///
/// # Invariants
/// - [`ParameterError::summary`] is stable and matches the user-facing
///   diagnostic titles.
/// - Details name the offending attribute or literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// Host configuration payload did not decode.
    #[error("failed to decode {PARAMETER_TYPE_NAME} configuration: {reason}")]
    ConfigDecode {
        /// Decode failure description.
        reason: String,
    },
    /// Name attribute is null, unknown, or empty.
    #[error("`name` must be a known, non-empty string")]
    NameRequired,
    /// Declared type is unknown.
    #[error("`type` must be known")]
    TypeUnknown,
    /// Declared type is not one of the supported literals.
    #[error("unsupported `type` {declared:?} (supported: \"string\", \"number\")")]
    TypeUnsupported {
        /// Normalized declaration that was rejected.
        declared: String,
    },
    /// Type inference requires a known default.
    #[error("`default` must be known to infer `type`")]
    InferenceDefaultUnknown,
    /// Neither a declaration nor a default is present.
    #[error("`type` is required when `default` is not set")]
    TypeRequired,
    /// Default has a shape the type system cannot infer from.
    #[error("unsupported `default` type (supported: string, number)")]
    InferenceDefaultShape,
    /// Environment key absent and the default is unknown.
    #[error("environment variable {env_name:?} is not set and `default` is unknown")]
    ValueUnknownDefault {
        /// Derived environment variable name.
        env_name: String,
    },
    /// Environment key absent and no default is configured.
    #[error("environment variable {env_name:?} is not set and `default` is not configured")]
    ValueNoDefault {
        /// Derived environment variable name.
        env_name: String,
    },
    /// String-typed parameter with a non-string default.
    #[error("expected `default` to be a string")]
    DefaultNotString,
    /// Number-typed parameter with a non-numeric default.
    #[error("expected `default` to be a number")]
    DefaultNotNumber,
    /// Raw value does not parse as a decimal literal.
    #[error("{} value {raw:?} cannot be parsed as a number", .origin.describe())]
    NumberParse {
        /// Where the raw value came from.
        origin: ValueOrigin,
        /// Offending literal.
        raw: String,
    },
    /// Numeric bounds declared on a string-typed parameter.
    #[error("`validation` is only supported when `type = \"number\"`")]
    ValidationOnString,
    /// Option entry without a known value.
    #[error("option[{index}].value must be set")]
    OptionValueUnset {
        /// Zero-based option position.
        index: usize,
    },
    /// Resolved string absent from the configured option set.
    #[error("value {value:?} is not one of the configured options")]
    ValueNotAllowed {
        /// Resolved value that failed membership.
        value: String,
    },
    /// Option entries declared on a number-typed parameter.
    #[error("`option` blocks are only supported when `type = \"string\"`")]
    OptionsOnNumber,
    /// Declared bound is unknown.
    #[error("`validation.min` and `validation.max` must be known when set")]
    BoundsUnknown,
    /// Declared minimum exceeds the declared maximum.
    #[error("`validation.min` must be <= `validation.max`")]
    BoundsInverted,
    /// Resolved value below the inclusive minimum.
    #[error("value {value} is less than validation.min {min}")]
    BelowMinimum {
        /// Resolved value.
        value: BigDecimal,
        /// Declared minimum.
        min: BigDecimal,
    },
    /// Resolved value above the inclusive maximum.
    #[error("value {value} is greater than validation.max {max}")]
    AboveMaximum {
        /// Resolved value.
        value: BigDecimal,
        /// Declared maximum.
        max: BigDecimal,
    },
}

impl ParameterError {
    /// Returns the stable diagnostic summary for this error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::ConfigDecode { .. } | Self::NameRequired => "Invalid configuration",
            Self::TypeUnknown | Self::TypeUnsupported { .. } => "Invalid type",
            Self::InferenceDefaultUnknown
            | Self::InferenceDefaultShape
            | Self::DefaultNotString
            | Self::DefaultNotNumber => "Invalid default",
            Self::TypeRequired => "Missing type",
            Self::ValueUnknownDefault { .. } | Self::ValueNoDefault { .. } => "Missing value",
            Self::NumberParse { .. } => "Invalid number",
            Self::ValidationOnString | Self::BoundsUnknown | Self::BoundsInverted => {
                "Invalid validation"
            }
            Self::OptionValueUnset { .. } | Self::OptionsOnNumber => "Invalid option",
            Self::ValueNotAllowed { .. } | Self::BelowMinimum { .. } | Self::AboveMaximum { .. } => {
                "Invalid value"
            }
        }
    }
}

impl From<ParameterError> for Diagnostic {
    fn from(error: ParameterError) -> Self {
        Self::new(error.summary(), error.to_string())
    }
}

impl From<ParameterError> for Diagnostics {
    fn from(error: ParameterError) -> Self {
        Self::from(Diagnostic::from(error))
    }
}

// ============================================================================
// SECTION: Type Resolution
// ============================================================================

/// Resolves the effective parameter type from declaration or default shape.
///
/// # Errors
///
/// Returns [`ParameterError`] when the declaration is unknown or
/// unsupported, when inference meets an unknown or unsupported default, or
/// when neither declaration nor default is present.
pub fn resolve_parameter_type(
    declared: &StringAttr,
    default: &DynamicValue,
) -> Result<ParameterType, ParameterError> {
    match declared {
        StringAttr::Unknown => Err(ParameterError::TypeUnknown),
        StringAttr::Value(raw) => {
            let normalized = raw.trim().to_ascii_lowercase();
            match normalized.as_str() {
                "string" => Ok(ParameterType::String),
                "number" => Ok(ParameterType::Number),
                _ => Err(ParameterError::TypeUnsupported {
                    declared: normalized,
                }),
            }
        }
        StringAttr::Null => match default {
            DynamicValue::Unknown => Err(ParameterError::InferenceDefaultUnknown),
            DynamicValue::Null => Err(ParameterError::TypeRequired),
            DynamicValue::String(_) => Ok(ParameterType::String),
            DynamicValue::Number(_) => Ok(ParameterType::Number),
            DynamicValue::Bool(_) => Err(ParameterError::InferenceDefaultShape),
        },
    }
}

// ============================================================================
// SECTION: Value Parsing
// ============================================================================

/// Parses a raw string into a typed value.
///
/// String-typed parameters wrap the raw text as-is. Number-typed parameters
/// parse the trimmed text as an arbitrary-precision decimal literal.
///
/// # Errors
///
/// Returns [`ParameterError::NumberParse`] when a number-typed value does
/// not parse, carrying the origin and the offending literal.
pub fn parse_parameter_value(
    parameter_type: ParameterType,
    raw: &str,
    origin: ValueOrigin,
) -> Result<ParameterValue, ParameterError> {
    match parameter_type {
        ParameterType::String => Ok(ParameterValue::String(raw.to_owned())),
        ParameterType::Number => BigDecimal::from_str(raw.trim())
            .map(ParameterValue::Number)
            .map_err(|_| ParameterError::NumberParse {
                origin,
                raw: raw.to_owned(),
            }),
    }
}

// ============================================================================
// SECTION: Value Resolution
// ============================================================================

/// Resolves the parameter value from the environment or the default.
///
/// The environment wins on raw presence, including a key set to the empty
/// string. An absent key requires a known, non-null default coercible to the
/// effective type; a string default on a number-typed parameter is parsed
/// with origin `default`.
///
/// # Errors
///
/// Returns [`ParameterError`] when the key is absent and the default is
/// unknown, null, or shape-incompatible, or when parsing fails.
pub fn resolve_parameter_value(
    parameter_type: ParameterType,
    env_name: &str,
    default: &DynamicValue,
    env: &EnvironmentSource,
) -> Result<(ParameterValue, ValueOrigin), ParameterError> {
    if let Some(raw) = env.lookup(env_name) {
        let value = parse_parameter_value(parameter_type, &raw, ValueOrigin::Environment)?;
        return Ok((value, ValueOrigin::Environment));
    }
    match default {
        DynamicValue::Unknown => Err(ParameterError::ValueUnknownDefault {
            env_name: env_name.to_owned(),
        }),
        DynamicValue::Null => Err(ParameterError::ValueNoDefault {
            env_name: env_name.to_owned(),
        }),
        DynamicValue::Bool(_) | DynamicValue::String(_) | DynamicValue::Number(_) => {
            let value = coerce_default(parameter_type, default)?;
            Ok((value, ValueOrigin::Default))
        }
    }
}

/// Coerces a known default to the effective type.
///
/// # Errors
///
/// Returns [`ParameterError::DefaultNotString`] or
/// [`ParameterError::DefaultNotNumber`] on shape mismatch, and forwards
/// parse failures for numeric string defaults.
fn coerce_default(
    parameter_type: ParameterType,
    default: &DynamicValue,
) -> Result<ParameterValue, ParameterError> {
    match parameter_type {
        ParameterType::String => match default {
            DynamicValue::String(value) => Ok(ParameterValue::String(value.clone())),
            _ => Err(ParameterError::DefaultNotString),
        },
        ParameterType::Number => match default {
            DynamicValue::Number(value) => Ok(ParameterValue::Number(value.clone())),
            DynamicValue::String(value) => {
                parse_parameter_value(parameter_type, value, ValueOrigin::Default)
            }
            _ => Err(ParameterError::DefaultNotNumber),
        },
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a resolved value against bounds and option rules.
///
/// The value's own shape selects the rule set: string values reject numeric
/// bounds and check option membership; number values reject options and
/// check inclusive bounds with arbitrary-precision comparison. Malformed
/// option entries are all reported and suppress the membership check.
#[must_use]
pub fn validate_parameter_value(
    value: &ParameterValue,
    validation: &ValidationConfig,
    options: &[OptionConfig],
) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    match value {
        ParameterValue::String(text) => {
            let min_set = validation.min.as_value().is_some();
            let max_set = validation.max.as_value().is_some();
            if min_set || max_set {
                diagnostics.push(ParameterError::ValidationOnString.into());
                return diagnostics;
            }
            if options.is_empty() {
                return diagnostics;
            }
            let mut allowed = BTreeSet::new();
            for (index, option) in options.iter().enumerate() {
                match option.value.as_value() {
                    Some(value) => {
                        allowed.insert(value);
                    }
                    None => {
                        diagnostics.push(ParameterError::OptionValueUnset {
                            index,
                        }
                        .into());
                    }
                }
            }
            if !diagnostics.is_empty() {
                return diagnostics;
            }
            if !allowed.contains(text.as_str()) {
                diagnostics.push(ParameterError::ValueNotAllowed {
                    value: text.clone(),
                }
                .into());
            }
            diagnostics
        }
        ParameterValue::Number(number) => {
            if !options.is_empty() {
                diagnostics.push(ParameterError::OptionsOnNumber.into());
                return diagnostics;
            }
            if validation.min.is_unknown() || validation.max.is_unknown() {
                diagnostics.push(ParameterError::BoundsUnknown.into());
                return diagnostics;
            }
            if let (Some(min), Some(max)) = (validation.min.as_value(), validation.max.as_value())
                && min > max
            {
                diagnostics.push(ParameterError::BoundsInverted.into());
                return diagnostics;
            }
            if let Some(min) = validation.min.as_value()
                && number < min
            {
                diagnostics.push(ParameterError::BelowMinimum {
                    value: number.clone(),
                    min: min.clone(),
                }
                .into());
                return diagnostics;
            }
            if let Some(max) = validation.max.as_value()
                && number > max
            {
                diagnostics.push(ParameterError::AboveMaximum {
                    value: number.clone(),
                    max: max.clone(),
                }
                .into());
            }
            diagnostics
        }
    }
}

// ============================================================================
// SECTION: Data Source
// ============================================================================

/// Read-only data source resolving parameter values.
#[derive(Debug, Clone)]
pub struct ParameterDataSource {
    /// Environment the values are read from.
    env: EnvironmentSource,
}

impl ParameterDataSource {
    /// Creates the data source over the given environment.
    #[must_use]
    pub const fn new(env: EnvironmentSource) -> Self {
        Self {
            env,
        }
    }

    /// Runs the full resolution pipeline for one decoded configuration.
    ///
    /// # Errors
    ///
    /// Returns the accumulated [`Diagnostics`]: a single diagnostic for any
    /// stage before validation, possibly several from the validation pass.
    pub fn resolve(&self, config: &ParameterConfig) -> Result<ParameterState, Diagnostics> {
        let name = match config.name.as_value() {
            Some(name) if !name.is_empty() => name,
            Some(_) | None => return Err(ParameterError::NameRequired.into()),
        };
        let parameter_type = resolve_parameter_type(&config.declared_type, &config.default)?;
        let env_name = parameter_env_name(name);
        let (value, source) =
            resolve_parameter_value(parameter_type, &env_name, &config.default, &self.env)?;
        let diagnostics = validate_parameter_value(&value, &config.validation, &config.options);
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }
        Ok(ParameterState {
            id: name.to_owned(),
            name: name.to_owned(),
            display_name: config.display_name.clone(),
            description: config.description.clone(),
            parameter_type,
            default: config.default.clone(),
            value: value.into_dynamic(),
            environment_variable: env_name,
            source,
            validation: config.validation.clone(),
            options: config.options.clone(),
        })
    }
}

impl DataSource for ParameterDataSource {
    fn type_name(&self) -> &'static str {
        PARAMETER_TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema {
            description: "Reads a parameter value from an environment variable derived from \
                          `name`, falling back to `default`."
                .to_owned(),
            attributes: vec![
                AttributeSchema::computed(
                    "id",
                    AttrType::String,
                    "Internal identifier (same as `name`).",
                ),
                AttributeSchema::required(
                    "name",
                    AttrType::String,
                    "Parameter name (used to derive the environment variable key).",
                ),
                AttributeSchema::optional(
                    "display_name",
                    AttrType::String,
                    "Human-friendly display name.",
                ),
                AttributeSchema::optional(
                    "description",
                    AttrType::String,
                    "Human-friendly description.",
                ),
                AttributeSchema::optional(
                    "type",
                    AttrType::String,
                    "Parameter type. Supported values: `string`, `number`. If unset, inferred \
                     from `default`.",
                ),
                AttributeSchema::optional(
                    "default",
                    AttrType::Dynamic,
                    "Default value used when the environment variable is not set.",
                ),
                AttributeSchema::computed(
                    "value",
                    AttrType::Dynamic,
                    "Resolved value (from environment variable if set, otherwise `default`).",
                ),
                AttributeSchema::computed(
                    "environment_variable",
                    AttrType::String,
                    "Environment variable key used to resolve the value.",
                ),
                AttributeSchema::computed(
                    "source",
                    AttrType::String,
                    "Where the value was resolved from: `environment` or `default`.",
                ),
            ],
            blocks: vec![
                BlockSchema {
                    name: "validation".to_owned(),
                    kind: BlockKind::Single,
                    description: "Numeric validation (only valid when `type = \"number\"`)."
                        .to_owned(),
                    attributes: vec![
                        AttributeSchema::optional(
                            "min",
                            AttrType::Number,
                            "Minimum allowed value (inclusive).",
                        ),
                        AttributeSchema::optional(
                            "max",
                            AttrType::Number,
                            "Maximum allowed value (inclusive).",
                        ),
                    ],
                },
                BlockSchema {
                    name: "option".to_owned(),
                    kind: BlockKind::List,
                    description: "Allowed values (enum) when `type = \"string\"`.".to_owned(),
                    attributes: vec![
                        AttributeSchema::optional(
                            "name",
                            AttrType::String,
                            "Human-friendly option label.",
                        ),
                        AttributeSchema::required("value", AttrType::String, "Allowed value."),
                    ],
                },
            ],
        }
    }

    fn read(&self, config: &Value) -> Result<Value, Diagnostics> {
        let config: ParameterConfig =
            serde_json::from_value(config.clone()).map_err(|error| {
                Diagnostics::from(ParameterError::ConfigDecode {
                    reason: error.to_string(),
                })
            })?;
        let state = self.resolve(&config)?;
        serde_json::to_value(&state).map_err(|error| {
            Diagnostics::from(Diagnostic::new(
                "Invalid configuration",
                format!("failed to encode {PARAMETER_TYPE_NAME} state: {error}"),
            ))
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
