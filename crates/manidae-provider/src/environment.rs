// crates/manidae-provider/src/environment.rs
// ============================================================================
// Module: Environment Source
// Description: Abstraction over process environment variable lookups.
// Purpose: Provide deterministic, injectable access to environment state.
// Dependencies: manidae-contract, thiserror
// ============================================================================

//! ## Overview
//! Every environment read in the provider goes through an
//! [`EnvironmentSource`]. The process-backed source reads live variables; the
//! fixed source resolves from an override map so tests and replay never touch
//! process state. Lookup trims surrounding whitespace but reports raw
//! presence: a variable set to the empty string is present, which downstream
//! parameter resolution must distinguish from an unset variable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::num::ParseIntError;

use manidae_contract::Diagnostic;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a required environment variable cannot be read.
///
/// # Invariants
/// - Each variant renders the variable name in its detail text.
/// - [`EnvError::summary`] is stable across releases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// Variable is unset or blank after trimming.
    #[error("{name:?} must be set")]
    Missing {
        /// Environment variable name.
        name: String,
    },
    /// Variable does not parse as an unsigned decimal integer.
    #[error("{name:?} must be a non-negative integer: {reason}")]
    NotAnInteger {
        /// Environment variable name.
        name: String,
        /// Parse failure description.
        reason: String,
    },
    /// Variable parses but exceeds the signed 64-bit range.
    #[error("{name:?} is too large to fit into a signed 64-bit integer")]
    TooLarge {
        /// Environment variable name.
        name: String,
    },
}

impl EnvError {
    /// Returns the stable diagnostic summary for this error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "Missing environment variable",
            Self::NotAnInteger { .. } | Self::TooLarge { .. } => "Invalid environment variable",
        }
    }
}

impl From<EnvError> for Diagnostic {
    fn from(error: EnvError) -> Self {
        Self::new(error.summary(), error.to_string())
    }
}

// ============================================================================
// SECTION: Environment Source
// ============================================================================

/// Injectable source of environment variables.
///
/// # Invariants
/// - Overrides, when present, fully replace process environment reads.
/// - Values are trimmed on lookup; presence is decided before trimming.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSource {
    /// Optional override map used for deterministic lookups.
    overrides: Option<BTreeMap<String, String>>,
}

impl EnvironmentSource {
    /// Creates a source backed by the live process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self {
            overrides: None,
        }
    }

    /// Creates a source backed by a fixed variable map.
    #[must_use]
    pub const fn fixed(overrides: BTreeMap<String, String>) -> Self {
        Self {
            overrides: Some(overrides),
        }
    }

    /// Looks up a variable, returning the trimmed value when present.
    ///
    /// Presence is decided on the stored value, before trimming: a variable
    /// set to the empty string yields `Some("")`, not `None`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<String> {
        let raw = if let Some(overrides) = &self.overrides {
            overrides.get(name).cloned()
        } else {
            std::env::var(name).ok()
        };
        raw.map(|value| value.trim().to_owned())
    }

    /// Reads a required variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Missing`] when the variable is unset or blank
    /// after trimming.
    pub fn required_string(&self, name: &str) -> Result<String, EnvError> {
        let value = self.lookup(name).ok_or_else(|| EnvError::Missing {
            name: name.to_owned(),
        })?;
        if value.is_empty() {
            return Err(EnvError::Missing {
                name: name.to_owned(),
            });
        }
        Ok(value)
    }

    /// Reads a required variable as a non-negative 64-bit identifier.
    ///
    /// The value must parse as an unsigned decimal integer and fit the
    /// signed 64-bit range.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Missing`] when the variable is unset or blank,
    /// [`EnvError::NotAnInteger`] when it does not parse, and
    /// [`EnvError::TooLarge`] when it exceeds the signed range.
    pub fn required_id(&self, name: &str) -> Result<i64, EnvError> {
        let raw = self.required_string(name)?;
        let unsigned: u64 = raw.parse().map_err(|error: ParseIntError| EnvError::NotAnInteger {
            name: name.to_owned(),
            reason: error.to_string(),
        })?;
        i64::try_from(unsigned).map_err(|_| EnvError::TooLarge {
            name: name.to_owned(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
