//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while running a payroll period.
//! The first three variants are the recoverable rejections surfaced to callers
//! verbatim; none of them is retried automatically.

use thiserror::Error;

use crate::models::{PayrollState, Role};

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use payroll_engine::models::PayrollState;
///
/// let error = EngineError::InvalidState {
///     current: PayrollState::Draft,
///     required: PayrollState::Review,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Payroll is in state [DRAFT], but [REVIEW] is required."
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The period is in the wrong lifecycle state for the attempted action.
    #[error("Payroll is in state [{current}], but [{required}] is required.")]
    InvalidState {
        /// The state the period is currently in.
        current: PayrollState,
        /// The state the action requires.
        required: PayrollState,
    },

    /// The acting user's role is insufficient for the action.
    #[error("User is not authorized to [{action}]. Required role: [{required_role}].")]
    Unauthorized {
        /// Human-readable name of the attempted action.
        action: String,
        /// The minimum role the action requires.
        required_role: Role,
    },

    /// A business rule was breached that is not tied to state or role.
    #[error("{message}")]
    DomainRuleViolation {
        /// A description of the breached rule.
        message: String,
    },

    /// Caller-supplied input was malformed or out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// Fatal precondition failure inside a payroll run; aborts the whole transaction.
    #[error("Missing payroll context: {message}")]
    MissingContext {
        /// A description of the missing context.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::DomainRuleViolation`] from any message.
    pub fn rule_violation(message: impl Into<String>) -> Self {
        Self::DomainRuleViolation {
            message: message.into(),
        }
    }

    /// Builds a [`EngineError::InvalidInput`] for a field.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`EngineError::CalculationError`] for an amount that does not
    /// fit in a decimal.
    pub fn overflow(what: impl std::fmt::Display) -> Self {
        Self::CalculationError {
            message: format!("{} is out of range", what),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
