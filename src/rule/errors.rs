//! Rule evaluation and configuration errors
//!
//! Messages are part of the public contract; callers match on them.

use std::fmt;

use thiserror::Error;

use crate::operation::Operation;
use crate::value::Kind;

/// Result type for rule construction and evaluation
pub type RuleResult<T> = Result<T, RuleError>;

/// A rule rejected an operation, or an annotation could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// Value kind does not match the declared kind
    #[error("'{path}' has invalid kind '{actual}', must be '{expected}'{}", key_suffix(.for_key))]
    TypeMismatch {
        path: String,
        actual: Kind,
        expected: Kind,
        /// Set when the mismatch concerns a map key
        for_key: bool,
    },

    /// Value names a field the schema does not declare
    #[error("field '{0}' is unknown")]
    UnknownField(String),

    #[error("value is less then specified: '{:.6}' < '{:.6}'", .value, .min)]
    BelowMin { value: f64, min: f64 },

    #[error("value is greater then specified: '{:.6}' > '{:.6}'", .value, .max)]
    AboveMax { value: f64, max: f64 },

    #[error("expression '{expression}' not match {value}")]
    ExpressionMismatch { expression: String, value: String },

    #[error("operation '{0}' not allowed")]
    OperationNotAllowed(Operation),

    /// Path carries `jp_disallow: true`
    #[error("modification is disallowed")]
    Disallowed,

    /// Annotation value could not be parsed
    #[error("invalid value '{value}' for rule '{rule}': {reason}")]
    InvalidConfig {
        rule: String,
        value: String,
        reason: String,
    },
}

fn key_suffix(for_key: &bool) -> &'static str {
    if *for_key {
        " for key"
    } else {
        ""
    }
}

impl RuleError {
    pub(crate) fn mismatch(path: &str, actual: Kind, expected: Kind) -> Self {
        RuleError::TypeMismatch {
            path: path.to_string(),
            actual,
            expected,
            for_key: false,
        }
    }

    pub(crate) fn key_mismatch(path: &str, actual: Kind, expected: Kind) -> Self {
        RuleError::TypeMismatch {
            path: path.to_string(),
            actual,
            expected,
            for_key: true,
        }
    }

    pub(crate) fn invalid_config(
        rule: &str,
        value: &str,
        reason: impl fmt::Display,
    ) -> Self {
        RuleError::InvalidConfig {
            rule: rule.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::TypeMismatch { .. } => "DOCPATCH_TYPE_MISMATCH",
            RuleError::UnknownField(_) => "DOCPATCH_UNKNOWN_FIELD",
            RuleError::BelowMin { .. } => "DOCPATCH_BELOW_MIN",
            RuleError::AboveMax { .. } => "DOCPATCH_ABOVE_MAX",
            RuleError::ExpressionMismatch { .. } => "DOCPATCH_EXPRESSION_MISMATCH",
            RuleError::OperationNotAllowed(_) => "DOCPATCH_OPERATION_NOT_ALLOWED",
            RuleError::Disallowed => "DOCPATCH_DISALLOWED",
            RuleError::InvalidConfig { .. } => "DOCPATCH_INVALID_RULE_CONFIG",
        }
    }
}

/// Rule registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Rule names must start with `jp_`
    #[error("rule name '{0}' is missing the 'jp_' prefix")]
    MissingPrefix(String),

    /// Name already taken by another rule or a reserved key
    #[error("rule name '{0}' is already registered")]
    DuplicateRuleTags(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_templates() {
        assert_eq!(
            RuleError::mismatch("a", Kind::Int, Kind::String).to_string(),
            "'a' has invalid kind 'int', must be 'string'"
        );
        assert_eq!(
            RuleError::key_mismatch("m", Kind::Int, Kind::String).to_string(),
            "'m' has invalid kind 'int', must be 'string' for key"
        );
        assert_eq!(
            RuleError::BelowMin { value: 1.0, min: 3.0 }.to_string(),
            "value is less then specified: '1.000000' < '3.000000'"
        );
        assert_eq!(
            RuleError::AboveMax { value: 123.0, max: 3.0 }.to_string(),
            "value is greater then specified: '123.000000' > '3.000000'"
        );
        assert_eq!(
            RuleError::OperationNotAllowed(Operation::Remove).to_string(),
            "operation 'remove' not allowed"
        );
    }
}
