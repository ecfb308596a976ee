//! Validator error types
//!
//! Construction errors are raised while registering rules or building the
//! rule tables; they are fatal for that schema. Runtime errors reject a
//! single operation.

use thiserror::Error;

use crate::operation::Path;
use crate::rule::{RegistrationError, RuleError};

/// Result type for validator operations
pub type ValidatorResult<T> = Result<T, ValidatorError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidatorError {
    /// Rule name lacks the `jp_` prefix
    #[error("rule name '{0}' is missing the 'jp_' prefix")]
    MissingPrefix(String),

    /// Rule name already registered or reserved
    #[error("rule name '{0}' is already registered")]
    DuplicateRuleTags(String),

    /// Reference is not a struct description
    #[error("reference is nil: expected a struct description")]
    ReferenceIsNil,

    /// An annotation value could not be parsed
    #[error("invalid rule configuration at '{path}': {source}")]
    InvalidRuleConfig {
        path: String,
        #[source]
        source: RuleError,
    },

    /// `jp_inherit` names a rule the field does not carry
    #[error("cannot inherit rule '{rule}' at '{path}': rule is not declared")]
    UnknownInheritedRule { path: String, rule: String },

    /// Path resolves to neither a concrete nor a wildcard rule set
    #[error("defined path '{0}' is unknown")]
    UnknownPath(Path),

    /// Operation spec carries no operation kind
    #[error("operation kind is missing")]
    MissingOperation,

    /// A rule rejected the operation
    #[error("operation not allowed: {0}")]
    NotAllowed(RuleError),
}

impl ValidatorError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidatorError::MissingPrefix(_) => "DOCPATCH_MISSING_PREFIX",
            ValidatorError::DuplicateRuleTags(_) => "DOCPATCH_DUPLICATE_RULE_TAGS",
            ValidatorError::ReferenceIsNil => "DOCPATCH_REFERENCE_IS_NIL",
            ValidatorError::InvalidRuleConfig { .. } => "DOCPATCH_INVALID_RULE_CONFIG",
            ValidatorError::UnknownInheritedRule { .. } => "DOCPATCH_UNKNOWN_INHERITED_RULE",
            ValidatorError::UnknownPath(_) => "DOCPATCH_UNKNOWN_PATH",
            ValidatorError::MissingOperation => "DOCPATCH_MISSING_OPERATION",
            ValidatorError::NotAllowed(_) => "DOCPATCH_NOT_ALLOWED",
        }
    }

    /// True for errors raised while building a validator
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ValidatorError::MissingPrefix(_)
                | ValidatorError::DuplicateRuleTags(_)
                | ValidatorError::ReferenceIsNil
                | ValidatorError::InvalidRuleConfig { .. }
                | ValidatorError::UnknownInheritedRule { .. }
        )
    }
}

impl From<RegistrationError> for ValidatorError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::MissingPrefix(name) => ValidatorError::MissingPrefix(name),
            RegistrationError::DuplicateRuleTags(name) => ValidatorError::DuplicateRuleTags(name),
        }
    }
}
