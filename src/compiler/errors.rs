//! Compilation errors

use thiserror::Error;

use crate::validator::ValidatorError;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Operation spec is malformed for its kind
    #[error("unexpected operation input: {0}")]
    UnexpectedInput(String),

    /// A pre-check policy rejected the operation
    #[error("policy violation: {0}")]
    PolicyViolation(String),

    /// Schema validation rejected the operation
    #[error(transparent)]
    Validation(#[from] ValidatorError),
}

impl CompileError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::UnexpectedInput(_) => "DOCPATCH_UNEXPECTED_INPUT",
            CompileError::PolicyViolation(_) => "DOCPATCH_POLICY_VIOLATION",
            CompileError::Validation(e) => e.code(),
        }
    }
}
