//! Value conversion errors

use thiserror::Error;

use super::types::Kind;

/// Result type for value conversions
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised while turning Rust values or JSON into [`Value`](super::Value)s.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Identifier text or bytes are not a valid 12-byte object id
    #[error("invalid object id '{0}'")]
    InvalidObjectId(String),

    /// Map keys must stay addressable as path segments
    #[error("map key must be a string, integer or bool, found '{0}'")]
    KeyMustBeScalar(Kind),

    /// Raised by `Serialize` implementations through `serde::ser::Error`
    #[error("{0}")]
    Custom(String),
}

impl ValueError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValueError::InvalidObjectId(_) => "DOCPATCH_INVALID_OBJECT_ID",
            ValueError::KeyMustBeScalar(_) => "DOCPATCH_INVALID_MAP_KEY",
            ValueError::Custom(_) => "DOCPATCH_VALUE_CONVERSION",
        }
    }
}

impl serde::ser::Error for ValueError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ValueError::Custom(msg.to_string())
    }
}

impl serde::de::Error for ValueError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ValueError::Custom(msg.to_string())
    }
}
