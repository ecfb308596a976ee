//! Pre-compilation policies

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operation::{OperationSpec, Path};

/// Gate evaluated before an operation is compiled.
pub trait Policy: fmt::Debug + Send + Sync {
    /// Returns false to reject the operation.
    fn permits(&self, spec: &OperationSpec) -> bool;

    /// Reported when the policy rejects an operation
    fn details(&self) -> &str;
}

/// Rejects every operation targeting one exact path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisallowPathPolicy {
    pub details: String,
    pub path: Path,
}

impl DisallowPathPolicy {
    pub fn new(details: impl Into<String>, path: impl Into<Path>) -> Self {
        Self {
            details: details.into(),
            path: path.into(),
        }
    }
}

impl Policy for DisallowPathPolicy {
    fn permits(&self, spec: &OperationSpec) -> bool {
        spec.path != self.path
    }

    fn details(&self) -> &str {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disallow_path() {
        let policy = DisallowPathPolicy::new("MustFailPolicy", "user.a");
        assert!(!policy.permits(&OperationSpec::remove("user.a")));
        assert!(policy.permits(&OperationSpec::remove("user.b")));
        assert!(policy.permits(&OperationSpec::remove("user.a.b")));
        assert_eq!(policy.details(), "MustFailPolicy");
    }
}
