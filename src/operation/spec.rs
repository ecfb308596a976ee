//! Patch operation model
//!
//! An [`OperationSpec`] is one JSON-patch style instruction:
//!
//! ```json
//! {"op": "move", "path": "user.a", "from": "user.a_tmp"}
//! ```
//!
//! Paths are dotted rather than JSON pointers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::value::{to_value, Value, ValueResult};

/// Supported patch operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Remove,
        Operation::Replace,
        Operation::Move,
        Operation::Copy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::Replace => "replace",
            Operation::Move => "move",
            Operation::Copy => "copy",
        }
    }

    /// Operations that read their source from `from`
    pub fn requires_from(&self) -> bool {
        matches!(self, Operation::Move | Operation::Copy)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when text does not name an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s.trim())
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Parses a comma-separated list such as `add,remove`.
pub fn parse_operation_list(list: &str) -> Result<Vec<Operation>, UnknownOperation> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// One patch instruction against a document path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Operation kind; absent when the input did not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<Operation>,
    /// Target path
    #[serde(default)]
    pub path: Path,
    /// Payload for add/replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Source path for move/copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Path>,
}

impl OperationSpec {
    pub fn new(op: Operation, path: impl Into<Path>) -> Self {
        Self {
            op: Some(op),
            path: path.into(),
            value: None,
            from: None,
        }
    }

    pub fn add(path: impl Into<Path>, value: impl Into<Value>) -> Self {
        Self::new(Operation::Add, path).with_value(value)
    }

    pub fn remove(path: impl Into<Path>) -> Self {
        Self::new(Operation::Remove, path)
    }

    pub fn replace(path: impl Into<Path>, value: impl Into<Value>) -> Self {
        Self::new(Operation::Replace, path).with_value(value)
    }

    pub fn move_from(path: impl Into<Path>, from: impl Into<Path>) -> Self {
        Self::new(Operation::Move, path).with_from(from)
    }

    pub fn copy_from(path: impl Into<Path>, from: impl Into<Path>) -> Self {
        Self::new(Operation::Copy, path).with_from(from)
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attaches a typed payload, serializing it into a [`Value`].
    pub fn with_serialized<T: Serialize + ?Sized>(mut self, value: &T) -> ValueResult<Self> {
        self.value = Some(to_value(value)?);
        Ok(self)
    }

    pub fn with_from(mut self, from: impl Into<Path>) -> Self {
        self.from = Some(from.into());
        self
    }
}
