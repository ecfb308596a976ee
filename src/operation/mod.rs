//! Patch operations and document paths

mod path;
mod spec;

pub use path::{Path, SEPARATOR, WILDCARD};
pub(crate) use path::join;
pub use spec::{parse_operation_list, Operation, OperationSpec, UnknownOperation};
