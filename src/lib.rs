//! docpatch - schema-driven validation and compilation of document patches
//!
//! Patch operations (`add`, `remove`, `replace`, `move`, `copy` against a
//! dotted path) are checked against rules derived from a document schema and
//! compiled into MongoDB aggregation-pipeline update stages.
//!
//! ```
//! use docpatch::{FieldDef, OperationSpec, SchemaType, SmartParser, StructDef};
//!
//! let schema = StructDef::new()
//!     .field(FieldDef::new("id", SchemaType::ObjectId).rename("_id").disallow())
//!     .field(FieldDef::new("name", SchemaType::String));
//! let parser = SmartParser::new(schema).unwrap();
//!
//! let pipeline = parser.parse(&[OperationSpec::replace("name", "new")]).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&pipeline).unwrap(),
//!     serde_json::json!([{"$unset": "name"}, {"$set": {"name": "new"}}])
//! );
//! assert!(parser.parse(&[OperationSpec::replace("_id", "x")]).is_err());
//! ```

pub mod cli;
pub mod compiler;
pub mod operation;
pub mod rule;
pub mod schema;
pub mod validator;
pub mod value;

pub use compiler::{CompileError, Compiler, DisallowPathPolicy, Expr, Fragment, Policy, SmartParser};
pub use operation::{Operation, OperationSpec, Path};
pub use rule::{FieldContext, Rule, RuleError, RuleRegistry};
pub use schema::{Document, FieldDef, SchemaType, StructDef};
pub use validator::{RuleSet, Validator, ValidatorError};
pub use value::{to_value, Kind, ObjectId, Value};
