//! Schema rule engine
//!
//! Builds per-path rule tables from a schema description and validates patch
//! operations against them:
//!
//! - concrete paths (`user.name`) map to exactly one [`RuleSet`]
//! - collection elements live in a separate wildcard table (`groups.*`)
//! - `jp_inherit` hands rules down to every path below a field
//! - evaluation is fail-fast and never mutates the tables

mod builder;
mod engine;
mod errors;
mod tables;

pub use builder::build_tables;
pub use engine::Validator;
pub use errors::{ValidatorError, ValidatorResult};
pub use tables::{RuleSet, RuleTables};
