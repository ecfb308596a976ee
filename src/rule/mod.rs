//! Validation rules
//!
//! A rule is a named check bound to one document path. Rules are configured
//! from field annotations (`jp_min: "3"`) once, when a schema is registered,
//! and evaluated against every operation that targets their path.
//!
//! Two general rules are installed on every path regardless of annotations:
//! - `jp_general_matching_operation_to_kind`: top-level kind check
//! - `jp_general_matching_kind`: full structural type match
//!
//! Custom rules implement [`Rule`] and are registered under a `jp_` name.

mod constraint;
mod errors;
mod kind;
pub mod matcher;
mod operations;
mod registry;

use std::fmt;
use std::sync::Arc;

use crate::operation::OperationSpec;
use crate::schema::SchemaType;
use crate::value::Kind;

pub use constraint::{DisallowRule, ExpressionRule, MaxRule, MinRule};
pub use errors::{RegistrationError, RuleError, RuleResult};
pub use kind::{MatchingKindRule, OperationKindRule};
pub use operations::{AllowedOperationsRule, DisallowedOperationsRule};
pub use registry::RuleRegistry;

/// Prefix every rule name must carry
pub const PREFIX: &str = "jp_";

pub const GENERAL_MATCHING_OPERATION_TO_KIND: &str = "jp_general_matching_operation_to_kind";
pub const GENERAL_MATCHING_KIND: &str = "jp_general_matching_kind";
pub const DISALLOW: &str = "jp_disallow";
pub const MIN: &str = "jp_min";
pub const MAX: &str = "jp_max";
pub const EXPRESSION: &str = "jp_expression";
pub const OP_ALLOWED: &str = "jp_op_allowed";
pub const OP_DISALLOWED: &str = "jp_op_disallowed";

/// Annotation listing rules that propagate to descendants. Not a rule itself.
pub const INHERIT: &str = "jp_inherit";

/// Schema position a rule instance is created for.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Concrete or wildcard path of the field
    pub path: &'a str,
    /// Declared type of the field
    pub reference: &'a SchemaType,
}

impl<'a> FieldContext<'a> {
    pub fn new(path: &'a str, reference: &'a SchemaType) -> Self {
        Self { path, reference }
    }

    /// Top-level kind of the declared type
    pub fn kind(&self) -> Kind {
        self.reference.kind()
    }
}

/// A pluggable check bound to a path.
///
/// Registered rules act as prototypes: [`new_instance`](Rule::new_instance)
/// parses a field's annotation value into a configured instance, and
/// [`new_inherit_instance`](Rule::new_inherit_instance) carries a configured
/// instance over to a descendant field.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Creates an instance for `field` configured by the annotation `value`.
    fn new_instance(&self, field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>>;

    /// Creates an instance for a descendant `field` with this instance's
    /// configuration.
    fn new_inherit_instance(&self, field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>>;

    /// Checks one operation against this rule.
    fn validate(&self, spec: &OperationSpec) -> RuleResult<()>;
}
