//! General kind rules installed on every schema path

use std::sync::Arc;

use crate::operation::{Operation, OperationSpec};
use crate::schema::SchemaType;
use crate::value::{Kind, Value};

use super::errors::{RuleError, RuleResult};
use super::matcher::{is_object_id_encoding, match_type};
use super::{FieldContext, Rule};

/// Full structural match of the operation value against the declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingKindRule {
    pub path: String,
    pub reference: SchemaType,
}

impl MatchingKindRule {
    pub fn new(path: impl Into<String>, reference: SchemaType) -> Self {
        Self {
            path: path.into(),
            reference,
        }
    }

    fn for_field(field: &FieldContext<'_>) -> Arc<dyn Rule> {
        Arc::new(Self::new(field.path, field.reference.clone()))
    }
}

impl Rule for MatchingKindRule {
    fn new_instance(&self, field: &FieldContext<'_>, _value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Self::for_field(field))
    }

    fn new_inherit_instance(&self, field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Self::for_field(field))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match &spec.value {
            Some(value) => match_type(&self.path, &self.reference, value, spec.op),
            None => Ok(()),
        }
    }
}

/// Cheap top-level kind check run before the structural match.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationKindRule {
    pub path: String,
    pub kind: Kind,
}

impl OperationKindRule {
    pub fn new(path: impl Into<String>, kind: Kind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    fn for_field(field: &FieldContext<'_>) -> Arc<dyn Rule> {
        Arc::new(Self::new(field.path, field.kind()))
    }

    fn accepts(&self, op: Option<Operation>, value: &Value) -> bool {
        let actual = value.kind();
        match self.kind {
            _ if actual == Kind::Null || actual == self.kind => true,
            // appending a single element
            Kind::Array => op == Some(Operation::Add),
            Kind::ObjectId => is_object_id_encoding(value),
            Kind::Struct => actual == Kind::Map,
            _ => false,
        }
    }
}

impl Rule for OperationKindRule {
    fn new_instance(&self, field: &FieldContext<'_>, _value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Self::for_field(field))
    }

    fn new_inherit_instance(&self, field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Self::for_field(field))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match &spec.value {
            Some(value) if !self.accepts(spec.op, value) => {
                Err(RuleError::mismatch(&self.path, value.kind(), self.kind))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_kind_scalar() {
        let rule = OperationKindRule::new("a", Kind::String);
        assert!(rule.validate(&OperationSpec::replace("a", "new")).is_ok());
        assert!(rule.validate(&OperationSpec::remove("a")).is_ok());

        let err = rule.validate(&OperationSpec::replace("a", 123)).unwrap_err();
        assert_eq!(err.to_string(), "'a' has invalid kind 'int', must be 'string'");
    }

    #[test]
    fn test_operation_kind_array_add() {
        let rule = OperationKindRule::new("d", Kind::Array);
        assert!(rule.validate(&OperationSpec::add("d", 2)).is_ok());
        assert!(rule.validate(&OperationSpec::replace("d", 2)).is_err());
        assert!(rule
            .validate(&OperationSpec::replace("d", Value::from_json(json!([2]))))
            .is_ok());
    }

    #[test]
    fn test_operation_kind_struct_and_id() {
        let rule = OperationKindRule::new("obj", Kind::Struct);
        assert!(rule
            .validate(&OperationSpec::replace("obj", Value::from_json(json!({"name": "A"}))))
            .is_ok());

        let rule = OperationKindRule::new("_id", Kind::ObjectId);
        assert!(rule
            .validate(&OperationSpec::replace("_id", "5f1b2c3d4e5f60718293a4b5"))
            .is_ok());
        assert!(rule.validate(&OperationSpec::replace("_id", 5)).is_err());
    }

    #[test]
    fn test_matching_kind_without_value() {
        let rule = MatchingKindRule::new("a", SchemaType::String);
        assert!(rule.validate(&OperationSpec::remove("a")).is_ok());
        assert!(rule.validate(&OperationSpec::move_from("a", "b")).is_ok());
    }

    #[test]
    fn test_inherit_instance_rebinds_path() {
        let prototype = MatchingKindRule::new("", SchemaType::Int);
        let reference = SchemaType::String;
        let rule = prototype
            .new_inherit_instance(&FieldContext::new("x.y", &reference))
            .unwrap();
        let err = rule.validate(&OperationSpec::replace("x.y", 1)).unwrap_err();
        assert_eq!(err.to_string(), "'x.y' has invalid kind 'int', must be 'string'");
    }
}
