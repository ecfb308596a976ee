//! Operation allow/deny lists

use std::sync::Arc;

use crate::operation::{parse_operation_list, Operation, OperationSpec};

use super::errors::{RuleError, RuleResult};
use super::{FieldContext, Rule, OP_ALLOWED, OP_DISALLOWED};

fn parse_list(rule: &str, value: &str) -> RuleResult<Vec<Operation>> {
    parse_operation_list(value).map_err(|e| RuleError::invalid_config(rule, value, e))
}

/// Only the listed operations may target the path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowedOperationsRule {
    pub operations: Vec<Operation>,
}

impl Rule for AllowedOperationsRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(AllowedOperationsRule {
            operations: parse_list(OP_ALLOWED, value)?,
        }))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(self.clone()))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match spec.op {
            Some(op) if !self.operations.contains(&op) => Err(RuleError::OperationNotAllowed(op)),
            _ => Ok(()),
        }
    }
}

/// The listed operations may not target the path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisallowedOperationsRule {
    pub operations: Vec<Operation>,
}

impl Rule for DisallowedOperationsRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(DisallowedOperationsRule {
            operations: parse_list(OP_DISALLOWED, value)?,
        }))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(self.clone()))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match spec.op {
            Some(op) if self.operations.contains(&op) => Err(RuleError::OperationNotAllowed(op)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaType;

    fn configure(prototype: &dyn Rule, value: &str) -> RuleResult<Arc<dyn Rule>> {
        let reference = SchemaType::String;
        prototype.new_instance(&FieldContext::new("a", &reference), value)
    }

    #[test]
    fn test_allowed_operations() {
        let rule = configure(&AllowedOperationsRule::default(), "replace").unwrap();
        assert!(rule.validate(&OperationSpec::replace("a", "abc")).is_ok());

        let err = rule.validate(&OperationSpec::remove("a")).unwrap_err();
        assert_eq!(err.to_string(), "operation 'remove' not allowed");
    }

    #[test]
    fn test_disallowed_operations() {
        let rule = configure(&DisallowedOperationsRule::default(), "remove").unwrap();
        assert!(rule.validate(&OperationSpec::replace("a", "abc")).is_ok());

        let err = rule.validate(&OperationSpec::remove("a")).unwrap_err();
        assert_eq!(err.to_string(), "operation 'remove' not allowed");
    }

    #[test]
    fn test_unknown_operation_in_list() {
        let err = configure(&AllowedOperationsRule::default(), "add,test").unwrap_err();
        assert_eq!(err.code(), "DOCPATCH_INVALID_RULE_CONFIG");
        assert!(err.to_string().contains("unknown operation 'test'"));
    }
}
