//! Value constraint rules: disallow, numeric bounds, regular expressions

use std::sync::Arc;

use regex::Regex;

use crate::operation::OperationSpec;

use super::errors::{RuleError, RuleResult};
use super::{FieldContext, Rule, DISALLOW, EXPRESSION, MAX, MIN};

/// Parses boolean annotation values: `1 t T true TRUE True` and their negatives.
fn parse_bool(rule: &str, value: &str) -> RuleResult<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(RuleError::invalid_config(rule, value, "expected a boolean")),
    }
}

fn parse_number(rule: &str, value: &str) -> RuleResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| RuleError::invalid_config(rule, value, e))
}

/// Rejects every operation when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisallowRule {
    pub disallow: bool,
}

impl Rule for DisallowRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(DisallowRule {
            disallow: parse_bool(DISALLOW, value)?,
        }))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(*self))
    }

    fn validate(&self, _spec: &OperationSpec) -> RuleResult<()> {
        if self.disallow {
            Err(RuleError::Disallowed)
        } else {
            Ok(())
        }
    }
}

/// Lower bound for numeric values. Non-numeric values are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MinRule {
    pub min: f64,
}

impl Rule for MinRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(MinRule {
            min: parse_number(MIN, value)?,
        }))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(*self))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match spec.value.as_ref().and_then(|v| v.as_f64()) {
            Some(value) if value < self.min => Err(RuleError::BelowMin {
                value,
                min: self.min,
            }),
            _ => Ok(()),
        }
    }
}

/// Upper bound for numeric values. Non-numeric values are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxRule {
    pub max: f64,
}

impl Rule for MaxRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(MaxRule {
            max: parse_number(MAX, value)?,
        }))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(*self))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        match spec.value.as_ref().and_then(|v| v.as_f64()) {
            Some(value) if value > self.max => Err(RuleError::AboveMax {
                value,
                max: self.max,
            }),
            _ => Ok(()),
        }
    }
}

/// Requires the value's text form to match a regular expression.
#[derive(Debug, Clone)]
pub struct ExpressionRule {
    pub expression: String,
    regex: Option<Regex>,
}

impl ExpressionRule {
    pub fn new(expression: &str) -> RuleResult<Self> {
        let regex =
            Regex::new(expression).map_err(|e| RuleError::invalid_config(EXPRESSION, expression, e))?;
        Ok(Self {
            expression: expression.to_string(),
            regex: Some(regex),
        })
    }

    /// Registry prototype; matches everything until configured.
    pub(crate) fn prototype() -> Self {
        Self {
            expression: String::new(),
            regex: None,
        }
    }
}

impl PartialEq for ExpressionRule {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

impl Rule for ExpressionRule {
    fn new_instance(&self, _field: &FieldContext<'_>, value: &str) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(ExpressionRule::new(value)?))
    }

    fn new_inherit_instance(&self, _field: &FieldContext<'_>) -> RuleResult<Arc<dyn Rule>> {
        Ok(Arc::new(self.clone()))
    }

    fn validate(&self, spec: &OperationSpec) -> RuleResult<()> {
        let (Some(regex), Some(value)) = (&self.regex, &spec.value) else {
            return Ok(());
        };

        let text = value.to_string();
        if regex.is_match(&text) {
            Ok(())
        } else {
            Err(RuleError::ExpressionMismatch {
                expression: self.expression.clone(),
                value: text,
            })
        }
    }
}
