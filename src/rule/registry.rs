//! Rule registry: annotation name → rule prototype

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::constraint::{DisallowRule, ExpressionRule, MaxRule, MinRule};
use super::errors::RegistrationError;
use super::operations::{AllowedOperationsRule, DisallowedOperationsRule};
use super::{
    Rule, DISALLOW, EXPRESSION, GENERAL_MATCHING_KIND, GENERAL_MATCHING_OPERATION_TO_KIND,
    INHERIT, MAX, MIN, OP_ALLOWED, OP_DISALLOWED, PREFIX,
};

/// Names that can never be registered.
const RESERVED: [&str; 3] = [
    GENERAL_MATCHING_OPERATION_TO_KIND,
    GENERAL_MATCHING_KIND,
    INHERIT,
];

/// Annotation-driven rule prototypes in registration order.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: IndexMap<String, Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Creates a registry without any annotation rules.
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Creates a registry holding the built-in annotation rules.
    pub fn new() -> Self {
        let mut rules: IndexMap<String, Arc<dyn Rule>> = IndexMap::new();
        rules.insert(DISALLOW.to_string(), Arc::new(DisallowRule::default()));
        rules.insert(MIN.to_string(), Arc::new(MinRule::default()));
        rules.insert(MAX.to_string(), Arc::new(MaxRule::default()));
        rules.insert(EXPRESSION.to_string(), Arc::new(ExpressionRule::prototype()));
        rules.insert(OP_ALLOWED.to_string(), Arc::new(AllowedOperationsRule::default()));
        rules.insert(
            OP_DISALLOWED.to_string(),
            Arc::new(DisallowedOperationsRule::default()),
        );
        Self { rules }
    }

    /// Adds a rule prototype under `name`.
    pub fn register(&mut self, name: &str, rule: Arc<dyn Rule>) -> Result<(), RegistrationError> {
        if !name.starts_with(PREFIX) {
            return Err(RegistrationError::MissingPrefix(name.to_string()));
        }
        if RESERVED.contains(&name) || self.rules.contains_key(name) {
            return Err(RegistrationError::DuplicateRuleTags(name.to_string()));
        }

        debug!(rule = name, "registered rule");
        self.rules.insert(name.to_string(), rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Rule>)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = RuleRegistry::new();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![DISALLOW, MIN, MAX, EXPRESSION, OP_ALLOWED, OP_DISALLOWED]
        );
        assert!(RuleRegistry::empty().is_empty());
    }

    #[test]
    fn test_register_custom() {
        let mut registry = RuleRegistry::new();
        registry
            .register("jp_name", Arc::new(DisallowRule::default()))
            .unwrap();
        assert!(registry.contains("jp_name"));
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = RuleRegistry::new();
        assert_eq!(
            registry.register(DISALLOW, Arc::new(DisallowRule::default())),
            Err(RegistrationError::DuplicateRuleTags(DISALLOW.to_string()))
        );
        assert_eq!(
            registry.register(INHERIT, Arc::new(DisallowRule::default())),
            Err(RegistrationError::DuplicateRuleTags(INHERIT.to_string()))
        );
        assert_eq!(
            registry.register(GENERAL_MATCHING_KIND, Arc::new(DisallowRule::default())),
            Err(RegistrationError::DuplicateRuleTags(GENERAL_MATCHING_KIND.to_string()))
        );
    }

    #[test]
    fn test_register_missing_prefix() {
        let mut registry = RuleRegistry::new();
        assert_eq!(
            registry.register("name", Arc::new(DisallowRule::default())),
            Err(RegistrationError::MissingPrefix("name".to_string()))
        );
    }
}
