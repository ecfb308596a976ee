//! Rule sets and the per-path rule tables

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::operation::{Path, WILDCARD};
use crate::rule::Rule;

/// Ordered rule name → rule instance mapping bound to one path.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: IndexMap<String, Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a rule; a replaced rule keeps its position.
    pub(crate) fn insert(&mut self, name: &str, rule: Arc<dyn Rule>) {
        self.rules.insert(name.to_string(), rule);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
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

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

/// Concrete and wildcard path tables produced from one schema.
#[derive(Debug, Clone, Default)]
pub struct RuleTables {
    pub(crate) rules: IndexMap<Path, RuleSet>,
    pub(crate) wildcard_rules: IndexMap<Path, RuleSet>,
}

impl RuleTables {
    /// Stores a rule set in the table matching its path.
    pub(crate) fn insert(&mut self, path: Path, set: RuleSet) {
        if path.segments().any(|s| s == WILDCARD) {
            self.wildcard_rules.insert(path, set);
        } else {
            self.rules.insert(path, set);
        }
    }

    pub fn rules(&self) -> &IndexMap<Path, RuleSet> {
        &self.rules
    }

    pub fn wildcard_rules(&self) -> &IndexMap<Path, RuleSet> {
        &self.wildcard_rules
    }

    pub fn is_known(&self, path: &str) -> bool {
        self.rules.contains_key(path) || self.wildcard_rules.contains_key(path)
    }

    /// Looks up a rule set in either table.
    pub fn get(&self, path: &str) -> Option<&RuleSet> {
        self.rules
            .get(path)
            .or_else(|| self.wildcard_rules.get(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{DisallowRule, MinRule};

    #[test]
    fn test_replace_keeps_position() {
        let mut set = RuleSet::new();
        set.insert("jp_disallow", Arc::new(DisallowRule { disallow: true }));
        set.insert("jp_min", Arc::new(MinRule { min: 1.0 }));
        set.insert("jp_disallow", Arc::new(DisallowRule { disallow: false }));

        assert_eq!(set.names(), vec!["jp_disallow", "jp_min"]);
        assert_eq!(
            format!("{:?}", set.get("jp_disallow").unwrap()),
            "DisallowRule { disallow: false }"
        );
    }

    #[test]
    fn test_tables_split_by_wildcard() {
        let mut tables = RuleTables::default();
        tables.insert(Path::from("d"), RuleSet::new());
        tables.insert(Path::from("d.*"), RuleSet::new());
        tables.insert(Path::from("d.*.a"), RuleSet::new());

        assert_eq!(tables.rules().len(), 1);
        assert_eq!(tables.wildcard_rules().len(), 2);
        assert!(tables.is_known("d.*.a"));
        assert!(!tables.is_known("d.0"));
    }
}
