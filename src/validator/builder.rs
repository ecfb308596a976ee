//! Rule tree builder
//!
//! Walks a schema description once and produces the rule tables. Every field
//! gets the two general rules, then the rules it inherits from enclosing
//! fields, then the rules its own annotations configure. Collections keep
//! their own rules at the collection path and describe their elements under
//! `path.*`.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::operation::{join, Path, WILDCARD};
use crate::rule::{
    FieldContext, MatchingKindRule, OperationKindRule, Rule, RuleRegistry,
    GENERAL_MATCHING_KIND, GENERAL_MATCHING_OPERATION_TO_KIND, INHERIT, PREFIX,
};
use crate::schema::{FieldDef, SchemaType, StructDef};

use super::errors::{ValidatorError, ValidatorResult};
use super::tables::{RuleSet, RuleTables};

/// Rules handed down to descendants, keyed by rule name.
type InheritBag = IndexMap<String, Arc<dyn Rule>>;

/// Builds the rule tables for `schema` using the prototypes in `registry`.
pub fn build_tables(schema: &StructDef, registry: &RuleRegistry) -> ValidatorResult<RuleTables> {
    let mut builder = TableBuilder {
        registry,
        tables: RuleTables::default(),
    };
    builder.walk_struct("", schema, &InheritBag::new())?;

    debug!(
        paths = builder.tables.rules.len(),
        wildcard_paths = builder.tables.wildcard_rules.len(),
        "built rule tables"
    );
    Ok(builder.tables)
}

struct TableBuilder<'a> {
    registry: &'a RuleRegistry,
    tables: RuleTables,
}

impl TableBuilder<'_> {
    fn walk_struct(&mut self, prefix: &str, def: &StructDef, bag: &InheritBag) -> ValidatorResult<()> {
        for field in &def.fields {
            let Some(name) = field.serialized_name() else {
                trace!(field = %field.name, "skipping field");
                continue;
            };
            let path = join(prefix, &name);
            self.walk_field(&path, &field.ty, Some(field), bag)?;
        }
        Ok(())
    }

    /// Installs the rule set for one position and recurses below it.
    ///
    /// `field` is `None` for collection elements, which carry no annotations
    /// of their own.
    fn walk_field(
        &mut self,
        path: &str,
        ty: &SchemaType,
        field: Option<&FieldDef>,
        bag: &InheritBag,
    ) -> ValidatorResult<()> {
        let ctx = FieldContext::new(path, ty);
        let mut set = RuleSet::new();

        set.insert(
            GENERAL_MATCHING_OPERATION_TO_KIND,
            Arc::new(OperationKindRule::new(path, ty.kind())),
        );
        set.insert(
            GENERAL_MATCHING_KIND,
            Arc::new(MatchingKindRule::new(path, ty.clone())),
        );

        for (name, inherited) in bag {
            let rule = inherited
                .new_inherit_instance(&ctx)
                .map_err(|source| invalid_config(path, source))?;
            set.insert(name, rule);
        }

        let mut child_bag = bag.clone();
        if let Some(field) = field {
            self.apply_annotations(&ctx, field, &mut set, &mut child_bag)?;
        }

        self.tables.insert(Path::new(path), set);
        self.descend(path, ty, &child_bag)
    }

    fn apply_annotations(
        &self,
        ctx: &FieldContext<'_>,
        field: &FieldDef,
        set: &mut RuleSet,
        child_bag: &mut InheritBag,
    ) -> ValidatorResult<()> {
        for (name, prototype) in self.registry.iter() {
            let Some(value) = field.annotation(name) else {
                continue;
            };
            let rule = prototype
                .new_instance(ctx, value)
                .map_err(|source| invalid_config(ctx.path, source))?;

            // a redeclared rule also replaces what descendants inherit
            if child_bag.contains_key(name) {
                child_bag.insert(name.to_string(), Arc::clone(&rule));
            }
            set.insert(name, rule);
        }

        for key in field.annotations.keys() {
            if key.starts_with(PREFIX) && key.as_str() != INHERIT && !self.registry.contains(key) {
                warn!(path = ctx.path, annotation = %key, "ignoring unregistered rule annotation");
            }
        }

        if let Some(list) = field.annotation(INHERIT) {
            for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let rule = set
                    .get(name)
                    .filter(|_| self.registry.contains(name))
                    .ok_or_else(|| ValidatorError::UnknownInheritedRule {
                        path: ctx.path.to_string(),
                        rule: name.to_string(),
                    })?;
                child_bag.insert(name.to_string(), Arc::clone(rule));
            }
        }

        Ok(())
    }

    fn descend(&mut self, path: &str, ty: &SchemaType, bag: &InheritBag) -> ValidatorResult<()> {
        match ty.deref() {
            SchemaType::Struct(def) => self.walk_struct(path, def, bag),
            SchemaType::Array { element_type } => {
                self.walk_field(&join(path, WILDCARD), element_type, None, bag)
            }
            SchemaType::Map { value_type, .. } => {
                self.walk_field(&join(path, WILDCARD), value_type, None, bag)
            }
            _ => Ok(()),
        }
    }
}

fn invalid_config(path: &str, source: crate::rule::RuleError) -> ValidatorError {
    ValidatorError::InvalidRuleConfig {
        path: path.to_string(),
        source,
    }
}
