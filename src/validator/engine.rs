//! Schema-bound operation validator

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::operation::{join, OperationSpec, Path, WILDCARD};
use crate::rule::{Rule, RuleRegistry};
use crate::schema::{Document, SchemaType, StructDef};

use super::builder::build_tables;
use super::errors::{ValidatorError, ValidatorResult};
use super::tables::{RuleSet, RuleTables};

/// Validates patch operations against the rules derived from one schema.
///
/// Rule tables are built when the schema is registered and never change
/// until [`use_reference`](Validator::use_reference) or
/// [`rebuild`](Validator::rebuild) is called again.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: RuleRegistry,
    reference: StructDef,
    tables: RuleTables,
}

impl Validator {
    /// Creates a validator for `reference` with the built-in rules.
    pub fn new(reference: impl Into<SchemaType>) -> ValidatorResult<Self> {
        Self::with_registry(reference, RuleRegistry::new())
    }

    /// Creates a validator for the schema a [`Document`] type describes.
    pub fn for_document<T: Document>() -> ValidatorResult<Self> {
        Self::new(T::schema())
    }

    /// Creates a validator with a caller-provided registry.
    pub fn with_registry(
        reference: impl Into<SchemaType>,
        registry: RuleRegistry,
    ) -> ValidatorResult<Self> {
        let reference = struct_reference(reference.into())?;
        let tables = build_tables(&reference, &registry)?;
        Ok(Self {
            registry,
            reference,
            tables,
        })
    }

    /// Registers a custom rule prototype.
    ///
    /// Existing tables are not touched; call
    /// [`use_reference`](Validator::use_reference) or
    /// [`rebuild`](Validator::rebuild) to apply the rule.
    pub fn register_rule(&mut self, name: &str, rule: Arc<dyn Rule>) -> ValidatorResult<()> {
        self.registry.register(name, rule)?;
        Ok(())
    }

    /// Replaces the schema and rebuilds the rule tables.
    ///
    /// On error the previous schema and tables stay in place.
    pub fn use_reference(&mut self, reference: impl Into<SchemaType>) -> ValidatorResult<()> {
        let reference = struct_reference(reference.into())?;
        self.tables = build_tables(&reference, &self.registry)?;
        self.reference = reference;
        Ok(())
    }

    /// Rebuilds the rule tables for the current schema.
    pub fn rebuild(&mut self) -> ValidatorResult<()> {
        self.tables = build_tables(&self.reference, &self.registry)?;
        Ok(())
    }

    /// Checks one operation, returning the first rule failure.
    pub fn validate(&self, spec: &OperationSpec) -> ValidatorResult<()> {
        let op = spec.op.ok_or(ValidatorError::MissingOperation)?;

        let rules = self
            .resolve(&spec.path)
            .ok_or_else(|| ValidatorError::UnknownPath(spec.path.clone()))?;

        if op.requires_from() {
            if let Some(from) = &spec.from {
                if self.resolve(from).is_none() {
                    return Err(ValidatorError::UnknownPath(from.clone()));
                }
            }
        }

        for (name, rule) in rules.iter() {
            rule.validate(spec).map_err(|e| {
                debug!(path = %spec.path, op = %op, rule = name, error = %e, "operation rejected");
                ValidatorError::NotAllowed(e)
            })?;
        }

        Ok(())
    }

    /// Finds the rule set for a path.
    ///
    /// Exact matches win. Otherwise each segment that is not a known literal
    /// is replaced by the wildcard, provided the wildcard table knows that
    /// prefix. Paths with empty segments never resolve.
    pub fn resolve(&self, path: &Path) -> Option<&RuleSet> {
        if !path.is_well_formed() {
            return None;
        }

        if let Some(set) = self.tables.rules.get(path.as_str()) {
            return Some(set);
        }

        let mut resolved = String::new();
        for segment in path.segments() {
            let literal = join(&resolved, segment);
            if self.tables.is_known(&literal) {
                resolved = literal;
                continue;
            }

            let wildcard = join(&resolved, WILDCARD);
            if self.tables.wildcard_rules.contains_key(wildcard.as_str()) {
                resolved = wildcard;
            } else {
                return None;
            }
        }

        self.tables.get(&resolved)
    }

    /// Declared type at a concrete or wildcard path.
    ///
    /// Any segment below an array or map addresses its element.
    pub fn schema_type(&self, path: &Path) -> Option<&SchemaType> {
        if !path.is_well_formed() {
            return None;
        }

        let mut segments = path.segments();
        let mut current = &self.reference.find(segments.next()?)?.ty;
        for segment in segments {
            current = match current.deref() {
                SchemaType::Struct(def) => &def.find(segment)?.ty,
                other => other.element()?,
            };
        }
        Some(current)
    }

    /// Concrete path → rule set table
    pub fn rules(&self) -> &IndexMap<Path, RuleSet> {
        self.tables.rules()
    }

    /// Wildcard path → rule set table
    pub fn wildcard_rules(&self) -> &IndexMap<Path, RuleSet> {
        self.tables.wildcard_rules()
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Schema the tables were built from
    pub fn reference(&self) -> &StructDef {
        &self.reference
    }
}

fn struct_reference(reference: SchemaType) -> ValidatorResult<StructDef> {
    match reference {
        SchemaType::Struct(def) => Ok(def),
        SchemaType::Optional { inner } => struct_reference(*inner),
        _ => Err(ValidatorError::ReferenceIsNil),
    }
}
