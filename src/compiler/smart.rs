//! Validate-then-compile front end

use std::sync::Arc;

use tracing::debug;

use crate::operation::OperationSpec;
use crate::rule::Rule;
use crate::schema::{Document, SchemaType};
use crate::validator::Validator;

use super::compile::{Compiler, RemoveIndex};
use super::errors::CompileResult;
use super::fragment::Fragment;
use super::policy::Policy;

/// Binds a [`Validator`] and a [`Compiler`] to one schema.
#[derive(Debug)]
pub struct SmartParser {
    validator: Validator,
    compiler: Compiler,
}

impl SmartParser {
    pub fn new(reference: impl Into<SchemaType>) -> CompileResult<Self> {
        Ok(Self::from_parts(Validator::new(reference)?, Compiler::new()))
    }

    pub fn for_document<T: Document>() -> CompileResult<Self> {
        Self::new(T::schema())
    }

    pub fn from_parts(validator: Validator, compiler: Compiler) -> Self {
        Self {
            validator,
            compiler,
        }
    }

    pub fn with_policy(mut self, policy: impl Policy + 'static) -> Self {
        self.compiler.add_policy(policy);
        self
    }

    /// Registers a custom rule and rebuilds the rule tables with it.
    pub fn register_rule(&mut self, name: &str, rule: Arc<dyn Rule>) -> CompileResult<()> {
        self.validator.register_rule(name, rule)?;
        self.validator.rebuild()?;
        Ok(())
    }

    /// Validates every operation, then compiles them into one pipeline.
    ///
    /// Nothing is compiled unless all operations pass validation. Removing
    /// `m.<int>` from a map unsets the key instead of splicing an array.
    pub fn parse(&self, specs: &[OperationSpec]) -> CompileResult<Vec<Fragment>> {
        for spec in specs {
            self.validator.validate(spec)?;
        }

        let mut pipeline = Vec::new();
        for spec in specs {
            pipeline.extend(self.compiler.compile_spec(spec, self.remove_mode(spec))?);
        }
        debug!(operations = specs.len(), fragments = pipeline.len(), "parsed patch");
        Ok(pipeline)
    }

    fn remove_mode(&self, spec: &OperationSpec) -> RemoveIndex {
        let parent = spec.path.parent();
        match parent.and_then(|p| self.validator.schema_type(&p)).map(SchemaType::deref) {
            Some(SchemaType::Map { .. }) => RemoveIndex::Key,
            _ => RemoveIndex::Splice,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;
    use crate::rule::DisallowRule;
    use crate::schema::{FieldDef, StructDef};
    use crate::validator::ValidatorError;

    fn schema() -> StructDef {
        StructDef::new()
            .field(FieldDef::new("id", SchemaType::String).rename("_id").disallow())
            .field(FieldDef::new("a", SchemaType::String))
    }

    #[test]
    fn test_parse_valid() {
        let parser = SmartParser::new(schema()).unwrap();
        let pipeline = parser.parse(&[OperationSpec::replace("a", "new")]).unwrap();
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_parse_rejected_compiles_nothing() {
        let parser = SmartParser::new(schema()).unwrap();
        let err = parser
            .parse(&[OperationSpec::replace("a", "new"), OperationSpec::replace("_id", "new")])
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::Validation(ValidatorError::NotAllowed(crate::rule::RuleError::Disallowed))
        );
    }

    #[test]
    fn test_remove_index_by_parent_kind() {
        let schema = schema()
            .field(FieldDef::new("d", SchemaType::array(SchemaType::Int)))
            .field(FieldDef::new("m", SchemaType::map(SchemaType::Int)));
        let parser = SmartParser::new(schema).unwrap();

        let unset = parser.parse(&[OperationSpec::remove("m.0")]).unwrap();
        assert_eq!(serde_json::to_value(unset).unwrap(), serde_json::json!([{"$unset": "m.0"}]));

        let splice = parser.parse(&[OperationSpec::remove("d.0")]).unwrap();
        assert!(matches!(splice.as_slice(), [Fragment::Set { .. }]));
    }

    #[test]
    fn test_register_rule_rebuilds() {
        let schema = StructDef::new().field(FieldDef::new("a", SchemaType::String).annotate("jp_frozen", "1"));
        let mut parser = SmartParser::new(schema).unwrap();
        assert!(parser.parse(&[OperationSpec::replace("a", "x")]).is_ok());

        parser
            .register_rule("jp_frozen", Arc::new(DisallowRule::default()))
            .unwrap();
        assert!(parser.parse(&[OperationSpec::replace("a", "x")]).is_err());
    }
}
