//! Schema description types
//!
//! A document schema is a [`StructDef`]: an ordered list of [`FieldDef`]s, each
//! with a declared [`SchemaType`] and optional string annotations that become
//! validation rules (`jp_min`, `jp_disallow`, ...).
//!
//! Supported types:
//! - bool, int, float, string
//! - object_id: 12-byte identifier
//! - binary: raw bytes
//! - optional: nullable wrapper, transparent for paths and matching
//! - array: homogeneous elements
//! - map: string (or int) keys to homogeneous values
//! - struct: nested fields

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::naming::to_snake_case;
use crate::operation::Operation;
use crate::rule;
use crate::value::Kind;

/// Serialized name that removes a field from the schema
pub const SKIP_FIELD: &str = "-";

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaType {
    Bool,
    Int,
    Float,
    String,
    ObjectId,
    Binary,
    /// Nullable value of the inner type
    Optional {
        inner: Box<SchemaType>,
    },
    /// Homogeneous array
    Array {
        element_type: Box<SchemaType>,
    },
    /// Map with homogeneous values
    Map {
        #[serde(default = "default_key_kind")]
        key_kind: Kind,
        value_type: Box<SchemaType>,
    },
    /// Nested record
    Struct(StructDef),
}

fn default_key_kind() -> Kind {
    Kind::String
}

impl SchemaType {
    pub fn optional(inner: SchemaType) -> Self {
        SchemaType::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn array(element_type: SchemaType) -> Self {
        SchemaType::Array {
            element_type: Box::new(element_type),
        }
    }

    /// String-keyed map
    pub fn map(value_type: SchemaType) -> Self {
        Self::map_with_key(Kind::String, value_type)
    }

    pub fn map_with_key(key_kind: Kind, value_type: SchemaType) -> Self {
        SchemaType::Map {
            key_kind,
            value_type: Box::new(value_type),
        }
    }

    /// Top-level kind; optional wrappers report their inner kind.
    pub fn kind(&self) -> Kind {
        match self {
            SchemaType::Bool => Kind::Bool,
            SchemaType::Int => Kind::Int,
            SchemaType::Float => Kind::Float,
            SchemaType::String => Kind::String,
            SchemaType::ObjectId => Kind::ObjectId,
            SchemaType::Binary => Kind::Binary,
            SchemaType::Optional { inner } => inner.kind(),
            SchemaType::Array { .. } => Kind::Array,
            SchemaType::Map { .. } => Kind::Map,
            SchemaType::Struct(_) => Kind::Struct,
        }
    }

    /// Strips optional wrappers.
    pub fn deref(&self) -> &SchemaType {
        match self {
            SchemaType::Optional { inner } => inner.deref(),
            other => other,
        }
    }

    /// Element type of arrays, value type of maps.
    pub fn element(&self) -> Option<&SchemaType> {
        match self.deref() {
            SchemaType::Array { element_type } => Some(element_type),
            SchemaType::Map { value_type, .. } => Some(value_type),
            _ => None,
        }
    }

    /// Field list of (possibly optional) structs.
    pub fn as_struct(&self) -> Option<&StructDef> {
        match self.deref() {
            SchemaType::Struct(def) => Some(def),
            _ => None,
        }
    }
}

impl From<StructDef> for SchemaType {
    fn from(def: StructDef) -> Self {
        SchemaType::Struct(def)
    }
}

/// Ordered field list of a record type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructDef {
    /// Informational type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds the field serialized under `name`.
    pub fn find(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.serialized_name().as_deref() == Some(name))
    }

    /// Validates the description itself (not a document).
    ///
    /// Serialized names must be non-empty and unique per struct, recursively.
    pub fn validate_structure(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            let Some(name) = field.serialized_name() else {
                continue;
            };
            if name.is_empty() {
                return Err(format!("field '{}' has an empty serialized name", field.name));
            }
            if !seen.insert(name.clone()) {
                return Err(format!("serialized name '{}' is declared twice", name));
            }
            let mut ty = field.ty.deref();
            while let Some(element) = ty.element() {
                ty = element.deref();
            }
            if let SchemaType::Struct(nested) = ty {
                nested
                    .validate_structure()
                    .map_err(|e| format!("{}: {}", name, e))?;
            }
        }
        Ok(())
    }
}

/// Field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Identifier of the field in its owning type
    pub name: String,
    /// Explicit serialized name; `"-"` skips the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Declared type
    #[serde(flatten)]
    pub ty: SchemaType,
    /// Rule annotations, e.g. `jp_min: "3"`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            rename: None,
            ty,
            annotations: IndexMap::new(),
        }
    }

    pub fn rename(mut self, serialized: impl Into<String>) -> Self {
        self.rename = Some(serialized.into());
        self
    }

    /// Sets a raw annotation; later values replace earlier ones.
    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn disallow(self) -> Self {
        self.annotate(rule::DISALLOW, "true")
    }

    pub fn min(self, min: f64) -> Self {
        self.annotate(rule::MIN, min.to_string())
    }

    pub fn max(self, max: f64) -> Self {
        self.annotate(rule::MAX, max.to_string())
    }

    pub fn expression(self, pattern: &str) -> Self {
        self.annotate(rule::EXPRESSION, pattern)
    }

    pub fn allowed_ops(self, ops: &[Operation]) -> Self {
        self.annotate(rule::OP_ALLOWED, join_ops(ops))
    }

    pub fn disallowed_ops(self, ops: &[Operation]) -> Self {
        self.annotate(rule::OP_DISALLOWED, join_ops(ops))
    }

    /// Propagates the named rules to every path below this field.
    pub fn inherit(self, rules: &[&str]) -> Self {
        self.annotate(rule::INHERIT, rules.join(","))
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Path segment for this field; `None` when the field is skipped.
    pub fn serialized_name(&self) -> Option<String> {
        match self.rename.as_deref() {
            Some(SKIP_FIELD) => None,
            Some(name) => Some(name.to_string()),
            None => Some(to_snake_case(&self.name)),
        }
    }
}

fn join_ops(ops: &[Operation]) -> String {
    ops.iter().map(Operation::name).collect::<Vec<_>>().join(",")
}

/// Rust types that describe their own document schema.
///
/// Implement this for document structs to build validators with
/// [`Validator::for_document`](crate::validator::Validator::for_document).
pub trait Document {
    fn schema() -> StructDef;
}
