//! Structural type matcher
//!
//! Compares a candidate value against a declared schema type. The walk is
//! shallow on purpose for collections: only the first array element or map
//! entry is inspected. Errors carry the path of the offending element, with
//! `.[*]` appended for every step into a collection.

use crate::operation::{join, Operation};
use crate::schema::{SchemaType, StructDef};
use crate::value::{Kind, Map, ObjectId, Record, Value};

use super::errors::{RuleError, RuleResult};

/// Path segment appended when descending into a collection element
const ELEMENT: &str = "[*]";

/// Checks that `candidate` fits `reference` at `path`.
///
/// For `add`, a non-array candidate against an array reference is compared
/// with the element type, since adding appends a single element.
pub fn match_type(
    path: &str,
    reference: &SchemaType,
    candidate: &Value,
    op: Option<Operation>,
) -> RuleResult<()> {
    let reference = reference.deref();

    if candidate.is_null() {
        return Ok(());
    }

    if op == Some(Operation::Add) && candidate.kind() != Kind::Array {
        if let SchemaType::Array { element_type } = reference {
            return match_type(&join(path, ELEMENT), element_type, candidate, op);
        }
    }

    match (reference, candidate) {
        (SchemaType::Struct(def), Value::Map(map)) => match_map_with_struct(path, def, map, op),
        (SchemaType::Struct(def), Value::Struct(record)) => match_record(path, def, record, op),
        (SchemaType::ObjectId, candidate) => match_object_id(path, candidate),
        (SchemaType::Array { element_type }, Value::Array(items)) => match items.first() {
            Some(first) => match_type(&join(path, ELEMENT), element_type, first, op),
            None => Ok(()),
        },
        (
            SchemaType::Map {
                key_kind,
                value_type,
            },
            Value::Map(map),
        ) => match map.first() {
            Some(_) if map.key_kind() != *key_kind => {
                Err(RuleError::key_mismatch(path, map.key_kind(), *key_kind))
            }
            Some((_, value)) => match_type(&join(path, ELEMENT), value_type, value, op),
            None => Ok(()),
        },
        (reference, candidate) if reference.kind() == candidate.kind() => Ok(()),
        (reference, candidate) => Err(RuleError::mismatch(path, candidate.kind(), reference.kind())),
    }
}

/// Identifier fields accept structured ids, hex strings, 12-byte binaries and
/// arrays of twelve byte-sized integers.
fn match_object_id(path: &str, candidate: &Value) -> RuleResult<()> {
    if is_object_id_encoding(candidate) {
        Ok(())
    } else {
        Err(RuleError::mismatch(path, candidate.kind(), Kind::ObjectId))
    }
}

pub(crate) fn is_object_id_encoding(candidate: &Value) -> bool {
    match candidate {
        Value::ObjectId(_) => true,
        Value::String(hex) => ObjectId::from_hex(hex).is_ok(),
        Value::Binary(bytes) => bytes.len() == 12,
        Value::Array(items) => {
            items.len() == 12
                && items
                    .iter()
                    .all(|item| matches!(item, Value::Int(b) if (0..=255).contains(b)))
        }
        _ => false,
    }
}

/// A map standing in for a struct: string keys naming declared fields.
fn match_map_with_struct(
    path: &str,
    def: &StructDef,
    map: &Map,
    op: Option<Operation>,
) -> RuleResult<()> {
    if map.key_kind() != Kind::String {
        return Err(RuleError::key_mismatch(path, map.key_kind(), Kind::String));
    }

    for (key, value) in map.iter() {
        let field_path = join(path, key);
        let field = def
            .find(key)
            .ok_or_else(|| RuleError::UnknownField(field_path.clone()))?;
        match_type(&field_path, &field.ty, value, op)?;
    }

    Ok(())
}

fn match_record(
    path: &str,
    def: &StructDef,
    record: &Record,
    op: Option<Operation>,
) -> RuleResult<()> {
    for (name, value) in record.iter() {
        let field_path = join(path, name);
        let field = def
            .find(name)
            .ok_or_else(|| RuleError::UnknownField(field_path.clone()))?;
        match_type(&field_path, &field.ty, value, op)?;
    }

    Ok(())
}
