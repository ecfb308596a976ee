//! serde `Serializer` producing [`Value`]s
//!
//! Lets typed Rust values be used as patch payloads while keeping the kind
//! details JSON would lose: structs stay structs, map key kinds are recorded,
//! byte buffers become binary, and [`ObjectId`]s stay identifiers.

use serde::ser::{self, Serialize};

use super::errors::{ValueError, ValueResult};
use super::object_id::{ObjectId, OBJECT_ID_TOKEN};
use super::types::{Kind, Map, Record, Value};

/// Converts any serializable value into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> ValueResult<Value> {
    value.serialize(ValueSerializer)
}

/// Serializer whose output is a [`Value`] tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ValueError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> ValueResult<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_i16(self, v: i16) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_i32(self, v: i32) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_i64(self, v: i64) -> ValueResult<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_u16(self, v: u16) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_u32(self, v: u32) -> ValueResult<Value> {
        Ok(Value::Int(v as i64))
    }

    fn serialize_u64(self, v: u64) -> ValueResult<Value> {
        Ok(i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64)))
    }

    fn serialize_f32(self, v: f32) -> ValueResult<Value> {
        Ok(Value::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> ValueResult<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> ValueResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> ValueResult<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> ValueResult<Value> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn serialize_none(self) -> ValueResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> ValueResult<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> ValueResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> ValueResult<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> ValueResult<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> ValueResult<Value> {
        let inner = value.serialize(self)?;
        if name == OBJECT_ID_TOKEN {
            if let Value::String(hex) = &inner {
                return ObjectId::from_hex(hex).map(Value::ObjectId);
            }
        }
        Ok(inner)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> ValueResult<Value> {
        let mut map = Map::new();
        map.insert(variant, to_value(value)?);
        Ok(Value::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> ValueResult<SerializeVec> {
        Ok(SerializeVec {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> ValueResult<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> ValueResult<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> ValueResult<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> ValueResult<SerializeMap> {
        Ok(SerializeMap {
            map: None,
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> ValueResult<SerializeRecord> {
        Ok(SerializeRecord {
            record: Record::new(Some(name)),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> ValueResult<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            record: Record::new(Some(variant)),
        })
    }
}

pub struct SerializeVec {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> ValueResult<()> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> ValueResult<Value> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> ValueResult<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> ValueResult<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> ValueResult<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> ValueResult<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> ValueResult<()> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> ValueResult<Value> {
        let mut map = Map::new();
        map.insert(self.variant, Value::Array(self.items));
        Ok(Value::Map(map))
    }
}

pub struct SerializeMap {
    map: Option<Map>,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> ValueResult<()> {
        let (key, kind) = map_key(to_value(key)?)?;
        self.map.get_or_insert_with(|| Map::with_key_kind(kind));
        self.next_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> ValueResult<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ValueError::Custom("map value serialized before its key".into()))?;
        let value = to_value(value)?;
        self.map.get_or_insert_with(Map::new).insert(key, value);
        Ok(())
    }

    fn end(self) -> ValueResult<Value> {
        Ok(Value::Map(self.map.unwrap_or_default()))
    }
}

/// Turns a serialized map key into its path-segment form.
fn map_key(key: Value) -> ValueResult<(String, Kind)> {
    match key {
        Value::String(s) => Ok((s, Kind::String)),
        Value::Int(i) => Ok((i.to_string(), Kind::Int)),
        Value::Bool(b) => Ok((b.to_string(), Kind::Bool)),
        Value::ObjectId(id) => Ok((id.to_hex(), Kind::ObjectId)),
        other => Err(ValueError::KeyMustBeScalar(other.kind())),
    }
}

pub struct SerializeRecord {
    record: Record,
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> ValueResult<()> {
        self.record.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> ValueResult<Value> {
        Ok(Value::Struct(self.record))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    record: Record,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> ValueResult<()> {
        self.record.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> ValueResult<Value> {
        let mut map = Map::new();
        map.insert(self.variant, Value::Struct(self.record));
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Profile {
        name: String,
        #[serde(rename = "user_age")]
        age: u32,
        tags: Vec<String>,
        owner: Option<ObjectId>,
    }

    #[test]
    fn test_struct_stays_struct() {
        let profile = Profile {
            name: "Anja".into(),
            age: 31,
            tags: vec!["a".into()],
            owner: None,
        };
        let value = to_value(&profile).unwrap();
        let Value::Struct(record) = value else {
            panic!("expected struct");
        };
        assert_eq!(record.name(), Some("Profile"));
        assert_eq!(record.get("name"), Some(&Value::from("Anja")));
        assert_eq!(record.get("user_age"), Some(&Value::Int(31)));
        assert_eq!(record.get("tags").unwrap().kind(), Kind::Array);
        assert_eq!(record.get("owner"), Some(&Value::Null));
    }

    #[test]
    fn test_map_records_key_kind() {
        let mut by_int = BTreeMap::new();
        by_int.insert(1i32, "one");
        let Value::Map(map) = to_value(&by_int).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(map.key_kind(), Kind::Int);
        assert_eq!(map.get("1"), Some(&Value::from("one")));

        let mut by_str = BTreeMap::new();
        by_str.insert("k", 1u8);
        let Value::Map(map) = to_value(&by_str).unwrap() else {
            panic!("expected map");
        };
        assert_eq!(map.key_kind(), Kind::String);
    }

    #[test]
    fn test_object_id_preserved() {
        let id = ObjectId::new();
        assert_eq!(to_value(&id).unwrap(), Value::ObjectId(id));
    }

    #[test]
    fn test_non_scalar_key_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1], 1);
        let err = to_value(&map).unwrap_err();
        assert_eq!(err, ValueError::KeyMustBeScalar(Kind::Array));
    }

    #[test]
    fn test_empty_map_defaults_to_string_keys() {
        let map: BTreeMap<String, String> = BTreeMap::new();
        let Value::Map(map) = to_value(&map).unwrap() else {
            panic!("expected map");
        };
        assert!(map.is_empty());
        assert_eq!(map.key_kind(), Kind::String);
    }
}
