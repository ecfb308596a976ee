//! Dynamic document values
//!
//! Candidate values for patch operations arrive either as JSON or as typed Rust
//! values converted with [`to_value`](super::to_value). Both land here, keeping
//! the kind information structural matching relies on:
//! - maps remember the kind of their keys
//! - structs stay distinct from maps
//! - identifiers and binary payloads keep their own kinds

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::object_id::ObjectId;

/// Structural kind of a value or a declared schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    ObjectId,
    Binary,
    Array,
    Map,
    Struct,
}

impl Kind {
    /// Returns the kind name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::ObjectId => "object_id",
            Kind::Binary => "binary",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Struct => "struct",
        }
    }

    /// Arrays and maps have addressable elements
    pub fn is_collection(&self) -> bool {
        matches!(self, Kind::Array | Kind::Map)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key/value mapping with insertion order and a recorded key kind.
///
/// Keys are always stored in their string form because they double as path
/// segments; `key_kind` records what they were before conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    key_kind: Kind,
    entries: IndexMap<String, Value>,
}

impl Map {
    /// Creates an empty string-keyed map
    pub fn new() -> Self {
        Self::with_key_kind(Kind::String)
    }

    /// Creates an empty map whose keys were of the given kind
    pub fn with_key_kind(key_kind: Kind) -> Self {
        Self {
            key_kind,
            entries: IndexMap::new(),
        }
    }

    pub fn key_kind(&self) -> Kind {
        self.key_kind
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry in insertion order, used for element sampling
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.entries.first()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Named-field record produced from a serialized Rust struct.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    name: Option<String>,
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            fields: IndexMap::new(),
        }
    }

    /// Struct name, when known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }
}

/// A runtime document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    ObjectId(ObjectId),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(Map),
    Struct(Record),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::ObjectId(_) => Kind::ObjectId,
            Value::Binary(_) => Kind::Binary,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value, recognizing `$oid` and `$binary` extended forms.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(object) => {
                let map: Map = object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect();
                extended_json(map)
            }
        }
    }
}

/// Collapses single-key `{"$oid": ..}` / `{"$binary": ..}` maps.
fn extended_json(map: Map) -> Value {
    if map.len() == 1 {
        if let Some((key, value)) = map.first() {
            match (key.as_str(), value) {
                ("$oid", Value::String(hex)) => {
                    if let Ok(id) = ObjectId::from_hex(hex) {
                        return Value::ObjectId(id);
                    }
                }
                ("$binary", Value::Map(binary)) => {
                    if let Some(Value::String(encoded)) = binary.get("base64") {
                        if let Ok(bytes) = STANDARD.decode(encoded) {
                            return Value::Binary(bytes);
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Value::Map(map)
}

/// Compact text form (`<nil>`, `[1 2]`, `map[k:v]`, `{a b}`) that
/// expression rules match against.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::ObjectId(id) => write!(f, "{}", id),
            Value::Binary(bytes) => {
                f.write_str("[")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", b)?;
                }
                f.write_str("]")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("]")
            }
            Value::Struct(record) => {
                f.write_str("{")?;
                for (i, (_, value)) in record.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::ObjectId(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$oid", &id.to_hex())?;
                map.end()
            }
            Value::Binary(bytes) => {
                let mut inner = IndexMap::new();
                inner.insert("base64", STANDARD.encode(bytes));
                inner.insert("subType", "00".to_string());
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$binary", &inner)?;
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Struct(record) => {
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (key, value) in record.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any document value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map(Value::Int).unwrap_or(Value::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(extended_json(map))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(Kind::Int.to_string(), "int");
        assert_eq!(Kind::String.to_string(), "string");
        assert_eq!(Kind::ObjectId.to_string(), "object_id");
        assert!(Kind::Array.is_collection());
        assert!(Kind::Map.is_collection());
        assert!(!Kind::Struct.is_collection());
    }

    #[test]
    fn test_from_json_kinds() {
        let value = Value::from_json(json!({"a": 1, "b": 1.5, "c": "x", "d": [true]}));
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.key_kind(), Kind::String);
        assert_eq!(map.get("a").unwrap().kind(), Kind::Int);
        assert_eq!(map.get("b").unwrap().kind(), Kind::Float);
        assert_eq!(map.get("c").unwrap().kind(), Kind::String);
        assert_eq!(map.get("d").unwrap().kind(), Kind::Array);
    }

    #[test]
    fn test_extended_json_object_id() {
        let value = Value::from_json(json!({"$oid": "63890e0db9cc0e2a2bfd2667"}));
        assert_eq!(value.kind(), Kind::ObjectId);

        let rendered = serde_json::to_value(&value).unwrap();
        assert_eq!(rendered, json!({"$oid": "63890e0db9cc0e2a2bfd2667"}));
    }

    #[test]
    fn test_extended_json_binary() {
        let value = Value::Binary(vec![1, 2, 3]);
        let rendered = serde_json::to_value(&value).unwrap();
        assert_eq!(rendered, json!({"$binary": {"base64": "AQID", "subType": "00"}}));

        let back: Value = serde_json::from_value(rendered).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_display_matches_format_verb() {
        assert_eq!(Value::from("123").to_string(), "123");
        assert_eq!(Value::Float(3.0).to_string(), "3");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(), "[1 2]");
    }

    #[test]
    fn test_deserialize_large_unsigned_as_float() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value.kind(), Kind::Float);
    }
}
