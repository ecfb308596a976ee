//! Database update fragments
//!
//! Fragments are aggregation-pipeline update stages:
//!
//! ```json
//! [{"$unset": "a"}, {"$set": {"a": "new"}}]
//! ```

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::operation::Path;
use crate::value::Value;

/// Expression assigned by a `$set` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Value written as is
    Literal(Value),
    /// Reference to another field: `"$path"`
    Field(Path),
    /// `{"$concatArrays": [...]}`
    ConcatArrays(Vec<Expr>),
    /// `{"$slice": [...]}`
    Slice(Vec<Expr>),
    /// `{"$add": [...]}`
    Add(Vec<Expr>),
    /// `{"$size": ...}`
    Size(Box<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn field(path: &Path) -> Self {
        Expr::Field(path.clone())
    }
}

struct Operator<'a, T: ?Sized>(&'static str, &'a T);

impl<T: Serialize + ?Sized> Serialize for Operator<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(value) => value.serialize(serializer),
            Expr::Field(path) => serializer.serialize_str(&path.field_ref()),
            Expr::ConcatArrays(items) => Operator("$concatArrays", items).serialize(serializer),
            Expr::Slice(items) => Operator("$slice", items).serialize(serializer),
            Expr::Add(items) => Operator("$add", items).serialize(serializer),
            Expr::Size(inner) => Operator("$size", &**inner).serialize(serializer),
        }
    }
}

/// One update stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// `{"$unset": "path"}`
    Unset(Path),
    /// `{"$set": {"path": expr}}`
    Set { path: Path, value: Expr },
}

impl Fragment {
    pub fn set(path: impl Into<Path>, value: Expr) -> Self {
        Fragment::Set {
            path: path.into(),
            value,
        }
    }

    pub fn unset(path: impl Into<Path>) -> Self {
        Fragment::Unset(path.into())
    }
}

struct SetBody<'a>(&'a Path, &'a Expr);

impl Serialize for SetBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.as_str(), self.1)?;
        map.end()
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fragment::Unset(path) => Operator("$unset", path.as_str()).serialize(serializer),
            Fragment::Set { path, value } => Operator("$set", &SetBody(path, value)).serialize(serializer),
        }
    }
}
