//! Dotted document paths

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// Segment standing for any array index or map key
pub const WILDCARD: &str = "*";

/// Dot-separated address into a document, e.g. `user.groups.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the raw segments; an empty path has none.
    ///
    /// Empty segments (`a..b`, `a.`) are yielded as `""`, never skipped.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        (!self.0.is_empty())
            .then(|| self.0.split(SEPARATOR))
            .into_iter()
            .flatten()
    }

    /// True for non-empty paths without empty segments.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|s| !s.is_empty())
    }

    /// Last segment, if any
    pub fn last(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Everything before the last segment; `None` for single-segment paths.
    pub fn parent(&self) -> Option<Path> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| Path::new(parent))
            .filter(|p| !p.is_empty())
    }

    /// Appends one segment.
    pub fn join(&self, segment: &str) -> Path {
        Path(join(&self.0, segment))
    }

    /// Array index carried by the last segment, if it is a non-negative integer.
    pub fn trailing_index(&self) -> Option<i64> {
        self.last()
            .and_then(|s| s.parse::<u64>().ok())
            .and_then(|i| i64::try_from(i).ok())
    }

    /// Database field-reference form: `$path`.
    pub fn field_ref(&self) -> String {
        format!("${}", self.0)
    }
}

/// Joins a prefix and a segment with the separator, skipping empty prefixes.
pub(crate) fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", prefix, SEPARATOR, segment)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::new(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path(s)
    }
}

impl Borrow<str> for Path {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
