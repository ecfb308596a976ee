//! 12-byte document identifiers
//!
//! Layout follows the BSON ObjectId convention:
//! - 4 bytes: seconds since the Unix epoch, big-endian
//! - 5 bytes: random value fixed per process
//! - 3 bytes: incrementing counter, seeded randomly

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use rand::Rng;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{ValueError, ValueResult};

/// Newtype name that [`ValueSerializer`](super::ValueSerializer) recognizes as an identifier.
pub(crate) const OBJECT_ID_TOKEN: &str = "$oid";

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Opaque document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Number of raw bytes in an identifier
    pub const LEN: usize = 12;

    /// Generates a new identifier.
    pub fn new() -> Self {
        let timestamp = chrono::Utc::now().timestamp() as u32;
        let process = PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen());
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..COUNTER_MASK)))
            .fetch_add(1, Ordering::SeqCst)
            & COUNTER_MASK;

        let mut bytes = [0u8; Self::LEN];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Wraps raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Wraps a byte slice, which must be exactly 12 bytes long.
    pub fn from_slice(bytes: &[u8]) -> ValueResult<Self> {
        let raw: [u8; 12] = bytes
            .try_into()
            .map_err(|_| ValueError::InvalidObjectId(hex::encode(bytes)))?;
        Ok(Self(raw))
    }

    /// Parses the 24-digit hex form.
    pub fn from_hex(s: &str) -> ValueResult<Self> {
        let bytes = hex::decode(s).map_err(|_| ValueError::InvalidObjectId(s.to_string()))?;
        Self::from_slice(&bytes).map_err(|_| ValueError::InvalidObjectId(s.to_string()))
    }

    /// Returns the 24-digit lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the raw bytes.
    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Returns the creation time in seconds since the Unix epoch.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(OBJECT_ID_TOKEN, &self.to_hex())
    }
}

struct ObjectIdVisitor;

impl<'de> Visitor<'de> for ObjectIdVisitor {
    type Value = ObjectId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 24-digit hex object id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjectId, E> {
        ObjectId::from_hex(v).map_err(E::custom)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, d: D) -> Result<ObjectId, D::Error> {
        d.deserialize_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(OBJECT_ID_TOKEN, ObjectIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let id = ObjectId::new();
        let parsed = ObjectId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.to_hex().len(), 24);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(ObjectId::from_hex("not-hex").is_err());
        assert!(ObjectId::from_hex("abcd").is_err());
    }

    #[test]
    fn test_from_slice_requires_twelve_bytes() {
        assert!(ObjectId::from_slice(&[1, 2, 3]).is_err());
        let id = ObjectId::from_slice(&[99, 137, 14, 13, 185, 204, 14, 42, 43, 253, 38, 103]).unwrap();
        assert_eq!(id.to_hex(), "63890e0db9cc0e2a2bfd2667");
    }

    #[test]
    fn test_timestamp_prefix() {
        let before = chrono::Utc::now().timestamp() as u32;
        let id = ObjectId::new();
        assert!(id.timestamp() >= before);
    }

    #[test]
    fn test_json_form_is_hex_string() {
        let id = ObjectId::from_hex("63890e0db9cc0e2a2bfd2667").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"63890e0db9cc0e2a2bfd2667\"");
        let back: ObjectId = serde_json::from_str("\"63890e0db9cc0e2a2bfd2667\"").unwrap();
        assert_eq!(back, id);
    }
}
