//! # Ordered JSON Model — `Val` and `Obj`
//!
//! The substrate the canonicalizer and the normal matcher operate on.
//! Standard JSON object models either sort keys or keep last-value-wins
//! semantics for repeated keys; this model does neither:
//!
//! - Object iteration order is source order (`IndexMap`).
//! - A repeated key at any nesting depth is a hard parse error, caught at
//!   insertion time during the single parse pass.
//!
//! ## Security Invariant
//!
//! Duplicate keys are a known signature-forgery vector: two parsers that
//! disagree on which occurrence wins will verify different payloads under
//! the same signature. Rejecting duplicates at the one point of entry makes
//! the ambiguity unrepresentable.

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::b64::B64;
use crate::error::{CozeError, DUPLICATE_FIELD_PREFIX};

/// A JSON value whose objects preserve source key order.
#[derive(Clone, PartialEq)]
pub enum Val {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, kept in serde_json's exact representation.
    Num(serde_json::Number),
    /// JSON string.
    Str(String),
    /// JSON array.
    Arr(Vec<Val>),
    /// JSON object, in source order.
    Obj(Obj),
}

/// A JSON object that preserves insertion order and holds no duplicate
/// keys.
#[derive(Clone, Default, PartialEq)]
pub struct Obj(IndexMap<String, Val>);

impl Val {
    /// Parse a value from JSON bytes, rejecting duplicate object keys at
    /// every nesting depth.
    ///
    /// # Errors
    ///
    /// `MalformedInput` for invalid JSON, `DuplicateField` for a repeated
    /// key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CozeError> {
        serde_json::from_slice(bytes).map_err(CozeError::from)
    }

    /// Serialize to compact JSON bytes, preserving object order.
    ///
    /// The encoder never escapes `&`, `<`, or `>`; those characters pass
    /// through literally.
    pub fn to_vec(&self) -> Result<Vec<u8>, CozeError> {
        serde_json::to_vec(self).map_err(CozeError::from)
    }

    /// Borrow the object form, if this value is an object.
    pub fn as_obj(&self) -> Option<&Obj> {
        match self {
            Val::Obj(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the string form, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the integer form, if this value is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Val::Num(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl FromStr for Val {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl Obj {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Val> {
        self.0.get(key)
    }

    /// Look up a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Val::as_str)
    }

    /// Look up an integer value by key.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Val::as_i64)
    }

    /// Insert a key/value pair at the end, replacing (in place) any
    /// existing entry for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Val) -> Option<Val> {
        self.0.insert(key.into(), value)
    }

    /// Remove an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Val> {
        self.0.shift_remove(key)
    }

    /// True when the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Val)> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sort entries (and all nested objects) by UTF-8 byte order of keys.
    pub(crate) fn sort_all(&mut self) {
        self.0.sort_unstable_keys();
        for value in self.0.values_mut() {
            value.sort_all();
        }
    }
}

impl Val {
    /// Sort every object in this value (at any depth) by UTF-8 byte order
    /// of keys. String comparison in Rust is byte-wise, which is exactly
    /// the required order.
    pub(crate) fn sort_all(&mut self) {
        match self {
            Val::Obj(obj) => obj.sort_all(),
            Val::Arr(items) => {
                for item in items {
                    item.sort_all();
                }
            }
            _ => {}
        }
    }
}

impl From<Obj> for Val {
    fn from(obj: Obj) -> Self {
        Val::Obj(obj)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl From<i64> for Val {
    fn from(n: i64) -> Self {
        Val::Num(n.into())
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<&B64> for Val {
    fn from(b: &B64) -> Self {
        Val::Str(b.to_string())
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for Val {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Val::Null => serializer.serialize_unit(),
            Val::Bool(b) => serializer.serialize_bool(*b),
            Val::Num(n) => n.serialize(serializer),
            Val::Str(s) => serializer.serialize_str(s),
            Val::Arr(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Val::Obj(obj) => obj.serialize(serializer),
        }
    }
}

impl Serialize for Obj {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Val {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValVisitor)
    }
}

struct ValVisitor;

impl<'de> Visitor<'de> for ValVisitor {
    type Value = Val;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Val, E> {
        Ok(Val::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Val, E> {
        Ok(Val::Num(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Val, E> {
        Ok(Val::Num(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Val, E> {
        serde_json::Number::from_f64(v)
            .map(Val::Num)
            .ok_or_else(|| de::Error::custom("non-finite number"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Val, E> {
        Ok(Val::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Val, E> {
        Ok(Val::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Val, E> {
        Ok(Val::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Val, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Val::Arr(items))
    }

    /// Keys arrive in document order; an insert that displaces an existing
    /// entry is a repeated key and aborts the parse.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Val, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value::<Val>()?;
            if entries.insert(key.clone(), value).is_some() {
                return Err(de::Error::custom(format_args!(
                    "{DUPLICATE_FIELD_PREFIX}{key:?}"
                )));
            }
        }
        Ok(Val::Obj(Obj(entries)))
    }
}

impl std::fmt::Debug for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_vec() {
            Ok(bytes) => f.write_str(&String::from_utf8_lossy(&bytes)),
            Err(_) => f.write_str("<unserializable>"),
        }
    }
}

impl std::fmt::Debug for Obj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&Val::Obj(self.clone()), f)
    }
}
