//! # B64 — URL-Safe Base64 Wire Encoding
//!
//! All binary fields in wire JSON (`x`, `d`, `tmb`, `sig`, `cad`, `czd`)
//! are carried as base64 URL-safe strings with no padding. `B64` wraps the
//! raw bytes and owns both directions of the conversion.
//!
//! ## Security Invariant
//!
//! Decoding is canonical-only: padding characters and non-canonical
//! trailing bits are rejected. Two distinct text strings can therefore
//! never decode to the same byte value, which keeps text-level equality
//! and byte-level equality interchangeable for identity fields like `tmb`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::CozeError;

/// Raw bytes that serialize as base64 URL-safe, no padding.
///
/// Equality is byte equality. `Display` and `Debug` both render the
/// encoded text form, so digests and signatures print the way they appear
/// on the wire.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct B64(Vec<u8>);

impl B64 {
    /// Wrap raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a base64url-no-pad string.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` for padding, non-alphabet characters, or a
    /// non-canonical encoding.
    pub fn decode(s: &str) -> Result<Self, CozeError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CozeError::MalformedInput(format!("invalid base64 {s:?}: {e}")))?;
        Ok(Self(bytes))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the wrapper, returning the raw bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Number of raw bytes (not encoded characters).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for B64 {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for B64 {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for B64 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for B64 {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl std::fmt::Display for B64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl std::fmt::Debug for B64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B64({self})")
    }
}

impl Serialize for B64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for B64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
