//! # Hex — Uppercase Hexadecimal Text Type
//!
//! Secondary binary-to-text form used by contexts that prefer hex over
//! base64 (key escrow printouts, QR-friendly exports). Strict by
//! construction: even length, two digits per byte, uppercase only.
//! Lowercase input is rejected rather than normalized so that a given byte
//! string has exactly one accepted text form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::b64::B64;
use crate::error::CozeError;

/// Raw bytes that serialize as strict uppercase hex.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex(Vec<u8>);

impl Hex {
    /// Wrap raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a strict uppercase hex string.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` for odd length, non-hex characters, or
    /// lowercase digits.
    pub fn decode(s: &str) -> Result<Self, CozeError> {
        if s.len() % 2 != 0 {
            return Err(CozeError::MalformedInput(format!(
                "hex string must have even length, got {} chars",
                s.len()
            )));
        }
        if s.bytes().any(|b| b.is_ascii_lowercase()) {
            return Err(CozeError::MalformedInput(format!(
                "hex string must be uppercase: {s:?}"
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| CozeError::MalformedInput(format!("invalid hex {s:?}: {e}")))?;
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

    /// Number of raw bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Hex {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Re-render a base64url wire value in the hex text form. The bytes are
/// identical; only the text changes.
impl From<&B64> for Hex {
    fn from(b: &B64) -> Self {
        Self(b.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Hex {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Hex {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

impl std::fmt::Debug for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hex({self})")
    }
}

impl Serialize for Hex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(&self.0))
    }
}

impl<'de> Deserialize<'de> for Hex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
