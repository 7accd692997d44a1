//! # Canonicalizer — Deterministic Byte Production
//!
//! Turns arbitrary JSON bytes into the byte-exact form that feeds digest
//! computation. Three modes:
//!
//! - **No canon** (`None`): compact re-encoding that preserves source
//!   field order. This is the digest path — a payload's `cad` is computed
//!   over its own field order, so any compliant implementation re-derives
//!   the same bytes from the same wire payload.
//! - **[`Canon::Sort`]**: object keys sorted by UTF-8 byte order at every
//!   nesting level. Two payloads holding the same key/value set in
//!   different orders canonicalize identically under this mode.
//! - **[`Canon::Fields`]**: exactly the listed top-level fields, in list
//!   order. Listed fields absent from the input are omitted (not emitted
//!   as null); input fields not in the list are dropped. This truncation
//!   and reordering is specified behavior, not an error.
//!
//! Every mode is idempotent: canonicalizing already-canonical bytes with
//! the same canon yields byte-identical output.
//!
//! The encoder never converts `&`, `<`, or `>` to unicode escapes; those
//! are meaningful UTF-8 characters and pass through literally. An encoder
//! that HTML-escapes would silently change every digest downstream.

use serde::Serialize;

use crate::alg::HashAlg;
use crate::b64::B64;
use crate::error::CozeError;
use crate::hash::hash;
use crate::value::{Obj, Val};

/// A canonicalization specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Canon {
    /// Sort all object keys by UTF-8 byte order, recursively.
    Sort,
    /// Exactly these top-level fields, in this order.
    Fields(Vec<String>),
}

impl Canon {
    /// Build a field-list canon.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Canon::Fields(names.into_iter().map(Into::into).collect())
    }

    /// Derive a field-list canon from a template value's own top-level
    /// key order. Value types in the template are ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCanon` when the template does not serialize to a
    /// JSON object.
    pub fn from_template<T: Serialize>(template: &T) -> Result<Self, CozeError> {
        let bytes = serde_json::to_vec(template)
            .map_err(|e| CozeError::InvalidCanon(format!("template failed to encode: {e}")))?;
        let val = Val::from_slice(&bytes)
            .map_err(|e| CozeError::InvalidCanon(format!("template failed to decode: {e}")))?;
        let obj = val
            .as_obj()
            .ok_or_else(|| CozeError::InvalidCanon("template is not a JSON object".to_string()))?;
        Ok(Canon::Fields(obj.keys().cloned().collect()))
    }
}

/// Canonicalize JSON bytes under the given canon.
///
/// # Errors
///
/// `MalformedInput` for invalid JSON (or non-object input when a field
/// list requires one), `DuplicateField` for repeated keys.
pub fn canonicalize(input: &[u8], canon: Option<&Canon>) -> Result<Vec<u8>, CozeError> {
    let val = Val::from_slice(input)?;
    match canon {
        None => val.to_vec(),
        Some(Canon::Sort) => {
            let mut sorted = val;
            sorted.sort_all();
            sorted.to_vec()
        }
        Some(Canon::Fields(names)) => {
            let obj = val.as_obj().ok_or_else(|| {
                CozeError::MalformedInput("canon requires a top-level JSON object".to_string())
            })?;
            let mut out = Obj::new();
            for name in names {
                if out.contains_key(name) {
                    continue;
                }
                if let Some(value) = obj.get(name) {
                    out.insert(name.clone(), value.clone());
                }
            }
            Val::Obj(out).to_vec()
        }
    }
}

/// Canonicalize then hash: the canonical digest of `input`.
///
/// # Errors
///
/// Canonicalization errors propagate; `InvalidHashAlg` when `alg` is the
/// unknown sentinel.
pub fn canonical_hash(
    input: &[u8],
    canon: Option<&Canon>,
    alg: HashAlg,
) -> Result<B64, CozeError> {
    let canonical = canonicalize(input, canon)?;
    Ok(B64::new(hash(alg, &canonical)?))
}

/// The top-level field names of a JSON object, in appearance order (the
/// `can` of a payload).
///
/// # Errors
///
/// `MalformedInput` when the input is not a JSON object.
pub fn canon_fields(input: &[u8]) -> Result<Vec<String>, CozeError> {
    let val = Val::from_slice(input)?;
    let obj = val
        .as_obj()
        .ok_or_else(|| CozeError::MalformedInput("expected a top-level JSON object".to_string()))?;
    Ok(obj.keys().cloned().collect())
}
