//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error taxonomy used throughout the Coze crates. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parsing and canonicalization errors abort the enclosing operation
//!   immediately; no partial canonical output is ever returned.
//! - Algorithm-name parsing is the one non-failing path: unknown names map
//!   to the `UnknownAlg` sentinel, and operations that actually require a
//!   resolved algorithm reject the sentinel with `InvalidHashAlg` or
//!   `UnsupportedAlg`.
//! - `verify` returning `false` (well-formed but not authentic) is distinct
//!   from an `Err` (structural/input problem). Callers must check both.
//! - Error text never includes private key material.

use thiserror::Error;

/// Top-level error type for the Coze crates.
#[derive(Error, Debug)]
pub enum CozeError {
    /// Input is not valid JSON, or not the JSON shape the operation needs.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A JSON object repeated a key. Duplicate keys are a signature
    /// ambiguity vector and are rejected at any nesting depth.
    #[error("duplicate field {field:?} in JSON object")]
    DuplicateField {
        /// The repeated key.
        field: String,
    },

    /// A canon (explicit field list or template) failed to decode.
    #[error("invalid canon: {0}")]
    InvalidCanon(String),

    /// An operation requiring a resolved hash algorithm was given an
    /// unknown or empty one.
    #[error("invalid hash algorithm {0:?}")]
    InvalidHashAlg(String),

    /// A signing operation was requested for a non-signing or
    /// unimplemented algorithm.
    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlg(String),

    /// The key and the payload disagree on `alg` or `tmb`.
    #[error("key/payload mismatch: {0}")]
    KeyPayloadMismatch(String),

    /// A key failed its non-cryptographic structural checks.
    #[error("structural key error: {0}")]
    StructuralKey(String),

    /// The underlying cryptographic primitive failed.
    #[error("crypto failure: {0}")]
    Crypto(String),
}

/// Message prefix emitted by the ordered-value visitor when it rejects a
/// repeated key. `From<serde_json::Error>` uses it to recover the typed
/// `DuplicateField` variant from serde's custom-error channel.
pub(crate) const DUPLICATE_FIELD_PREFIX: &str = "duplicate field ";

impl From<serde_json::Error> for CozeError {
    fn from(err: serde_json::Error) -> Self {
        let msg = err.to_string();
        if let Some(rest) = msg.strip_prefix(DUPLICATE_FIELD_PREFIX) {
            // The visitor formats the key with `{:?}`; strip the quotes and
            // anything serde appended (line/column info) after them.
            let field = rest
                .split('"')
                .nth(1)
                .unwrap_or(rest)
                .to_string();
            return CozeError::DuplicateField { field };
        }
        CozeError::MalformedInput(msg)
    }
}
