//! # coze-core — Foundational Types for Coze
//!
//! Coze is a compact, deterministic, JSON-based cryptographic
//! message-signing format. This crate is the leaf of the workspace DAG:
//! it defines everything the signing layers build on, and depends on no
//! internal crate.
//!
//! - **Ordered JSON model** ([`value`]): objects preserve source key
//!   order and reject duplicate keys at parse time, at every depth.
//! - **Canonicalizer** ([`canon`]): byte-exact compact/sorted/field-list
//!   canonical forms feeding digest computation.
//! - **Normal matcher** ([`normal`]): the field-shape grammar
//!   (`Canon`/`Only`/`Option`/`Need`/`Extra`) as an explicit state
//!   machine.
//! - **Algorithm registry** ([`alg`]): one identifier determines every
//!   derived parameter; parsing is total with an unknown sentinel.
//! - **Digest engine** ([`hash`]): SHA-2/SHA-3/SHAKE with pinned XOF
//!   output sizes.
//! - **Wire encodings** ([`b64`], [`hex`]): base64url-no-pad (strict,
//!   canonical-only) and uppercase-strict hex.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `coze-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod alg;
pub mod b64;
pub mod canon;
pub mod error;
pub mod hash;
pub mod hex;
pub mod normal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use alg::{Alg, Crv, Family, Genus, HashAlg, KeyUse, Params};
pub use b64::B64;
pub use canon::{canon_fields, canonical_hash, canonicalize, Canon};
pub use error::CozeError;
pub use hash::hash;
pub use hex::Hex;
pub use normal::{is_normal, Norm};
pub use value::{Obj, Val};
