//! # coze — Signing, Verification, and the Wire Types
//!
//! The top of the workspace DAG: the [`Key`], [`Pay`], and [`Coze`] wire
//! types and every operation that ties the canonicalizer, the digest
//! engine, and the asymmetric primitives together.
//!
//! ```
//! use coze::{Alg, Key, Pay};
//!
//! # fn main() -> Result<(), coze::CozeError> {
//! let key = Key::generate(Alg::Es256)?;
//! let pay = Pay {
//!     alg: key.alg,
//!     iat: Some(1627518000),
//!     tmb: key.tmb.clone(),
//!     typ: Some("cyphr.me/msg".to_string()),
//!     ..Default::default()
//! };
//! let coze = key.sign_pay(&pay)?;
//! assert!(key.verify_coze(&coze)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Policy
//!
//! - All wire parsing routes through the ordered model: duplicate keys at
//!   any depth are rejected before any field is read.
//! - Structural checks (`alg`/`tmb` agreement) run before cryptographic
//!   work.
//! - No `unsafe` code; no `panic!()` or `.unwrap()` outside tests.

pub mod coze;
pub mod key;
pub mod pay;

// Re-export primary types for ergonomic imports.
pub use crate::coze::{link_digest, Coze};
pub use crate::key::{thumbprint, Key, REVOKE_TYP};
pub use crate::pay::Pay;
pub use coze_core::alg::{Alg, Crv, Family, Genus, HashAlg, KeyUse, Params};
pub use coze_core::b64::B64;
pub use coze_core::canon::{canon_fields, canonical_hash, canonicalize, Canon};
pub use coze_core::error::CozeError;
pub use coze_core::hex::Hex;
pub use coze_core::normal::{is_normal, Norm};
pub use coze_core::value::{Obj, Val};
