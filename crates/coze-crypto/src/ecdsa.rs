//! # ECDSA — NIST-Curve Signing over Precomputed Digests
//!
//! One module per curve, all generated from the same template: the
//! operations differ only in the curve crate they borrow types from.
//!
//! ## Wire format
//!
//! - Public key `x` is X‖Y, both coordinates left-zero-padded to the
//!   curve's field size (66 bytes per coordinate for P-521).
//! - Signature is R‖S, both scalars left-zero-padded to the field size.
//!   `S` is low-S normalized at signing time.
//! - Signing operates on the already-computed payload digest via the
//!   prehash interface; no hashing happens here.
//!
//! The fixed-width coordinate and scalar encodings come straight from the
//! curve crates' field types, so the padding can never drift from the
//! sizes the algorithm registry declares.

use coze_core::error::CozeError;
use rand::rngs::OsRng;

macro_rules! ecdsa_curve {
    ($name:ident, $curve:ident) => {
        pub(crate) mod $name {
            use super::*;
            use $curve::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
            use $curve::ecdsa::{Signature, SigningKey, VerifyingKey};
            use $curve::elliptic_curve::sec1::ToEncodedPoint;
            use $curve::{EncodedPoint, FieldBytes};

            fn field_size() -> usize {
                FieldBytes::default().len()
            }

            fn coordinates(vk: &VerifyingKey) -> Result<Vec<u8>, CozeError> {
                let point = vk.to_encoded_point(false);
                let x = point
                    .x()
                    .ok_or_else(|| CozeError::Crypto("public key is the identity point".to_string()))?;
                let y = point
                    .y()
                    .ok_or_else(|| CozeError::Crypto("public key is the identity point".to_string()))?;
                Ok([x.as_slice(), y.as_slice()].concat())
            }

            pub(crate) fn generate() -> Result<(Vec<u8>, Vec<u8>), CozeError> {
                let sk = SigningKey::random(&mut OsRng);
                let x = coordinates(&VerifyingKey::from(&sk))?;
                Ok((sk.to_bytes().to_vec(), x))
            }

            pub(crate) fn public_from_private(d: &[u8]) -> Result<Vec<u8>, CozeError> {
                let sk = SigningKey::from_slice(d)
                    .map_err(|e| CozeError::Crypto(format!("invalid private scalar: {e}")))?;
                coordinates(&VerifyingKey::from(&sk))
            }

            pub(crate) fn sign(d: &[u8], digest: &[u8]) -> Result<Vec<u8>, CozeError> {
                let sk = SigningKey::from_slice(d)
                    .map_err(|e| CozeError::Crypto(format!("invalid private scalar: {e}")))?;
                let sig: Signature = sk
                    .sign_prehash(digest)
                    .map_err(|e| CozeError::Crypto(format!("ECDSA signing failed: {e}")))?;
                let sig = sig.normalize_s().unwrap_or(sig);
                Ok(sig.to_bytes().to_vec())
            }

            pub(crate) fn verify(x: &[u8], digest: &[u8], sig: &[u8]) -> bool {
                let size = field_size();
                if x.len() != size * 2 {
                    return false;
                }
                let point = EncodedPoint::from_affine_coordinates(
                    FieldBytes::from_slice(&x[..size]),
                    FieldBytes::from_slice(&x[size..]),
                    false,
                );
                let Ok(vk) = VerifyingKey::from_encoded_point(&point) else {
                    return false;
                };
                let Ok(sig) = Signature::from_slice(sig) else {
                    return false;
                };
                vk.verify_prehash(digest, &sig).is_ok()
            }
        }
    };
}

ecdsa_curve!(es224, p224);
ecdsa_curve!(es256, p256);
ecdsa_curve!(es384, p384);
ecdsa_curve!(es512, p521);
