//! # coze-crypto — Asymmetric Primitives for Coze
//!
//! The dispatch seam between the Coze key operations and the underlying
//! curve crates. Callers name an [`Alg`]; this crate picks the primitive:
//!
//! - **ECDSA** over P-224/P-256/P-384/P-521 with fixed-width X‖Y public
//!   keys and low-S-normalized R‖S signatures.
//! - **Ed25519** with seed private keys and compressed-point public keys.
//!
//! Signing always operates on the precomputed payload digest; hashing
//! lives in `coze-core`. `Ed25519ph` and `Ed448` carry registry
//! parameters but have no implemented primitive here, so every operation
//! rejects them with `UnsupportedAlg` — as it does for hash-only and
//! unknown algorithms.
//!
//! ## Crate Policy
//!
//! - Depends only on `coze-core` internally.
//! - No mocking of cryptographic operations in tests — real curves, real
//!   RNG, real signatures.
//! - No `unsafe` code.

mod ecdsa;
mod eddsa;

use coze_core::alg::Alg;
use coze_core::error::CozeError;

use crate::ecdsa::{es224, es256, es384, es512};

/// Freshly generated key material, sized per the algorithm's registry
/// parameters.
#[derive(Clone)]
pub struct KeyPair {
    /// Private scalar (ECDSA) or seed (Ed25519), left-zero-padded.
    pub d: Vec<u8>,
    /// Public key: X‖Y coordinates (ECDSA) or compressed point (Ed25519).
    pub x: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print private material.
        write!(f, "KeyPair(<private>)")
    }
}

/// True when key operations implement this algorithm.
pub fn supported(alg: Alg) -> bool {
    matches!(
        alg,
        Alg::Es224 | Alg::Es256 | Alg::Es384 | Alg::Es512 | Alg::Ed25519
    )
}

/// Generate a fresh keypair for a signing algorithm.
///
/// # Errors
///
/// `UnsupportedAlg` for anything outside the supported signing set.
pub fn generate(alg: Alg) -> Result<KeyPair, CozeError> {
    let (d, x) = match alg {
        Alg::Es224 => es224::generate()?,
        Alg::Es256 => es256::generate()?,
        Alg::Es384 => es384::generate()?,
        Alg::Es512 => es512::generate()?,
        Alg::Ed25519 => eddsa::generate(),
        other => return Err(CozeError::UnsupportedAlg(other.as_str().to_string())),
    };
    Ok(KeyPair { d, x })
}

/// Recompute the public key from private material.
///
/// # Errors
///
/// `UnsupportedAlg` for non-signing algorithms; `Crypto` for malformed
/// private material.
pub fn public_from_private(alg: Alg, d: &[u8]) -> Result<Vec<u8>, CozeError> {
    match alg {
        Alg::Es224 => es224::public_from_private(d),
        Alg::Es256 => es256::public_from_private(d),
        Alg::Es384 => es384::public_from_private(d),
        Alg::Es512 => es512::public_from_private(d),
        Alg::Ed25519 => eddsa::public_from_private(d),
        other => Err(CozeError::UnsupportedAlg(other.as_str().to_string())),
    }
}

/// Sign a precomputed digest.
///
/// The digest must be exactly the size of the algorithm's hash.
///
/// # Errors
///
/// `UnsupportedAlg` for non-signing algorithms; `Crypto` for a wrongly
/// sized digest, malformed private material, or primitive failure.
pub fn sign_digest(alg: Alg, d: &[u8], digest: &[u8]) -> Result<Vec<u8>, CozeError> {
    if !supported(alg) {
        return Err(CozeError::UnsupportedAlg(alg.as_str().to_string()));
    }
    let expected = alg.hash().size();
    if digest.len() != expected {
        return Err(CozeError::Crypto(format!(
            "digest must be {expected} bytes for {alg}, got {}",
            digest.len()
        )));
    }
    match alg {
        Alg::Es224 => es224::sign(d, digest),
        Alg::Es256 => es256::sign(d, digest),
        Alg::Es384 => es384::sign(d, digest),
        Alg::Es512 => es512::sign(d, digest),
        Alg::Ed25519 => eddsa::sign(d, digest),
        // Unreachable given the support check, but the match stays total.
        other => Err(CozeError::UnsupportedAlg(other.as_str().to_string())),
    }
}

/// Verify a signature over a precomputed digest.
///
/// Returns `Ok(false)` for any cryptographic rejection, malformed public
/// key, or malformed signature: attacker-supplied garbage is a failed
/// verification, not an error.
///
/// # Errors
///
/// `UnsupportedAlg` for non-signing algorithms.
pub fn verify_digest(alg: Alg, x: &[u8], digest: &[u8], sig: &[u8]) -> Result<bool, CozeError> {
    match alg {
        Alg::Es224 => Ok(es224::verify(x, digest, sig)),
        Alg::Es256 => Ok(es256::verify(x, digest, sig)),
        Alg::Es384 => Ok(es384::verify(x, digest, sig)),
        Alg::Es512 => Ok(es512::verify(x, digest, sig)),
        Alg::Ed25519 => Ok(eddsa::verify(x, digest, sig)),
        other => Err(CozeError::UnsupportedAlg(other.as_str().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNING: [Alg; 5] = [Alg::Es224, Alg::Es256, Alg::Es384, Alg::Es512, Alg::Ed25519];

    #[test]
    fn test_roundtrip_every_supported_alg() {
        for alg in SIGNING {
            let pair = generate(alg).unwrap();
            assert_eq!(pair.d.len(), alg.d_size(), "{alg}");
            assert_eq!(pair.x.len(), alg.x_size(), "{alg}");

            let digest = vec![0x5a; alg.hash().size()];
            let sig = sign_digest(alg, &pair.d, &digest).unwrap();
            assert_eq!(sig.len(), alg.sig_size(), "{alg}");
            assert!(verify_digest(alg, &pair.x, &digest, &sig).unwrap(), "{alg}");

            let mut wrong = digest.clone();
            wrong[0] ^= 1;
            assert!(!verify_digest(alg, &pair.x, &wrong, &sig).unwrap(), "{alg}");
        }
    }

    #[test]
    fn test_public_from_private_every_supported_alg() {
        for alg in SIGNING {
            let pair = generate(alg).unwrap();
            assert_eq!(public_from_private(alg, &pair.d).unwrap(), pair.x, "{alg}");
        }
    }

    #[test]
    fn test_unsupported_algorithms_rejected() {
        for alg in [Alg::Ed25519ph, Alg::Ed448, Alg::Sha256, Alg::UnknownAlg] {
            assert!(matches!(
                generate(alg).unwrap_err(),
                CozeError::UnsupportedAlg(_)
            ));
            assert!(matches!(
                sign_digest(alg, &[0u8; 32], &[0u8; 32]).unwrap_err(),
                CozeError::UnsupportedAlg(_)
            ));
            assert!(matches!(
                verify_digest(alg, &[0u8; 32], &[0u8; 32], &[0u8; 64]).unwrap_err(),
                CozeError::UnsupportedAlg(_)
            ));
        }
    }

    #[test]
    fn test_wrong_digest_length_rejected() {
        let pair = generate(Alg::Es256).unwrap();
        assert!(matches!(
            sign_digest(Alg::Es256, &pair.d, &[0u8; 20]).unwrap_err(),
            CozeError::Crypto(_)
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let pair = generate(Alg::Es256).unwrap();
        let digest = [1u8; 32];
        let mut sig = sign_digest(Alg::Es256, &pair.d, &digest).unwrap();
        sig[10] ^= 1;
        assert!(!verify_digest(Alg::Es256, &pair.x, &digest, &sig).unwrap());
    }

    #[test]
    fn test_keypair_debug_redacts() {
        let pair = generate(Alg::Ed25519).unwrap();
        assert_eq!(format!("{pair:?}"), "KeyPair(<private>)");
    }
}
