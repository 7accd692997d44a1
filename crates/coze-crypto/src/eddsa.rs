//! # EdDSA — Ed25519 Signing over Precomputed Digests
//!
//! The private key `d` is the 32-byte seed; the public key `x` is the
//! 32-byte compressed point. Signing delegates directly to the primitive
//! with the payload digest as the message — Coze signs digests, so the
//! digest plays the message role here.

use coze_core::error::CozeError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

const SEED_LEN: usize = 32;

fn seed(d: &[u8]) -> Result<&[u8; SEED_LEN], CozeError> {
    d.try_into().map_err(|_| {
        CozeError::Crypto(format!(
            "Ed25519 private key must be {SEED_LEN} bytes, got {}",
            d.len()
        ))
    })
}

pub(crate) fn generate() -> (Vec<u8>, Vec<u8>) {
    let mut csprng = rand::rngs::OsRng;
    let sk = SigningKey::generate(&mut csprng);
    (sk.to_bytes().to_vec(), sk.verifying_key().to_bytes().to_vec())
}

pub(crate) fn public_from_private(d: &[u8]) -> Result<Vec<u8>, CozeError> {
    let sk = SigningKey::from_bytes(seed(d)?);
    Ok(sk.verifying_key().to_bytes().to_vec())
}

pub(crate) fn sign(d: &[u8], digest: &[u8]) -> Result<Vec<u8>, CozeError> {
    let sk = SigningKey::from_bytes(seed(d)?);
    Ok(sk.sign(digest).to_bytes().to_vec())
}

pub(crate) fn verify(x: &[u8], digest: &[u8], sig: &[u8]) -> bool {
    let Ok(public) = <&[u8; 32]>::try_from(x) else {
        return false;
    };
    let Ok(vk) = VerifyingKey::from_bytes(public) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(sig) else {
        return false;
    };
    vk.verify(digest, &sig).is_ok()
}
