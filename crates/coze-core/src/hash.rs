//! # Digest Engine — Hashing for Canonical Bytes
//!
//! Computes digests with the hash algorithm an [`Alg`](crate::alg::Alg)
//! implies. SHA-2 and SHA-3 produce their defined fixed sizes; the SHAKE
//! extendable-output functions are pinned to 32 bytes (SHAKE128) and 64
//! bytes (SHAKE256) — never arbitrary length — so every implementation of
//! this format derives identical digests.
//!
//! Unlike algorithm-name parsing, this is a fallible boundary: an
//! operation that reaches hashing genuinely requires a resolved algorithm,
//! so the unknown sentinel is rejected with `InvalidHashAlg` here.

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512, Shake128, Shake256};

use crate::alg::HashAlg;
use crate::error::CozeError;

/// Hash `msg` with the given algorithm.
///
/// # Errors
///
/// Returns `InvalidHashAlg` for [`HashAlg::UnknownHashAlg`].
pub fn hash(alg: HashAlg, msg: &[u8]) -> Result<Vec<u8>, CozeError> {
    match alg {
        HashAlg::UnknownHashAlg => Err(CozeError::InvalidHashAlg(alg.as_str().to_string())),
        HashAlg::Sha224 => Ok(Sha224::digest(msg).to_vec()),
        HashAlg::Sha256 => Ok(Sha256::digest(msg).to_vec()),
        HashAlg::Sha384 => Ok(Sha384::digest(msg).to_vec()),
        HashAlg::Sha512 => Ok(Sha512::digest(msg).to_vec()),
        HashAlg::Sha3_224 => Ok(Sha3_224::digest(msg).to_vec()),
        HashAlg::Sha3_256 => Ok(Sha3_256::digest(msg).to_vec()),
        HashAlg::Sha3_384 => Ok(Sha3_384::digest(msg).to_vec()),
        HashAlg::Sha3_512 => Ok(Sha3_512::digest(msg).to_vec()),
        HashAlg::Shake128 => Ok(xof::<Shake128>(msg, alg.size())),
        HashAlg::Shake256 => Ok(xof::<Shake256>(msg, alg.size())),
    }
}

fn xof<H: Default + Update + ExtendableOutput>(msg: &[u8], out_len: usize) -> Vec<u8> {
    let mut hasher = H::default();
    hasher.update(msg);
    let mut out = vec![0u8; out_len];
    hasher.finalize_xof().read(&mut out);
    out
}
