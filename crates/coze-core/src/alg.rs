//! # Algorithm Registry — Declarative Parameter Tables
//!
//! One wire-level identifier (`Alg`) determines every derived
//! cryptographic parameter: genus, family, hash algorithm, key and
//! signature sizes, curve, and key use. The derivations are pure closed
//! functions over a closed enum; there is no numeric layering between
//! levels, so a genus value can never be mistaken for a species value.
//!
//! ## Totality
//!
//! `Alg::parse` never fails: algorithm names appear in untrusted wire
//! payloads, and a corrupt name must survive parsing (as
//! [`Alg::UnknownAlg`]) so the payload can still be inspected or
//! round-tripped. Operations that actually require a resolved algorithm
//! reject the sentinel at their own boundary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A Coze algorithm identifier.
///
/// The closed set of wire names: four ECDSA signing algorithms, three
/// EdDSA variants, and the hash-only algorithms. Anything else parses to
/// [`Alg::UnknownAlg`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Alg {
    /// Sentinel for unrecognized or absent algorithm names.
    #[default]
    UnknownAlg,
    /// ECDSA over P-224 with SHA-224.
    Es224,
    /// ECDSA over P-256 with SHA-256.
    Es256,
    /// ECDSA over P-384 with SHA-384.
    Es384,
    /// ECDSA over P-521 with SHA-512.
    Es512,
    /// EdDSA over Curve25519.
    Ed25519,
    /// Pre-hashed EdDSA over Curve25519.
    Ed25519ph,
    /// EdDSA over Curve448.
    Ed448,
    /// SHA-224 (hash only).
    Sha224,
    /// SHA-256 (hash only).
    Sha256,
    /// SHA-384 (hash only).
    Sha384,
    /// SHA-512 (hash only).
    Sha512,
    /// SHA3-224 (hash only).
    Sha3_224,
    /// SHA3-256 (hash only).
    Sha3_256,
    /// SHA3-384 (hash only).
    Sha3_384,
    /// SHA3-512 (hash only).
    Sha3_512,
    /// SHAKE128 XOF, pinned to a 32-byte output.
    Shake128,
    /// SHAKE256 XOF, pinned to a 64-byte output.
    Shake256,
}

/// The hash algorithm a Coze algorithm signs (or is) — a distinct type
/// from [`Alg`] so a species value can never stand in for its hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlg {
    /// Sentinel for unrecognized or absent hash names.
    #[default]
    UnknownHashAlg,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
    /// SHA3-224.
    Sha3_224,
    /// SHA3-256.
    Sha3_256,
    /// SHA3-384.
    Sha3_384,
    /// SHA3-512.
    Sha3_512,
    /// SHAKE128, pinned to 32 bytes.
    Shake128,
    /// SHAKE256, pinned to 64 bytes.
    Shake256,
}

/// Algorithm genus: the signature or hash construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genus {
    /// Unrecognized algorithm.
    Unknown,
    /// NIST-curve ECDSA.
    Ecdsa,
    /// Edwards-curve EdDSA.
    Eddsa,
    /// SHA-2 hash family member.
    Sha2,
    /// SHA-3/Keccak family member (including SHAKE).
    Sha3,
}

/// Algorithm family: the broadest grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Unrecognized algorithm.
    Unknown,
    /// Elliptic-curve signing.
    Ec,
    /// Hashing.
    Sha,
}

/// Named curve for elliptic-curve algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crv {
    /// NIST P-224.
    P224,
    /// NIST P-256.
    P256,
    /// NIST P-384.
    P384,
    /// NIST P-521.
    P521,
    /// Curve25519 (Ed25519, Ed25519ph).
    Curve25519,
    /// Curve448 (Ed448).
    Curve448,
}

/// Intended use of a key with a given algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUse {
    /// Signing and verification.
    Sig,
    /// Hashing.
    Hsh,
}

/// Every parameter derived from an [`Alg`], read-only.
///
/// Sizes are in bytes and zero where not applicable (a hash algorithm has
/// no key sizes; an unknown algorithm has nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Canonical wire name.
    pub name: &'static str,
    /// Signature/hash construction.
    pub genus: Genus,
    /// Broadest grouping.
    pub family: Family,
    /// Hash algorithm used when signing (or the algorithm itself, for
    /// hash-only algorithms).
    pub hash: HashAlg,
    /// Digest size of `hash`.
    pub hash_size: usize,
    /// Public key size. For ECDSA this is X‖Y, both coordinates
    /// left-zero-padded to half this size.
    pub x_size: usize,
    /// Private key (scalar/seed) size, left-zero-padded.
    pub d_size: usize,
    /// Signature size. For ECDSA this is R‖S, both components
    /// left-zero-padded to half this size.
    pub sig_size: usize,
    /// Named curve, for elliptic-curve algorithms.
    pub crv: Option<Crv>,
    /// Key use, when the algorithm is recognized.
    pub key_use: Option<KeyUse>,
}

impl Alg {
    /// Every identifier, sentinel included. Used by exhaustiveness tests.
    pub const ALL: [Alg; 18] = [
        Alg::UnknownAlg,
        Alg::Es224,
        Alg::Es256,
        Alg::Es384,
        Alg::Es512,
        Alg::Ed25519,
        Alg::Ed25519ph,
        Alg::Ed448,
        Alg::Sha224,
        Alg::Sha256,
        Alg::Sha384,
        Alg::Sha512,
        Alg::Sha3_224,
        Alg::Sha3_256,
        Alg::Sha3_384,
        Alg::Sha3_512,
        Alg::Shake128,
        Alg::Shake256,
    ];

    /// Total parse: exactly the canonical name strings resolve; anything
    /// else, the empty string included, is [`Alg::UnknownAlg`].
    pub fn parse(name: &str) -> Alg {
        match name {
            "ES224" => Alg::Es224,
            "ES256" => Alg::Es256,
            "ES384" => Alg::Es384,
            "ES512" => Alg::Es512,
            "Ed25519" => Alg::Ed25519,
            "Ed25519ph" => Alg::Ed25519ph,
            "Ed448" => Alg::Ed448,
            "SHA-224" => Alg::Sha224,
            "SHA-256" => Alg::Sha256,
            "SHA-384" => Alg::Sha384,
            "SHA-512" => Alg::Sha512,
            "SHA3-224" => Alg::Sha3_224,
            "SHA3-256" => Alg::Sha3_256,
            "SHA3-384" => Alg::Sha3_384,
            "SHA3-512" => Alg::Sha3_512,
            "SHAKE128" => Alg::Shake128,
            "SHAKE256" => Alg::Shake256,
            _ => Alg::UnknownAlg,
        }
    }

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Alg::UnknownAlg => "UnknownAlg",
            Alg::Es224 => "ES224",
            Alg::Es256 => "ES256",
            Alg::Es384 => "ES384",
            Alg::Es512 => "ES512",
            Alg::Ed25519 => "Ed25519",
            Alg::Ed25519ph => "Ed25519ph",
            Alg::Ed448 => "Ed448",
            Alg::Sha224 => "SHA-224",
            Alg::Sha256 => "SHA-256",
            Alg::Sha384 => "SHA-384",
            Alg::Sha512 => "SHA-512",
            Alg::Sha3_224 => "SHA3-224",
            Alg::Sha3_256 => "SHA3-256",
            Alg::Sha3_384 => "SHA3-384",
            Alg::Sha3_512 => "SHA3-512",
            Alg::Shake128 => "SHAKE128",
            Alg::Shake256 => "SHAKE256",
        }
    }

    /// The construction this algorithm belongs to.
    pub fn genus(self) -> Genus {
        match self {
            Alg::UnknownAlg => Genus::Unknown,
            Alg::Es224 | Alg::Es256 | Alg::Es384 | Alg::Es512 => Genus::Ecdsa,
            Alg::Ed25519 | Alg::Ed25519ph | Alg::Ed448 => Genus::Eddsa,
            Alg::Sha224 | Alg::Sha256 | Alg::Sha384 | Alg::Sha512 => Genus::Sha2,
            Alg::Sha3_224 | Alg::Sha3_256 | Alg::Sha3_384 | Alg::Sha3_512 => Genus::Sha3,
            Alg::Shake128 | Alg::Shake256 => Genus::Sha3,
        }
    }

    /// The broadest grouping this algorithm belongs to.
    pub fn family(self) -> Family {
        match self.genus() {
            Genus::Unknown => Family::Unknown,
            Genus::Ecdsa | Genus::Eddsa => Family::Ec,
            Genus::Sha2 | Genus::Sha3 => Family::Sha,
        }
    }

    /// The hash used for signing with this algorithm, fixed per the
    /// algorithm's defining specification. Hash-only algorithms map to
    /// themselves.
    pub fn hash(self) -> HashAlg {
        match self {
            Alg::UnknownAlg => HashAlg::UnknownHashAlg,
            Alg::Es224 => HashAlg::Sha224,
            Alg::Es256 => HashAlg::Sha256,
            Alg::Es384 => HashAlg::Sha384,
            Alg::Es512 => HashAlg::Sha512,
            Alg::Ed25519 | Alg::Ed25519ph => HashAlg::Sha512,
            Alg::Ed448 => HashAlg::Shake256,
            Alg::Sha224 => HashAlg::Sha224,
            Alg::Sha256 => HashAlg::Sha256,
            Alg::Sha384 => HashAlg::Sha384,
            Alg::Sha512 => HashAlg::Sha512,
            Alg::Sha3_224 => HashAlg::Sha3_224,
            Alg::Sha3_256 => HashAlg::Sha3_256,
            Alg::Sha3_384 => HashAlg::Sha3_384,
            Alg::Sha3_512 => HashAlg::Sha3_512,
            Alg::Shake128 => HashAlg::Shake128,
            Alg::Shake256 => HashAlg::Shake256,
        }
    }

    /// Named curve, for elliptic-curve algorithms.
    pub fn crv(self) -> Option<Crv> {
        match self {
            Alg::Es224 => Some(Crv::P224),
            Alg::Es256 => Some(Crv::P256),
            Alg::Es384 => Some(Crv::P384),
            Alg::Es512 => Some(Crv::P521),
            Alg::Ed25519 | Alg::Ed25519ph => Some(Crv::Curve25519),
            Alg::Ed448 => Some(Crv::Curve448),
            _ => None,
        }
    }

    /// Intended key use.
    pub fn key_use(self) -> Option<KeyUse> {
        match self.family() {
            Family::Unknown => None,
            Family::Ec => Some(KeyUse::Sig),
            Family::Sha => Some(KeyUse::Hsh),
        }
    }

    /// Public key size in bytes (0 when not applicable).
    pub fn x_size(self) -> usize {
        match self {
            Alg::Es224 => 56,
            Alg::Es256 => 64,
            Alg::Es384 => 96,
            // P-521 coordinates are 66 bytes each.
            Alg::Es512 => 132,
            Alg::Ed25519 | Alg::Ed25519ph => 32,
            Alg::Ed448 => 57,
            _ => 0,
        }
    }

    /// Private key size in bytes (0 when not applicable).
    pub fn d_size(self) -> usize {
        match self {
            Alg::Es224 => 28,
            Alg::Es256 => 32,
            Alg::Es384 => 48,
            Alg::Es512 => 66,
            Alg::Ed25519 | Alg::Ed25519ph => 32,
            Alg::Ed448 => 57,
            _ => 0,
        }
    }

    /// Signature size in bytes (0 when not applicable).
    pub fn sig_size(self) -> usize {
        match self {
            Alg::Es224 => 56,
            Alg::Es256 => 64,
            Alg::Es384 => 96,
            Alg::Es512 => 132,
            Alg::Ed25519 | Alg::Ed25519ph => 64,
            Alg::Ed448 => 114,
            _ => 0,
        }
    }

    /// True for signature algorithms (whether or not key operations
    /// implement them).
    pub fn is_sig(self) -> bool {
        self.family() == Family::Ec
    }

    /// True for the unknown sentinel. Usable as a serde
    /// `skip_serializing_if` predicate.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Alg::UnknownAlg)
    }

    /// The full derived parameter record.
    pub fn params(self) -> Params {
        Params {
            name: self.as_str(),
            genus: self.genus(),
            family: self.family(),
            hash: self.hash(),
            hash_size: self.hash().size(),
            x_size: self.x_size(),
            d_size: self.d_size(),
            sig_size: self.sig_size(),
            crv: self.crv(),
            key_use: self.key_use(),
        }
    }
}

impl HashAlg {
    /// Digest size in bytes. SHAKE outputs are pinned (32 for SHAKE128,
    /// 64 for SHAKE256); zero for the unknown sentinel.
    pub fn size(self) -> usize {
        match self {
            HashAlg::UnknownHashAlg => 0,
            HashAlg::Sha224 | HashAlg::Sha3_224 => 28,
            HashAlg::Sha256 | HashAlg::Sha3_256 | HashAlg::Shake128 => 32,
            HashAlg::Sha384 | HashAlg::Sha3_384 => 48,
            HashAlg::Sha512 | HashAlg::Sha3_512 | HashAlg::Shake256 => 64,
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlg::UnknownHashAlg => "UnknownHashAlg",
            HashAlg::Sha224 => "SHA-224",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
            HashAlg::Sha3_224 => "SHA3-224",
            HashAlg::Sha3_256 => "SHA3-256",
            HashAlg::Sha3_384 => "SHA3-384",
            HashAlg::Sha3_512 => "SHA3-512",
            HashAlg::Shake128 => "SHAKE128",
            HashAlg::Shake256 => "SHAKE256",
        }
    }
}

impl From<&str> for Alg {
    fn from(name: &str) -> Self {
        Alg::parse(name)
    }
}

impl std::fmt::Display for Alg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for HashAlg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Alg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Alg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Alg::parse(&name))
    }
}
