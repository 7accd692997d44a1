//! # Key — Coze Key Operations
//!
//! A `Key` is a plain value owned by its caller: generated locally or
//! deserialized from the wire, mutated only by [`Key::revoke`] and the
//! thumbprint recompute. `d` present means private key; absent means
//! public-only (or thumbprint-only) key.
//!
//! ## Security Invariant
//!
//! The thumbprint is the key's identity and is always *recomputed* from
//! `{alg, x}` — never trusted from wire data. `Debug` redacts `d`, and no
//! error text ever includes it.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use coze_core::alg::Alg;
use coze_core::b64::B64;
use coze_core::canon::{canonical_hash, Canon};
use coze_core::error::CozeError;
use coze_core::hash::hash;
use coze_core::value::{Obj, Val};

use crate::coze::Coze;
use crate::pay::Pay;

/// Payload `typ` of a self-signed revocation.
pub const REVOKE_TYP: &str = "cyphr.me/key/revoke";

/// Fixed message used by the self-test round trip in [`Key::valid`] and
/// [`Key::correct`].
const SELF_TEST_MSG: &[u8] = b"7AtyaCHO2BAG06z0W1tOQlZFWbhxGgqej4k9-HWP3DE";

/// A Coze key. Wire field order is fixed: `alg, d, iat, kid, rvk, tmb,
/// typ, x`, each omitted when empty.
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct Key {
    /// Signing algorithm.
    #[serde(skip_serializing_if = "Alg::is_unknown")]
    pub alg: Alg,
    /// Private key material. Present only on private keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<B64>,
    /// Issued-at, Unix seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Human-readable, non-programmatic key label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Revocation time, Unix seconds. Nonzero means revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rvk: Option<i64>,
    /// Thumbprint: the digest of canonical `{alg, x}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmb: Option<B64>,
    /// Key type label, e.g. `cyphr.me/key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Public key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<B64>,
}

/// Compute the thumbprint of a public key: the digest of canonical
/// `{"alg":…,"x":…}` using the hash the algorithm implies.
pub fn thumbprint(alg: Alg, x: &B64) -> Result<B64, CozeError> {
    let mut obj = Obj::new();
    obj.insert("alg", Val::from(alg.as_str()));
    obj.insert("x", Val::from(x));
    let bytes = Val::Obj(obj).to_vec()?;
    canonical_hash(&bytes, Some(&Canon::fields(["alg", "x"])), alg.hash())
}

impl Key {
    /// Generate a fresh keypair: sets `d`, `x`, `iat`, and `tmb`.
    ///
    /// # Errors
    ///
    /// `UnsupportedAlg` for any algorithm outside the supported signing
    /// set.
    pub fn generate(alg: Alg) -> Result<Self, CozeError> {
        let pair = coze_crypto::generate(alg)?;
        let x = B64::new(pair.x);
        let tmb = thumbprint(alg, &x)?;
        Ok(Key {
            alg,
            d: Some(B64::new(pair.d)),
            iat: Some(Utc::now().timestamp()),
            tmb: Some(tmb),
            x: Some(x),
            ..Default::default()
        })
    }

    /// Recompute this key's thumbprint from `alg` and `x`.
    ///
    /// # Errors
    ///
    /// `StructuralKey` when `x` is absent; `InvalidHashAlg` when `alg` is
    /// unknown.
    pub fn thumbprint(&self) -> Result<B64, CozeError> {
        let x = self
            .x
            .as_ref()
            .ok_or_else(|| CozeError::StructuralKey("thumbprint requires x".to_string()))?;
        thumbprint(self.alg, x)
    }

    /// Recompute and store `tmb`. Call after any change to `alg` or `x`.
    pub fn update_thumbprint(&mut self) -> Result<(), CozeError> {
        self.tmb = Some(self.thumbprint()?);
        Ok(())
    }

    /// The stored thumbprint, or a fresh recompute when none is stored.
    fn effective_tmb(&self) -> Result<B64, CozeError> {
        match &self.tmb {
            Some(tmb) => Ok(tmb.clone()),
            None => self.thumbprint(),
        }
    }

    /// Sign a precomputed digest. No structural checks on any payload.
    ///
    /// # Errors
    ///
    /// `StructuralKey` when `d` is absent; `UnsupportedAlg`/`Crypto` from
    /// the primitive layer.
    pub fn sign(&self, digest: &[u8]) -> Result<B64, CozeError> {
        let d = self.d.as_ref().ok_or_else(|| {
            CozeError::StructuralKey("signing requires the private key".to_string())
        })?;
        Ok(B64::new(coze_crypto::sign_digest(
            self.alg,
            d.as_bytes(),
            digest,
        )?))
    }

    /// Verify a signature over a precomputed digest.
    ///
    /// `Ok(false)` means well-formed but not authentic.
    ///
    /// # Errors
    ///
    /// `StructuralKey` when `x` is absent; `UnsupportedAlg` from the
    /// primitive layer.
    pub fn verify(&self, digest: &[u8], sig: &B64) -> Result<bool, CozeError> {
        let x = self.x.as_ref().ok_or_else(|| {
            CozeError::StructuralKey("verification requires x".to_string())
        })?;
        coze_crypto::verify_digest(self.alg, x.as_bytes(), digest, sig.as_bytes())
    }

    /// Require the payload to name this key: `alg` and `tmb` must both
    /// match, before any cryptographic work happens.
    fn check_pay(&self, pay: &Pay) -> Result<(), CozeError> {
        if pay.alg != self.alg {
            return Err(CozeError::KeyPayloadMismatch(format!(
                "payload alg {} does not match key alg {}",
                pay.alg, self.alg
            )));
        }
        let key_tmb = self.effective_tmb()?;
        match &pay.tmb {
            Some(tmb) if *tmb == key_tmb => Ok(()),
            Some(tmb) => Err(CozeError::KeyPayloadMismatch(format!(
                "payload tmb {tmb} does not match key tmb {key_tmb}"
            ))),
            None => Err(CozeError::KeyPayloadMismatch(
                "payload has no tmb".to_string(),
            )),
        }
    }

    /// Sign a payload: canonicalize, digest, sign, and wrap in a [`Coze`].
    ///
    /// # Errors
    ///
    /// `KeyPayloadMismatch` when the payload's `alg`/`tmb` do not name
    /// this key, plus any signing-path error.
    pub fn sign_pay(&self, pay: &Pay) -> Result<Coze, CozeError> {
        self.check_pay(pay)?;
        let bytes = pay.to_vec()?;
        let cad = canonical_hash(&bytes, None, self.alg.hash())?;
        let sig = self.sign(cad.as_bytes())?;
        Ok(Coze {
            pay: Some(Val::Obj(pay.to_val())),
            sig: Some(sig),
            ..Default::default()
        })
    }

    /// Sign an existing envelope's payload in place, replacing `sig`.
    ///
    /// The digest is computed over the envelope's `pay` exactly as it
    /// stands, in its existing field order.
    pub fn sign_coze(&self, coze: &mut Coze) -> Result<(), CozeError> {
        let pay_val = coze
            .pay
            .as_ref()
            .ok_or_else(|| CozeError::MalformedInput("coze has no pay".to_string()))?;
        let pay = Pay::from_val(pay_val)?;
        self.check_pay(&pay)?;
        let cad = canonical_hash(&pay_val.to_vec()?, None, self.alg.hash())?;
        coze.sig = Some(self.sign(cad.as_bytes())?);
        Ok(())
    }

    /// Verify a signed envelope against this key.
    ///
    /// `Ok(false)` means well-formed but not authentic.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when `pay` or `sig` is absent;
    /// `KeyPayloadMismatch` when the payload does not name this key.
    pub fn verify_coze(&self, coze: &Coze) -> Result<bool, CozeError> {
        let pay_val = coze
            .pay
            .as_ref()
            .ok_or_else(|| CozeError::MalformedInput("coze has no pay".to_string()))?;
        let sig = coze
            .sig
            .as_ref()
            .ok_or_else(|| CozeError::MalformedInput("coze has no sig".to_string()))?;
        let pay = Pay::from_val(pay_val)?;
        self.check_pay(&pay)?;
        let cad = canonical_hash(&pay_val.to_vec()?, None, self.alg.hash())?;
        self.verify(cad.as_bytes(), sig)
    }

    /// Non-cryptographic structural sanity check.
    ///
    /// In order: (1) `alg` must be set; (2) at least one of `tmb`, `x`,
    /// `d` must be present — both are structural errors. Then, for the
    /// fields present: a lone `tmb` must be hash-sized; `x` must be
    /// x-sized and agree with any stored `tmb`; `d` must be d-sized,
    /// agree with any stored `x`/`tmb` through public-key derivation, and
    /// prove itself with a sign/verify round trip. A failed check is
    /// `Ok(false)`.
    pub fn correct(&self) -> Result<bool, CozeError> {
        if self.alg == Alg::UnknownAlg {
            return Err(CozeError::StructuralKey("key has no alg".to_string()));
        }
        let params = self.alg.params();
        match (&self.d, &self.x, &self.tmb) {
            (None, None, None) => Err(CozeError::StructuralKey(
                "key needs at least one of tmb, x, or d".to_string(),
            )),
            (None, None, Some(tmb)) => Ok(tmb.len() == params.hash_size),
            (None, Some(x), tmb) => {
                if x.len() != params.x_size {
                    return Ok(false);
                }
                if let Some(tmb) = tmb {
                    if thumbprint(self.alg, x)? != *tmb {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Some(d), x, tmb) => {
                if d.len() != params.d_size {
                    return Ok(false);
                }
                let derived = B64::new(coze_crypto::public_from_private(
                    self.alg,
                    d.as_bytes(),
                )?);
                if let Some(x) = x {
                    if *x != derived {
                        return Ok(false);
                    }
                }
                if let Some(tmb) = tmb {
                    if thumbprint(self.alg, &derived)? != *tmb {
                        return Ok(false);
                    }
                }
                // Round-trip proof that the private key works with its
                // stated public parameters.
                let digest = hash(self.alg.hash(), SELF_TEST_MSG)?;
                let sig = coze_crypto::sign_digest(self.alg, d.as_bytes(), &digest)?;
                coze_crypto::verify_digest(self.alg, derived.as_bytes(), &digest, &sig)
            }
        }
    }

    /// Sign-then-verify round trip over a fixed message. True only when
    /// this key holds a working `d`/`x` pairing.
    pub fn valid(&self) -> bool {
        let round_trip = || -> Result<bool, CozeError> {
            let digest = hash(self.alg.hash(), SELF_TEST_MSG)?;
            let sig = self.sign(&digest)?;
            self.verify(&digest, &sig)
        };
        round_trip().unwrap_or(false)
    }

    /// Build and self-sign a `cyphr.me/key/revoke` payload, then mark
    /// this key revoked. Revocation is one-way; there is no un-revoke.
    ///
    /// # Errors
    ///
    /// `StructuralKey` when [`Key::correct`] fails — revoking a
    /// structurally broken key is refused — plus any signing-path error.
    pub fn revoke(&mut self, msg: Option<&str>) -> Result<Coze, CozeError> {
        match self.correct() {
            Ok(true) => {}
            Ok(false) => {
                return Err(CozeError::StructuralKey(
                    "refusing to revoke a structurally incorrect key".to_string(),
                ))
            }
            Err(err) => return Err(err),
        }
        let now = Utc::now().timestamp();
        let mut pay = Pay {
            alg: self.alg,
            iat: Some(now),
            tmb: Some(self.effective_tmb()?),
            typ: Some(REVOKE_TYP.to_string()),
            extra: Obj::new(),
        };
        if let Some(msg) = msg {
            pay.extra.insert("msg", Val::from(msg));
        }
        pay.extra.insert("rvk", Val::from(now));
        let coze = self.sign_pay(&pay)?;
        self.rvk = Some(now);
        Ok(coze)
    }

    /// True when this key carries a nonzero revocation time.
    pub fn is_revoked(&self) -> bool {
        self.rvk.is_some_and(|rvk| rvk > 0)
    }

    /// Build a key from a decoded ordered value. Unknown fields are
    /// ignored.
    pub fn from_val(val: &Val) -> Result<Self, CozeError> {
        let obj = val
            .as_obj()
            .ok_or_else(|| CozeError::MalformedInput("key must be a JSON object".to_string()))?;
        let mut key = Key::default();
        for (name, value) in obj.iter() {
            match name.as_str() {
                "alg" => {
                    let text = value.as_str().ok_or_else(|| {
                        CozeError::MalformedInput("key field \"alg\" must be a string".to_string())
                    })?;
                    key.alg = Alg::parse(text);
                }
                "d" => key.d = Some(decode_b64_field(value, "d")?),
                "iat" => key.iat = Some(decode_i64_field(value, "iat")?),
                "kid" => key.kid = Some(decode_str_field(value, "kid")?),
                "rvk" => key.rvk = Some(decode_i64_field(value, "rvk")?),
                "tmb" => key.tmb = Some(decode_b64_field(value, "tmb")?),
                "typ" => key.typ = Some(decode_str_field(value, "typ")?),
                "x" => key.x = Some(decode_b64_field(value, "x")?),
                _ => {}
            }
        }
        Ok(key)
    }

    /// Parse a key from JSON bytes, rejecting duplicate keys.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CozeError> {
        Self::from_val(&Val::from_slice(bytes)?)
    }
}

fn decode_b64_field(value: &Val, name: &str) -> Result<B64, CozeError> {
    let text = value.as_str().ok_or_else(|| {
        CozeError::MalformedInput(format!("key field {name:?} must be a string"))
    })?;
    B64::decode(text)
}

fn decode_i64_field(value: &Val, name: &str) -> Result<i64, CozeError> {
    value.as_i64().ok_or_else(|| {
        CozeError::MalformedInput(format!("key field {name:?} must be an integer"))
    })
}

fn decode_str_field(value: &Val, name: &str) -> Result<String, CozeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CozeError::MalformedInput(format!("key field {name:?} must be a string")))
}

impl FromStr for Key {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let val = Val::deserialize(deserializer)?;
        Key::from_val(&val).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("alg", &self.alg)
            .field("d", &self.d.as_ref().map(|_| "<private>"))
            .field("iat", &self.iat)
            .field("kid", &self.kid)
            .field("rvk", &self.rvk)
            .field("tmb", &self.tmb)
            .field("typ", &self.typ)
            .field("x", &self.x)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_KEY: &str = concat!(
        r#"{"alg":"ES256","iat":1623132000,"kid":"Zami's Majuscule Key.","#,
        r#""tmb":"cLj8vsYtMBwYkzoFVZHBZo6SNL8wSdCIjCKAwXNuhOk","typ":"cyphr.me/key","#,
        r#""x":"2nTOaFVm2QLxmUO_SjgyscVHBtvHEfo2rq65MvgNRjORojq39Haq9rXNxvXxwba_Xj0F5vZibJR3isBdOWbo5g"}"#
    );

    #[test]
    fn test_golden_thumbprint() {
        let key: Key = GOLDEN_KEY.parse().unwrap();
        assert_eq!(
            key.thumbprint().unwrap().to_string(),
            "cLj8vsYtMBwYkzoFVZHBZo6SNL8wSdCIjCKAwXNuhOk"
        );
        assert_eq!(key.correct().unwrap(), true);
    }

    #[test]
    fn test_generate_sets_all_fields() {
        let key = Key::generate(Alg::Es256).unwrap();
        assert_eq!(key.alg, Alg::Es256);
        assert_eq!(key.d.as_ref().unwrap().len(), 32);
        assert_eq!(key.x.as_ref().unwrap().len(), 64);
        assert!(key.iat.is_some());
        assert_eq!(key.tmb.as_ref().unwrap().len(), 32);
        assert!(key.correct().unwrap());
        assert!(key.valid());
    }

    #[test]
    fn test_generate_unsupported() {
        for alg in [Alg::Ed448, Alg::Ed25519ph, Alg::Sha256, Alg::UnknownAlg] {
            assert!(matches!(
                Key::generate(alg).unwrap_err(),
                CozeError::UnsupportedAlg(_)
            ));
        }
    }

    #[test]
    fn test_thumbprint_stability() {
        let key = Key::generate(Alg::Ed25519).unwrap();
        assert_eq!(key.thumbprint().unwrap(), key.thumbprint().unwrap());

        let other = Key::generate(Alg::Ed25519).unwrap();
        let mut moved = key.clone();
        moved.x = other.x.clone();
        assert_ne!(moved.thumbprint().unwrap(), key.thumbprint().unwrap());
    }

    #[test]
    fn test_sign_verify_digest() {
        let key = Key::generate(Alg::Es256).unwrap();
        let digest = vec![9u8; 32];
        let sig = key.sign(&digest).unwrap();
        assert!(key.verify(&digest, &sig).unwrap());
        assert!(!key.verify(&[0u8; 32], &sig).unwrap());
    }

    #[test]
    fn test_sign_pay_verify_coze() {
        let key = Key::generate(Alg::Ed25519).unwrap();
        let mut pay = Pay {
            alg: key.alg,
            iat: Some(1627518000),
            tmb: key.tmb.clone(),
            typ: Some("cyphr.me/msg".to_string()),
            extra: Obj::new(),
        };
        pay.extra.insert("msg", Val::from("Coze Rocks"));
        let coze = key.sign_pay(&pay).unwrap();
        assert!(key.verify_coze(&coze).unwrap());
    }

    #[test]
    fn test_key_payload_mismatch_checked_before_crypto() {
        let key = Key::generate(Alg::Es256).unwrap();
        let wrong_alg = Pay {
            alg: Alg::Es384,
            tmb: key.tmb.clone(),
            ..Default::default()
        };
        assert!(matches!(
            key.sign_pay(&wrong_alg).unwrap_err(),
            CozeError::KeyPayloadMismatch(_)
        ));

        let other = Key::generate(Alg::Es256).unwrap();
        let wrong_tmb = Pay {
            alg: Alg::Es256,
            tmb: other.tmb.clone(),
            ..Default::default()
        };
        assert!(matches!(
            key.sign_pay(&wrong_tmb).unwrap_err(),
            CozeError::KeyPayloadMismatch(_)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let key = Key::generate(Alg::Es256).unwrap();
        let pay = Pay {
            alg: key.alg,
            tmb: key.tmb.clone(),
            ..Default::default()
        };
        let mut coze = key.sign_pay(&pay).unwrap();
        let mut sig = coze.sig.clone().unwrap().into_vec();
        sig[0] ^= 1;
        coze.sig = Some(B64::new(sig));
        assert_eq!(key.verify_coze(&coze).unwrap(), false);
    }

    #[test]
    fn test_correct_structural_errors() {
        let no_alg = Key::default();
        assert!(matches!(
            no_alg.correct().unwrap_err(),
            CozeError::StructuralKey(_)
        ));

        let no_material = Key {
            alg: Alg::Es256,
            ..Default::default()
        };
        assert!(matches!(
            no_material.correct().unwrap_err(),
            CozeError::StructuralKey(_)
        ));
    }

    #[test]
    fn test_correct_tmb_only() {
        let mut key = Key {
            alg: Alg::Es256,
            tmb: Some(B64::new(vec![0u8; 32])),
            ..Default::default()
        };
        assert!(key.correct().unwrap());
        key.tmb = Some(B64::new(vec![0u8; 31]));
        assert!(!key.correct().unwrap());
    }

    #[test]
    fn test_correct_asymmetry_on_tampered_d() {
        let full = Key::generate(Alg::Ed25519).unwrap();

        // The public half alone passes.
        let mut public = full.clone();
        public.d = None;
        assert!(public.correct().unwrap());

        // A single flipped bit in d fails against the stored x/tmb.
        let mut tampered = full.clone();
        let mut d = tampered.d.clone().unwrap().into_vec();
        d[0] ^= 1;
        tampered.d = Some(B64::new(d));
        assert!(!tampered.correct().unwrap());
        assert!(!tampered.valid());
    }

    #[test]
    fn test_correct_wrong_x_size() {
        let mut key = Key::generate(Alg::Es256).unwrap();
        key.d = None;
        key.tmb = None;
        key.x = Some(B64::new(vec![0u8; 10]));
        assert!(!key.correct().unwrap());
    }

    #[test]
    fn test_correct_mismatched_tmb() {
        let mut key = Key::generate(Alg::Es256).unwrap();
        key.d = None;
        key.tmb = Some(B64::new(vec![7u8; 32]));
        assert!(!key.correct().unwrap());
    }

    #[test]
    fn test_revoke_flow() {
        let mut key = Key::generate(Alg::Es256).unwrap();
        assert!(!key.is_revoked());
        let coze = key.revoke(Some("compromised")).unwrap();
        assert!(key.is_revoked());
        assert!(key.rvk.unwrap() > 0);

        // The revocation is self-verifying and carries the revoke shape.
        assert!(key.verify_coze(&coze).unwrap());
        let pay = Pay::from_val(coze.pay.as_ref().unwrap()).unwrap();
        assert_eq!(pay.typ.as_deref(), Some(REVOKE_TYP));
        assert_eq!(pay.extra.get_str("msg"), Some("compromised"));
        assert!(pay.extra.get_i64("rvk").unwrap() > 0);
    }

    #[test]
    fn test_revoke_refused_for_broken_key() {
        let mut key = Key::generate(Alg::Es256).unwrap();
        key.tmb = Some(B64::new(vec![1u8; 32]));
        assert!(matches!(
            key.revoke(None).unwrap_err(),
            CozeError::StructuralKey(_)
        ));
        assert!(!key.is_revoked());
    }

    #[test]
    fn test_wire_shape_field_order() {
        let key: Key = GOLDEN_KEY.parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, GOLDEN_KEY);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        assert!(matches!(
            Key::from_slice(br#"{"alg":"ES256","alg":"ES384"}"#).unwrap_err(),
            CozeError::DuplicateField { .. }
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = Key::generate(Alg::Ed25519).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("<private>"));
        assert!(!debug.contains(&key.d.as_ref().unwrap().to_string()));
    }

    #[test]
    fn test_error_text_never_contains_d() {
        let key = Key::generate(Alg::Es256).unwrap();
        let d_text = key.d.as_ref().unwrap().to_string();
        let err = key.sign(&[0u8; 5]).unwrap_err();
        assert!(!err.to_string().contains(&d_text));
    }
}
