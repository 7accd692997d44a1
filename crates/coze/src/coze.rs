//! # Coze — The Signed-Payload Envelope
//!
//! The wire envelope around a payload: `{can, cad, czd, pay, key, sig}`,
//! every field optional. `pay` is the source of truth and is held as an
//! ordered value in its exact wire form; `can`, `cad`, and `czd` are
//! caches recomputed by [`Coze::meta`] and must never be trusted ahead of
//! calling it.
//!
//! `czd` binds `cad` and `sig` together: it is the digest of the fixed
//! two-field object `{"cad":…,"sig":…}`, which makes the pairing
//! tamper-evident without needing the full payload.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use coze_core::alg::{Alg, HashAlg};
use coze_core::b64::B64;
use coze_core::canon::canonical_hash;
use coze_core::error::CozeError;
use coze_core::hash::hash;
use coze_core::value::{Obj, Val};

use crate::key::Key;

/// A signed payload and its derived metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Coze {
    /// Top-level field names of `pay`, in appearance order. Derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can: Option<Vec<String>>,
    /// Canonical-payload digest. Derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cad: Option<B64>,
    /// Digest binding `cad` and `sig`. Derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub czd: Option<B64>,
    /// The payload, in its exact wire field order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay: Option<Val>,
    /// Optionally embedded public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// Signature over `cad`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<B64>,
}

/// Digest of the fixed two-field object `{"cad":…,"sig":…}` — key names
/// and order fixed, values base64url-no-pad.
pub fn link_digest(alg: HashAlg, cad: &B64, sig: &B64) -> Result<B64, CozeError> {
    let mut obj = Obj::new();
    obj.insert("cad", Val::from(cad));
    obj.insert("sig", Val::from(sig));
    Ok(B64::new(hash(alg, &Val::Obj(obj).to_vec()?)?))
}

impl Coze {
    /// Recompute the derived fields from `pay` (and `sig`, when present):
    /// `can`, `cad`, and — with a signature — `czd`. Call again whenever
    /// the payload or signature changes.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when `pay` is absent or not an object;
    /// `InvalidHashAlg` when the payload's `alg` is missing or unknown.
    pub fn meta(&mut self) -> Result<(), CozeError> {
        let pay = self
            .pay
            .as_ref()
            .ok_or_else(|| CozeError::MalformedInput("coze has no pay".to_string()))?;
        let obj = pay
            .as_obj()
            .ok_or_else(|| CozeError::MalformedInput("pay must be a JSON object".to_string()))?;
        let alg = Alg::parse(obj.get_str("alg").unwrap_or(""));
        let cad = canonical_hash(&pay.to_vec()?, None, alg.hash())?;
        let czd = match &self.sig {
            Some(sig) => Some(link_digest(alg.hash(), &cad, sig)?),
            None => None,
        };
        self.can = Some(obj.keys().cloned().collect());
        self.cad = Some(cad);
        self.czd = czd;
        Ok(())
    }

    /// Build an envelope from a decoded ordered value. Unknown fields are
    /// ignored.
    pub fn from_val(val: &Val) -> Result<Self, CozeError> {
        let obj = val
            .as_obj()
            .ok_or_else(|| CozeError::MalformedInput("coze must be a JSON object".to_string()))?;
        let mut coze = Coze::default();
        for (name, value) in obj.iter() {
            match name.as_str() {
                "can" => coze.can = Some(decode_can(value)?),
                "cad" => coze.cad = Some(decode_b64_field(value, "cad")?),
                "czd" => coze.czd = Some(decode_b64_field(value, "czd")?),
                "pay" => {
                    if value.as_obj().is_none() {
                        return Err(CozeError::MalformedInput(
                            "pay must be a JSON object".to_string(),
                        ));
                    }
                    coze.pay = Some(value.clone());
                }
                "key" => coze.key = Some(Key::from_val(value)?),
                "sig" => coze.sig = Some(decode_b64_field(value, "sig")?),
                _ => {}
            }
        }
        Ok(coze)
    }

    /// Parse an envelope from JSON bytes, rejecting duplicate keys at any
    /// depth — the embedded `pay` and `key` included.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CozeError> {
        Self::from_val(&Val::from_slice(bytes)?)
    }
}

fn decode_can(value: &Val) -> Result<Vec<String>, CozeError> {
    let Val::Arr(items) = value else {
        return Err(CozeError::MalformedInput(
            "coze field \"can\" must be an array of strings".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                CozeError::MalformedInput(
                    "coze field \"can\" must be an array of strings".to_string(),
                )
            })
        })
        .collect()
}

fn decode_b64_field(value: &Val, name: &str) -> Result<B64, CozeError> {
    let text = value.as_str().ok_or_else(|| {
        CozeError::MalformedInput(format!("coze field {name:?} must be a string"))
    })?;
    B64::decode(text)
}

impl FromStr for Coze {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl<'de> Deserialize<'de> for Coze {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let val = Val::deserialize(deserializer)?;
        Coze::from_val(&val).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Coze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_PAY: &str = concat!(
        r#"{"msg":"Coze Rocks","alg":"ES256","iat":1627518000,"#,
        r#""tmb":"cLj8vsYtMBwYkzoFVZHBZo6SNL8wSdCIjCKAwXNuhOk","typ":"cyphr.me/msg"}"#
    );

    fn golden_coze() -> Coze {
        Coze {
            pay: Some(Val::from_str(GOLDEN_PAY).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_meta_can_and_cad() {
        let mut coze = golden_coze();
        coze.meta().unwrap();
        assert_eq!(
            coze.can.as_ref().unwrap(),
            &["msg", "alg", "iat", "tmb", "typ"]
        );
        assert_eq!(
            coze.cad.as_ref().unwrap().to_string(),
            "LSgWE4vEfyxJZUTFaRaB2JdEclORdZcm4UVH9D8vVto"
        );
        // No signature, no link digest.
        assert!(coze.czd.is_none());
    }

    #[test]
    fn test_meta_czd_binds_cad_and_sig() {
        let mut coze = golden_coze();
        coze.sig = Some(B64::new(vec![1u8; 64]));
        coze.meta().unwrap();
        let czd = coze.czd.clone().unwrap();

        // A different signature produces a different binding.
        coze.sig = Some(B64::new(vec![2u8; 64]));
        coze.meta().unwrap();
        assert_ne!(coze.czd.unwrap(), czd);
    }

    #[test]
    fn test_meta_requires_resolved_alg() {
        let mut coze = Coze {
            pay: Some(Val::from_str(r#"{"msg":"no alg here"}"#).unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            coze.meta().unwrap_err(),
            CozeError::InvalidHashAlg(_)
        ));
    }

    #[test]
    fn test_meta_requires_pay() {
        let mut coze = Coze::default();
        assert!(matches!(
            coze.meta().unwrap_err(),
            CozeError::MalformedInput(_)
        ));
    }

    #[test]
    fn test_parse_envelope() {
        let wire = format!(
            r#"{{"pay":{GOLDEN_PAY},"sig":"{}"}}"#,
            B64::new(vec![7u8; 64])
        );
        let coze: Coze = wire.parse().unwrap();
        assert!(coze.pay.is_some());
        assert_eq!(coze.sig.as_ref().unwrap().len(), 64);
        assert!(coze.key.is_none());
    }

    #[test]
    fn test_parse_rejects_duplicate_inside_pay() {
        let err = Coze::from_slice(br#"{"pay":{"alg":"ES256","alg":"ES384"}}"#).unwrap_err();
        assert!(matches!(err, CozeError::DuplicateField { .. }));
    }

    #[test]
    fn test_parse_rejects_non_object_pay() {
        assert!(Coze::from_slice(br#"{"pay":[1,2]}"#).is_err());
    }

    #[test]
    fn test_serialize_roundtrip_preserves_pay_order() {
        let mut coze = golden_coze();
        coze.meta().unwrap();
        let json = coze.to_string();
        let back: Coze = json.parse().unwrap();
        assert_eq!(
            back.pay.unwrap().to_vec().unwrap(),
            coze.pay.unwrap().to_vec().unwrap()
        );
        assert_eq!(back.cad, coze.cad);
        assert_eq!(back.can, coze.can);
    }

    #[test]
    fn test_link_digest_fixed_shape() {
        // The binding object is exactly {"cad":"…","sig":"…"}.
        let cad = B64::new(vec![0xaa; 32]);
        let sig = B64::new(vec![0xbb; 64]);
        let expected_input = format!(r#"{{"cad":"{cad}","sig":"{sig}"}}"#);
        let direct = B64::new(hash(HashAlg::Sha256, expected_input.as_bytes()).unwrap());
        assert_eq!(link_digest(HashAlg::Sha256, &cad, &sig).unwrap(), direct);
    }
}
