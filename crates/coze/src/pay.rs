//! # Pay — The Signed Payload Record
//!
//! A payload carries four standard fields (`alg`, `iat`, `tmb`, `typ`)
//! plus arbitrary caller-defined fields merged at the top level. The
//! record keeps the two groups separate and merges them at encode time:
//! standard fields in fixed order, then the remainder in its original
//! order. Decoding routes through the ordered model, so a repeated key
//! anywhere in the payload is rejected before any field is read.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use coze_core::alg::Alg;
use coze_core::b64::B64;
use coze_core::error::CozeError;
use coze_core::value::{Obj, Val};

/// A Coze payload: standard fields plus ordered custom fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pay {
    /// Signing algorithm; the unknown sentinel when absent from the wire.
    pub alg: Alg,
    /// Issued-at, Unix seconds.
    pub iat: Option<i64>,
    /// Thumbprint of the signing key.
    pub tmb: Option<B64>,
    /// Payload type, e.g. `cyphr.me/msg`.
    pub typ: Option<String>,
    /// Caller-defined fields, in their original order. Entries named
    /// after a standard field are ignored at encode time.
    pub extra: Obj,
}

const STANDARD_FIELDS: [&str; 4] = ["alg", "iat", "tmb", "typ"];

impl Pay {
    /// Build a payload from a decoded ordered value.
    ///
    /// # Errors
    ///
    /// `MalformedInput` when the value is not an object or a standard
    /// field has the wrong type.
    pub fn from_val(val: &Val) -> Result<Self, CozeError> {
        let obj = val
            .as_obj()
            .ok_or_else(|| CozeError::MalformedInput("pay must be a JSON object".to_string()))?;

        let mut pay = Pay::default();
        for (key, value) in obj.iter() {
            match key.as_str() {
                "alg" => {
                    let name = value.as_str().ok_or_else(|| {
                        CozeError::MalformedInput("pay field \"alg\" must be a string".to_string())
                    })?;
                    pay.alg = Alg::parse(name);
                }
                "iat" => {
                    pay.iat = Some(value.as_i64().ok_or_else(|| {
                        CozeError::MalformedInput("pay field \"iat\" must be an integer".to_string())
                    })?);
                }
                "tmb" => {
                    let text = value.as_str().ok_or_else(|| {
                        CozeError::MalformedInput("pay field \"tmb\" must be a string".to_string())
                    })?;
                    pay.tmb = Some(B64::decode(text)?);
                }
                "typ" => {
                    let text = value.as_str().ok_or_else(|| {
                        CozeError::MalformedInput("pay field \"typ\" must be a string".to_string())
                    })?;
                    pay.typ = Some(text.to_string());
                }
                _ => {
                    pay.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(pay)
    }

    /// Parse a payload from JSON bytes, rejecting duplicate keys.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CozeError> {
        Self::from_val(&Val::from_slice(bytes)?)
    }

    /// Encode as an ordered value: standard fields first (in `alg`,
    /// `iat`, `tmb`, `typ` order, present ones only), then the custom
    /// fields in their original order.
    pub fn to_val(&self) -> Obj {
        let mut obj = Obj::new();
        if self.alg != Alg::UnknownAlg {
            obj.insert("alg", Val::from(self.alg.as_str()));
        }
        if let Some(iat) = self.iat {
            obj.insert("iat", Val::from(iat));
        }
        if let Some(tmb) = &self.tmb {
            obj.insert("tmb", Val::from(tmb));
        }
        if let Some(typ) = &self.typ {
            obj.insert("typ", Val::from(typ.as_str()));
        }
        for (key, value) in self.extra.iter() {
            if STANDARD_FIELDS.contains(&key.as_str()) {
                continue;
            }
            obj.insert(key.clone(), value.clone());
        }
        obj
    }

    /// Serialize to compact JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>, CozeError> {
        Val::Obj(self.to_val()).to_vec()
    }
}

impl FromStr for Pay {
    type Err = CozeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl Serialize for Pay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Val::Obj(self.to_val()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let val = Val::deserialize(deserializer)?;
        Pay::from_val(&val).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_then_custom_order() {
        let pay: Pay = r#"{"msg":"hi","alg":"ES256","iat":5,"n":1}"#.parse().unwrap();
        assert_eq!(pay.alg, Alg::Es256);
        assert_eq!(pay.iat, Some(5));
        assert_eq!(
            String::from_utf8(pay.to_vec().unwrap()).unwrap(),
            r#"{"alg":"ES256","iat":5,"msg":"hi","n":1}"#
        );
    }

    #[test]
    fn test_custom_fields_keep_their_order() {
        let pay: Pay = r#"{"z":1,"alg":"ES256","a":2}"#.parse().unwrap();
        let keys: Vec<_> = pay.extra.keys().cloned().collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(
            String::from_utf8(pay.to_vec().unwrap()).unwrap(),
            r#"{"alg":"ES256","z":1,"a":2}"#
        );
    }

    #[test]
    fn test_absent_standard_fields_omitted() {
        let pay = Pay {
            alg: Alg::Es256,
            ..Default::default()
        };
        assert_eq!(
            String::from_utf8(pay.to_vec().unwrap()).unwrap(),
            r#"{"alg":"ES256"}"#
        );
    }

    #[test]
    fn test_unknown_alg_omitted() {
        let pay: Pay = r#"{"msg":"hi"}"#.parse().unwrap();
        assert_eq!(pay.alg, Alg::UnknownAlg);
        assert_eq!(
            String::from_utf8(pay.to_vec().unwrap()).unwrap(),
            r#"{"msg":"hi"}"#
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Pay::from_slice(br#"{"alg":"ES256","alg":"ES384"}"#).unwrap_err();
        match err {
            CozeError::DuplicateField { field } => assert_eq!(field, "alg"),
            other => panic!("expected DuplicateField, got: {other}"),
        }
    }

    #[test]
    fn test_duplicate_rejected_via_serde_entry() {
        let err = serde_json::from_str::<Pay>(r#"{"a":1,"a":2}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate field"));
    }

    #[test]
    fn test_wrong_types_rejected() {
        assert!(Pay::from_slice(br#"{"alg":5}"#).is_err());
        assert!(Pay::from_slice(br#"{"iat":"soon"}"#).is_err());
        assert!(Pay::from_slice(br#"{"tmb":123}"#).is_err());
        assert!(Pay::from_slice(br#"{"typ":[]}"#).is_err());
    }

    #[test]
    fn test_tmb_must_be_canonical_base64() {
        assert!(Pay::from_slice(br#####"{"tmb":"####"}"#####).is_err());
    }

    #[test]
    fn test_extra_shadowing_standard_is_ignored() {
        let mut pay = Pay {
            alg: Alg::Es256,
            ..Default::default()
        };
        pay.extra.insert("alg", Val::from("ES384"));
        assert_eq!(
            String::from_utf8(pay.to_vec().unwrap()).unwrap(),
            r#"{"alg":"ES256"}"#
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let pay: Pay = r#"{"msg":"Coze Rocks","alg":"ES256","iat":1627518000}"#.parse().unwrap();
        let json = serde_json::to_string(&pay).unwrap();
        let back: Pay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pay);
    }
}
