//! Hashing primitives for TamperChain

use crate::error::{ChainError, Result};
use serde::ser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Number of hex characters shown when a digest is rendered in short form.
pub const DISPLAY_HASH_LEN: usize = 32;

/// A full SHA-256 digest. Comparisons always use all 32 bytes; truncation
/// only ever happens when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Digest([u8; 32]);

impl Digest {
    /// Sentinel used as the genesis block's previous hash.
    pub const ZERO: Digest = Digest([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex prefix of `DISPLAY_HASH_LEN` characters.
    pub fn short(&self) -> String {
        self.short_with(DISPLAY_HASH_LEN)
    }

    /// Hex prefix of at most `len` characters (capped at the full 64).
    pub fn short_with(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len);
        hex
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for Digest {
    type Error = ChainError;

    fn try_from(hex_str: String) -> Result<Self> {
        let bytes = hex::decode(&hex_str)
            .map_err(|e| ChainError::SerializationFailure(format!("Invalid hex digest: {}", e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            ChainError::SerializationFailure(format!("Digest must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Digest(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Converts a payload into the `Value` a block stores.
///
/// serde_json maps NaN and the infinities to `null`; those are rejected
/// here instead, so a block never holds data it was not given.
pub fn payload_value<T: Serialize + ?Sized>(data: &T) -> Result<Value> {
    data.serialize(FiniteCheck)
        .map_err(|e| ChainError::SerializationFailure(e.to_string()))?;
    Ok(serde_json::to_value(data)?)
}

/// Canonical JSON encoding of a payload. Object keys come out sorted, so two
/// logically equal payloads always encode to the same string.
pub fn canonical_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let value = payload_value(data)?;
    Ok(encode_value(&value))
}

/// Canonical JSON for a payload already held as a `Value`. serde_json keeps
/// object keys in a sorted map, so this cannot fail and needs no re-sorting.
pub fn encode_value(value: &Value) -> String {
    value.to_string()
}

/// Block content digest over `(index, previous_hash, timestamp, data_json)`.
///
/// Variable-length fields are length-prefixed so bytes cannot migrate from
/// one field into its neighbour and still produce the same preimage.
pub fn block_digest(index: u64, previous_hash: &Digest, timestamp: &str, data_json: &str) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(index.to_le_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update((timestamp.len() as u64).to_le_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update((data_json.len() as u64).to_le_bytes());
    hasher.update(data_json.as_bytes());
    Digest(hasher.finalize().into())
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct NonFiniteFloat(String);

impl ser::Error for NonFiniteFloat {
    fn custom<M: fmt::Display>(msg: M) -> Self {
        NonFiniteFloat(msg.to_string())
    }
}

type CheckResult = std::result::Result<(), NonFiniteFloat>;

fn check_float(v: f64) -> CheckResult {
    if v.is_finite() {
        Ok(())
    } else {
        Err(NonFiniteFloat(format!("{} cannot be encoded as JSON", v)))
    }
}

/// Serializer that produces nothing and only walks the payload looking for
/// non-finite floats.
#[derive(Clone, Copy)]
struct FiniteCheck;

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> CheckResult {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> CheckResult {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> CheckResult {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> CheckResult {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> CheckResult {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> CheckResult {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> CheckResult {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> CheckResult {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> CheckResult {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> CheckResult {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> CheckResult {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> CheckResult {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> CheckResult {
        check_float(v)
    }

    fn serialize_char(self, _: char) -> CheckResult {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> CheckResult {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> CheckResult {
        Ok(())
    }

    fn serialize_none(self) -> CheckResult {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> CheckResult {
        key.serialize(*self)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_digest_is_deterministic() {
        let a = block_digest(3, &Digest::ZERO, "01/01/2023", "\"payload\"");
        let b = block_digest(3, &Digest::ZERO, "01/01/2023", "\"payload\"");
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_digest_field_sensitivity() {
        let base = block_digest(1, &Digest::ZERO, "t", "\"d\"");
        let other_prev = Digest::from_bytes([1u8; 32]);

        assert_ne!(base, block_digest(2, &Digest::ZERO, "t", "\"d\""));
        assert_ne!(base, block_digest(1, &other_prev, "t", "\"d\""));
        assert_ne!(base, block_digest(1, &Digest::ZERO, "u", "\"d\""));
        assert_ne!(base, block_digest(1, &Digest::ZERO, "t", "\"e\""));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        // "ab" + "c" must not hash like "a" + "bc"
        let left = block_digest(0, &Digest::ZERO, "ab", "c");
        let right = block_digest(0, &Digest::ZERO, "a", "bc");
        assert_ne!(left, right);
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let a = canonical_json(&json!({"b": 1, "a": [1, 2]})).unwrap();
        let b = canonical_json(&json!({"a": [1, 2], "b": 1})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":[1,2],"b":1}"#);
    }

    #[test]
    fn test_canonical_json_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "value");
        assert!(canonical_json(&map).is_err());
    }

    #[test]
    fn test_payload_value_rejects_non_finite_floats() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(payload_value(&bad), Err(ChainError::SerializationFailure(_))));
        }
        assert!(payload_value(&vec![f64::INFINITY, 1.0]).is_err());
        assert!(payload_value(&Some(f32::NAN)).is_err());

        let mut nested = std::collections::BTreeMap::new();
        nested.insert("reading", (1u8, f64::NAN));
        assert!(payload_value(&nested).is_err());
        assert!(canonical_json(&nested).is_err());
    }

    #[test]
    fn test_payload_value_keeps_finite_payloads() {
        assert_eq!(payload_value(&1.5f64).unwrap(), json!(1.5));
        assert_eq!(payload_value(&Option::<f64>::None).unwrap(), Value::Null);
        assert_eq!(
            payload_value(&json!({"a": [1, -2.25, "x"], "b": null})).unwrap(),
            json!({"a": [1, -2.25, "x"], "b": null})
        );
        assert_eq!(payload_value(&7u128).unwrap(), json!(7));
    }

    #[test]
    fn test_digest_serializes_as_hex() {
        let digest = block_digest(0, &Digest::ZERO, "t", "\"d\"");
        let encoded = serde_json::to_string(&digest).unwrap();
        assert_eq!(encoded, format!("\"{}\"", digest.to_hex()));
        assert_eq!(serde_json::from_str::<Digest>(&encoded).unwrap(), digest);
        assert!(serde_json::from_str::<Digest>("\"abcd\"").is_err());
    }

    #[test]
    fn test_short_hash_lengths() {
        let digest = block_digest(0, &Digest::ZERO, "t", "\"d\"");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.short().len(), DISPLAY_HASH_LEN);
        assert_eq!(digest.short_with(8), &digest.to_hex()[..8]);
        assert_eq!(digest.short_with(100).len(), 64);
        assert!(Digest::ZERO.is_zero());
    }
}
