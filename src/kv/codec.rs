//! JSON value codec.
//!
//! `serde_json` writes NaN and the infinities as `null`, which would make a
//! successful `set` unreadable as the type it was written with. Values are
//! walked once with [`FiniteFloats`] before encoding so those are rejected as
//! [`Error::Serialization`] instead.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::{self, Error as _};

use crate::error::{Error, Result};

/// Encode `value` as JSON, rejecting non-finite floats.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    value.serialize(FiniteFloats).map_err(Error::Serialization)?;
    serde_json::to_vec(value).map_err(Error::Serialization)
}

/// Decode the JSON stored at `key` as `T`.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Deserialization {
        key: key.to_string(),
        source,
    })
}

/// A serializer that produces nothing and fails on the first NaN or
/// infinite float it meets.
struct FiniteFloats;

type Check = std::result::Result<(), serde_json::Error>;

fn check_float(value: f64) -> Check {
    if value.is_finite() {
        Ok(())
    } else {
        Err(serde_json::Error::custom(format!(
            "unsupported value: {value} cannot be represented in JSON"
        )))
    }
}

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Check {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Check {
        check_float(v)
    }

    fn serialize_bool(self, _v: bool) -> Check {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Check {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Check {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Check {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Check {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Check {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Check {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Check {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Check {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Check {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Check {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Check {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Check {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Check {
        Ok(())
    }

    fn serialize_none(self) -> Check {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Check {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Check {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Check {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Check {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Check {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Reading {
        sensor: String,
        values: Vec<Option<f32>>,
    }

    #[test]
    fn test_finite_values_encode() -> anyhow::Result<()> {
        let reading = Reading {
            sensor: "t1".to_string(),
            values: vec![Some(1.5), None, Some(-0.0)],
        };
        let bytes = encode(&reading)?;
        assert_eq!(bytes, serde_json::to_vec(&reading)?);
        Ok(())
    }

    #[test]
    fn test_nested_non_finite_rejected() {
        let reading = Reading {
            sensor: "t1".to_string(),
            values: vec![Some(1.5), Some(f32::INFINITY)],
        };
        assert!(matches!(encode(&reading), Err(Error::Serialization(_))));

        let mut map = BTreeMap::new();
        map.insert("x", (1u8, f64::NEG_INFINITY));
        assert!(matches!(encode(&map), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_decode_reports_key() {
        let err = decode::<u32>("count", b"\"many\"").err();
        assert!(matches!(err, Some(Error::Deserialization { key, .. }) if key == "count"));
    }
}
