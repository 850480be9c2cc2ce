//! JSON codec
//!
//! Values are checked before encoding. serde_json writes non-finite floats as
//! `null` and turns integer or bool map keys into strings; neither reads back
//! as the value that was stored, so both are rejected here.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::{self, Impossible, Serialize};

use crate::error::{DbmError, Result};

pub(super) fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    value
        .serialize(Checker)
        .map_err(|e| DbmError::Encode(format!("json: {}", e)))?;
    serde_json::to_vec(value).map_err(|e| DbmError::Encode(format!("json: {}", e)))
}

pub(super) fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|e| DbmError::Corruption(format!("json: {}", e)))
}

// =============================================================================
// Representability Check
// =============================================================================

#[derive(Debug)]
struct Unrepresentable(String);

impl fmt::Display for Unrepresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Unrepresentable {}

impl ser::Error for Unrepresentable {
    fn custom<M: fmt::Display>(msg: M) -> Self {
        Unrepresentable(msg.to_string())
    }
}

type Check<T = ()> = std::result::Result<T, Unrepresentable>;

fn finite(v: f64) -> Check {
    if v.is_finite() {
        Ok(())
    } else {
        Err(Unrepresentable(format!("non-finite float {} has no JSON form", v)))
    }
}

fn non_string_key(kind: &str) -> Unrepresentable {
    Unrepresentable(format!("map key must be a string, got {}", kind))
}

/// Walks a value without producing output, failing on anything JSON cannot
/// hold faithfully
#[derive(Clone, Copy)]
struct Checker;

impl ser::Serializer for Checker {
    type Ok = ();
    type Error = Unrepresentable;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Check {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Check {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Check {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Check {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Check {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Check {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Check {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Check {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Check {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Check {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Check {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Check {
        finite(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Check {
        finite(v)
    }

    fn serialize_char(self, _: char) -> Check {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Check {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Check {
        Ok(())
    }

    fn serialize_none(self) -> Check {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Check {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Check {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Check {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Check {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Check<Self> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Check<Self> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Check<Self> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Check<Self> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Check<Self> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Check<Self> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Check<Self> {
        Ok(self)
    }
}

impl ser::SerializeSeq for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTuple for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeMap for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Check {
        key.serialize(KeyChecker)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStruct for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Checker {
    type Ok = ();
    type Error = Unrepresentable;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Check {
        value.serialize(*self)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

/// Accepts only keys that are strings in the data model
struct KeyChecker;

impl ser::Serializer for KeyChecker {
    type Ok = ();
    type Error = Unrepresentable;
    type SerializeSeq = Impossible<(), Unrepresentable>;
    type SerializeTuple = Impossible<(), Unrepresentable>;
    type SerializeTupleStruct = Impossible<(), Unrepresentable>;
    type SerializeTupleVariant = Impossible<(), Unrepresentable>;
    type SerializeMap = Impossible<(), Unrepresentable>;
    type SerializeStruct = Impossible<(), Unrepresentable>;
    type SerializeStructVariant = Impossible<(), Unrepresentable>;

    fn serialize_str(self, _: &str) -> Check {
        Ok(())
    }

    fn serialize_char(self, _: char) -> Check {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Check {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_bool(self, _: bool) -> Check {
        Err(non_string_key("bool"))
    }

    fn serialize_i8(self, _: i8) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_i16(self, _: i16) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_i32(self, _: i32) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_i64(self, _: i64) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_i128(self, _: i128) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_u8(self, _: u8) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_u16(self, _: u16) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_u32(self, _: u32) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_u64(self, _: u64) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_u128(self, _: u128) -> Check {
        Err(non_string_key("integer"))
    }

    fn serialize_f32(self, _: f32) -> Check {
        Err(non_string_key("float"))
    }

    fn serialize_f64(self, _: f64) -> Check {
        Err(non_string_key("float"))
    }

    fn serialize_bytes(self, _: &[u8]) -> Check {
        Err(non_string_key("bytes"))
    }

    fn serialize_none(self) -> Check {
        Err(non_string_key("none"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Check {
        Err(non_string_key("option"))
    }

    fn serialize_unit(self) -> Check {
        Err(non_string_key("unit"))
    }

    fn serialize_unit_struct(self, _: &'static str) -> Check {
        Err(non_string_key("unit struct"))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Check {
        Err(non_string_key("enum variant"))
    }

    fn serialize_seq(self, _: Option<usize>) -> Check<Self::SerializeSeq> {
        Err(non_string_key("sequence"))
    }

    fn serialize_tuple(self, _: usize) -> Check<Self::SerializeTuple> {
        Err(non_string_key("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Check<Self::SerializeTupleStruct> {
        Err(non_string_key("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Check<Self::SerializeTupleVariant> {
        Err(non_string_key("enum variant"))
    }

    fn serialize_map(self, _: Option<usize>) -> Check<Self::SerializeMap> {
        Err(non_string_key("map"))
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Check<Self::SerializeStruct> {
        Err(non_string_key("struct"))
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Check<Self::SerializeStructVariant> {
        Err(non_string_key("enum variant"))
    }
}
