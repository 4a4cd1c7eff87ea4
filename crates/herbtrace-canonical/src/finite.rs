use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::Value;

use crate::canonicalizer::CanonicalizationError;

/// Fails with the JSON path of the first NaN or infinite float in `value`.
///
/// Must run on the original value: `serde_json::to_value` already writes a
/// non-finite float as `null`.
pub fn ensure_finite<T: Serialize + ?Sized>(value: &T) -> Result<(), CanonicalizationError> {
    value
        .serialize(FiniteCheck { path: Path::root() })
        .map_err(|err| match err {
            CheckError::NonFinite(path) => CanonicalizationError::NonFiniteNumber(path),
            CheckError::Custom(msg) => CanonicalizationError::InvalidStructure(msg),
        })
}

/// JSON path of the value being visited.
#[derive(Debug, Clone)]
pub(crate) struct Path {
    segments: Vec<String>,
}

impl Path {
    pub(crate) fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub(crate) fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    pub(crate) fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

#[derive(Debug)]
enum CheckError {
    NonFinite(String),
    Custom(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::NonFinite(path) => write!(f, "non-finite number at {}", path),
            CheckError::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CheckError {}

impl ser::Error for CheckError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CheckError::Custom(msg.to_string())
    }
}

/// Serializer that writes nothing and only inspects floats.
struct FiniteCheck {
    path: Path,
}

macro_rules! accept {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<(), CheckError> {
                Ok(())
            }
        )*
    };
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = CheckError;
    type SerializeSeq = Compound;
    type SerializeTuple = Compound;
    type SerializeTupleStruct = Compound;
    type SerializeTupleVariant = Compound;
    type SerializeMap = Compound;
    type SerializeStruct = Compound;
    type SerializeStructVariant = Compound;

    accept! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    fn serialize_f32(self, v: f32) -> Result<(), CheckError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), CheckError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(CheckError::NonFinite(self.path.to_string()))
        }
    }

    fn serialize_none(self) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), CheckError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), CheckError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        value.serialize(FiniteCheck {
            path: self.path.push_field(variant),
        })
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path.push_field(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound, CheckError> {
        Ok(Compound::new(self.path.push_field(variant)))
    }
}

struct Compound {
    path: Path,
    index: usize,
    key: Option<String>,
}

impl Compound {
    fn new(path: Path) -> Self {
        Self {
            path,
            index: 0,
            key: None,
        }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        let path = self.path.push_index(self.index);
        self.index += 1;
        value.serialize(FiniteCheck { path })
    }

    fn field<T: ?Sized + Serialize>(&self, key: &str, value: &T) -> Result<(), CheckError> {
        value.serialize(FiniteCheck {
            path: self.path.push_field(key),
        })
    }
}

impl ser::SerializeSeq for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        self.element(value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTuple for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        self.element(value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        self.element(value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        self.element(value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeMap for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), CheckError> {
        key.serialize(FiniteCheck {
            path: self.path.clone(),
        })?;
        let label = match serde_json::to_value(key) {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(err) => return Err(CheckError::Custom(err.to_string())),
        };
        self.key = Some(label);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), CheckError> {
        let key = self.key.take().unwrap_or_default();
        self.field(&key, value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeStruct for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Compound {
    type Ok = ();
    type Error = CheckError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CheckError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), CheckError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(serde::Serialize)]
    struct Reading {
        site: &'static str,
        weights: Vec<f64>,
    }

    #[test]
    fn path_display_joins_segments() {
        let path = Path::root().push_field("coordinates").push_index(2);
        assert_eq!(path.to_string(), "coordinates.[2]");
        assert_eq!(Path::root().to_string(), "root");
    }

    #[test]
    fn finite_values_pass() {
        assert!(ensure_finite(&json!({"lat": 26.9, "tags": ["a", 1]})).is_ok());
        assert!(ensure_finite(&Reading { site: "s", weights: vec![1.5, -0.0] }).is_ok());
    }

    #[test]
    fn reports_the_path_of_the_first_bad_float() {
        let reading = Reading {
            site: "s",
            weights: vec![1.0, f64::NAN],
        };
        match ensure_finite(&reading) {
            Err(CanonicalizationError::NonFiniteNumber(path)) => assert_eq!(path, "weights.[1]"),
            other => panic!("unexpected {:?}", other),
        }

        let mut map = BTreeMap::new();
        map.insert("quantity_kg", f64::INFINITY);
        match ensure_finite(&map) {
            Err(CanonicalizationError::NonFiniteNumber(path)) => assert_eq!(path, "quantity_kg"),
            other => panic!("unexpected {:?}", other),
        }

        match ensure_finite(&Some(f32::NEG_INFINITY)) {
            Err(CanonicalizationError::NonFiniteNumber(path)) => assert_eq!(path, "root"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
