//! Conversion between structured values and typed records.
//!
//! Conversions are pure and never fail loudly: a payload that does not match
//! the requested type yields `None`, which callers treat as "no valid
//! conversion" rather than as an error.

use crate::value::{AnyMap, AnyValue};

/// A record that can be carried inside an [`AnyValue`].
///
/// Implementors describe how to read themselves from a map-shaped payload and
/// how to write themselves back. [`AnyCodable::from_any`] accepts any
/// structured value; its default implementation only accepts maps and defers
/// to [`AnyCodable::from_map`]. Scalar and container implementations override
/// it instead.
pub trait AnyCodable: Sized {
    /// Reads the record from a map. Returns `None` when a required field is
    /// missing or has the wrong shape.
    fn from_map(map: &AnyMap) -> Option<Self>;

    /// Writes the record as a structured value.
    fn to_any(&self) -> AnyValue;

    /// Reads the record from an arbitrary structured value.
    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_map().and_then(Self::from_map)
    }
}

/// Reads a required field from `map`.
///
/// Returns `None` when the key is absent or its value does not convert.
#[must_use]
pub fn required_field<T: AnyCodable>(map: &AnyMap, key: &str) -> Option<T> {
    map.get(key).and_then(T::from_any)
}

/// Reads an optional field from `map`.
///
/// An absent key and an explicit `null` both read as `Some(None)`. A present
/// value that does not convert yields `None`, failing the enclosing record.
#[must_use]
pub fn optional_field<T: AnyCodable>(map: &AnyMap, key: &str) -> Option<Option<T>> {
    match map.get(key) {
        None | Some(AnyValue::Null) => Some(None),
        Some(value) => T::from_any(value).map(Some),
    }
}

impl AnyCodable for AnyValue {
    fn from_map(map: &AnyMap) -> Option<Self> {
        Some(Self::Map(map.clone()))
    }

    fn to_any(&self) -> AnyValue {
        self.clone()
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl AnyCodable for String {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        AnyValue::String(self.clone())
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_str().map(ToOwned::to_owned)
    }
}

impl AnyCodable for i64 {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        AnyValue::Int(*self)
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_i64()
    }
}

impl AnyCodable for bool {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        AnyValue::Bool(*self)
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_bool()
    }
}

impl AnyCodable for f64 {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        AnyValue::Float(*self)
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_f64()
    }
}

/// `None` is written as [`AnyValue::Null`], and `null` reads back as `None`.
impl<T: AnyCodable> AnyCodable for Option<T> {
    fn from_map(map: &AnyMap) -> Option<Self> {
        T::from_map(map).map(Some)
    }

    fn to_any(&self) -> AnyValue {
        self.as_ref().map_or(AnyValue::Null, AnyCodable::to_any)
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_any(value).map(Some)
    }
}

/// Lists convert element by element; one mismatched element fails the list.
impl<T: AnyCodable> AnyCodable for Vec<T> {
    fn from_map(_map: &AnyMap) -> Option<Self> {
        None
    }

    fn to_any(&self) -> AnyValue {
        AnyValue::List(self.iter().map(AnyCodable::to_any).collect())
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        value.as_list()?.iter().map(T::from_any).collect()
    }
}
