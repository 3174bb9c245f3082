//! The recursive structured value and its JSON wire form.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, DecodeError};

/// String-keyed map of structured values. Key order carries no meaning.
pub type AnyMap = BTreeMap<String, AnyValue>;

/// Ordered list of structured values.
pub type AnyList = Vec<AnyValue>;

/// Arbitrary protocol payload, equivalent to a JSON value.
///
/// Equality and hashing are structural. Floats are compared by bit pattern,
/// so `NaN` equals itself and `0.0` differs from `-0.0`; this keeps [`Eq`] and
/// [`Hash`] consistent with each other.
#[derive(Debug, Clone, Default)]
pub enum AnyValue {
    /// Absent value.
    #[default]
    Null,
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Double precision float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list.
    List(AnyList),
    /// String-keyed map.
    Map(AnyMap),
}

/// Discriminant of an [`AnyValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`AnyValue::Null`].
    Null,
    /// [`AnyValue::Int`].
    Int,
    /// [`AnyValue::Bool`].
    Bool,
    /// [`AnyValue::Float`].
    Float,
    /// [`AnyValue::String`].
    String,
    /// [`AnyValue::List`].
    List,
    /// [`AnyValue::Map`].
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Null => "null",
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        };
        formatter.write_str(label)
    }
}

/// Decodes a structured value from its JSON wire form.
///
/// # Errors
///
/// Returns [`DecodeError`] when the input is not well-formed JSON.
pub fn decode(bytes: &[u8]) -> Result<AnyValue, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::new)
}

/// Encodes a structured value into its JSON wire form.
///
/// Encoding never fails. Non-finite floats have no JSON representation and
/// are written as `null`.
#[must_use]
pub fn encode(value: &AnyValue) -> Vec<u8> {
    serde_json::Value::from(value).to_string().into_bytes()
}

impl AnyValue {
    /// Returns the variant discriminant.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Int(_) => ValueKind::Int,
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
        }
    }

    /// Whether the value is [`AnyValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the integer payload.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float payload. Integers are not widened.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the list payload.
    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// Returns the map payload.
    #[must_use]
    pub const fn as_map(&self) -> Option<&AnyMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when the value is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Decodes the value from its JSON wire form. See [`decode`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the input is not well-formed JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode(bytes)
    }

    /// Encodes the value into its JSON wire form. See [`encode`].
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        encode(self)
    }

    /// Converts any serialisable record into a structured value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when the record's `Serialize`
    /// implementation fails, for example with non-string map keys.
    pub fn from_typed<T>(value: &T) -> Result<Self, CodecError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(Self::from)
            .map_err(CodecError::Encode)
    }

    /// Converts the structured value into a deserialisable record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when the value does not match `T`.
    pub fn to_typed<T>(&self) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(serde_json::Value::from(self)).map_err(CodecError::Decode)
    }
}

impl PartialEq for AnyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(left), Self::Int(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Float(left), Self::Float(right)) => left.to_bits() == right.to_bits(),
            (Self::String(left), Self::String(right)) => left == right,
            (Self::List(left), Self::List(right)) => left == right,
            (Self::Map(left), Self::Map(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for AnyValue {}

impl Hash for AnyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Int(value) => value.hash(state),
            Self::Bool(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::String(value) => value.hash(state),
            Self::List(values) => values.hash(state),
            Self::Map(map) => map.hash(state),
        }
    }
}

impl Serialize for AnyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::List(values) => serializer.collect_seq(values),
            Self::Map(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for AnyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AnyValueVisitor)
    }
}

struct AnyValueVisitor;

impl<'de> Visitor<'de> for AnyValueVisitor {
    type Value = AnyValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("null, integer, boolean, float, string, list or map")
    }

    fn visit_unit<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<AnyValue, E> {
        Ok(AnyValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<AnyValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        AnyValue::deserialize(deserializer)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<AnyValue, E> {
        Ok(AnyValue::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<AnyValue, E> {
        Ok(i64::try_from(value).map_or_else(|_| AnyValue::Float(u64_to_f64(value)), AnyValue::Int))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<AnyValue, E> {
        Ok(AnyValue::Bool(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<AnyValue, E> {
        Ok(AnyValue::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<AnyValue, E> {
        Ok(AnyValue::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<AnyValue, E> {
        Ok(AnyValue::String(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<AnyValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(AnyValue::List(values))
    }

    fn visit_map<A>(self, mut access: A) -> Result<AnyValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = AnyMap::new();
        while let Some((key, value)) = access.next_entry::<String, AnyValue>()? {
            // The first occurrence of a duplicated key wins.
            if let Entry::Vacant(slot) = map.entry(key) {
                slot.insert(value);
            }
        }
        Ok(AnyValue::Map(map))
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integers beyond i64 are only representable as floats"
)]
const fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

impl From<&AnyValue> for serde_json::Value {
    fn from(value: &AnyValue) -> Self {
        match value {
            AnyValue::Null => Self::Null,
            AnyValue::Int(number) => Self::from(*number),
            AnyValue::Bool(flag) => Self::Bool(*flag),
            AnyValue::Float(number) => Self::from(*number),
            AnyValue::String(text) => Self::String(text.clone()),
            AnyValue::List(values) => Self::Array(values.iter().map(Self::from).collect()),
            AnyValue::Map(map) => Self::Object(
                map.iter()
                    .map(|(key, entry)| (key.clone(), Self::from(entry)))
                    .collect(),
            ),
        }
    }
}

impl From<AnyValue> for serde_json::Value {
    fn from(value: AnyValue) -> Self {
        Self::from(&value)
    }
}

impl From<serde_json::Value> for AnyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(integer) => Self::Int(integer),
                None => number.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(text) => Self::String(text),
            serde_json::Value::Array(values) => {
                Self::List(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(object) => Self::Map(
                object
                    .into_iter()
                    .map(|(key, entry)| (key, Self::from(entry)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for AnyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AnyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for AnyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AnyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AnyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<AnyList> for AnyValue {
    fn from(values: AnyList) -> Self {
        Self::List(values)
    }
}

impl From<AnyMap> for AnyValue {
    fn from(map: AnyMap) -> Self {
        Self::Map(map)
    }
}

impl<T> From<Option<T>> for AnyValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl FromIterator<Self> for AnyValue {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

/// Builds a map; when a key repeats, the first occurrence wins.
impl<K> FromIterator<(K, Self)> for AnyValue
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Self)>>(iter: I) -> Self {
        let mut map = AnyMap::new();
        for (key, value) in iter {
            map.entry(key.into()).or_insert(value);
        }
        Self::Map(map)
    }
}
