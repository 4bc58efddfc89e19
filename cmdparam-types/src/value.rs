use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::types::{ScalarType, TypeDescriptor};

/// A dynamically typed parameter value.
///
/// The absence of a value is expressed as `Option::<Value>::None` wherever a value may be
/// missing, there is no dedicated null variant.
///
/// Floating point values compare by their bit pattern, so `NaN` equals itself and `0.0`
/// differs from `-0.0`, matching [`Hash`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    Boolean(bool),
    Character(char),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Url(Url),
    Uuid(Uuid),
    Array(ArrayValue),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// An array whose elements are all of `element_type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub element_type: TypeDescriptor,
    pub items: Vec<Value>,
}

impl ArrayValue {
    pub fn new(element_type: TypeDescriptor, items: Vec<Value>) -> Self {
        Self { element_type, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Value {

    pub fn array(element_type: TypeDescriptor, items: impl IntoIterator<Item=Value>) -> Self {
        Value::Array(ArrayValue::new(element_type, items.into_iter().collect()))
    }

    pub fn string_array<S: Into<String>>(items: impl IntoIterator<Item=S>) -> Self {
        Value::array(
            TypeDescriptor::Scalar(ScalarType::String),
            items.into_iter().map(|item| Value::String(item.into())),
        )
    }

    /// The runtime type of this value.
    pub fn value_type(&self) -> TypeDescriptor {
        match self {
            Value::Boolean(_) => TypeDescriptor::Scalar(ScalarType::Boolean),
            Value::Character(_) => TypeDescriptor::Scalar(ScalarType::Character),
            Value::Byte(_) => TypeDescriptor::Scalar(ScalarType::Byte),
            Value::Short(_) => TypeDescriptor::Scalar(ScalarType::Short),
            Value::Integer(_) => TypeDescriptor::Scalar(ScalarType::Integer),
            Value::Long(_) => TypeDescriptor::Scalar(ScalarType::Long),
            Value::Float(_) => TypeDescriptor::Scalar(ScalarType::Float),
            Value::Double(_) => TypeDescriptor::Scalar(ScalarType::Double),
            Value::String(_) => TypeDescriptor::Scalar(ScalarType::String),
            Value::Url(_) => TypeDescriptor::Scalar(ScalarType::Url),
            Value::Uuid(_) => TypeDescriptor::Scalar(ScalarType::Uuid),
            Value::Array(array) => TypeDescriptor::Array(Box::new(Clone::clone(&array.element_type))),
            Value::List(_) => TypeDescriptor::List,
            Value::Map(_) => TypeDescriptor::Map,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::List(_) | Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Widens any integral value to `i64`.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            Value::Byte(value) => Some(i64::from(*value)),
            Value::Short(value) => Some(i64::from(*value)),
            Value::Integer(value) => Some(i64::from(*value)),
            Value::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_floating(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(f64::from(*value)),
            Value::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// Items of an array or list value, `None` for everything else.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Array(array) => Some(array.items.as_slice()),
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Character(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(String::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Url> for Value {
    fn from(value: Url) -> Self {
        Value::Url(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(this), Value::Boolean(that)) => this == that,
            (Value::Character(this), Value::Character(that)) => this == that,
            (Value::Byte(this), Value::Byte(that)) => this == that,
            (Value::Short(this), Value::Short(that)) => this == that,
            (Value::Integer(this), Value::Integer(that)) => this == that,
            (Value::Long(this), Value::Long(that)) => this == that,
            (Value::Float(this), Value::Float(that)) => this.to_bits() == that.to_bits(),
            (Value::Double(this), Value::Double(that)) => this.to_bits() == that.to_bits(),
            (Value::String(this), Value::String(that)) => this == that,
            (Value::Url(this), Value::Url(that)) => this == that,
            (Value::Uuid(this), Value::Uuid(that)) => this == that,
            (Value::Array(this), Value::Array(that)) => this == that,
            (Value::List(this), Value::List(that)) => this == that,
            (Value::Map(this), Value::Map(that)) => this == that,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(value) => value.hash(state),
            Value::Character(value) => value.hash(state),
            Value::Byte(value) => value.hash(state),
            Value::Short(value) => value.hash(state),
            Value::Integer(value) => value.hash(state),
            Value::Long(value) => value.hash(state),
            Value::Float(value) => value.to_bits().hash(state),
            Value::Double(value) => value.to_bits().hash(state),
            Value::String(value) => value.hash(state),
            Value::Url(value) => value.hash(state),
            Value::Uuid(value) => value.hash(state),
            Value::Array(array) => {
                array.element_type.hash(state);
                array.items.hash(state);
            }
            Value::List(items) => items.hash(state),
            Value::Map(entries) => entries.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Character(value) => write!(f, "{value}"),
            Value::Byte(value) => write!(f, "{value}"),
            Value::Short(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Long(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Double(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Url(value) => write!(f, "{value}"),
            Value::Uuid(value) => write!(f, "{value}"),
            Value::Array(ArrayValue { items, .. }) | Value::List(items) => {
                let items = items.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{items}]")
            }
            Value::Map(entries) => {
                let entries = entries.iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{entries}}}")
            }
        }
    }
}
