//! The type table used to validate and convert parameter values.
//!
//! Every type a [`ParameterDefinition`](crate::definition::ParameterDefinition) can declare is
//! described by a [`TypeDescriptor`]. Scalar types carry an instance-of test and an ordered list
//! of single-argument [`Constructor`]s; the [`TypeRegistry`] maps type names onto descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::InvalidParameterDefinition;
use crate::value::Value;

mod constructor;
mod registry;

pub use constructor::{ConstructionError, Constructor};
pub use registry::TypeRegistry;

/// Object types which are backed by a [`Value`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Boolean,
    Character,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Url,
    Uuid,
}

impl ScalarType {

    pub const ALL: [ScalarType; 11] = [
        ScalarType::Boolean,
        ScalarType::Character,
        ScalarType::Byte,
        ScalarType::Short,
        ScalarType::Integer,
        ScalarType::Long,
        ScalarType::Float,
        ScalarType::Double,
        ScalarType::String,
        ScalarType::Url,
        ScalarType::Uuid,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Character => "character",
            ScalarType::Byte => "byte",
            ScalarType::Short => "short",
            ScalarType::Integer => "integer",
            ScalarType::Long => "long",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::String => "string",
            ScalarType::Url => "url",
            ScalarType::Uuid => "uuid",
        }
    }

    /// Name of the unboxed counterpart, if this type has one.
    pub const fn primitive_name(self) -> Option<&'static str> {
        match self {
            ScalarType::Boolean => Some("bool"),
            ScalarType::Character => Some("char"),
            ScalarType::Byte => Some("i8"),
            ScalarType::Short => Some("i16"),
            ScalarType::Integer => Some("int"),
            ScalarType::Long => Some("i64"),
            ScalarType::Float => Some("f32"),
            ScalarType::Double => Some("f64"),
            ScalarType::String | ScalarType::Url | ScalarType::Uuid => None,
        }
    }

    pub fn is_instance(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ScalarType::Boolean, Value::Boolean(_))
            | (ScalarType::Character, Value::Character(_))
            | (ScalarType::Byte, Value::Byte(_))
            | (ScalarType::Short, Value::Short(_))
            | (ScalarType::Integer, Value::Integer(_))
            | (ScalarType::Long, Value::Long(_))
            | (ScalarType::Float, Value::Float(_))
            | (ScalarType::Double, Value::Double(_))
            | (ScalarType::String, Value::String(_))
            | (ScalarType::Url, Value::Url(_))
            | (ScalarType::Uuid, Value::Uuid(_))
        )
    }

    /// Constructors in the order they are tried during conversion.
    pub fn constructors(self) -> &'static [Constructor] {
        constructor::constructors_of(self)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identity of a parameter's declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeDescriptor {
    /// Any value.
    Object,
    Scalar(ScalarType),
    /// An unboxed type. Values are never instances of it and nothing converts to it.
    Primitive(ScalarType),
    Array(Box<TypeDescriptor>),
    List,
    Map,
    /// A type name the registry does not know. Validation against it always fails.
    Unresolved(String),
}

impl TypeDescriptor {

    pub const fn string() -> Self {
        TypeDescriptor::Scalar(ScalarType::String)
    }

    pub fn array_of(element_type: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element_type))
    }

    pub fn is_instance(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Object, _) => true,
            (TypeDescriptor::Scalar(scalar), value) => scalar.is_instance(value),
            (TypeDescriptor::Array(element_type), Value::Array(array)) => element_type.is_assignable_from(&array.element_type),
            (TypeDescriptor::List, Value::List(_)) => true,
            (TypeDescriptor::Map, Value::Map(_)) => true,
            _ => false,
        }
    }

    /// Whether a value of type `other` is also an instance of this type. Arrays are covariant.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        match (self, other) {
            (TypeDescriptor::Unresolved(_), _) | (_, TypeDescriptor::Unresolved(_)) => false,
            (TypeDescriptor::Object, other) => !other.is_primitive(),
            (TypeDescriptor::Array(this), TypeDescriptor::Array(other)) => this.is_assignable_from(other),
            (this, other) => this == other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_))
    }

    /// Arrays and lists, which are both rendered and converted as a sequence of elements.
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_) | TypeDescriptor::List)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TypeDescriptor::Map)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            TypeDescriptor::Unresolved(_) => false,
            TypeDescriptor::Array(element_type) => element_type.is_resolved(),
            _ => true,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Object => write!(f, "object"),
            TypeDescriptor::Scalar(scalar) => write!(f, "{}", scalar.name()),
            TypeDescriptor::Primitive(scalar) => write!(f, "{}", scalar.primitive_name().unwrap_or(scalar.name())),
            TypeDescriptor::Array(element_type) => write!(f, "{element_type}[]"),
            TypeDescriptor::List => write!(f, "list"),
            TypeDescriptor::Map => write!(f, "map"),
            TypeDescriptor::Unresolved(name) => write!(f, "{name}"),
        }
    }
}

impl From<TypeDescriptor> for String {
    fn from(value: TypeDescriptor) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = InvalidParameterDefinition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRegistry::builtin().resolve(&value)
    }
}

impl TryFrom<&str> for TypeDescriptor {
    type Error = InvalidParameterDefinition;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TypeRegistry::builtin().resolve(value)
    }
}
