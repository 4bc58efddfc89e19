use crate::definition::ParameterName;
use crate::types::ConstructionError;

/// The definition of a parameter, or a lookup of a definition, is invalid.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum InvalidParameterDefinition {
    #[error("Parameter name must not be empty.")]
    EmptyName,
    #[error("Type name must not be empty.")]
    EmptyTypeName,
    #[error("Type '{type_name}' cannot be resolved.")]
    UnresolvableType { type_name: String },
    #[error("Parameter '{name}' declares fixed values, which are not supported for array type '{type_name}'.")]
    ArrayTypeNotAllowed { name: ParameterName, type_name: String },
    #[error("Parameter '{name}' declares fixed values, but no values are allowed.")]
    NoAllowedValues { name: ParameterName },
    #[error("Allowed value of parameter '{name}' cannot be converted: {source}")]
    AllowedValueNotConvertible { name: ParameterName, source: Box<InvalidParameterValue> },
    #[error("Allowed values of parameter '{name}' are fixed and cannot be replaced.")]
    AllowedValuesImmutable { name: ParameterName },
    #[error("Parameter '{name}' does not declare fixed values.")]
    NotFixedValues { name: ParameterName },
    #[error("No parameter named '{name}'.")]
    NoSuchParameter { name: String },
}

impl InvalidParameterDefinition {

    pub fn new_no_such_parameter_error(name: impl Into<String>) -> Self {
        Self::NoSuchParameter { name: name.into() }
    }

    pub fn new_allowed_value_not_convertible_error(name: &ParameterName, source: InvalidParameterValue) -> Self {
        Self::AllowedValueNotConvertible {
            name: Clone::clone(name),
            source: Box::new(source),
        }
    }
}

/// A value cannot be stored in, or converted for, a parameter.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum InvalidParameterValue {
    #[error("Parameter '{name}' is not nullable.")]
    NotNullable { name: ParameterName },
    #[error("Type '{type_name}' of parameter '{name}' cannot be resolved.")]
    UnresolvableType { name: ParameterName, type_name: String },
    #[error("Cannot convert '{value}' to primitive type '{type_name}' of parameter '{name}'.")]
    CannotConvertToPrimitive { name: ParameterName, type_name: String, value: String },
    #[error("Type '{type_name}' of parameter '{name}' has no constructor accepting '{value}' of type '{value_type}'.")]
    NoCompatibleConstructor { name: ParameterName, type_name: String, value: String, value_type: String },
    #[error("Cannot convert '{value}' to type '{type_name}' of parameter '{name}': {source}")]
    ConstructionFailed { name: ParameterName, type_name: String, value: String, source: ConstructionError },
    #[error("Converted value '{value}' is still not valid for parameter '{name}' of type '{type_name}'.")]
    StillNotValid { name: ParameterName, type_name: String, value: String },
    #[error("Value '{value}' is not one of the allowed values of parameter '{name}'.")]
    NotAnAllowedValue { name: ParameterName, value: String },
}

impl InvalidParameterValue {

    /// Name of the parameter the value was meant for.
    pub fn parameter_name(&self) -> &ParameterName {
        match self {
            InvalidParameterValue::NotNullable { name }
            | InvalidParameterValue::UnresolvableType { name, .. }
            | InvalidParameterValue::CannotConvertToPrimitive { name, .. }
            | InvalidParameterValue::NoCompatibleConstructor { name, .. }
            | InvalidParameterValue::ConstructionFailed { name, .. }
            | InvalidParameterValue::StillNotValid { name, .. }
            | InvalidParameterValue::NotAnAllowedValue { name, .. } => name,
        }
    }
}
