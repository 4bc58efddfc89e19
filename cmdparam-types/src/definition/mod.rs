use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::i18n::ResourceBundle;
use crate::rendering::{RenderingDefaults, RenderingInformation};
use crate::types::{TypeDescriptor, TypeRegistry};
use crate::value::Value;

mod convert;
mod error;
mod fixed;

pub use convert::{tokenize, DEFAULT_DELIMITER, DELIMITERS};
pub use error::{InvalidParameterDefinition, InvalidParameterValue};
pub use fixed::{AllowedValues, ValueConstraint};

/// A `ParameterName` identifies a parameter. It must not be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParameterName(String);

impl ParameterName {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ParameterName {
    type Error = InvalidParameterDefinition;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(InvalidParameterDefinition::EmptyName)
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<&str> for ParameterName {
    type Error = InvalidParameterDefinition;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_owned())
    }
}

impl From<ParameterName> for String {
    fn from(value: ParameterName) -> Self {
        value.0
    }
}

impl AsRef<str> for ParameterName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ParameterName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ParameterName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ParameterName> for str {
    fn eq(&self, other: &ParameterName) -> bool {
        self == other.0
    }
}

impl PartialEq<ParameterName> for &str {
    fn eq(&self, other: &ParameterName) -> bool {
        *self == other.0
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The schema of a single parameter.
///
/// A definition knows how to validate values and how to convert values into its declared type.
/// Name and type never change after construction.
///
/// # Equality
///
/// Two definitions are equal if their names are equal, regardless of type, flags or constraints.
/// Collections rely on this to treat a definition with a known name as a replacement.
///
/// # Examples
/// ```
/// use cmdparam_types::definition::ParameterDefinition;
/// use cmdparam_types::value::Value;
///
/// let definition = ParameterDefinition::builder("ports", "integer[]")
///     .required(true)
///     .build()
///     .expect("valid definition");
///
/// let converted = definition.convert_object(Some(Value::from("8080,8081"))).expect("convertible value");
/// assert_eq!(converted.map(|value| value.to_string()), Some(String::from("[8080, 8081]")));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDefinition {
    name: ParameterName,
    value_type: TypeDescriptor,
    required: bool,
    nullable: bool,
    hidden: bool,
    description: Option<String>,
    rendering_info: RenderingInformation,
    constraint: ValueConstraint,
}

impl ParameterDefinition {

    pub fn builder(name: impl Into<String>, type_name: impl Into<String>) -> ParameterDefinitionBuilder<'static> {
        ParameterDefinitionBuilder::new(name, type_name)
    }

    /// An optional, nullable, visible definition with default rendering information.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Result<Self, InvalidParameterDefinition> {
        Self::builder(name, type_name).build()
    }

    pub fn name(&self) -> &ParameterName {
        &self.name
    }

    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value_type
    }

    pub fn type_name(&self) -> String {
        self.value_type.to_string()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the parameter is hidden from end users. The rendering information takes precedence
    /// over the flag given at construction.
    pub fn is_hidden(&self) -> bool {
        self.rendering_info.hidden
    }

    /// Description as given by the rendering information.
    pub fn description(&self) -> Option<&str> {
        self.rendering_info.description.as_deref()
    }

    pub fn rendering_info(&self) -> &RenderingInformation {
        &self.rendering_info
    }

    pub fn set_rendering_info(&mut self, rendering_info: RenderingInformation) {
        self.rendering_info = rendering_info;
    }

    pub fn apply_resource_bundle(&mut self, bundle: &ResourceBundle) {
        self.rendering_info.apply_resource_bundle(bundle);
    }

    pub fn constraint(&self) -> &ValueConstraint {
        &self.constraint
    }

    pub fn has_fixed_values(&self) -> bool {
        self.constraint.has_fixed_values()
    }

    /// The allowed values in their declared order, empty for definitions without fixed values.
    pub fn allowed_values(&self) -> &[Value] {
        self.constraint.allowed_values()
            .map(AllowedValues::values)
            .unwrap_or_default()
    }

    /// Replaces the allowed values of a dynamic fixed-values definition.
    ///
    /// Every value is converted to the definition's type. If any value cannot be converted, the
    /// allowed values end up empty, not restored, and the conversion error is returned.
    pub fn set_allowed_values(&mut self, values: Vec<Value>) -> Result<(), InvalidParameterDefinition> {
        match self.constraint {
            ValueConstraint::None => Err(InvalidParameterDefinition::NotFixedValues { name: Clone::clone(&self.name) }),
            ValueConstraint::FixedValues(_) => Err(InvalidParameterDefinition::AllowedValuesImmutable { name: Clone::clone(&self.name) }),
            ValueConstraint::DynamicFixedValues(_) => self.install_allowed_values(values),
        }
    }

    fn install_allowed_values(&mut self, values: Vec<Value>) -> Result<(), InvalidParameterDefinition> {
        self.replace_allowed_values(AllowedValues::uninitialized());

        let converted = values.into_iter()
            .map(|value| self.convert_value(value))
            .collect::<Result<Vec<_>, _>>();

        match converted {
            Ok(converted) => {
                self.replace_allowed_values(AllowedValues::new(converted));
                Ok(())
            }
            Err(cause) => {
                warn!("Allowed values of parameter '{}' could not be converted and are now empty: {cause}", self.name);
                self.replace_allowed_values(AllowedValues::new(Vec::new()));
                Err(InvalidParameterDefinition::new_allowed_value_not_convertible_error(&self.name, cause))
            }
        }
    }

    fn replace_allowed_values(&mut self, allowed_values: AllowedValues) {
        match &mut self.constraint {
            ValueConstraint::None => {}
            ValueConstraint::FixedValues(current)
            | ValueConstraint::DynamicFixedValues(current) => *current = allowed_values,
        }
    }

    /// Absent values are valid if the definition is nullable. Present values must be instances of
    /// the declared type and, for fixed-values definitions, one of the allowed values.
    pub fn is_valid_value(&self, value: Option<&Value>) -> bool {
        match value {
            None => self.nullable,
            Some(value) => self.value_type.is_instance(value) && self.constraint.permits(value),
        }
    }

    /// Converts `value` into the declared type, returning valid values unchanged.
    pub fn convert_object(&self, value: Option<Value>) -> Result<Option<Value>, InvalidParameterValue> {
        match value {
            None if self.nullable => Ok(None),
            None => Err(InvalidParameterValue::NotNullable { name: Clone::clone(&self.name) }),
            Some(value) => self.convert_value(value).map(Some),
        }
    }

    fn convert_value(&self, value: Value) -> Result<Value, InvalidParameterValue> {
        if self.is_valid_value(Some(&value)) {
            return Ok(value);
        }

        let converted = convert::convert_to(&self.name, &self.value_type, value)?;

        if !self.value_type.is_instance(&converted) {
            return Err(InvalidParameterValue::StillNotValid {
                name: Clone::clone(&self.name),
                type_name: self.type_name(),
                value: converted.to_string(),
            });
        }
        if !self.constraint.permits(&converted) {
            return Err(InvalidParameterValue::NotAnAllowedValue {
                name: Clone::clone(&self.name),
                value: converted.to_string(),
            });
        }
        Ok(converted)
    }

    pub fn default_rendering_info(&self) -> Result<RenderingInformation, InvalidParameterDefinition> {
        self.default_rendering_info_with(&RenderingDefaults::default())
    }

    /// Fixed values render as an option list, maps as a multi-line text field, arrays and lists as a
    /// single-line text field and everything else plain. Label, description and hidden flag are taken
    /// from this definition.
    pub fn default_rendering_info_with(&self, defaults: &RenderingDefaults) -> Result<RenderingInformation, InvalidParameterDefinition> {
        let mut rendering_info = if self.has_fixed_values() {
            RenderingInformation::option_list()
        } else if !self.value_type.is_resolved() {
            return Err(InvalidParameterDefinition::UnresolvableType { type_name: self.type_name() });
        } else if self.value_type.is_map() {
            RenderingInformation::text_field(defaults.text_field_width, defaults.map_rows)
        } else if self.value_type.is_collection() {
            RenderingInformation::text_field(defaults.text_field_width, defaults.collection_rows)
        } else {
            RenderingInformation::new()
        };

        rendering_info.label = Some(self.name.to_string());
        rendering_info.description = Clone::clone(&self.description);
        rendering_info.hidden = self.hidden;

        Ok(rendering_info)
    }
}

impl PartialEq for ParameterDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ParameterDefinition {}

impl Hash for ParameterDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamDef: name=[{}]; type=[{}]; required=[{}]; nullable=[{}]; hidden=[{}]; description=[{}]",
            self.name,
            self.value_type,
            self.required,
            self.nullable,
            self.hidden,
            self.description.as_deref().unwrap_or_default(),
        )?;
        if let Some(allowed_values) = self.constraint.allowed_values() {
            let allowed_values = allowed_values.values().iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "; allowed-values=[{allowed_values}]")?;
        }
        Ok(())
    }
}

enum FixedValuesRequest {
    Fixed(Vec<Value>),
    Dynamic(Vec<Value>),
}

/// Builds a [`ParameterDefinition`], see [`ParameterDefinition::builder`].
pub struct ParameterDefinitionBuilder<'a> {
    name: String,
    type_name: String,
    required: bool,
    nullable: bool,
    hidden: bool,
    description: Option<String>,
    rendering_info: Option<RenderingInformation>,
    rendering_defaults: RenderingDefaults,
    registry: &'a TypeRegistry,
    fixed_values: Option<FixedValuesRequest>,
}

impl ParameterDefinitionBuilder<'static> {
    fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
            nullable: true,
            hidden: false,
            description: None,
            rendering_info: None,
            rendering_defaults: RenderingDefaults::default(),
            registry: TypeRegistry::builtin(),
            fixed_values: None,
        }
    }
}

impl<'a> ParameterDefinitionBuilder<'a> {

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rendering information to use instead of the default one.
    pub fn rendering_info(mut self, rendering_info: RenderingInformation) -> Self {
        self.rendering_info = Some(rendering_info);
        self
    }

    pub fn rendering_defaults(mut self, rendering_defaults: RenderingDefaults) -> Self {
        self.rendering_defaults = rendering_defaults;
        self
    }

    /// Resolves the type name with `registry` instead of the built-in one.
    pub fn registry<'b>(self, registry: &'b TypeRegistry) -> ParameterDefinitionBuilder<'b> {
        ParameterDefinitionBuilder {
            name: self.name,
            type_name: self.type_name,
            required: self.required,
            nullable: self.nullable,
            hidden: self.hidden,
            description: self.description,
            rendering_info: self.rendering_info,
            rendering_defaults: self.rendering_defaults,
            registry,
            fixed_values: self.fixed_values,
        }
    }

    /// Restricts values to `values`, which must not be empty and cannot be changed later.
    pub fn fixed_values(mut self, values: impl IntoIterator<Item=Value>) -> Self {
        self.fixed_values = Some(FixedValuesRequest::Fixed(values.into_iter().collect()));
        self
    }

    /// Restricts values to `values`, which may be empty and replaced later.
    pub fn dynamic_fixed_values(mut self, values: impl IntoIterator<Item=Value>) -> Self {
        self.fixed_values = Some(FixedValuesRequest::Dynamic(values.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<ParameterDefinition, InvalidParameterDefinition> {
        let name = ParameterName::try_from(self.name)?;
        let value_type = self.registry.resolve(&self.type_name)?;

        let (constraint, allowed_values) = match self.fixed_values {
            None => (ValueConstraint::None, None),
            Some(request) => {
                if value_type.is_array() {
                    return Err(InvalidParameterDefinition::ArrayTypeNotAllowed { name, type_name: value_type.to_string() });
                }
                match request {
                    FixedValuesRequest::Fixed(values) if values.is_empty() => {
                        return Err(InvalidParameterDefinition::NoAllowedValues { name });
                    }
                    FixedValuesRequest::Fixed(values) => (ValueConstraint::FixedValues(AllowedValues::uninitialized()), Some(values)),
                    FixedValuesRequest::Dynamic(values) => (ValueConstraint::DynamicFixedValues(AllowedValues::uninitialized()), Some(values)),
                }
            }
        };

        let mut definition = ParameterDefinition {
            name,
            value_type,
            required: self.required,
            nullable: self.nullable,
            hidden: self.hidden,
            description: self.description,
            rendering_info: RenderingInformation::default(),
            constraint,
        };

        definition.rendering_info = match self.rendering_info {
            Some(rendering_info) => rendering_info,
            None => definition.default_rendering_info_with(&self.rendering_defaults)?,
        };

        if let Some(values) = allowed_values {
            definition.install_allowed_values(values)?;
        }

        Ok(definition)
    }
}
