use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::definition::{InvalidParameterValue, ParameterDefinition, ParameterName};
use crate::value::Value;

/// A value cell, optionally described by a [`ParameterDefinition`].
///
/// Setting a value marks the parameter dirty. Values are not validated when set, use
/// [`Parameter::validate`] or [`Parameter::convert`] for that.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameter {
    definition: Option<ParameterDefinition>,
    value: Option<Value>,
    dirty: bool,
}

impl Parameter {

    pub fn new(definition: ParameterDefinition, value: Option<Value>) -> Self {
        Self {
            definition: Some(definition),
            value,
            dirty: false,
        }
    }

    /// A parameter whose value has no known shape.
    pub fn without_definition(value: Option<Value>) -> Self {
        Self {
            definition: None,
            value,
            dirty: false,
        }
    }

    pub fn name(&self) -> Option<&ParameterName> {
        self.definition.as_ref().map(ParameterDefinition::name)
    }

    pub fn definition(&self) -> Option<&ParameterDefinition> {
        self.definition.as_ref()
    }

    pub fn definition_mut(&mut self) -> Option<&mut ParameterDefinition> {
        self.definition.as_mut()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
        self.dirty = true;
    }

    /// `true` once a value has been set. Never reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_hidden(&self) -> bool {
        self.definition.as_ref()
            .map_or(false, ParameterDefinition::is_hidden)
    }

    /// Validates the value against the definition. Without a definition every value is valid.
    pub fn validate(&self) -> bool {
        self.definition.as_ref()
            .map_or(true, |definition| definition.is_valid_value(self.value.as_ref()))
    }

    /// Converts the value into the type of the definition. A changed value marks the parameter dirty.
    pub fn convert(&mut self) -> Result<(), InvalidParameterValue> {
        if let Some(definition) = &self.definition {
            let converted = definition.convert_object(Clone::clone(&self.value))?;
            if converted != self.value {
                self.set_value(converted);
            }
        }
        Ok(())
    }

    /// Formats the parameter for diagnostics. Without `show_value` only the type of the value is shown.
    pub fn to_string_with(&self, show_value: bool) -> String {
        let definition = self.definition.as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let value = match (&self.value, show_value) {
            (Some(value), true) => value.to_string(),
            (Some(value), false) => format!("<{}>", value.value_type()),
            (None, _) => String::from("<none>"),
        };
        format!("Parameter: definition=[{definition}]; value=[{value}]; dirty=[{}]", self.dirty)
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.definition == other.definition
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.definition.hash(state);
    }
}

/// Redacts the value if the rendering information marks it as obscured.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let obscured = self.definition.as_ref()
            .map_or(false, |definition| definition.rendering_info().obscured);
        write!(f, "{}", self.to_string_with(!obscured))
    }
}
