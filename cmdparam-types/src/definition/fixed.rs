use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Restricts the values a parameter definition accepts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "allowed_values", rename_all = "kebab-case")]
pub enum ValueConstraint {
    #[default]
    None,
    /// Allowed values are set once, at construction.
    FixedValues(AllowedValues),
    /// Allowed values may be replaced after construction, e.g. when they are discovered at runtime.
    DynamicFixedValues(AllowedValues),
}

impl ValueConstraint {

    pub fn allowed_values(&self) -> Option<&AllowedValues> {
        match self {
            ValueConstraint::None => None,
            ValueConstraint::FixedValues(allowed_values)
            | ValueConstraint::DynamicFixedValues(allowed_values) => Some(allowed_values),
        }
    }

    pub fn has_fixed_values(&self) -> bool {
        !matches!(self, ValueConstraint::None)
    }

    /// `true` if the constraint does not reject `value`.
    ///
    /// Always `true` while the allowed values are being replaced.
    pub fn permits(&self, value: &Value) -> bool {
        self.allowed_values()
            .map_or(true, |allowed_values| allowed_values.permits(value))
    }
}

/// An ordered list of allowed values.
///
/// While the list is being replaced it is *uninitialized* and permits every value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedValues {
    values: Option<Vec<Value>>,
}

impl AllowedValues {

    pub fn new(values: Vec<Value>) -> Self {
        Self { values: Some(values) }
    }

    pub(crate) fn uninitialized() -> Self {
        Self { values: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.values.is_some()
    }

    pub fn values(&self) -> &[Value] {
        self.values.as_deref().unwrap_or_default()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values().contains(value)
    }

    pub fn permits(&self, value: &Value) -> bool {
        !self.is_initialized() || self.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}
