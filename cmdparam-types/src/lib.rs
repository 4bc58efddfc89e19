//! Schema-driven command parameters.
//!
//! A [`ParameterDefinition`] describes the name, type and constraints of a parameter and knows
//! how to validate and convert values for it. [`Parameter`]s pair a definition with a value, and
//! [`ParametersImpl`] keeps them in an ordered collection which can be viewed by partition, see
//! [`Parameters::public_parameters`].
//!
//! [`ParameterDefinition`]: definition::ParameterDefinition
//! [`Parameter`]: parameter::Parameter
//! [`ParametersImpl`]: parameters::ParametersImpl
//! [`Parameters::public_parameters`]: parameters::Parameters::public_parameters

pub mod definition;
pub mod i18n;
pub mod parameter;
pub mod parameters;
pub mod rendering;
pub mod types;
pub mod value;
