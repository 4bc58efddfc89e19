use crate::definition::{InvalidParameterDefinition, ParameterName};
use crate::parameters::Partition;

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ParametersError {
    #[error("Parameter '{name}' is {actual} and cannot be added to the {expected} parameters.")]
    IllegalArgument {
        name: ParameterName,
        expected: Partition,
        actual: Partition,
    },
    #[error("Parameter has no definition and therefore cannot be identified by name.")]
    NullReference,
    #[error(transparent)]
    Definition(#[from] InvalidParameterDefinition),
}
