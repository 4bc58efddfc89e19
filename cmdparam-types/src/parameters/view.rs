use std::fmt;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};

use crate::definition::ParameterName;
use crate::parameter::Parameter;
use crate::parameters::{ParameterKey, Parameters, ParametersError, ParametersImpl};

/// The two halves of a parameter collection, decided by each definition's hidden flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partition {
    /// Parameters an end user is asked for.
    Public,
    /// Parameters supplied internally.
    Hidden,
}

impl Partition {
    pub fn of(parameter: &Parameter) -> Partition {
        if parameter.is_hidden() {
            Partition::Hidden
        } else {
            Partition::Public
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Public => write!(f, "public"),
            Partition::Hidden => write!(f, "hidden"),
        }
    }
}

/// A live view onto one [`Partition`] of a [`ParametersImpl`].
///
/// Reads only see parameters of the view's partition. Writes go to the underlying collection,
/// there is no copy.
#[derive(Debug)]
pub struct ParametersView<'a> {
    parent: &'a mut ParametersImpl,
    partition: Partition,
}

impl<'a> ParametersView<'a> {

    pub(crate) fn new(parent: &'a mut ParametersImpl, partition: Partition) -> Self {
        Self { parent, partition }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    fn admits(&self, parameter: &Parameter) -> bool {
        Partition::of(parameter) == self.partition
    }

    /// The same partition yields this view again, the opposite one an empty, detached collection.
    fn partitioned(&mut self, partition: Partition) -> Partitioned<'_> {
        if partition == self.partition {
            Partitioned::View(ParametersView::new(&mut *self.parent, partition))
        } else {
            Partitioned::Detached(ParametersImpl::new())
        }
    }

    fn admitted_names(&self) -> Vec<ParameterName> {
        self.iter()
            .filter_map(Parameter::name)
            .cloned()
            .collect()
    }
}

impl Parameters for ParametersView<'_> {

    fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parent.get_parameter(name)
            .filter(|parameter| self.admits(parameter))
    }

    fn get_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        let partition = self.partition;
        self.parent.get_parameter_mut(name)
            .filter(|parameter| Partition::of(parameter) == partition)
    }

    fn public_parameters(&mut self) -> Partitioned<'_> {
        self.partitioned(Partition::Public)
    }

    fn internal_parameters(&mut self) -> Partitioned<'_> {
        self.partitioned(Partition::Hidden)
    }

    fn add(&mut self, parameter: Parameter) -> Result<Option<Parameter>, ParametersError> {
        let name = parameter.name()
            .ok_or(ParametersError::NullReference)?;
        let actual = Partition::of(&parameter);
        if actual != self.partition {
            return Err(ParametersError::IllegalArgument {
                name: Clone::clone(name),
                expected: self.partition,
                actual,
            });
        }
        self.parent.add(parameter)
    }

    fn remove<'k>(&mut self, key: impl Into<ParameterKey<'k>>) -> Result<Option<Parameter>, ParametersError> {
        let name = key.into().name()?;
        if self.get_parameter(name).is_some() {
            Ok(self.parent.remove_by_name(name))
        } else {
            Ok(None)
        }
    }

    fn len(&self) -> usize {
        self.parent.iter()
            .filter(|parameter| self.admits(parameter))
            .count()
    }

    fn clear(&mut self) {
        for name in self.admitted_names() {
            self.parent.remove_by_name(name.as_str());
        }
    }

    fn iter(&self) -> IntoIter<&Parameter> {
        self.parent.iter()
            .filter(|parameter| self.admits(parameter))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// The result of asking a collection for one of its partitions.
///
/// Asking a view for its own partition yields a [`ParametersView`] again; asking it for the opposite
/// partition yields an empty [`ParametersImpl`] which is not connected to anything.
#[derive(Debug)]
pub enum Partitioned<'a> {
    View(ParametersView<'a>),
    Detached(ParametersImpl),
}

impl Partitioned<'_> {
    pub fn is_detached(&self) -> bool {
        matches!(self, Partitioned::Detached(_))
    }
}

macro_rules! delegate {
    ($self:ident, $parameters:ident => $call:expr) => {
        match $self {
            Partitioned::View($parameters) => $call,
            Partitioned::Detached($parameters) => $call,
        }
    };
}

impl Parameters for Partitioned<'_> {

    fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        delegate!(self, parameters => parameters.get_parameter(name))
    }

    fn get_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        delegate!(self, parameters => parameters.get_parameter_mut(name))
    }

    fn public_parameters(&mut self) -> Partitioned<'_> {
        delegate!(self, parameters => parameters.public_parameters())
    }

    fn internal_parameters(&mut self) -> Partitioned<'_> {
        delegate!(self, parameters => parameters.internal_parameters())
    }

    fn add(&mut self, parameter: Parameter) -> Result<Option<Parameter>, ParametersError> {
        delegate!(self, parameters => parameters.add(parameter))
    }

    fn remove<'k>(&mut self, key: impl Into<ParameterKey<'k>>) -> Result<Option<Parameter>, ParametersError> {
        let key = key.into();
        delegate!(self, parameters => parameters.remove(key))
    }

    fn len(&self) -> usize {
        delegate!(self, parameters => parameters.len())
    }

    fn clear(&mut self) {
        delegate!(self, parameters => parameters.clear())
    }

    fn iter(&self) -> IntoIter<&Parameter> {
        delegate!(self, parameters => parameters.iter())
    }
}
