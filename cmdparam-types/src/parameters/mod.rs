use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::vec::IntoIter;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::definition::{InvalidParameterDefinition, ParameterDefinition, ParameterName};
use crate::i18n::ResourceBundle;
use crate::parameter::Parameter;
use crate::value::Value;

mod error;
mod view;

pub use error::ParametersError;
pub use view::{Partition, Partitioned, ParametersView};

/// Identifies a parameter in a collection, either by its name or by a parameter with the same name.
#[derive(Clone, Copy, Debug)]
pub enum ParameterKey<'a> {
    Name(&'a str),
    Parameter(&'a Parameter),
}

impl<'a> ParameterKey<'a> {

    /// Fails with [`ParametersError::NullReference`] for a parameter without definition.
    pub fn name(self) -> Result<&'a str, ParametersError> {
        match self {
            ParameterKey::Name(name) => Ok(name),
            ParameterKey::Parameter(parameter) => parameter.name()
                .map(ParameterName::as_str)
                .ok_or(ParametersError::NullReference),
        }
    }
}

impl<'a> From<&'a str> for ParameterKey<'a> {
    fn from(value: &'a str) -> Self {
        ParameterKey::Name(value)
    }
}

impl<'a> From<&'a String> for ParameterKey<'a> {
    fn from(value: &'a String) -> Self {
        ParameterKey::Name(value.as_str())
    }
}

impl<'a> From<&'a ParameterName> for ParameterKey<'a> {
    fn from(value: &'a ParameterName) -> Self {
        ParameterKey::Name(value.as_str())
    }
}

impl<'a> From<&'a Parameter> for ParameterKey<'a> {
    fn from(value: &'a Parameter) -> Self {
        ParameterKey::Parameter(value)
    }
}

/// An ordered collection of [`Parameter`]s with unique names.
///
/// Iteration yields parameters in the order they were last added. Every collection can be split
/// into a public and a hidden partition, see [`Parameters::public_parameters`].
pub trait Parameters {

    fn get_parameter(&self, name: &str) -> Option<&Parameter>;

    fn get_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter>;

    fn get_parameter_definition(&self, name: &str) -> Result<&ParameterDefinition, InvalidParameterDefinition> {
        self.get_parameter(name)
            .and_then(Parameter::definition)
            .ok_or_else(|| InvalidParameterDefinition::new_no_such_parameter_error(name))
    }

    fn get_parameter_value(&self, name: &str) -> Result<Option<&Value>, InvalidParameterDefinition> {
        self.get_parameter(name)
            .map(Parameter::value)
            .ok_or_else(|| InvalidParameterDefinition::new_no_such_parameter_error(name))
    }

    fn set_parameter_value(&mut self, name: &str, value: Option<Value>) -> Result<(), InvalidParameterDefinition> {
        let parameter = self.get_parameter_mut(name)
            .ok_or_else(|| InvalidParameterDefinition::new_no_such_parameter_error(name))?;
        parameter.set_value(value);
        Ok(())
    }

    /// Parameters which are not hidden.
    fn public_parameters(&mut self) -> Partitioned<'_>;

    /// Parameters which are hidden.
    fn internal_parameters(&mut self) -> Partitioned<'_>;

    /// Adds `parameter`, replacing and returning a parameter with the same name.
    ///
    /// The added parameter is ordered last, even if it replaced another one.
    fn add(&mut self, parameter: Parameter) -> Result<Option<Parameter>, ParametersError>;

    fn contains<'k>(&self, key: impl Into<ParameterKey<'k>>) -> Result<bool, ParametersError> {
        let name = key.into().name()?;
        Ok(self.get_parameter(name).is_some())
    }

    fn remove<'k>(&mut self, key: impl Into<ParameterKey<'k>>) -> Result<Option<Parameter>, ParametersError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Parameters in the order they were last added.
    fn iter(&self) -> IntoIter<&Parameter>;

    fn to_vec(&self) -> Vec<Parameter> {
        self.iter()
            .cloned()
            .collect()
    }

    /// Returns `true` if any parameter was added.
    fn add_all(&mut self, parameters: impl IntoIterator<Item=Parameter>) -> Result<bool, ParametersError> {
        let mut changed = false;
        for parameter in parameters {
            self.add(parameter)?;
            changed = true;
        }
        Ok(changed)
    }

    fn contains_all<'k, K: Into<ParameterKey<'k>>>(&self, keys: impl IntoIterator<Item=K>) -> Result<bool, ParametersError> {
        let mut contains_all = true;
        for key in keys {
            contains_all &= self.contains(key)?;
        }
        Ok(contains_all)
    }

    /// Returns `true` if any parameter was removed.
    fn remove_all<'k, K: Into<ParameterKey<'k>>>(&mut self, keys: impl IntoIterator<Item=K>) -> Result<bool, ParametersError> {
        let mut changed = false;
        for key in keys {
            changed |= self.remove(key)?.is_some();
        }
        Ok(changed)
    }

    /// Removes every parameter whose name is not among `keys`. Returns `true` if any parameter was removed.
    fn retain_all<'k, K: Into<ParameterKey<'k>>>(&mut self, keys: impl IntoIterator<Item=K>) -> Result<bool, ParametersError> {
        let retained = keys.into_iter()
            .map(|key| key.into().name())
            .collect::<Result<HashSet<_>, _>>()?;

        let removable = self.iter()
            .filter_map(Parameter::name)
            .filter(|name| !retained.contains(name.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        for name in &removable {
            self.remove(name)?;
        }
        Ok(!removable.is_empty())
    }

    /// Resolves the label and description keys of every parameter's rendering information.
    fn apply_resource_bundle_to_parameter_rendering_information(&mut self, bundle: &ResourceBundle) {
        let names = self.iter()
            .filter_map(Parameter::name)
            .cloned()
            .collect::<Vec<_>>();

        for name in names {
            if let Some(definition) = self.get_parameter_mut(name.as_str()).and_then(Parameter::definition_mut) {
                definition.apply_resource_bundle(bundle);
            }
        }
    }

    /// Names of the parameters whose value is invalid, or which are required but have no value.
    fn validate_all(&self) -> Vec<ParameterName> {
        self.iter()
            .filter(|parameter| {
                let required = parameter.definition().map_or(false, ParameterDefinition::is_required);
                !parameter.validate() || (required && parameter.value().is_none())
            })
            .filter_map(Parameter::name)
            .cloned()
            .collect()
    }
}

/// Key of the backing map. Equality and hash use the name only; the index orders iteration.
#[derive(Clone, Debug)]
struct ParameterNameIndex {
    name: ParameterName,
    index: usize,
}

impl PartialEq for ParameterNameIndex {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ParameterNameIndex {}

impl Hash for ParameterNameIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.as_str().hash(state);
    }
}

impl Borrow<str> for ParameterNameIndex {
    fn borrow(&self) -> &str {
        self.name.as_str()
    }
}

/// The backing store of a parameter collection.
///
/// Not thread-safe. Views borrow the store mutably, so a store and its views are always
/// accessed through the same owner.
#[derive(Clone, Debug, Default)]
pub struct ParametersImpl {
    parameters: HashMap<ParameterNameIndex, Parameter>,
    next_index: usize,
}

impl ParametersImpl {

    pub fn new() -> Self {
        Default::default()
    }

    /// Copies every parameter of `original`, keeping its order and dirty flags.
    pub fn from_parameters(original: &impl Parameters) -> Self {
        let mut parameters = Self::new();
        for parameter in original.iter() {
            if let Some(name) = parameter.name() {
                parameters.insert(Clone::clone(name), Clone::clone(parameter));
            }
        }
        parameters
    }

    fn insert(&mut self, name: ParameterName, parameter: Parameter) -> Option<Parameter> {
        let index = self.next_index;
        self.next_index += 1;
        // `HashMap::insert` keeps an existing key, which would keep the old index.
        let previous = self.parameters.remove(name.as_str());
        self.parameters.insert(ParameterNameIndex { name, index }, parameter);
        previous
    }

    pub(crate) fn remove_by_name(&mut self, name: &str) -> Option<Parameter> {
        self.parameters.remove(name)
    }

    fn sorted_entries(&self) -> Vec<(&ParameterNameIndex, &Parameter)> {
        let mut entries = self.parameters.iter().collect::<Vec<_>>();
        entries.sort_by_key(|(key, _)| key.index);
        entries
    }
}

impl Parameters for ParametersImpl {

    fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    fn get_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.get_mut(name)
    }

    fn public_parameters(&mut self) -> Partitioned<'_> {
        Partitioned::View(ParametersView::new(self, Partition::Public))
    }

    fn internal_parameters(&mut self) -> Partitioned<'_> {
        Partitioned::View(ParametersView::new(self, Partition::Hidden))
    }

    fn add(&mut self, parameter: Parameter) -> Result<Option<Parameter>, ParametersError> {
        let name = parameter.name()
            .cloned()
            .ok_or(ParametersError::NullReference)?;
        let previous = self.insert(Clone::clone(&name), parameter);
        if previous.is_some() {
            debug!("Replaced parameter '{name}'.");
        }
        Ok(previous)
    }

    fn remove<'k>(&mut self, key: impl Into<ParameterKey<'k>>) -> Result<Option<Parameter>, ParametersError> {
        let name = key.into().name()?;
        Ok(self.remove_by_name(name))
    }

    fn len(&self) -> usize {
        self.parameters.len()
    }

    fn clear(&mut self) {
        self.parameters.clear();
        self.next_index = 0;
    }

    fn iter(&self) -> IntoIter<&Parameter> {
        self.sorted_entries().into_iter()
            .map(|(_, parameter)| parameter)
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Equal if both contain pairwise equal parameters under the same names, regardless of order.
impl PartialEq for ParametersImpl {
    fn eq(&self, other: &Self) -> bool {
        self.parameters.len() == other.parameters.len()
            && self.parameters.iter().all(|(key, parameter)| {
                other.parameters.get(key.name.as_str()) == Some(parameter)
            })
    }
}

impl Eq for ParametersImpl {}

impl Hash for ParametersImpl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.parameters.iter()
            .map(|(key, parameter)| {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                parameter.hash(&mut hasher);
                hasher.finish()
            })
            .fold(0u64, u64::wrapping_add);
        state.write_u64(combined);
    }
}

/// `{name=parameter, ...}` in iteration order.
impl fmt::Display for ParametersImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.iter()
            .filter_map(|parameter| parameter.name().map(|name| format!("{name}={parameter}")))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{entries}}}")
    }
}

impl Serialize for ParametersImpl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ParametersImpl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut parameters = ParametersImpl::new();
        for parameter in Vec::<Parameter>::deserialize(deserializer)? {
            parameters.add(parameter).map_err(D::Error::custom)?;
        }
        Ok(parameters)
    }
}

impl TryFrom<Vec<Parameter>> for ParametersImpl {
    type Error = ParametersError;

    fn try_from(value: Vec<Parameter>) -> Result<Self, Self::Error> {
        let mut parameters = ParametersImpl::new();
        parameters.add_all(value)?;
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::{fixture, rstest};

    use crate::rendering::RenderingInformation;

    use super::*;

    fn parameter(name: &str, hidden: bool) -> Parameter {
        let definition = ParameterDefinition::builder(name, "string")
            .hidden(hidden)
            .build()
            .expect("valid definition");
        Parameter::new(definition, Some(Value::from(name)))
    }

    fn names(parameters: &impl Parameters) -> Vec<String> {
        parameters.iter()
            .filter_map(Parameter::name)
            .map(ToString::to_string)
            .collect()
    }

    #[fixture]
    fn parameters() -> ParametersImpl {
        let mut parameters = ParametersImpl::new();
        parameters.add_all([
            parameter("host", false),
            parameter("token", true),
            parameter("port", false),
            parameter("session", true),
            parameter("user", false),
        ]).expect("parameters with definition");
        parameters
    }

    #[rstest]
    fn should_iterate_in_insertion_order(parameters: ParametersImpl) -> Result<()> {
        assert_that!(names(&parameters), eq(vec!["host", "token", "port", "session", "user"]));
        Ok(())
    }

    #[test]
    fn re_adding_a_name_should_move_it_to_the_end() -> Result<()> {
        let mut parameters = ParametersImpl::new();
        parameters.add_all([parameter("b", false), parameter("a", false), parameter("c", false)])?;

        let previous = parameters.add(parameter("a", true))?;

        assert_that!(previous.as_ref().and_then(Parameter::name), some(eq("a")));
        assert_that!(names(&parameters), eq(vec!["b", "c", "a"]));
        assert_that!(parameters.len(), eq(3));
        assert_that!(parameters.get_parameter("a").map(Parameter::is_hidden), some(eq(true)));
        Ok(())
    }

    #[rstest]
    fn should_identify_parameters_by_name(parameters: ParametersImpl) -> Result<()> {
        let other_port = Parameter::new(ParameterDefinition::new("port", "integer")?, None);

        assert_that!(parameters.contains("port"), ok(eq(true)));
        assert_that!(parameters.contains(&other_port), ok(eq(true)));
        assert_that!(parameters.contains("missing"), ok(eq(false)));
        assert_that!(parameters.contains(&Parameter::without_definition(None)), err(eq(ParametersError::NullReference)));
        Ok(())
    }

    #[test]
    fn should_reject_parameters_without_definition() -> Result<()> {
        let mut parameters = ParametersImpl::new();

        assert_that!(parameters.add(Parameter::without_definition(Some(Value::from(1)))), err(eq(ParametersError::NullReference)));
        assert_that!(parameters.is_empty(), eq(true));
        Ok(())
    }

    #[rstest]
    fn should_get_and_set_values_by_name(mut parameters: ParametersImpl) -> Result<()> {
        parameters.set_parameter_value("port", Some(Value::Integer(22)))?;

        assert_that!(parameters.get_parameter_value("port")?, some(eq(&Value::Integer(22))));
        assert_that!(parameters.get_parameter("port").map(Parameter::is_dirty), some(eq(true)));
        assert_that!(parameters.get_parameter_definition("port")?.name(), eq("port"));
        assert_that!(
            parameters.set_parameter_value("missing", None),
            err(eq(InvalidParameterDefinition::NoSuchParameter { name: String::from("missing") }))
        );
        assert_that!(parameters.get_parameter_value("missing"), err(anything()));
        Ok(())
    }

    #[rstest]
    fn should_remove_by_name_or_parameter(mut parameters: ParametersImpl) -> Result<()> {
        let removed = parameters.remove("host")?;
        let user = parameter("user", false);

        assert_that!(removed.as_ref().and_then(Parameter::name), some(eq("host")));
        assert_that!(parameters.remove(&user)?, some(anything()));
        assert_that!(parameters.remove("host")?, none());
        assert_that!(names(&parameters), eq(vec!["token", "port", "session"]));
        Ok(())
    }

    #[rstest]
    fn bulk_operations_should_report_changes(mut parameters: ParametersImpl) -> Result<()> {
        assert_that!(parameters.contains_all(["host", "port"]), ok(eq(true)));
        assert_that!(parameters.contains_all(["host", "missing"]), ok(eq(false)));
        assert_that!(parameters.remove_all(["missing"]), ok(eq(false)));
        assert_that!(parameters.remove_all(["host", "missing"]), ok(eq(true)));
        assert_that!(parameters.add_all(Vec::new()), ok(eq(false)));
        Ok(())
    }

    #[rstest]
    fn retain_all_should_intersect_by_name(mut parameters: ParametersImpl) -> Result<()> {
        let changed = parameters.retain_all(["port", "user", "missing"])?;

        assert_that!(changed, eq(true));
        assert_that!(names(&parameters), eq(vec!["port", "user"]));
        assert_that!(parameters.retain_all(["port", "user"]), ok(eq(false)));
        Ok(())
    }

    #[rstest]
    fn clear_should_restart_the_order(mut parameters: ParametersImpl) -> Result<()> {
        parameters.clear();
        parameters.add(parameter("z", false))?;

        assert_that!(names(&parameters), eq(vec!["z"]));
        Ok(())
    }

    #[rstest]
    fn copies_should_be_equal_and_independent(parameters: ParametersImpl) -> Result<()> {
        let mut copy = ParametersImpl::from_parameters(&parameters);

        assert_that!(copy, eq(Clone::clone(&parameters)));
        assert_that!(names(&copy), eq(names(&parameters)));

        copy.set_parameter_value("host", Some(Value::from("example.com")))?;

        assert_that!(copy, not(eq(Clone::clone(&parameters))));
        assert_that!(parameters.get_parameter("host").map(Parameter::is_dirty), some(eq(false)));
        Ok(())
    }

    #[rstest]
    fn should_display_parameters_in_order(parameters: ParametersImpl) -> Result<()> {
        let display = parameters.to_string();

        assert_that!(display, starts_with("{host=Parameter: definition=[ParamDef: name=[host]"));
        assert_that!(display, contains_substring("dirty=[false], token=Parameter: "));
        assert_that!(display, ends_with("dirty=[false]}"));
        assert_that!(ParametersImpl::new().to_string(), eq("{}"));
        Ok(())
    }

    #[test]
    fn building_from_parameters_without_definition_should_fail() -> Result<()> {
        let result = ParametersImpl::try_from(vec![parameter("host", false), Parameter::without_definition(Some(Value::from(1)))]);

        assert_that!(result, err(eq(ParametersError::NullReference)));
        Ok(())
    }

    #[test]
    fn equality_and_hash_should_not_depend_on_order() -> Result<()> {
        let forward = ParametersImpl::try_from(vec![parameter("a", false), parameter("b", true)])?;
        let backward = ParametersImpl::try_from(vec![parameter("b", true), parameter("a", false)])?;

        let hash_of = |parameters: &ParametersImpl| {
            let mut hasher = DefaultHasher::new();
            parameters.hash(&mut hasher);
            hasher.finish()
        };

        assert_that!(forward, eq(Clone::clone(&backward)));
        assert_that!(hash_of(&forward), eq(hash_of(&backward)));
        Ok(())
    }

    #[rstest]
    fn should_roundtrip_in_order_through_json(parameters: ParametersImpl) -> Result<()> {
        let json = serde_json::to_string(&parameters)?;
        let decoded = serde_json::from_str::<ParametersImpl>(&json)?;

        assert_that!(names(&decoded), eq(names(&parameters)));
        assert_that!(decoded, eq(parameters));
        Ok(())
    }

    #[test]
    fn should_apply_resource_bundle_to_all_parameters() -> Result<()> {
        let definition = ParameterDefinition::builder("port", "integer")
            .rendering_info(RenderingInformation::text_field(5, 1).with_label_key("port.label"))
            .build()?;
        let mut parameters = ParametersImpl::try_from(vec![Parameter::new(definition, None), parameter("host", false)])?;

        parameters.apply_resource_bundle_to_parameter_rendering_information(&ResourceBundle::from_iter([("port.label", "Port")]));

        let label = parameters.get_parameter_definition("port")?.rendering_info().label.clone();
        assert_that!(label, some(eq("Port")));
        Ok(())
    }

    #[test]
    fn validate_all_should_report_invalid_and_missing_parameters() -> Result<()> {
        let mut parameters = ParametersImpl::new();
        parameters.add_all([
            Parameter::new(ParameterDefinition::builder("required", "string").required(true).build()?, None),
            Parameter::new(ParameterDefinition::new("invalid", "integer")?, Some(Value::from("x"))),
            Parameter::new(ParameterDefinition::new("valid", "integer")?, Some(Value::Integer(1))),
            Parameter::new(ParameterDefinition::builder("strict", "integer").nullable(false).build()?, None),
        ])?;

        assert_that!(
            parameters.validate_all().iter().map(ToString::to_string).collect::<Vec<_>>(),
            eq(vec!["required", "invalid", "strict"])
        );
        Ok(())
    }

    mod views {
        use super::*;

        #[rstest]
        fn should_partition_by_hidden_flag(mut parameters: ParametersImpl) -> Result<()> {
            assert_that!(names(&parameters.public_parameters()), eq(vec!["host", "port", "user"]));
            assert_that!(parameters.public_parameters().len(), eq(3));
            assert_that!(parameters.internal_parameters().len(), eq(2));
            Ok(())
        }

        #[rstest]
        fn should_reject_parameters_of_the_other_partition(mut parameters: ParametersImpl) -> Result<()> {
            let result = parameters.public_parameters().add(parameter("secret", true));

            assert_that!(result, err(eq(ParametersError::IllegalArgument {
                name: ParameterName::try_from("secret")?,
                expected: Partition::Public,
                actual: Partition::Hidden,
            })));
            assert_that!(parameters.contains("secret"), ok(eq(false)));
            Ok(())
        }

        #[rstest]
        fn should_write_through_to_the_collection(mut parameters: ParametersImpl) -> Result<()> {
            {
                let mut internal = parameters.internal_parameters();
                internal.add(parameter("key", true))?;
                internal.set_parameter_value("token", Some(Value::from("abc")))?;
                assert_that!(internal.remove("host")?, none());
                assert_that!(internal.remove("session")?, some(anything()));
            }

            assert_that!(names(&parameters), eq(vec!["host", "token", "port", "user", "key"]));
            assert_that!(parameters.get_parameter_value("token")?, some(eq(&Value::from("abc"))));
            Ok(())
        }

        #[rstest]
        fn should_hide_parameters_of_the_other_partition(mut parameters: ParametersImpl) -> Result<()> {
            let mut public = parameters.public_parameters();

            assert_that!(public.get_parameter("token"), none());
            assert_that!(public.get_parameter_mut("token"), none());
            assert_that!(public.contains("token"), ok(eq(false)));
            assert_that!(public.get_parameter_definition("token"), err(anything()));
            Ok(())
        }

        #[rstest]
        fn clear_should_only_remove_the_own_partition(mut parameters: ParametersImpl) -> Result<()> {
            parameters.public_parameters().clear();

            assert_that!(names(&parameters), eq(vec!["token", "session"]));
            Ok(())
        }

        #[rstest]
        fn asking_a_view_for_its_own_partition_should_yield_a_live_view(mut parameters: ParametersImpl) -> Result<()> {
            let mut public = parameters.public_parameters();
            {
                let mut same = public.public_parameters();
                assert_that!(same.is_detached(), eq(false));
                same.add(parameter("added", false))?;
            }

            assert_that!(public.contains("added"), ok(eq(true)));
            assert_that!(parameters.contains("added"), ok(eq(true)));
            Ok(())
        }

        #[rstest]
        fn asking_a_view_for_the_other_partition_should_yield_a_detached_collection(mut parameters: ParametersImpl) -> Result<()> {
            let mut public = parameters.public_parameters();
            {
                let mut other = public.internal_parameters();
                assert_that!(other.is_detached(), eq(true));
                assert_that!(other.is_empty(), eq(true));
                other.add(parameter("detached", true))?;
            }

            assert_that!(public.len(), eq(3));
            assert_that!(parameters.contains("detached"), ok(eq(false)));
            Ok(())
        }

        #[rstest]
        fn retain_all_through_a_view_should_keep_the_other_partition(mut parameters: ParametersImpl) -> Result<()> {
            let changed = parameters.internal_parameters().retain_all(["token"])?;

            assert_that!(changed, eq(true));
            assert_that!(names(&parameters), eq(vec!["host", "token", "port", "user"]));
            Ok(())
        }
    }
}
