use tracing::trace;

use crate::definition::{InvalidParameterValue, ParameterName};
use crate::types::{ScalarType, TypeDescriptor};
use crate::value::Value;

/// Characters which, when leading a string, are used as the delimiter of its tokens.
pub const DELIMITERS: &str = ",.;:|/!#$%^&*-_+= \t\n\r";

pub const DEFAULT_DELIMITER: char = ',';

/// Splits the string form of an array into its tokens.
///
/// The delimiter is the first character, if it is one of [`DELIMITERS`], otherwise [`DEFAULT_DELIMITER`].
/// Empty tokens are dropped.
pub fn tokenize(source: &str) -> Vec<String> {
    let delimiter = match source.chars().next() {
        Some(first) if DELIMITERS.contains(first) => first,
        Some(_) => DEFAULT_DELIMITER,
        None => return Vec::new(),
    };
    source.split(delimiter)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Converts `value` into an instance of `target`, or returns it unchanged if it already is one.
pub(crate) fn convert_to(name: &ParameterName, target: &TypeDescriptor, value: Value) -> Result<Value, InvalidParameterValue> {
    if target.is_instance(&value) {
        return Ok(value);
    }
    trace!("Converting '{value}' to type '{target}' for parameter '{name}'.");

    match target {
        TypeDescriptor::Object => Ok(value),
        TypeDescriptor::Unresolved(type_name) => Err(InvalidParameterValue::UnresolvableType {
            name: Clone::clone(name),
            type_name: Clone::clone(type_name),
        }),
        TypeDescriptor::Primitive(_) => Err(InvalidParameterValue::CannotConvertToPrimitive {
            name: Clone::clone(name),
            type_name: target.to_string(),
            value: value.to_string(),
        }),
        TypeDescriptor::Array(element_type) => {
            let items = elements_of(value).into_iter()
                .map(|item| convert_to(name, element_type, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(Clone::clone(element_type.as_ref()), items))
        }
        TypeDescriptor::List => Ok(Value::List(elements_of(value))),
        TypeDescriptor::Map => Err(no_compatible_constructor(name, target, &value)),
        TypeDescriptor::Scalar(scalar) => construct(name, *scalar, value),
    }
}

fn elements_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(array) => array.items,
        Value::List(items) => items,
        other => tokenize(&other.to_string()).into_iter()
            .map(Value::String)
            .collect(),
    }
}

/// Tries each accepting constructor in order. The first success wins, otherwise the last failure is reported.
fn construct(name: &ParameterName, target: ScalarType, value: Value) -> Result<Value, InvalidParameterValue> {
    let mut last_failure = None;

    for constructor in target.constructors().iter().filter(|constructor| (constructor.accepts)(&value)) {
        trace!("Trying constructor {} for value '{value}'.", constructor.description);
        match (constructor.construct)(&value) {
            Ok(constructed) => return Ok(constructed),
            Err(cause) => last_failure = Some(cause),
        }
    }

    match last_failure {
        Some(source) => Err(InvalidParameterValue::ConstructionFailed {
            name: Clone::clone(name),
            type_name: target.to_string(),
            value: value.to_string(),
            source,
        }),
        None => Err(no_compatible_constructor(name, &TypeDescriptor::Scalar(target), &value)),
    }
}

fn no_compatible_constructor(name: &ParameterName, target: &TypeDescriptor, value: &Value) -> InvalidParameterValue {
    InvalidParameterValue::NoCompatibleConstructor {
        name: Clone::clone(name),
        type_name: target.to_string(),
        value: value.to_string(),
        value_type: value.value_type().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use googletest::prelude::*;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn name() -> ParameterName {
        ParameterName::try_from("param").expect("valid parameter name")
    }

    #[rstest]
    #[case("|a|b|c", vec!["a", "b", "c"])]
    #[case("a,b,c", vec!["a", "b", "c"])]
    #[case(",a,,b,", vec!["a", "b"])]
    #[case(" a b", vec!["a", "b"])]
    #[case("a|b", vec!["a|b"])]
    #[case("", vec![])]
    fn should_tokenize_by_leading_delimiter(#[case] source: &str, #[case] expected: Vec<&str>) {
        assert_that!(tokenize(source), eq(expected.into_iter().map(String::from).collect::<Vec<_>>()));
    }

    #[rstest]
    fn should_convert_nested_arrays_element_wise(name: ParameterName) -> Result<()> {
        let target = TypeDescriptor::try_from("integer[][]")?;
        let source = Value::List(vec![Value::from("1,2"), Value::from(";3")]);

        let converted = convert_to(&name, &target, source)?;

        let integer = TypeDescriptor::Scalar(ScalarType::Integer);
        assert_that!(converted, eq(Value::array(TypeDescriptor::array_of(Clone::clone(&integer)), [
            Value::array(Clone::clone(&integer), [Value::Integer(1), Value::Integer(2)]),
            Value::array(integer, [Value::Integer(3)]),
        ])));

        Ok(())
    }

    #[rstest]
    fn should_tokenize_non_string_sources_by_their_string_form(name: ParameterName) -> Result<()> {
        let converted = convert_to(&name, &TypeDescriptor::try_from("string[]")?, Value::Integer(42))?;

        assert_that!(converted, eq(Value::string_array(["42"])));

        Ok(())
    }

    #[rstest]
    fn should_keep_list_tokens_as_strings(name: ParameterName) -> Result<()> {
        let converted = convert_to(&name, &TypeDescriptor::List, Value::from("/x/y"))?;

        assert_that!(converted, eq(Value::List(vec![Value::from("x"), Value::from("y")])));

        Ok(())
    }

    #[rstest]
    fn should_only_accept_maps_for_map_types(name: ParameterName) -> Result<()> {
        let map = Value::Map(BTreeMap::new());

        assert_that!(convert_to(&name, &TypeDescriptor::Map, Clone::clone(&map)), ok(eq(map)));
        assert_that!(
            convert_to(&name, &TypeDescriptor::Map, Value::from("a=b")),
            err(matches_pattern!(InvalidParameterValue::NoCompatibleConstructor { name: anything() }))
        );

        Ok(())
    }

    #[rstest]
    fn should_reject_primitive_targets(name: ParameterName) -> Result<()> {
        let result = convert_to(&name, &TypeDescriptor::try_from("int")?, Value::from("1"));

        assert_that!(result, err(matches_pattern!(InvalidParameterValue::CannotConvertToPrimitive { name: anything() })));

        Ok(())
    }

    #[rstest]
    fn should_report_the_last_construction_failure(name: ParameterName) -> Result<()> {
        let result = convert_to(&name, &TypeDescriptor::Scalar(ScalarType::Uuid), Value::from("not-a-uuid"));

        assert_that!(result, err(matches_pattern!(InvalidParameterValue::ConstructionFailed { name: anything() })));

        Ok(())
    }

    #[rstest]
    fn should_fail_closed_for_unresolved_types(name: ParameterName) -> Result<()> {
        let target = TypeDescriptor::Unresolved(String::from("com.example.Missing"));

        assert_that!(
            convert_to(&name, &target, Value::from("x")),
            err(eq(InvalidParameterValue::UnresolvableType { name: Clone::clone(&name), type_name: String::from("com.example.Missing") }))
        );

        Ok(())
    }
}
