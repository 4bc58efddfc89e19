use std::fmt;

use url::Url;
use uuid::Uuid;

use crate::types::ScalarType;
use crate::value::Value;

/// A single-argument conversion into a [`ScalarType`].
///
/// `accepts` is the cheap parameter-type test, `construct` may still fail for an accepted
/// argument (e.g. a string that does not parse).
#[derive(Clone, Copy)]
pub struct Constructor {
    pub description: &'static str,
    pub accepts: fn(&Value) -> bool,
    pub construct: fn(&Value) -> Result<Value, ConstructionError>,
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("description", &self.description)
            .finish()
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Could not parse '{source_text}' as {target}: {cause}")]
    Parse { source_text: String, target: ScalarType, cause: String },
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: ScalarType },
    #[error("Expected a single character, but got '{source_text}'")]
    NotASingleCharacter { source_text: String },
    #[error("Argument {value} is not supported by this constructor")]
    UnsupportedArgument { value: String },
}

impl ConstructionError {
    fn parse(source_text: &str, target: ScalarType, cause: impl fmt::Display) -> Self {
        ConstructionError::Parse { source_text: source_text.to_owned(), target, cause: cause.to_string() }
    }

    fn out_of_range(value: impl fmt::Display, target: ScalarType) -> Self {
        ConstructionError::OutOfRange { value: value.to_string(), target }
    }

    fn unsupported(value: &Value) -> Self {
        ConstructionError::UnsupportedArgument { value: value.to_string() }
    }
}

pub(super) fn constructors_of(target: ScalarType) -> &'static [Constructor] {
    match target {
        ScalarType::Boolean => BOOLEAN,
        ScalarType::Character => CHARACTER,
        ScalarType::Byte => BYTE,
        ScalarType::Short => SHORT,
        ScalarType::Integer => INTEGER,
        ScalarType::Long => LONG,
        ScalarType::Float => FLOAT,
        ScalarType::Double => DOUBLE,
        ScalarType::String => STRING,
        ScalarType::Url => URL,
        ScalarType::Uuid => UUID,
    }
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

fn is_integral(value: &Value) -> bool {
    value.as_integral().is_some()
}

fn is_numeric(value: &Value) -> bool {
    value.as_integral().is_some() || value.as_floating().is_some()
}

fn source_text(value: &Value) -> Result<&str, ConstructionError> {
    value.as_str().ok_or_else(|| ConstructionError::unsupported(value))
}

fn integral(value: &Value) -> Result<i64, ConstructionError> {
    value.as_integral().ok_or_else(|| ConstructionError::unsupported(value))
}

fn floating(value: &Value) -> Result<f64, ConstructionError> {
    match (value.as_floating(), value.as_integral()) {
        (Some(floating), _) => Ok(floating),
        (None, Some(integral)) => Ok(integral as f64),
        (None, None) => Err(ConstructionError::unsupported(value)),
    }
}

const BOOLEAN: &[Constructor] = &[
    Constructor {
        description: "boolean(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            Ok(Value::Boolean(text.eq_ignore_ascii_case("true")))
        },
    },
];

const CHARACTER: &[Constructor] = &[
    Constructor {
        description: "character(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(char), None) => Ok(Value::Character(char)),
                _ => Err(ConstructionError::NotASingleCharacter { source_text: text.to_owned() }),
            }
        },
    },
];

macro_rules! integral_constructors {
    ($table:ident, $scalar:ident, $primitive:ty) => {
        const $table: &[Constructor] = &[
            Constructor {
                description: concat!(stringify!($primitive), "(string)"),
                accepts: is_string,
                construct: |value| {
                    let text = source_text(value)?;
                    text.parse::<$primitive>()
                        .map(Value::$scalar)
                        .map_err(|cause| ConstructionError::parse(text, ScalarType::$scalar, cause))
                },
            },
            Constructor {
                description: concat!(stringify!($primitive), "(integral)"),
                accepts: is_integral,
                construct: |value| {
                    let integral = integral(value)?;
                    <$primitive>::try_from(integral)
                        .map(Value::$scalar)
                        .map_err(|_| ConstructionError::out_of_range(integral, ScalarType::$scalar))
                },
            },
        ];
    };
}

integral_constructors!(BYTE, Byte, i8);
integral_constructors!(SHORT, Short, i16);
integral_constructors!(INTEGER, Integer, i32);
integral_constructors!(LONG, Long, i64);

const FLOAT: &[Constructor] = &[
    Constructor {
        description: "f32(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            text.parse::<f32>()
                .map(Value::Float)
                .map_err(|cause| ConstructionError::parse(text, ScalarType::Float, cause))
        },
    },
    Constructor {
        description: "f32(number)",
        accepts: is_numeric,
        construct: |value| floating(value).map(|floating| Value::Float(floating as f32)),
    },
];

const DOUBLE: &[Constructor] = &[
    Constructor {
        description: "f64(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            text.parse::<f64>()
                .map(Value::Double)
                .map_err(|cause| ConstructionError::parse(text, ScalarType::Double, cause))
        },
    },
    Constructor {
        description: "f64(number)",
        accepts: is_numeric,
        construct: |value| floating(value).map(Value::Double),
    },
];

const STRING: &[Constructor] = &[
    Constructor {
        description: "string(character)",
        accepts: |value| matches!(value, Value::Character(_)),
        construct: |value| match value {
            Value::Character(char) => Ok(Value::String(char.to_string())),
            other => Err(ConstructionError::unsupported(other)),
        },
    },
    Constructor {
        description: "string(character[])",
        accepts: |value| match value {
            Value::Array(array) => array.items.iter().all(|item| matches!(item, Value::Character(_))),
            _ => false,
        },
        construct: |value| {
            let items = value.as_items().ok_or_else(|| ConstructionError::unsupported(value))?;
            items.iter()
                .map(|item| match item {
                    Value::Character(char) => Ok(*char),
                    other => Err(ConstructionError::unsupported(other)),
                })
                .collect::<Result<String, _>>()
                .map(Value::String)
        },
    },
    Constructor {
        description: "string(scalar)",
        accepts: Value::is_scalar,
        construct: |value| Ok(Value::String(value.to_string())),
    },
];

const URL: &[Constructor] = &[
    Constructor {
        description: "url(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            Url::parse(text)
                .map(Value::Url)
                .map_err(|cause| ConstructionError::parse(text, ScalarType::Url, cause))
        },
    },
];

const UUID: &[Constructor] = &[
    Constructor {
        description: "uuid(string)",
        accepts: is_string,
        construct: |value| {
            let text = source_text(value)?;
            Uuid::parse_str(text)
                .map(Value::Uuid)
                .map_err(|cause| ConstructionError::parse(text, ScalarType::Uuid, cause))
        },
    },
];

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn construct(target: ScalarType, value: &Value) -> Option<std::result::Result<Value, ConstructionError>> {
        target.constructors().iter()
            .find(|constructor| (constructor.accepts)(value))
            .map(|constructor| (constructor.construct)(value))
    }

    #[rstest]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("yes", false)]
    #[case("", false)]
    fn should_construct_booleans_leniently(#[case] text: &str, #[case] expected: bool) {
        assert_that!(construct(ScalarType::Boolean, &Value::from(text)), some(ok(eq(Value::Boolean(expected)))));
    }

    #[test]
    fn should_not_trim_integers() -> Result<()> {
        assert_that!(construct(ScalarType::Integer, &Value::from("42")), some(ok(eq(Value::Integer(42)))));
        assert_that!(construct(ScalarType::Integer, &Value::from(" 42")), some(err(anything())));

        Ok(())
    }

    #[test]
    fn should_narrow_integral_values_with_range_checks() -> Result<()> {
        assert_that!(construct(ScalarType::Byte, &Value::Long(12)), some(ok(eq(Value::Byte(12)))));
        assert_that!(
            construct(ScalarType::Byte, &Value::Integer(300)),
            some(err(eq(ConstructionError::OutOfRange { value: String::from("300"), target: ScalarType::Byte })))
        );

        Ok(())
    }

    #[test]
    fn should_widen_numbers_into_floating_point() -> Result<()> {
        assert_that!(construct(ScalarType::Double, &Value::Integer(2)), some(ok(eq(Value::Double(2.0)))));
        assert_that!(construct(ScalarType::Float, &Value::Double(0.5)), some(ok(eq(Value::Float(0.5)))));

        Ok(())
    }

    #[test]
    fn should_build_strings_from_characters() -> Result<()> {
        let chars = Value::array(crate::types::TypeDescriptor::Scalar(ScalarType::Character), [Value::from('h'), Value::from('i')]);

        assert_that!(construct(ScalarType::String, &chars), some(ok(eq(Value::from("hi")))));
        assert_that!(construct(ScalarType::String, &Value::Long(7)), some(ok(eq(Value::from("7")))));

        Ok(())
    }

    #[test]
    fn should_only_accept_single_characters() -> Result<()> {
        assert_that!(construct(ScalarType::Character, &Value::from("x")), some(ok(eq(Value::Character('x')))));
        assert_that!(construct(ScalarType::Character, &Value::from("xy")), some(err(anything())));

        Ok(())
    }

    #[test]
    fn should_have_no_constructor_for_unrelated_sources() -> Result<()> {
        assert_that!(construct(ScalarType::Uuid, &Value::Integer(1)), none());
        assert_that!(construct(ScalarType::Url, &Value::from("https://example.com")), some(ok(anything())));

        Ok(())
    }
}
