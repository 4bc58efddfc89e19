use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::trace;

use crate::definition::InvalidParameterDefinition;
use crate::types::{ScalarType, TypeDescriptor};

const ARRAY_SUFFIX: &str = "[]";

/// Maps type names onto [`TypeDescriptor`]s.
///
/// The built-in registry knows the canonical names of every supported type. Embedders may
/// clone it and register aliases for their own identifiers, e.g. `java.lang.String`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRegistry {
    names: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {

    pub fn builtin() -> &'static TypeRegistry {
        static BUILTIN: OnceLock<TypeRegistry> = OnceLock::new();
        BUILTIN.get_or_init(TypeRegistry::with_canonical_names)
    }

    fn with_canonical_names() -> Self {
        let mut names = HashMap::new();
        names.insert(String::from("object"), TypeDescriptor::Object);
        names.insert(String::from("list"), TypeDescriptor::List);
        names.insert(String::from("map"), TypeDescriptor::Map);
        for scalar in ScalarType::ALL {
            names.insert(scalar.name().to_owned(), TypeDescriptor::Scalar(scalar));
            if let Some(primitive_name) = scalar.primitive_name() {
                names.insert(primitive_name.to_owned(), TypeDescriptor::Primitive(scalar));
            }
        }
        Self { names }
    }

    /// Makes `alias` resolve to whatever `canonical` resolves to.
    pub fn register_alias(&mut self, alias: impl Into<String>, canonical: &str) -> Result<(), InvalidParameterDefinition> {
        let alias = alias.into();
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(InvalidParameterDefinition::EmptyTypeName);
        }
        let descriptor = self.resolve(canonical)?;
        if !descriptor.is_resolved() {
            return Err(InvalidParameterDefinition::UnresolvableType { type_name: canonical.to_owned() });
        }
        trace!("Registering type alias '{alias}' for '{descriptor}'.");
        self.names.insert(alias.to_owned(), descriptor);
        Ok(())
    }

    /// Resolves a type name. Unknown names resolve to [`TypeDescriptor::Unresolved`].
    pub fn resolve(&self, name: &str) -> Result<TypeDescriptor, InvalidParameterDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidParameterDefinition::EmptyTypeName);
        }
        if let Some(element_name) = name.strip_suffix(ARRAY_SUFFIX) {
            let element_type = self.resolve(element_name)?;
            return Ok(TypeDescriptor::array_of(element_type));
        }
        let descriptor = self.names.get(name)
            .cloned()
            .unwrap_or_else(|| TypeDescriptor::Unresolved(name.to_owned()));
        Ok(descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name)
            .map(|descriptor| descriptor.is_resolved())
            .unwrap_or(false)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::builtin().clone()
    }
}
