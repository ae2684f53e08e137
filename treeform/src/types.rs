//! Type names and the type-descriptor registry
//!
//! Rules never inspect Rust types to learn what a collection holds. The
//! declared structure of every type lives in a [`TypeRegistry`] populated up
//! front, and rules look it up by [`TypeName`]. A descriptor plays the part of
//! a class-level annotation; a [`FieldDescriptor`] plays the part of a
//! field-level one.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cheaply cloneable identifier of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub const STRING: &'static str = "string";
    pub const INT: &'static str = "int";
    pub const FLOAT: &'static str = "float";
    pub const BOOL: &'static str = "bool";
    pub const LIST: &'static str = "list";
    pub const SET: &'static str = "set";
    pub const MAP: &'static str = "map";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName(Arc::from(name))
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName(Arc::from(name))
    }
}

impl From<TypeName> for String {
    fn from(name: TypeName) -> Self {
        name.0.to_string()
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// A field of a record type, with its field-level annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeName>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            element_type: None,
            key_type: None,
            value_type: None,
        }
    }

    /// Annotate a collection-typed field with its element type
    pub fn with_element_type(mut self, element_type: impl Into<TypeName>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    /// Annotate a map-typed field with its key and value types
    pub fn with_map_types(
        mut self,
        key_type: impl Into<TypeName>,
        value_type: impl Into<TypeName>,
    ) -> Self {
        self.key_type = Some(key_type.into());
        self.value_type = Some(value_type.into());
        self
    }
}

/// Declared structure of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeDescriptor {
    Scalar,
    Collection {
        #[serde(default)]
        element: Option<TypeName>,
    },
    Map {
        #[serde(default)]
        key: Option<TypeName>,
        #[serde(default)]
        value: Option<TypeName>,
    },
    Record {
        fields: Vec<FieldDescriptor>,
    },
}

/// Registry of type descriptors, keyed by type name
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in scalar and container types
    ///
    /// The built-in containers declare no element, key or value type; those
    /// must come from the caller or a field annotation.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for scalar in [
            TypeName::STRING,
            TypeName::INT,
            TypeName::FLOAT,
            TypeName::BOOL,
        ] {
            registry.register(scalar, TypeDescriptor::Scalar);
        }
        for collection in [TypeName::LIST, TypeName::SET] {
            registry.register(collection, TypeDescriptor::Collection { element: None });
        }
        registry.register(
            TypeName::MAP,
            TypeDescriptor::Map {
                key: None,
                value: None,
            },
        );
        registry
    }

    /// Register a descriptor, replacing any previous one for the same name
    pub fn register(&mut self, name: impl Into<TypeName>, descriptor: TypeDescriptor) {
        self.types.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Element type declared by a collection type, if any
    pub fn element_type_of(&self, name: &str) -> Option<&TypeName> {
        match self.get(name)? {
            TypeDescriptor::Collection { element } => element.as_ref(),
            _ => None,
        }
    }

    /// Key and value types declared by a map type, each if any
    pub fn map_types_of(&self, name: &str) -> (Option<&TypeName>, Option<&TypeName>) {
        match self.get(name) {
            Some(TypeDescriptor::Map { key, value }) => (key.as_ref(), value.as_ref()),
            _ => (None, None),
        }
    }

    /// Fields declared by a record type
    pub fn fields_of(&self, name: &str) -> Option<&[FieldDescriptor]> {
        match self.get(name)? {
            TypeDescriptor::Record { fields } => Some(fields),
            _ => None,
        }
    }

    /// List all registered type names (sorted)
    pub fn list_types(&self) -> Vec<TypeName> {
        let mut names: Vec<_> = self.types.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Extend<(TypeName, TypeDescriptor)> for TypeRegistry {
    fn extend<I: IntoIterator<Item = (TypeName, TypeDescriptor)>>(&mut self, iter: I) {
        self.types.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_declare_no_element_type() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.has("string"));
        assert!(registry.has("list"));
        assert_eq!(registry.element_type_of("list"), None);
        assert_eq!(registry.map_types_of("map"), (None, None));
    }

    #[test]
    fn test_collection_annotation() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "StringList",
            TypeDescriptor::Collection {
                element: Some(TypeName::from("string")),
            },
        );
        assert_eq!(
            registry.element_type_of("StringList"),
            Some(&TypeName::from("string"))
        );
        assert_eq!(registry.element_type_of("missing"), None);
    }

    #[test]
    fn test_record_fields() {
        let mut registry = TypeRegistry::new();
        registry.register(
            "Person",
            TypeDescriptor::Record {
                fields: vec![
                    FieldDescriptor::new("name", "string"),
                    FieldDescriptor::new("tags", "list").with_element_type("string"),
                ],
            },
        );
        let fields = registry.fields_of("Person").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].element_type, Some(TypeName::from("string")));
        assert!(registry.fields_of("string").is_none());
    }

    #[test]
    fn test_descriptor_from_json() {
        let descriptor: TypeDescriptor =
            serde_json::from_str(r#"{"kind": "map", "key": "string", "value": "int"}"#).unwrap();
        assert_eq!(
            descriptor,
            TypeDescriptor::Map {
                key: Some(TypeName::from("string")),
                value: Some(TypeName::from("int")),
            }
        );
    }

    #[test]
    fn test_type_name_compares_with_str() {
        let name = TypeName::from("string");
        assert_eq!(name, "string");
        assert_eq!(name.to_string(), "string");
    }
}
