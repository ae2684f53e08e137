//! Named, typed context values carried by transformation parameters
//!
//! A prerequisite is stored under a string key and addressed through a typed
//! [`PrerequisiteKey`], so a rule asking for the document root gets a
//! `SharedDocument` back or a descriptive error, never a wrong type.
//!
//! Values are reference counted. Copying an entry into a child context clones
//! the handle, not the value, which is what lets shared accumulators (the
//! output document, the identity cache, the variable list) act as write-back
//! channels across the recursion.

use crate::cache::ObjectGraphCache;
use crate::document::Document;
use crate::error::TransformError;
use crate::types::{TypeName, TypeRegistry};
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// Output document shared by every rule of one run
pub type SharedDocument = Rc<RefCell<Document>>;

/// Identity cache shared by every rule of one run
pub type SharedCache = Rc<RefCell<ObjectGraphCache>>;

/// Free-variable accumulator filled while rewriting a token tree
pub type SharedVariables = Rc<RefCell<Vec<String>>>;

/// Typed name of a prerequisite
pub struct PrerequisiteKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PrerequisiteKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for PrerequisiteKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrerequisiteKey<T> {}

impl<T> fmt::Debug for PrerequisiteKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrerequisiteKey({})", self.name)
    }
}

/// Root element every produced node is attached under
pub const DOCUMENT_ROOT: PrerequisiteKey<SharedDocument> = PrerequisiteKey::new("document-root");
/// Identity cache of the current run
pub const OBJECT_CACHE: PrerequisiteKey<SharedCache> = PrerequisiteKey::new("object-cache");
/// Declared structure of every known type
pub const TYPE_REGISTRY: PrerequisiteKey<Arc<TypeRegistry>> = PrerequisiteKey::new("type-registry");
/// Declared element type for the collection being transformed
pub const ELEMENT_TYPE: PrerequisiteKey<TypeName> = PrerequisiteKey::new("element-type");
/// Declared key type for the map being transformed
pub const KEY_TYPE: PrerequisiteKey<TypeName> = PrerequisiteKey::new("key-type");
/// Declared value type for the map being transformed
pub const VALUE_TYPE: PrerequisiteKey<TypeName> = PrerequisiteKey::new("value-type");
/// Variable names referenced by a formula
pub const VARIABLES: PrerequisiteKey<SharedVariables> = PrerequisiteKey::new("variables");

/// Keys that belong to a whole run rather than to one level of it
pub const RUN_SCOPED: &[&str] = &[
    DOCUMENT_ROOT.name,
    OBJECT_CACHE.name,
    TYPE_REGISTRY.name,
    VARIABLES.name,
];

/// Map from prerequisite names to values of arbitrary type
#[derive(Clone, Default)]
pub struct Prerequisites {
    entries: HashMap<&'static str, Rc<dyn Any>>,
}

impl Prerequisites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key
    pub fn insert<T: 'static>(&mut self, key: PrerequisiteKey<T>, value: T) {
        self.entries.insert(key.name, Rc::new(value));
    }

    /// Fetch a value, failing if it was never supplied
    pub fn get<T: 'static>(&self, key: PrerequisiteKey<T>) -> Result<&T, TransformError> {
        self.find(key)?
            .ok_or(TransformError::MissingPrerequisite { key: key.name })
    }

    /// Fetch a value that may legitimately be absent
    pub fn find<T: 'static>(&self, key: PrerequisiteKey<T>) -> Result<Option<&T>, TransformError> {
        match self.entries.get(key.name) {
            None => Ok(None),
            Some(value) => (**value)
                .downcast_ref::<T>()
                .map(Some)
                .ok_or(TransformError::PrerequisiteType {
                    key: key.name,
                    expected: type_name::<T>(),
                }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the named entries present in `self` into `target`
    ///
    /// Names that are absent here are skipped. Entries already in `target`
    /// under the same name are overwritten.
    pub fn transfer_to(&self, target: &mut Prerequisites, names: &[&str]) {
        for name in names {
            if let Some((key, value)) = self.entries.get_key_value(*name) {
                target.entries.insert(*key, Rc::clone(value));
            }
        }
    }
}

impl fmt::Debug for Prerequisites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prerequisite_names_key() {
        let prerequisites = Prerequisites::new();
        let err = prerequisites.get(DOCUMENT_ROOT).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingPrerequisite {
                key: "document-root"
            }
        );
    }

    #[test]
    fn test_typed_roundtrip() {
        let mut prerequisites = Prerequisites::new();
        prerequisites.insert(ELEMENT_TYPE, TypeName::from("string"));
        assert_eq!(
            prerequisites.get(ELEMENT_TYPE).unwrap(),
            &TypeName::from("string")
        );
        assert!(prerequisites.find(KEY_TYPE).unwrap().is_none());
    }

    #[test]
    fn test_wrong_type_is_reported() {
        const BOGUS: PrerequisiteKey<u32> = PrerequisiteKey::new("element-type");
        let mut prerequisites = Prerequisites::new();
        prerequisites.insert(ELEMENT_TYPE, TypeName::from("string"));
        let err = prerequisites.get(BOGUS).unwrap_err();
        assert!(matches!(
            err,
            TransformError::PrerequisiteType {
                key: "element-type",
                ..
            }
        ));
    }

    #[test]
    fn test_transfer_shares_handles() {
        let mut parent = Prerequisites::new();
        parent.insert(VARIABLES, SharedVariables::default());
        parent.insert(ELEMENT_TYPE, TypeName::from("string"));

        let mut child = Prerequisites::new();
        parent.transfer_to(&mut child, RUN_SCOPED);

        assert!(child.contains(VARIABLES.name()));
        assert!(!child.contains(ELEMENT_TYPE.name()));

        child
            .get(VARIABLES)
            .unwrap()
            .borrow_mut()
            .push("x".to_string());
        assert_eq!(*parent.get(VARIABLES).unwrap().borrow(), vec!["x"]);
    }
}
