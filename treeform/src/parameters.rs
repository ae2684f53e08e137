//! The unit of work passed to every rule
//!
//! A [`TransformationParameters`] is built for the root value by the caller
//! and derived afresh for every recursive step. Nothing flows into a child
//! context implicitly: [`TransformationParameters::derive`] copies only the
//! run-scoped prerequisites, and per-level values such as the declared element
//! type are set by the rule that creates the child.

use crate::error::TransformError;
use crate::path::TransformationPath;
use crate::prerequisites::{PrerequisiteKey, Prerequisites, RUN_SCOPED};
use crate::types::TypeName;

/// A value that rules can be dispatched on
pub trait Subject: Clone {
    /// Runtime type of the value, used for applicability and type lookup
    fn real_type(&self) -> Result<TypeName, TransformError>;
}

/// Context of one transformation step
#[derive(Debug, Clone)]
pub struct TransformationParameters<S> {
    path: TransformationPath,
    subject: S,
    declared_type: TypeName,
    real_type: TypeName,
    depth: usize,
    pub prerequisites: Prerequisites,
}

impl<S: Subject> TransformationParameters<S> {
    /// Create the context of a top-level transformation
    pub fn new(
        path: TransformationPath,
        subject: S,
        declared_type: impl Into<TypeName>,
    ) -> Result<Self, TransformError> {
        let real_type = subject.real_type()?;
        Ok(Self {
            path,
            subject,
            declared_type: declared_type.into(),
            real_type,
            depth: 0,
            prerequisites: Prerequisites::new(),
        })
    }

    /// Create the context for a sub-value on the same path
    ///
    /// Run-scoped prerequisites are carried over; everything else starts empty.
    pub fn derive(
        &self,
        subject: S,
        declared_type: impl Into<TypeName>,
    ) -> Result<Self, TransformError> {
        let mut child = Self::new(self.path, subject, declared_type)?;
        child.depth = self.depth + 1;
        self.prerequisites
            .transfer_to(&mut child.prerequisites, RUN_SCOPED);
        Ok(child)
    }
}

impl<S> TransformationParameters<S> {
    pub fn path(&self) -> TransformationPath {
        self.path
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn declared_type(&self) -> &TypeName {
        &self.declared_type
    }

    pub fn real_type(&self) -> &TypeName {
        &self.real_type
    }

    /// Number of derivations between this context and the top-level one
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Builder-style prerequisite insertion
    pub fn with_prerequisite<T: 'static>(mut self, key: PrerequisiteKey<T>, value: T) -> Self {
        self.prerequisites.insert(key, value);
        self
    }

    /// Fetch a required prerequisite
    pub fn prerequisite<T: 'static>(&self, key: PrerequisiteKey<T>) -> Result<&T, TransformError> {
        self.prerequisites.get(key)
    }

    /// Fetch an optional prerequisite
    pub fn optional_prerequisite<T: 'static>(
        &self,
        key: PrerequisiteKey<T>,
    ) -> Result<Option<&T>, TransformError> {
        self.prerequisites.find(key)
    }
}

/// Copy the named prerequisites of `source` into `target`
pub fn transfer_prerequisites<S, T>(
    source: &TransformationParameters<S>,
    target: &mut TransformationParameters<T>,
    names: &[&str],
) {
    source
        .prerequisites
        .transfer_to(&mut target.prerequisites, names);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::OBJECT_TO_XML;
    use crate::prerequisites::{SharedVariables, ELEMENT_TYPE, VARIABLES};

    #[derive(Debug, Clone)]
    struct Word(&'static str);

    impl Subject for Word {
        fn real_type(&self) -> Result<TypeName, TransformError> {
            Ok(TypeName::from("word"))
        }
    }

    #[test]
    fn test_new_resolves_real_type() {
        let params = TransformationParameters::new(OBJECT_TO_XML, Word("a"), "thing").unwrap();
        assert_eq!(params.real_type(), &TypeName::from("word"));
        assert_eq!(params.declared_type(), &TypeName::from("thing"));
        assert_eq!(params.depth(), 0);
        assert_eq!(params.subject().0, "a");
    }

    #[test]
    fn test_derive_copies_only_run_scoped_prerequisites() {
        let params = TransformationParameters::new(OBJECT_TO_XML, Word("a"), "thing")
            .unwrap()
            .with_prerequisite(VARIABLES, SharedVariables::default())
            .with_prerequisite(ELEMENT_TYPE, TypeName::from("string"));

        let child = params.derive(Word("b"), "string").unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.path(), OBJECT_TO_XML);
        assert!(child.prerequisite(VARIABLES).is_ok());
        assert!(child.optional_prerequisite(ELEMENT_TYPE).unwrap().is_none());
    }

    #[test]
    fn test_explicit_transfer() {
        let params = TransformationParameters::new(OBJECT_TO_XML, Word("a"), "thing")
            .unwrap()
            .with_prerequisite(ELEMENT_TYPE, TypeName::from("string"));
        let mut child = params.derive(Word("b"), "list").unwrap();
        transfer_prerequisites(&params, &mut child, &[ELEMENT_TYPE.name()]);
        assert_eq!(
            child.prerequisite(ELEMENT_TYPE).unwrap(),
            &TypeName::from("string")
        );
    }
}
