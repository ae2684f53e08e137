//! Transformation paths
//!
//! A path names a family of rules by the representation they read from and
//! the representation they produce.

use std::fmt;

/// An (origin, destination) pair of representation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformationPath {
    origin: &'static str,
    destination: &'static str,
}

impl TransformationPath {
    pub const fn new(origin: &'static str, destination: &'static str) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn origin(&self) -> &'static str {
        self.origin
    }

    pub fn destination(&self) -> &'static str {
        self.destination
    }
}

impl fmt::Display for TransformationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// In-memory object graph to XML document
pub const OBJECT_TO_XML: TransformationPath = TransformationPath::new("object", "xml");

/// Parsed formula token tree to evaluation component tree
pub const TOKEN_TO_COMPONENT: TransformationPath = TransformationPath::new("token", "component");
