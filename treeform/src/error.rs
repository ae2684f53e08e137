//! Error types for transformation runs
//!
//! Every failure raised by a rule, the registry or the engine is a
//! [`TransformError`]. Errors are raised where they are detected and travel
//! unchanged up the recursive call chain; nothing is retried or salvaged.

use crate::path::TransformationPath;
use crate::types::TypeName;
use thiserror::Error;

/// Broad classification of a [`TransformError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Type information needed to transform a value is missing or inconsistent
    Configuration,
    /// A rule was invoked without a prerequisite it requires
    Protocol,
    /// The input tree or graph has a shape the rules cannot accept
    Structural,
    /// No rule took responsibility for the value
    DispatchExhausted,
}

/// Error that can occur during a transformation run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// A prerequisite the rule relies on was never supplied
    #[error("missing prerequisite '{key}'")]
    MissingPrerequisite { key: &'static str },

    /// A prerequisite exists under the key but holds a different type
    #[error("prerequisite '{key}' does not hold a value of type {expected}")]
    PrerequisiteType {
        key: &'static str,
        expected: &'static str,
    },

    /// Neither a prerequisite nor a type descriptor declares the needed type
    #[error("cannot resolve the declared {role} type of '{type_name}'")]
    UnresolvedType {
        type_name: TypeName,
        role: &'static str,
    },

    /// A record carries a field its type descriptor does not declare
    #[error("field '{field}' is not declared by type '{type_name}'")]
    UndeclaredField { type_name: TypeName, field: String },

    /// A tag name cannot be written as XML
    #[error("'{0}' is not a valid XML name")]
    InvalidName(String),

    /// No rule is registered for the path at all
    #[error("no rules registered for path {0}")]
    UnknownPath(TransformationPath),

    /// Rules exist for the path but none of them applies
    #[error("no rule applies to '{real_type}' on path {path}")]
    NoApplicableRule {
        path: TransformationPath,
        real_type: TypeName,
    },

    /// The fallback rule rejected the value
    #[error("cannot transform '{real_type}' (declared as '{declared_type}') on path {path}")]
    Unsupported {
        path: TransformationPath,
        real_type: TypeName,
        declared_type: TypeName,
    },

    /// A tree-rewrite rule saw the wrong number of children
    #[error("rule '{rule}' expects {expected} children, found {found}")]
    Arity {
        rule: &'static str,
        expected: usize,
        found: usize,
    },

    /// A handle points outside the structure it belongs to
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The recursion depth budget was exhausted
    #[error("recursion depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },
}

impl TransformError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::UnresolvedType { .. }
            | TransformError::UndeclaredField { .. }
            | TransformError::InvalidName(_) => ErrorKind::Configuration,
            TransformError::MissingPrerequisite { .. }
            | TransformError::PrerequisiteType { .. } => ErrorKind::Protocol,
            TransformError::Arity { .. }
            | TransformError::Malformed(_)
            | TransformError::DepthExceeded { .. } => ErrorKind::Structural,
            TransformError::UnknownPath(_)
            | TransformError::NoApplicableRule { .. }
            | TransformError::Unsupported { .. } => ErrorKind::DispatchExhausted,
        }
    }
}
