//! Rule trait definition
//!
//! A rule pairs an applicability predicate with a transform operation for one
//! transformation path. Rules are registered once and shared by every run, so
//! they hold no per-call state: everything a call needs arrives through its
//! [`TransformationParameters`], and everything it produces goes to the return
//! value or to prerequisites the caller passed in.
//!
//! Rules never call each other. To transform a sub-value a rule derives a
//! child context and hands it back to the [`Engine`], which picks whichever
//! rule applies. New rules can therefore be added without touching existing
//! ones.
//!
//! # Examples
//!
//! ```ignore
//! struct Shout;
//!
//! impl Rule<Word, String> for Shout {
//!     fn name(&self) -> &'static str {
//!         "shout"
//!     }
//!
//!     fn is_applicable(&self, params: &TransformationParameters<Word>) -> bool {
//!         params.real_type() == "word"
//!     }
//!
//!     fn transform(
//!         &self,
//!         _engine: &Engine<Word, String>,
//!         params: &TransformationParameters<Word>,
//!     ) -> Result<String, TransformError> {
//!         Ok(params.subject().0.to_uppercase())
//!     }
//! }
//! ```

use crate::engine::Engine;
use crate::error::TransformError;
use crate::parameters::TransformationParameters;
use tracing::warn;

/// Strategy for transforming one family of values
pub trait Rule<S, O>: Send + Sync {
    /// Name used in logs and listings
    fn name(&self) -> &'static str;

    /// Whether this rule takes responsibility for the value
    ///
    /// Must be free of side effects: the registry may evaluate it for several
    /// rules before one is chosen.
    fn is_applicable(&self, params: &TransformationParameters<S>) -> bool;

    /// Transform the value, recursing through `engine` for sub-values
    fn transform(
        &self,
        engine: &Engine<S, O>,
        params: &TransformationParameters<S>,
    ) -> Result<O, TransformError>;
}

type Predicate<S> = Box<dyn Fn(&TransformationParameters<S>) -> bool + Send + Sync>;
type TransformFn<S, O> = Box<
    dyn Fn(&Engine<S, O>, &TransformationParameters<S>) -> Result<O, TransformError>
        + Send
        + Sync,
>;

/// A rule assembled from closures
pub struct FnRule<S, O> {
    name: &'static str,
    applicable: Predicate<S>,
    transform: TransformFn<S, O>,
}

impl<S, O> FnRule<S, O> {
    pub fn new<P, F>(name: &'static str, applicable: P, transform: F) -> Self
    where
        P: Fn(&TransformationParameters<S>) -> bool + Send + Sync + 'static,
        F: Fn(&Engine<S, O>, &TransformationParameters<S>) -> Result<O, TransformError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            applicable: Box::new(applicable),
            transform: Box::new(transform),
        }
    }
}

impl<S, O> Rule<S, O> for FnRule<S, O> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_applicable(&self, params: &TransformationParameters<S>) -> bool {
        (self.applicable)(params)
    }

    fn transform(
        &self,
        engine: &Engine<S, O>,
        params: &TransformationParameters<S>,
    ) -> Result<O, TransformError> {
        (self.transform)(engine, params)
    }
}

/// Lowest-priority rule that turns dispatch exhaustion into a diagnosable error
///
/// Always applicable, never succeeds. Registered with `i32::MIN` it
/// guarantees resolution ends with either a result or a descriptive failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRule;

impl<S, O> Rule<S, O> for UnsupportedRule {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn is_applicable(&self, _params: &TransformationParameters<S>) -> bool {
        true
    }

    fn transform(
        &self,
        _engine: &Engine<S, O>,
        params: &TransformationParameters<S>,
    ) -> Result<O, TransformError> {
        warn!(
            path = %params.path(),
            real_type = %params.real_type(),
            declared_type = %params.declared_type(),
            "no rule accepted value"
        );
        Err(TransformError::Unsupported {
            path: params.path(),
            real_type: params.real_type().clone(),
            declared_type: params.declared_type().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parameters::Subject;
    use crate::path::OBJECT_TO_XML;
    use crate::registry::RuleRegistry;
    use crate::types::TypeName;

    #[derive(Debug, Clone)]
    struct Word(&'static str);

    impl Subject for Word {
        fn real_type(&self) -> Result<TypeName, TransformError> {
            Ok(TypeName::from("word"))
        }
    }

    #[test]
    fn test_fn_rule_delegates() {
        let rule: FnRule<Word, String> = FnRule::new(
            "upper",
            |params: &TransformationParameters<Word>| params.subject().0.len() < 5,
            |_, params: &TransformationParameters<Word>| Ok(params.subject().0.to_uppercase()),
        );
        let engine = Engine::new(RuleRegistry::new());
        let params = TransformationParameters::new(OBJECT_TO_XML, Word("abc"), "word").unwrap();
        assert_eq!(rule.name(), "upper");
        assert!(rule.is_applicable(&params));
        assert_eq!(rule.transform(&engine, &params).unwrap(), "ABC");
    }

    #[test]
    fn test_unsupported_rule_fails_descriptively() {
        let mut registry: RuleRegistry<Word, String> = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, i32::MIN, UnsupportedRule);
        let engine = Engine::new(registry);
        let params = TransformationParameters::new(OBJECT_TO_XML, Word("abc"), "noun").unwrap();

        let err = engine.transform(&params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DispatchExhausted);
        assert_eq!(
            err.to_string(),
            "cannot transform 'word' (declared as 'noun') on path object->xml"
        );
    }
}
