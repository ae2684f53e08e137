//! Rule registry and path resolution
//!
//! Rules are grouped by [`TransformationPath`] and kept sorted by descending
//! priority. Resolution walks a path's rules in that order and returns the
//! first one whose predicate accepts the value. Equal priorities keep their
//! registration order, so resolution is deterministic.

use crate::error::TransformError;
use crate::parameters::TransformationParameters;
use crate::path::TransformationPath;
use crate::rule::Rule;
use std::collections::HashMap;

struct RegisteredRule<S, O> {
    priority: i32,
    rule: Box<dyn Rule<S, O>>,
}

/// Registry of rules, keyed by transformation path
///
/// # Examples
///
/// ```ignore
/// let mut registry = RuleRegistry::new();
/// registry.register(OBJECT_TO_XML, 400, PrimitiveRule);
/// registry.register(OBJECT_TO_XML, i32::MIN, UnsupportedRule);
///
/// let rule = registry.resolve(&params)?;
/// ```
pub struct RuleRegistry<S, O> {
    paths: HashMap<TransformationPath, Vec<RegisteredRule<S, O>>>,
}

impl<S, O> RuleRegistry<S, O> {
    /// Create a new empty registry
    pub fn new() -> Self {
        RuleRegistry {
            paths: HashMap::new(),
        }
    }

    /// Register a rule on a path with the given priority
    ///
    /// A rule registered with the same priority as existing ones is tried
    /// after them.
    pub fn register<R: Rule<S, O> + 'static>(
        &mut self,
        path: TransformationPath,
        priority: i32,
        rule: R,
    ) {
        let rules = self.paths.entry(path).or_default();
        let position = rules.partition_point(|existing| existing.priority >= priority);
        rules.insert(
            position,
            RegisteredRule {
                priority,
                rule: Box::new(rule),
            },
        );
    }

    /// Find the highest-priority rule that applies to the parameters
    pub fn resolve(
        &self,
        params: &TransformationParameters<S>,
    ) -> Result<&dyn Rule<S, O>, TransformError> {
        let rules = self
            .paths
            .get(&params.path())
            .ok_or(TransformError::UnknownPath(params.path()))?;
        rules
            .iter()
            .find(|registered| registered.rule.is_applicable(params))
            .map(|registered| registered.rule.as_ref())
            .ok_or_else(|| TransformError::NoApplicableRule {
                path: params.path(),
                real_type: params.real_type().clone(),
            })
    }

    /// Check if any rule is registered on a path
    pub fn has_path(&self, path: TransformationPath) -> bool {
        self.paths.contains_key(&path)
    }

    /// List all paths that have rules (sorted)
    pub fn paths(&self) -> Vec<TransformationPath> {
        let mut paths: Vec<_> = self.paths.keys().copied().collect();
        paths.sort();
        paths
    }

    /// List a path's rules as (priority, name) in resolution order
    pub fn rules(&self, path: TransformationPath) -> Vec<(i32, &'static str)> {
        self.paths
            .get(&path)
            .map(|rules| {
                rules
                    .iter()
                    .map(|registered| (registered.priority, registered.rule.name()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<S, O> Default for RuleRegistry<S, O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::error::ErrorKind;
    use crate::parameters::Subject;
    use crate::path::{OBJECT_TO_XML, TOKEN_TO_COMPONENT};
    use crate::rule::FnRule;
    use crate::types::TypeName;

    #[derive(Debug, Clone)]
    struct Word(&'static str);

    impl Subject for Word {
        fn real_type(&self) -> Result<TypeName, TransformError> {
            Ok(TypeName::from(self.0))
        }
    }

    fn constant(name: &'static str) -> FnRule<Word, &'static str> {
        FnRule::new(name, |_| true, move |_, _| Ok(name))
    }

    fn only(name: &'static str, word: &'static str) -> FnRule<Word, &'static str> {
        FnRule::new(
            name,
            move |params: &TransformationParameters<Word>| params.real_type() == word,
            move |_, _| Ok(name),
        )
    }

    fn params(word: &'static str) -> TransformationParameters<Word> {
        TransformationParameters::new(OBJECT_TO_XML, Word(word), "word").unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry: RuleRegistry<Word, &'static str> = RuleRegistry::new();
        assert!(registry.paths().is_empty());
        assert!(!registry.has_path(OBJECT_TO_XML));
    }

    #[test]
    fn test_rules_sorted_by_descending_priority() {
        let mut registry = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, 10, constant("low"));
        registry.register(OBJECT_TO_XML, 30, constant("high"));
        registry.register(OBJECT_TO_XML, 20, constant("mid"));

        assert_eq!(
            registry.rules(OBJECT_TO_XML),
            vec![(30, "high"), (20, "mid"), (10, "low")]
        );
        assert_eq!(registry.resolve(&params("a")).unwrap().name(), "high");
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut registry = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, 5, constant("first"));
        registry.register(OBJECT_TO_XML, 5, constant("second"));

        for _ in 0..10 {
            assert_eq!(registry.resolve(&params("a")).unwrap().name(), "first");
        }
    }

    #[test]
    fn test_skips_inapplicable_rules() {
        let mut registry = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, 50, only("apple-only", "apple"));
        registry.register(OBJECT_TO_XML, 10, only("pear-only", "pear"));

        assert_eq!(
            registry.resolve(&params("pear")).unwrap().name(),
            "pear-only"
        );
    }

    #[test]
    fn test_no_applicable_rule() {
        let mut registry = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, 50, only("apple-only", "apple"));

        let err = registry.resolve(&params("plum")).err().unwrap();
        assert_eq!(
            err,
            TransformError::NoApplicableRule {
                path: OBJECT_TO_XML,
                real_type: TypeName::from("plum"),
            }
        );
        assert_eq!(err.kind(), ErrorKind::DispatchExhausted);
    }

    #[test]
    fn test_unknown_path() {
        let mut registry = RuleRegistry::new();
        registry.register(TOKEN_TO_COMPONENT, 1, constant("token"));

        let err = registry.resolve(&params("a")).err().unwrap();
        assert_eq!(err, TransformError::UnknownPath(OBJECT_TO_XML));
    }

    #[test]
    fn test_paths_are_independent() {
        let mut registry = RuleRegistry::new();
        registry.register(OBJECT_TO_XML, 1, constant("xml"));
        registry.register(TOKEN_TO_COMPONENT, 100, constant("token"));

        assert_eq!(registry.paths(), vec![OBJECT_TO_XML, TOKEN_TO_COMPONENT]);
        let engine = Engine::new(registry);
        assert_eq!(engine.transform(&params("a")).unwrap(), "xml");
    }
}
