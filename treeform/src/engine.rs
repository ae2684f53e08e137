//! Dispatch engine
//!
//! [`Engine::transform`] is the single recursion point of a run: it resolves
//! the rule for a context and invokes it, and rules call back into it for
//! every sub-value. The engine itself holds only the shared registry and an
//! optional depth budget, so one engine can serve any number of runs.

use crate::error::TransformError;
use crate::parameters::TransformationParameters;
use crate::registry::RuleRegistry;
use std::sync::Arc;
use tracing::trace;

/// Re-entrant driver over a [`RuleRegistry`]
pub struct Engine<S, O> {
    registry: Arc<RuleRegistry<S, O>>,
    max_depth: Option<usize>,
}

impl<S, O> Engine<S, O> {
    pub fn new(registry: RuleRegistry<S, O>) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Build an engine over a registry shared with other engines
    pub fn from_shared(registry: Arc<RuleRegistry<S, O>>) -> Self {
        Self {
            registry,
            max_depth: None,
        }
    }

    /// Fail any context derived more than `limit` times from its root
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn registry(&self) -> &RuleRegistry<S, O> {
        &self.registry
    }

    /// Transform a value with the first applicable rule of its path
    pub fn transform(&self, params: &TransformationParameters<S>) -> Result<O, TransformError> {
        if let Some(limit) = self.max_depth {
            if params.depth() > limit {
                return Err(TransformError::DepthExceeded { limit });
            }
        }

        let rule = self.registry.resolve(params)?;
        trace!(
            path = %params.path(),
            rule = rule.name(),
            real_type = %params.real_type(),
            declared_type = %params.declared_type(),
            depth = params.depth(),
            "rule selected"
        );
        rule.transform(self, params)
    }
}

impl<S, O> Clone for Engine<S, O> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Subject;
    use crate::path::TOKEN_TO_COMPONENT;
    use crate::rule::FnRule;
    use crate::types::TypeName;

    /// A countdown: each value recurses into the value one below it
    #[derive(Debug, Clone)]
    struct Count(u32);

    impl Subject for Count {
        fn real_type(&self) -> Result<TypeName, TransformError> {
            Ok(TypeName::from(if self.0 == 0 { "zero" } else { "positive" }))
        }
    }

    fn countdown_engine() -> Engine<Count, u32> {
        let mut registry = RuleRegistry::new();
        registry.register(
            TOKEN_TO_COMPONENT,
            10,
            FnRule::new(
                "zero",
                |params: &TransformationParameters<Count>| params.subject().0 == 0,
                |_, _| Ok(0),
            ),
        );
        registry.register(
            TOKEN_TO_COMPONENT,
            0,
            FnRule::new(
                "step",
                |_| true,
                |engine: &Engine<Count, u32>, params: &TransformationParameters<Count>| {
                    let child = params.derive(Count(params.subject().0 - 1), "count")?;
                    Ok(engine.transform(&child)? + 1)
                },
            ),
        );
        Engine::new(registry)
    }

    #[test]
    fn test_recursion_through_engine() {
        let engine = countdown_engine();
        let params = TransformationParameters::new(TOKEN_TO_COMPONENT, Count(5), "count").unwrap();
        assert_eq!(engine.transform(&params).unwrap(), 5);
    }

    #[test]
    fn test_depth_budget() {
        let engine = countdown_engine().with_max_depth(3);
        let shallow =
            TransformationParameters::new(TOKEN_TO_COMPONENT, Count(3), "count").unwrap();
        assert_eq!(engine.transform(&shallow).unwrap(), 3);

        let deep = TransformationParameters::new(TOKEN_TO_COMPONENT, Count(4), "count").unwrap();
        assert_eq!(
            engine.transform(&deep).unwrap_err(),
            TransformError::DepthExceeded { limit: 3 }
        );
    }

    #[test]
    fn test_engine_clone_shares_registry() {
        let engine = countdown_engine();
        let clone = engine.clone();
        assert_eq!(
            clone.registry().rules(TOKEN_TO_COMPONENT),
            vec![(10, "zero"), (0, "step")]
        );
    }
}
