//! Token rewrite rules
//!
//! Each rule accepts one [`TokenTrait`] and checks the node's child count
//! before recursing into any child, so a malformed tree fails without
//! producing partial output.

use super::{Component, FormulaEngine, Token, TokenNode, TokenParams, TokenTrait};
use crate::error::TransformError;
use crate::prerequisites::VARIABLES;
use crate::rule::Rule;
use std::sync::Arc;

fn has_trait(params: &TokenParams, expected: TokenTrait) -> bool {
    params.subject().token.token_trait() == expected
}

fn expect_arity(
    rule: &'static str,
    params: &TokenParams,
    expected: usize,
) -> Result<(), TransformError> {
    let found = params.subject().children.len();
    if found == expected {
        Ok(())
    } else {
        Err(TransformError::Arity {
            rule,
            expected,
            found,
        })
    }
}

fn rewrite_child(
    engine: &FormulaEngine,
    params: &TokenParams,
    child: &Arc<TokenNode>,
) -> Result<Component, TransformError> {
    let child = params.derive(Arc::clone(child), TokenNode::DECLARED_TYPE)?;
    engine.transform(&child)
}

fn unexpected(params: &TokenParams, rule: &str) -> TransformError {
    TransformError::Malformed(format!(
        "rule '{}' cannot rewrite a {} token",
        rule,
        params.subject().token.kind()
    ))
}

/// Parenthesized sub-expressions collapse into their single child
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupRule;

impl Rule<Arc<TokenNode>, Component> for GroupRule {
    fn name(&self) -> &'static str {
        "group"
    }

    fn is_applicable(&self, params: &TokenParams) -> bool {
        has_trait(params, TokenTrait::Grouping)
    }

    fn transform(
        &self,
        engine: &FormulaEngine,
        params: &TokenParams,
    ) -> Result<Component, TransformError> {
        expect_arity(self.name(), params, 1)?;
        rewrite_child(engine, params, &params.subject().children[0])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryOperatorRule;

impl Rule<Arc<TokenNode>, Component> for BinaryOperatorRule {
    fn name(&self) -> &'static str {
        "binary-operator"
    }

    fn is_applicable(&self, params: &TokenParams) -> bool {
        has_trait(params, TokenTrait::BinaryOperator)
    }

    fn transform(
        &self,
        engine: &FormulaEngine,
        params: &TokenParams,
    ) -> Result<Component, TransformError> {
        let &Token::Operator(op) = &params.subject().token else {
            return Err(unexpected(params, self.name()));
        };
        expect_arity(self.name(), params, 2)?;
        let children = &params.subject().children;
        let left = rewrite_child(engine, params, &children[0])?;
        let right = rewrite_child(engine, params, &children[1])?;
        Ok(Component::binary(op, left, right))
    }
}

/// Function calls with any number of arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct CallRule;

impl Rule<Arc<TokenNode>, Component> for CallRule {
    fn name(&self) -> &'static str {
        "call"
    }

    fn is_applicable(&self, params: &TokenParams) -> bool {
        has_trait(params, TokenTrait::Call)
    }

    fn transform(
        &self,
        engine: &FormulaEngine,
        params: &TokenParams,
    ) -> Result<Component, TransformError> {
        let Token::Function(name) = &params.subject().token else {
            return Err(unexpected(params, self.name()));
        };
        let args = params
            .subject()
            .children
            .iter()
            .map(|child| rewrite_child(engine, params, child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Component::Call {
            name: name.clone(),
            args,
        })
    }
}

/// Variable references
///
/// When the `VARIABLES` prerequisite is present, the name is appended to it
/// unless already listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableRule;

impl Rule<Arc<TokenNode>, Component> for VariableRule {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn is_applicable(&self, params: &TokenParams) -> bool {
        has_trait(params, TokenTrait::Reference)
    }

    fn transform(
        &self,
        _engine: &FormulaEngine,
        params: &TokenParams,
    ) -> Result<Component, TransformError> {
        let Token::Variable(name) = &params.subject().token else {
            return Err(unexpected(params, self.name()));
        };
        expect_arity(self.name(), params, 0)?;
        if let Some(variables) = params.optional_prerequisite(VARIABLES)? {
            let mut variables = variables.borrow_mut();
            if !variables.contains(name) {
                variables.push(name.clone());
            }
        }
        Ok(Component::Variable(name.clone()))
    }
}

/// Number and text literals
#[derive(Debug, Clone, Copy, Default)]
pub struct OperandRule;

impl Rule<Arc<TokenNode>, Component> for OperandRule {
    fn name(&self) -> &'static str {
        "operand"
    }

    fn is_applicable(&self, params: &TokenParams) -> bool {
        has_trait(params, TokenTrait::Operand)
    }

    fn transform(
        &self,
        _engine: &FormulaEngine,
        params: &TokenParams,
    ) -> Result<Component, TransformError> {
        expect_arity(self.name(), params, 0)?;
        match &params.subject().token {
            Token::Number(value) => Ok(Component::Constant(*value)),
            Token::Text(text) => Ok(Component::Text(text.clone())),
            _ => Err(unexpected(params, self.name())),
        }
    }
}
