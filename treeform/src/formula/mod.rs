//! Token tree to component tree
//!
//! A tokenizer (not part of this crate) turns formula text into a tree of
//! [`TokenNode`]s: operators and function calls own their operands as
//! children, parentheses become explicit group nodes. The rules on the
//! [`TOKEN_TO_COMPONENT`](crate::path::TOKEN_TO_COMPONENT) path rewrite that
//! tree into a [`Component`] tree, dispatching on the structural
//! [`TokenTrait`] of each node rather than on any Rust type.
//!
//! While walking, the variable rule records every referenced name in the
//! `VARIABLES` prerequisite so the caller can resolve free variables
//! afterwards.

pub mod component;
pub mod rules;

pub use component::Component;
pub use rules::{BinaryOperatorRule, CallRule, GroupRule, OperandRule, VariableRule};

use crate::engine::Engine;
use crate::error::TransformError;
use crate::parameters::{Subject, TransformationParameters};
use crate::types::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Engine over token trees
pub type FormulaEngine = Engine<Arc<TokenNode>, Component>;

/// Parameters of one token rewrite step
pub type TokenParams = TransformationParameters<Arc<TokenNode>>;

/// Infix operators taking exactly two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "^")]
    Power,
    #[serde(rename = "&")]
    Concat,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
            BinaryOperator::Concat => "&",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Structural role of a token, which rules dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTrait {
    /// A literal value
    Operand,
    /// A name to be resolved later
    Reference,
    BinaryOperator,
    /// A named function applied to its children
    Call,
    /// A parenthesized sub-expression
    Grouping,
}

/// Payload of a token tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Token {
    Number(f64),
    Text(String),
    Variable(String),
    Operator(BinaryOperator),
    Function(String),
    Group,
}

impl Token {
    pub fn token_trait(&self) -> TokenTrait {
        match self {
            Token::Number(_) | Token::Text(_) => TokenTrait::Operand,
            Token::Variable(_) => TokenTrait::Reference,
            Token::Operator(_) => TokenTrait::BinaryOperator,
            Token::Function(_) => TokenTrait::Call,
            Token::Group => TokenTrait::Grouping,
        }
    }

    /// Kind name, used as the node's real type
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Number(_) => "number",
            Token::Text(_) => "text",
            Token::Variable(_) => "variable",
            Token::Operator(_) => "operator",
            Token::Function(_) => "function",
            Token::Group => "group",
        }
    }
}

/// A node of a parsed token tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenNode {
    pub token: Token,
    #[serde(default)]
    pub children: Vec<Arc<TokenNode>>,
}

impl TokenNode {
    /// Declared type given to every node of a token tree
    pub const DECLARED_TYPE: &'static str = "token";

    pub fn leaf(token: Token) -> Arc<Self> {
        Arc::new(Self {
            token,
            children: Vec::new(),
        })
    }

    pub fn branch(token: Token, children: Vec<Arc<TokenNode>>) -> Arc<Self> {
        Arc::new(Self { token, children })
    }

    pub fn number(value: f64) -> Arc<Self> {
        Self::leaf(Token::Number(value))
    }

    pub fn variable(name: &str) -> Arc<Self> {
        Self::leaf(Token::Variable(name.to_string()))
    }

    pub fn binary(op: BinaryOperator, left: Arc<TokenNode>, right: Arc<TokenNode>) -> Arc<Self> {
        Self::branch(Token::Operator(op), vec![left, right])
    }

    pub fn call(name: &str, args: Vec<Arc<TokenNode>>) -> Arc<Self> {
        Self::branch(Token::Function(name.to_string()), args)
    }

    pub fn group(inner: Arc<TokenNode>) -> Arc<Self> {
        Self::branch(Token::Group, vec![inner])
    }
}

impl Subject for Arc<TokenNode> {
    fn real_type(&self) -> Result<TypeName, TransformError> {
        Ok(TypeName::from(self.token.kind()))
    }
}
