//! Evaluation components produced from token trees

use super::BinaryOperator;
use serde::Serialize;
use std::fmt;

/// A node of the evaluation tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Constant(f64),
    Text(String),
    Variable(String),
    Binary {
        op: BinaryOperator,
        left: Box<Component>,
        right: Box<Component>,
    },
    Call {
        name: String,
        args: Vec<Component>,
    },
}

impl Component {
    pub fn binary(op: BinaryOperator, left: Component, right: Component) -> Self {
        Component::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Component::Binary { left, right, .. } => 1 + left.size() + right.size(),
            Component::Call { args, .. } => 1 + args.iter().map(Component::size).sum::<usize>(),
            _ => 1,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Binary { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Constant(value) => write!(f, "{}", value),
            Component::Text(text) => write!(f, "\"{}\"", text.replace('"', "\"\"")),
            Component::Variable(name) => f.write_str(name),
            Component::Binary { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            Component::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
