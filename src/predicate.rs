//! This module contains the definition of the relational predicates that the
//! monitor accumulates as it prunes partial runs.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::AbstractValue;

/// The relational operator of a predicate.
///
/// The derived [`Ord`] instance provides the fixed total order used when
/// predicate lists are brought into canonical form.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    /// Gets the operator denoting the complement of the relation denoted by
    /// `self`.
    #[must_use]
    pub fn negated(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }

    /// Gets the conventional symbol for the operator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl Display for RelOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a relational predicate: either a literal integer or an
/// abstract value.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operand {
    /// A literal integer.
    Constant(i64),

    /// An abstract value minted by the host abstract domain.
    Value(AbstractValue),
}

impl Operand {
    /// Gets the abstract value denoted by the operand, or [`None`] if the
    /// operand is a literal.
    #[must_use]
    pub fn as_value(&self) -> Option<AbstractValue> {
        match self {
            Self::Constant(_) => None,
            Self::Value(value) => Some(*value),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(literal) => write!(f, "{literal}"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

impl From<AbstractValue> for Operand {
    fn from(value: AbstractValue) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Self::Constant(value)
    }
}

/// A relational predicate over symbolic operands.
///
/// Predicates only ever occur as conjunctive members of a path condition or
/// of a simple state's pruned list.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Predicate {
    /// The relational operator of the predicate.
    pub op: RelOp,

    /// The left operand.
    pub lhs: Operand,

    /// The right operand.
    pub rhs: Operand,
}

impl Predicate {
    /// Constructs a new predicate `lhs op rhs`.
    pub fn new(op: RelOp, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        let lhs = lhs.into();
        let rhs = rhs.into();
        Self { op, lhs, rhs }
    }

    /// Constructs the equality predicate between two abstract values.
    #[must_use]
    pub fn equal(lhs: AbstractValue, rhs: AbstractValue) -> Self {
        Self::new(RelOp::Eq, lhs, rhs)
    }

    /// Gets the predicate denoting the complement of `self`.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            op: self.op.negated(),
            lhs: self.lhs,
            rhs: self.rhs,
        }
    }

    /// Checks whether the predicate is an equality between one and the same
    /// abstract value, and hence trivially true.
    #[must_use]
    pub fn is_trivially_true(&self) -> bool {
        matches!(self.op, RelOp::Eq)
            && matches!(
                (self.lhs.as_value(), self.rhs.as_value()),
                (Some(lhs), Some(rhs)) if lhs == rhs
            )
    }

    /// Evaluates the predicate when both operands are literals, returning
    /// [`None`] when either side is an abstract value.
    #[must_use]
    pub fn constant_truth(&self) -> Option<bool> {
        match (self.lhs, self.rhs) {
            (Operand::Constant(lhs), Operand::Constant(rhs)) => Some(match self.op {
                RelOp::Eq => lhs == rhs,
                RelOp::Ne => lhs != rhs,
                RelOp::Lt => lhs < rhs,
                RelOp::Le => lhs <= rhs,
                RelOp::Gt => lhs > rhs,
                RelOp::Ge => lhs >= rhs,
            }),
            _ => None,
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}
