//! This module contains errors pertaining to the validation of an automaton
//! definition as it is assembled by the builder.

use thiserror::Error;

/// Errors that occur while validating an automaton definition.
///
/// These are the recoverable face of the static checks whose violation at
/// monitoring time would instead be an internal invariant failure: an
/// automaton accepted by the builder cannot trip those invariants.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The automaton declares no vertices")]
    NoVertices,

    #[error(
        "Transition {transition} references vertex {vertex} outside the automaton's {count} \
         vertices"
    )]
    VertexOutOfBounds {
        transition: usize,
        vertex: usize,
        count: usize,
    },

    #[error("Vertex {vertex} is outside the automaton's {count} vertices")]
    DesignatedVertexOutOfBounds { vertex: usize, count: usize },

    #[error("The register {register:?} is declared more than once")]
    DuplicateRegister { register: String },

    #[error(
        "The array-write label on transition {transition} must declare exactly two formals but \
         declares {declared}"
    )]
    BadArrayWriteArity { transition: usize, declared: usize },

    #[error(
        "The pattern {pattern:?} on transition {transition} is not a valid regular expression: \
         {message}"
    )]
    InvalidPattern {
        transition: usize,
        pattern: String,
        message: String,
    },

    #[error("Transition {transition} references the undeclared register {register:?}")]
    UndeclaredRegister { transition: usize, register: String },

    #[error(
        "Transition {transition} references the variable {variable:?}, which is not among its \
         formals"
    )]
    UndeclaredVariable { transition: usize, variable: String },
}

/// The result type for automaton validation.
pub type Result<T> = std::result::Result<T, Error>;
