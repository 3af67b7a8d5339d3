//! This module contains the primary error type for the monitor's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.

pub mod automaton;

use std::fmt::Display;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the more-specific
/// child error types as appropriate.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Errors that come from validating an automaton definition.
    #[error(transparent)]
    Automaton(#[from] automaton::Error),
}

/// Aborts processing of the current unit with a clearly tagged internal
/// error.
///
/// This is the path taken when an upstream precondition that the automaton
/// builder (or the host analyzer) is responsible for has been broken. These
/// failures must never be caught and converted into a recoverable analysis
/// finding, as they signal a contract violation elsewhere in the system.
#[track_caller]
pub(crate) fn invariant_violation(description: impl Display) -> ! {
    panic!("internal monitor invariant violated: {description}")
}
