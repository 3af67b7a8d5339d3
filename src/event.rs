//! This module contains the definition of the monitorable program events and
//! the locations and procedure identities they are attached to.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::AbstractValue;

/// The display name of a procedure, as matched by the automaton's
/// procedure-name patterns.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProcedureName {
    name: String,
}

impl ProcedureName {
    /// Constructs a new procedure name from the provided `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { name }
    }

    /// Gets the display name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Display for ProcedureName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A location in the program under analysis.
///
/// The monitor treats locations as opaque tags: the host analyzer decides how
/// they map onto its own source positions.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Location {
    offset: u32,
}

impl Location {
    /// Constructs a new location at the provided `offset`.
    #[must_use]
    pub fn new(offset: u32) -> Self {
        Self { offset }
    }

    /// Gets the raw offset of the location.
    #[must_use]
    pub fn offset(self) -> u32 {
        self.offset
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.offset)
    }
}

/// A handle for the procedure whose final state is being reported on,
/// carrying its display name and its declared location.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Procedure {
    /// The display name of the procedure.
    pub name: ProcedureName,

    /// The location at which the procedure is declared.
    pub location: Location,
}

impl Procedure {
    /// Constructs a new procedure handle.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        let name = ProcedureName::new(name);
        Self { name, location }
    }
}

/// A monitorable program event, extracted from one instruction by the host
/// analyzer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Event {
    /// A write to an array element.
    ArrayWrite {
        /// The abstract value of the array being written.
        array: AbstractValue,

        /// The abstract value of the index being written at.
        index: AbstractValue,
    },

    /// A call to a procedure.
    Call {
        /// The abstract value returned by the call, if any.
        return_value: Option<AbstractValue>,

        /// The abstract values of the actual arguments, in call order.
        arguments: Vec<AbstractValue>,

        /// The identity of the callee.
        procedure: ProcedureName,
    },
}

/// Renders the event the way it appears in counterexample traces.
impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArrayWrite { array, index } => {
                write!(f, "write to {array}[{index}]")
            }
            Self::Call {
                arguments,
                procedure,
                ..
            } => {
                write!(f, "call to {procedure}(")?;
                for (position, argument) in arguments.iter().enumerate() {
                    if position > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}
