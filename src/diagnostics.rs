//! This module contains the types through which the monitor reports the
//! temporal-property violations it finds, and the sink interface the host
//! provides to receive them.

use std::fmt::{Display, Formatter};

use crate::event::{Location, ProcedureName};

/// One entry in a counterexample trace.
///
/// Entries form a flattened nested structure: an entry at depth `n + 1`
/// belongs to the callee of the nearest preceding entry at depth `n`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TraceEntry {
    /// The location of the program step the entry describes.
    pub location: Location,

    /// A human-readable description of the step.
    pub description: String,

    /// The call-nesting depth of the entry, starting at zero in the reported
    /// procedure.
    pub depth: usize,
}

impl Display for TraceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:indent$}[{}] {}",
            "",
            self.location,
            self.description,
            indent = self.depth * 2
        )
    }
}

/// One issue found by the monitor: a temporal-safety violation in one
/// procedure, with the trace of monitor steps that led to it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Diagnostic {
    /// The procedure the issue is reported against.
    pub procedure: ProcedureName,

    /// The location the issue is reported at.
    pub location: Location,

    /// The message derived from the automaton's error-vertex template.
    pub message: String,

    /// The counterexample trace, in chronological order.
    pub trace: Vec<TraceEntry>,
}

/// The interface to an object that records the issues found by the monitor.
///
/// The interface is simple, but it can encapsulate arbitrary logic as far as
/// the monitor is concerned: deduplication, rendering, and persistence are
/// all host concerns.
pub trait DiagnosticSink {
    /// Records one issue.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// An implementation of the [`DiagnosticSink`] trait that buffers every
/// reported issue in memory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordingSink {
    diagnostics: Vec<Diagnostic>,
}

impl RecordingSink {
    /// Creates a new, empty, recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the issues recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the sink, returning the recorded issues.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
