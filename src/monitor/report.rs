//! This module contains the reconstruction of human-readable counterexample
//! traces from the lineage of partial runs that reached an error vertex.

use crate::{
    automaton::Automaton,
    diagnostics::{Diagnostic, DiagnosticSink, TraceEntry},
    event::Procedure,
    state::{SimpleState, State, StepData},
};

/// Walks the final disjunction of a procedure's analysis and reports one
/// diagnostic per partial run that started at a start vertex and reached an
/// error vertex.
///
/// Reporting happens at the innermost offending occurrence: the run's
/// lineage is rewound to the deepest point at which the error condition
/// already held, and runs whose innermost step is itself a start-to-error
/// call are suppressed, since that callee reports the same error at a finer
/// granularity.
pub(crate) fn report_errors(
    automaton: &Automaton,
    procedure: &Procedure,
    sink: &mut dyn DiagnosticSink,
    state: &State,
) {
    for simple_state in state {
        if !is_error_run(automaton, simple_state) {
            continue;
        }

        let innermost = innermost_occurrence(automaton, simple_state);
        if reported_by_callee(automaton, innermost) {
            continue;
        }

        let message = automaton
            .message_for(innermost.post.vertex)
            .map_or_else(
                || format!("temporal property violated at vertex {}", innermost.post.vertex),
                str::to_owned,
            );

        tracing::debug!(
            procedure = %procedure.name,
            vertex = %innermost.post.vertex,
            "reporting a temporal-property violation"
        );

        sink.report(Diagnostic {
            procedure: procedure.name.clone(),
            location: procedure.location,
            message,
            trace: trace_of(innermost, 0),
        });
    }
}

/// Checks whether `state` is a run from a start vertex to an error vertex.
fn is_error_run(automaton: &Automaton, state: &SimpleState) -> bool {
    automaton.is_start(state.pre.vertex) && automaton.is_error(state.post.vertex)
}

/// Rewinds `state` along its lineage to the deepest predecessor at which the
/// error condition already held.
///
/// This captures the case where the error was reached early and subsequent
/// steps are irrelevant padding that would only obscure the trace.
fn innermost_occurrence<'a>(automaton: &Automaton, state: &'a SimpleState) -> &'a SimpleState {
    let mut current = state;
    while let Some(step) = &current.last_step {
        if !is_error_run(automaton, &step.predecessor) {
            break;
        }
        current = &step.predecessor;
    }
    current
}

/// Checks whether the last step of `state` is a call whose summary is itself
/// a start-to-error run, in which case that call reports the error instead.
fn reported_by_callee(automaton: &Automaton, state: &SimpleState) -> bool {
    match &state.last_step {
        Some(step) => match &step.data {
            StepData::Large { post_summary, .. } => is_error_run(automaton, post_summary),
            StepData::Small { .. } => false,
        },
        None => false,
    }
}

/// Builds the chronological trace of `state`'s lineage at the provided
/// nesting `depth`.
///
/// Each small step contributes one flat entry. Each non-trivial large step
/// contributes one entry for the call plus the callee's own trace at
/// increased depth; a large step whose callee summary recorded no steps is
/// skipped transparently.
fn trace_of(state: &SimpleState, depth: usize) -> Vec<TraceEntry> {
    // The lineage is a backward chain, so collect it first and emit
    // oldest-first.
    let mut steps = Vec::new();
    let mut current = state;
    while let Some(step) = &current.last_step {
        steps.push(step);
        current = &step.predecessor;
    }

    let mut entries = Vec::new();
    for step in steps.iter().rev() {
        match &step.data {
            StepData::Small { event } => {
                entries.push(TraceEntry {
                    location: step.location,
                    description: event.to_string(),
                    depth,
                });
            }
            StepData::Large {
                callee,
                post_summary,
            } => {
                if post_summary.last_step.is_none() {
                    continue;
                }
                entries.push(TraceEntry {
                    location: step.location,
                    description: format!("call to {callee}"),
                    depth,
                });
                entries.extend(trace_of(post_summary, depth + 1));
            }
        }
    }

    entries
}
