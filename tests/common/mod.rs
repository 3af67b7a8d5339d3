//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use std::rc::Rc;

use temporal_monitor::{
    automaton::{Automaton, GuardClause, GuardOperand, LabelSpec},
    event::{Event, ProcedureName},
    monitor::Monitor,
    predicate::RelOp,
    value::{AbstractValue, ValueSource},
};

/// The message attached to the error vertex of the [`handle_automaton`].
#[allow(unused)] // It is actually
pub const CLOSE_MESSAGE: &str = "handle is closed while possibly still in use";

/// Builds the three-vertex handle-discipline automaton used across the
/// integration tests.
///
/// Vertex 0 is the start vertex and vertex 2 the error vertex. A call to
/// `open` moves 0 to 1, remembering the returned handle in the register
/// `reg`; a call to `close` on that same handle moves 1 to 2.
#[allow(unused)] // It is actually
pub fn handle_automaton() -> anyhow::Result<Automaton> {
    let automaton = Automaton::builder(3)
        .register("reg")
        .start(0)
        .error(2, CLOSE_MESSAGE)
        .transition(
            0,
            1,
            LabelSpec::on_call("open").with_formals(["ret"]).with_action("reg", "ret"),
        )
        .transition(
            1,
            2,
            LabelSpec::on_call("close").with_formals(["h"]).with_guard(GuardClause::compare(
                RelOp::Eq,
                GuardOperand::register("reg"),
                GuardOperand::variable("h"),
            )),
        )
        .build()?;

    Ok(automaton)
}

/// Constructs a monitor over the [`handle_automaton`] together with the
/// value pool it mints from.
#[allow(unused)] // It is actually
pub fn handle_monitor() -> anyhow::Result<(Monitor, ValueSource)> {
    let values = ValueSource::new();
    let monitor = Monitor::new(Rc::new(handle_automaton()?), values.clone());
    Ok((monitor, values))
}

/// Constructs a call event to the procedure named `procedure`.
#[allow(unused)] // It is actually
pub fn call(
    procedure: &str,
    return_value: Option<AbstractValue>,
    arguments: Vec<AbstractValue>,
) -> Event {
    Event::Call {
        return_value,
        arguments,
        procedure: ProcedureName::new(procedure),
    }
}
