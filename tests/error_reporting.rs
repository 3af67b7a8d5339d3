//! This module is an integration test that drives the monitor through a
//! complete property violation and inspects the reported counterexample.
#![cfg(test)]

use temporal_monitor::{
    diagnostics::RecordingSink,
    event::{Location, Procedure},
    oracle::TrivialOracle,
};

mod common;

#[test]
fn reports_a_definite_violation_exactly_once() -> anyhow::Result<()> {
    let (mut monitor, mut values) = common::handle_monitor()?;

    let state = monitor.start();
    let handle = values.fresh();
    let state = monitor.small_step(
        Location::new(0x10),
        &TrivialOracle,
        &(),
        &common::call("open", Some(handle), vec![]),
        state,
    );
    let state = monitor.small_step(
        Location::new(0x14),
        &TrivialOracle,
        &(),
        &common::call("close", None, vec![handle]),
        state,
    );

    // Closing the very handle that was opened satisfies the guard outright,
    // so some run has certainly travelled start to error.
    assert!(state
        .iter()
        .any(|s| s.pre.vertex.index() == 0 && s.post.vertex.index() == 2 && s.pruned.is_empty()));

    let mut sink = RecordingSink::new();
    let procedure = Procedure::new("open_then_close", Location::new(0x08));
    monitor.report_errors(&procedure, &mut sink, &state);

    let diagnostics = sink.into_diagnostics();
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.procedure.as_str(), "open_then_close");
    assert_eq!(diagnostic.location, Location::new(0x08));
    assert_eq!(diagnostic.message, common::CLOSE_MESSAGE);

    // The trace lists the two contributing events oldest-first, both at the
    // top nesting level.
    assert_eq!(diagnostic.trace.len(), 2);
    assert_eq!(diagnostic.trace[0].location, Location::new(0x10));
    assert_eq!(diagnostic.trace[0].description, "call to open()");
    assert_eq!(diagnostic.trace[0].depth, 0);
    assert_eq!(diagnostic.trace[1].location, Location::new(0x14));
    assert!(diagnostic.trace[1].description.starts_with("call to close("));
    assert_eq!(diagnostic.trace[1].depth, 0);

    Ok(())
}

#[test]
fn later_events_do_not_pad_the_trace() -> anyhow::Result<()> {
    let (mut monitor, mut values) = common::handle_monitor()?;

    let state = monitor.start();
    let handle = values.fresh();
    let state = monitor.small_step(
        Location::new(0x10),
        &TrivialOracle,
        &(),
        &common::call("open", Some(handle), vec![]),
        state,
    );
    let state = monitor.small_step(
        Location::new(0x14),
        &TrivialOracle,
        &(),
        &common::call("close", None, vec![handle]),
        state,
    );

    // Events after the violation do not extend the offending run's trace,
    // as the error vertex has no outgoing transitions here.
    let state = monitor.small_step(
        Location::new(0x18),
        &TrivialOracle,
        &(),
        &common::call("unrelated", None, vec![]),
        state,
    );

    let mut sink = RecordingSink::new();
    let procedure = Procedure::new("open_then_close_then_more", Location::new(0x08));
    monitor.report_errors(&procedure, &mut sink, &state);

    let diagnostics = sink.into_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].trace.len(), 2);

    Ok(())
}
