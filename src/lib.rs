//! This library implements a runtime-property monitor for a symbolic
//! analyzer of whole programs. A temporal-safety property is described as a
//! nondeterministic finite automaton over program events (procedure calls
//! and array writes), and this library simulates that automaton in lock-step
//! with the host's symbolic exploration, tracking every hypothesis about
//! where the automaton could stand as a disjunction of partial runs.
//!
//! # How it Works
//!
//! From a very high level, the monitoring process is performed as follows:
//!
//! 1. The property is assembled into an [`automaton::Automaton`] via
//!    [`automaton::AutomatonBuilder`], which validates vertex references,
//!    registers, patterns, guards, and actions up front.
//! 2. At procedure entry the host asks a [`monitor::Monitor`] to
//!    [`monitor::Monitor::start`] a fresh disjunction, one partial run per
//!    vertex with every register bound to a fresh [`value::AbstractValue`].
//! 3. Every observed [`event::Event`] advances the disjunction through
//!    [`monitor::Monitor::small_step`], forking on every matching
//!    transition and on the "skip" hypotheses where no transition fired,
//!    while an [`oracle::ConstraintOracle`] discards refutable branches.
//! 4. At call sites, a previously computed callee summary is composed in
//!    one shot via [`monitor::Monitor::large_step`], unifying callee-scope
//!    values into the caller's scope instead of re-simulating the callee.
//! 5. At procedure exit the disjunction is compacted with
//!    [`monitor::Monitor::simplify`] for storage as this procedure's
//!    summary, and [`monitor::Monitor::report_errors`] reconstructs a
//!    chronological counterexample trace for every run that reached an
//!    error vertex.
//!
//! # Basic Usage
//!
//! The host drives the monitor event by event. The following simulates the
//! classic open/close discipline, where using a handle after closing it is
//! the error:
//!
//! ```
//! use std::rc::Rc;
//!
//! use temporal_monitor::{
//!     automaton::{Automaton, GuardClause, GuardOperand, LabelSpec},
//!     diagnostics::RecordingSink,
//!     event::{Event, Location, Procedure, ProcedureName},
//!     monitor::Monitor,
//!     oracle::TrivialOracle,
//!     predicate::RelOp,
//!     value::ValueSource,
//! };
//!
//! let automaton = Automaton::builder(3)
//!     .register("handle")
//!     .start(0)
//!     .error(2, "handle is used after being closed")
//!     .transition(
//!         0,
//!         1,
//!         LabelSpec::on_call("close").with_formals(["h"]).with_action("handle", "h"),
//!     )
//!     .transition(
//!         1,
//!         2,
//!         LabelSpec::on_call("read").with_formals(["h"]).with_guard(GuardClause::compare(
//!             RelOp::Eq,
//!             GuardOperand::register("handle"),
//!             GuardOperand::variable("h"),
//!         )),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut values = ValueSource::new();
//! let mut monitor = Monitor::new(Rc::new(automaton), values.clone());
//!
//! let handle = values.fresh();
//! let state = monitor.start();
//! let state = monitor.small_step(
//!     Location::new(0x10),
//!     &TrivialOracle,
//!     &(),
//!     &Event::Call {
//!         return_value: None,
//!         arguments: vec![handle],
//!         procedure: ProcedureName::new("close"),
//!     },
//!     state,
//! );
//! let state = monitor.small_step(
//!     Location::new(0x14),
//!     &TrivialOracle,
//!     &(),
//!     &Event::Call {
//!         return_value: None,
//!         arguments: vec![handle],
//!         procedure: ProcedureName::new("read"),
//!     },
//!     state,
//! );
//!
//! let mut sink = RecordingSink::new();
//! let procedure = Procedure::new("example", Location::new(0x00));
//! monitor.report_errors(&procedure, &mut sink, &state);
//!
//! assert_eq!(sink.diagnostics().len(), 1);
//! assert_eq!(sink.diagnostics()[0].message, "handle is used after being closed");
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod automaton;
pub mod constant;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod monitor;
pub mod oracle;
pub mod predicate;
pub mod state;
pub mod value;

// Re-exports to provide the library interface.
pub use monitor::{substitute::Substitution, Monitor};
pub use state::{SimpleState, State};
