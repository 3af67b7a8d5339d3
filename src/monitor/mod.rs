//! This module contains the symbolic simulation engine for the
//! temporal-safety monitor.
//!
//! The engine tracks, in lock-step with the host analyzer's exploration of a
//! procedure, every way the monitoring automaton could have advanced given
//! the events seen so far. A [`crate::state::State`] is a disjunction of
//! such hypotheses; the engine advances it one event at a time
//! ([`Monitor::small_step`]), composes callee summaries at call sites
//! without re-simulating the callee ([`Monitor::large_step`]), compacts it
//! for storage as a procedure summary ([`Monitor::simplify`] and
//! [`Monitor::filter_for_summary`]), and reconstructs counterexample traces
//! from it ([`Monitor::report_errors`]).
//!
//! Everything here is purely functional over the monitor's own values: each
//! operation consumes a disjunction and produces a new one, with old simple
//! states retained only through the lineage back-references used by trace
//! reconstruction.

pub mod guard;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod substitute;

use std::{collections::HashSet, rc::Rc};

use itertools::Itertools;

use crate::{
    automaton::Automaton,
    constant::DISJUNCTION_WARN_SIZE,
    diagnostics::DiagnosticSink,
    error::invariant_violation,
    event::{Event, Location, Procedure, ProcedureName},
    monitor::{
        guard::{apply_action, eval_guard},
        matcher::{static_match, MatchedTransition},
        normalize::normalize_state,
        substitute::Substitution,
    },
    oracle::ConstraintOracle,
    predicate::Predicate,
    state::{Configuration, Memory, SimpleState, State, Step, StepData},
    value::{AbstractValue, ValueSource},
};

/// The symbolic simulation engine for one temporal-safety automaton.
///
/// The automaton handle is threaded explicitly through every operation via
/// this type, so multiple automata can be monitored side by side by holding
/// one monitor per automaton.
#[derive(Clone, Debug)]
pub struct Monitor {
    /// The automaton being simulated.
    automaton: Rc<Automaton>,

    /// The pool that fresh abstract values are minted from.
    values: ValueSource,
}

impl Monitor {
    /// Constructs a new monitor simulating `automaton`, minting fresh values
    /// out of `values`.
    #[must_use]
    pub fn new(automaton: Rc<Automaton>, values: ValueSource) -> Self {
        Self { automaton, values }
    }

    /// Gets the automaton this monitor simulates.
    #[must_use]
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Creates a substitution drawing on the monitor's value pool, for use
    /// with [`Self::large_step`].
    #[must_use]
    pub fn substitution(&self) -> Substitution {
        Substitution::new(self.values.clone())
    }

    /// Builds the disjunction for a fresh procedure invocation.
    ///
    /// An inactive monitor yields the empty disjunction. Otherwise there is
    /// one simple state per automaton vertex, each binding every declared
    /// register to a freshly minted value: total uncertainty about where the
    /// monitor stands when the procedure is entered.
    #[must_use]
    pub fn start(&mut self) -> State {
        if !self.automaton.is_active() {
            return State::new();
        }

        let automaton = Rc::clone(&self.automaton);
        automaton
            .vertices()
            .map(|vertex| {
                let mut memory = Memory::with_capacity(automaton.registers().len());
                for register in automaton.registers() {
                    memory.insert(register.clone(), self.values.fresh());
                }
                SimpleState::initial(Configuration { vertex, memory })
            })
            .collect()
    }

    /// Advances the disjunction by one event.
    ///
    /// Every partial run spawns one branch per matching, feasible transition
    /// plus the skip branches encoding that no transition fired; infeasible
    /// branches are silently discarded.
    #[must_use]
    pub fn small_step<O>(
        &self,
        location: Location,
        oracle: &O,
        path_condition: &O::PathCondition,
        event: &Event,
        state: State,
    ) -> State
    where
        O: ConstraintOracle,
    {
        let matches = static_match(&self.automaton, event);

        let mut result = State::new();
        for old in state {
            result.extend(self.evolve(location, oracle, path_condition, event, &matches, &old));
        }

        tracing::trace!(disjuncts = result.len(), %event, "advanced the disjunction by one event");
        warn_if_oversized(&result);
        result
    }

    /// Evolves one partial run by one event, producing its non-skip and skip
    /// successors.
    fn evolve<O>(
        &self,
        location: Location,
        oracle: &O,
        path_condition: &O::PathCondition,
        event: &Event,
        matches: &[MatchedTransition],
        old: &SimpleState,
    ) -> Vec<SimpleState>
    where
        O: ConstraintOracle,
    {
        // Everything this run has assumed so far is part of its local
        // feasibility context.
        let local = conjoin_all(oracle, path_condition, &old.pruned);

        let mut nonskip: Vec<(SimpleState, bool)> = Vec::new();
        for matched in matches {
            let transition = matched.transition;
            if transition.source() != old.post.vertex {
                continue;
            }

            let (post, pruned, significant) = match transition.label() {
                None => {
                    let post = Configuration {
                        vertex: transition.target(),
                        memory: old.post.memory.clone(),
                    };
                    // A self-looping "any" transition must not visibly
                    // pollute traces.
                    (post, Vec::new(), transition.source() != transition.target())
                }
                Some(label) => {
                    let pruned = eval_guard(&old.post.memory, &matched.context, label.guard());
                    let mut memory = old.post.memory.clone();
                    apply_action(&matched.context, label.action(), &mut memory);
                    let post = Configuration {
                        vertex: transition.target(),
                        memory,
                    };
                    (post, pruned, true)
                }
            };

            let candidate = SimpleState {
                pre: old.pre.clone(),
                post,
                pruned,
                last_step: None,
            };

            if is_feasible(oracle, &local, &candidate.pruned) {
                nonskip.push((candidate, significant));
            }
        }

        // The skip branches: every way of choosing, independently, the
        // negation of one guard conjunct from each non-skip candidate. The
        // nullary product is the single empty combination, so a run with no
        // firing transitions survives unchanged; a candidate with an empty
        // guard always fires and hence admits no skip at all.
        let skip_combinations: Vec<Vec<Predicate>> =
            nonskip
                .iter()
                .fold(vec![Vec::new()], |combinations, (candidate, _)| {
                    combinations
                        .iter()
                        .cartesian_product(&candidate.pruned)
                        .map(|(combination, predicate)| {
                            let mut extended = combination.clone();
                            extended.push(predicate.negated());
                            extended
                        })
                        .collect()
                });

        let skip = skip_combinations
            .into_iter()
            .filter(|pruned| is_feasible(oracle, &local, pruned))
            .map(|pruned| SimpleState {
                pre: old.pre.clone(),
                post: old.post.clone(),
                pruned,
                last_step: old.last_step.clone(),
            });

        // Merge: old facts are rightfully still true, so they are appended
        // back onto every survivor's pruned list.
        let mut successors = Vec::new();
        for (mut candidate, significant) in nonskip {
            candidate.pruned.extend(old.pruned.iter().copied());
            candidate.last_step = if significant {
                Some(Rc::new(Step {
                    location,
                    predecessor: old.clone(),
                    data: StepData::Small {
                        event: event.clone(),
                    },
                }))
            } else {
                old.last_step.clone()
            };
            successors.push(candidate);
        }
        for mut skipped in skip {
            skipped.pruned.extend(old.pruned.iter().copied());
            successors.push(skipped);
        }

        successors
    }

    /// Composes the caller's disjunction with a callee's pre/post summary
    /// disjunction at a call site, accounting for the call's effect without
    /// re-simulating the callee.
    ///
    /// Each feasible pairing of a caller run `p` with a callee summary run
    /// `q` whose `pre` vertex matches `p`'s `post` vertex yields one new
    /// run: callee-scope values are unified into caller scope through
    /// `substitution`, extending it directly where possible and emitting
    /// equality predicates only where a callee value is already mapped to a
    /// different caller value.
    ///
    /// # Panics
    ///
    /// Panics if a paired caller and callee configuration disagree on the
    /// register set; the automaton fixes one register set for every
    /// configuration, so a mismatch is a broken upstream invariant.
    #[must_use]
    pub fn large_step<O>(
        &self,
        call_location: Location,
        callee: &ProcedureName,
        substitution: &Substitution,
        oracle: &O,
        path_condition: &O::PathCondition,
        callee_prepost: &State,
        state: State,
    ) -> State
    where
        O: ConstraintOracle,
    {
        let mut callers = state;
        normalize_state(&mut callers);
        let mut callees = callee_prepost.clone();
        normalize_state(&mut callees);

        let mut result = State::new();
        for (caller, callee_summary) in callers.iter().cartesian_product(callees.iter()) {
            if caller.post.vertex != callee_summary.pre.vertex {
                continue;
            }

            let mut substitution = substitution.clone();
            let equalities =
                unify_memories(&mut substitution, &caller.post, &callee_summary.pre);
            let substituted = substitution.apply_simple_state(callee_summary);

            let mut pruned = equalities;
            pruned.extend(substituted.pruned.iter().copied());
            pruned.extend(caller.pruned.iter().copied());

            let successor = SimpleState {
                pre: caller.pre.clone(),
                post: substituted.post.clone(),
                pruned,
                last_step: Some(Rc::new(Step {
                    location: call_location,
                    predecessor: caller.clone(),
                    data: StepData::Large {
                        callee: callee.clone(),
                        post_summary: substituted,
                    },
                })),
            };

            if is_feasible(oracle, path_condition, &successor.pruned) {
                result.push(successor);
            }
        }

        tracing::trace!(
            disjuncts = result.len(),
            callee = %callee,
            "composed a callee summary into the disjunction"
        );
        warn_if_oversized(&result);
        result
    }

    /// Drops every simple state whose pruned predicates, conjoined with
    /// `path_condition`, are unsatisfiable.
    ///
    /// This is the feasibility gate applied once more at
    /// summary-construction time.
    #[must_use]
    pub fn filter_for_summary<O>(
        &self,
        oracle: &O,
        path_condition: &O::PathCondition,
        state: State,
    ) -> State
    where
        O: ConstraintOracle,
    {
        state
            .into_iter()
            .filter(|simple_state| is_feasible(oracle, path_condition, &simple_state.pruned))
            .collect()
    }

    /// Compacts the disjunction for storage as a procedure summary: drops
    /// predicates over values no longer observable (`keep` names externally
    /// relevant values that must be treated as observable), normalizes, and
    /// deduplicates.
    #[must_use]
    pub fn simplify(&self, keep: &HashSet<AbstractValue>, state: State) -> State {
        let before = state.len();
        let result = normalize::simplify(keep, state);
        tracing::debug!(before, after = result.len(), "simplified the disjunction");
        result
    }

    /// Reports one diagnostic per partial run in `state` that started at a
    /// start vertex and reached an error vertex, each at its innermost
    /// offending occurrence.
    pub fn report_errors(
        &self,
        procedure: &Procedure,
        sink: &mut dyn DiagnosticSink,
        state: &State,
    ) {
        report::report_errors(&self.automaton, procedure, sink, state);
    }
}

/// Unifies the callee's entry memory with the caller's current memory,
/// extending `substitution` directly where possible and returning the
/// equality predicates required where it is not.
///
/// Both configurations must already be in canonical form so the memories can
/// be walked in lock-step by register name.
fn unify_memories(
    substitution: &mut Substitution,
    caller: &Configuration,
    callee: &Configuration,
) -> Vec<Predicate> {
    if caller.memory.len() != callee.memory.len() {
        invariant_violation(
            "a caller and callee configuration disagree on the automaton's register set",
        );
    }

    let mut equalities = Vec::new();
    for ((caller_register, caller_value), (callee_register, callee_value)) in
        caller.memory.iter().zip(callee.memory.iter())
    {
        if caller_register != callee_register {
            invariant_violation(format_args!(
                "a caller and callee configuration disagree on the automaton's register set: \
                 {caller_register} vs {callee_register}"
            ));
        }

        match substitution.lookup(*callee_value) {
            Some(mapped) if mapped != *caller_value => {
                equalities.push(Predicate::equal(mapped, *caller_value));
            }
            Some(_) => {}
            None => substitution.bind(*callee_value, *caller_value),
        }
    }

    equalities
}

/// Conjoins `predicates` onto `condition`, feeding any equalities the oracle
/// learns along the way back in: learned facts can only sharpen the
/// unsatisfiability check that follows.
fn conjoin_all<O>(
    oracle: &O,
    condition: &O::PathCondition,
    predicates: &[Predicate],
) -> O::PathCondition
where
    O: ConstraintOracle,
{
    let mut condition = condition.clone();
    let mut pending = predicates.to_vec();
    while let Some(predicate) = pending.pop() {
        let (strengthened, learned) = oracle.assume(&condition, &predicate, false);
        condition = strengthened;
        pending.extend(learned);
    }
    condition
}

/// Checks whether `predicates` conjoined onto `condition` may still be
/// satisfiable.
fn is_feasible<O>(oracle: &O, condition: &O::PathCondition, predicates: &[Predicate]) -> bool
where
    O: ConstraintOracle,
{
    !oracle.is_unsatisfiable(&conjoin_all(oracle, condition, predicates))
}

/// Logs a warning when a disjunction has grown past the expected bound.
fn warn_if_oversized(state: &State) {
    if state.len() > DISJUNCTION_WARN_SIZE {
        tracing::warn!(
            disjuncts = state.len(),
            "the monitor disjunction has grown beyond the warning threshold"
        );
    }
}
