//! This module contains the canonicalization and compaction of disjunctions,
//! used to bound the size of a state before it is persisted as a procedure
//! summary.

use std::collections::HashSet;

use crate::{
    state::{SimpleState, State},
    value::AbstractValue,
};

/// Brings every simple state of `state` into canonical structural form.
pub(crate) fn normalize_state(state: &mut State) {
    for simple_state in state.iter_mut() {
        simple_state.normalize();
    }
}

/// Compacts `state` for storage as a procedure summary.
///
/// For each simple state, the live values are those reachable from the pre
/// and post memories together with the externally supplied `keep` set of
/// values still relevant to the host's own path condition. Predicates whose
/// operands are not all live constrain nothing observable any more and are
/// dropped; literals are always live. The resulting simple states are
/// normalized and deduplicated structurally, ignoring lineage.
pub(crate) fn simplify(keep: &HashSet<AbstractValue>, state: State) -> State {
    let mut result: State = state
        .into_iter()
        .map(|simple_state| simplify_simple_state(keep, simple_state))
        .collect();

    let mut seen: HashSet<SimpleState> = HashSet::with_capacity(result.len());
    result.retain(|simple_state| seen.insert(simple_state.clone()));
    result
}

/// Drops dead predicates from one simple state and normalizes it.
fn simplify_simple_state(keep: &HashSet<AbstractValue>, mut state: SimpleState) -> SimpleState {
    let mut live: HashSet<AbstractValue> = keep.clone();
    live.extend(state.pre.memory.values().copied());
    live.extend(state.post.memory.values().copied());

    state.pruned.retain(|predicate| {
        [predicate.lhs, predicate.rhs]
            .iter()
            .all(|operand| operand.as_value().map_or(true, |value| live.contains(&value)))
    });

    state.normalize();
    state
}
