//! This module contains the type definitions necessary to consult the host
//! analyzer's path condition while advancing the monitor.
//!
//! # Best-Effort Pruning
//!
//! The unsatisfiability check is a cheap, incomplete, but sound filter: an
//! answer of `true` means the condition definitely has no model, while
//! `false` only means the oracle could not refute it. The monitor uses the
//! check purely to discard impossible partial runs, so an imprecise oracle
//! costs disjunction size, never soundness of the reported errors.

use std::{collections::BTreeSet, fmt::Debug};

use crate::predicate::Predicate;

/// The interface to the host's abstract-value arithmetic domain, used to
/// accumulate relational predicates into an opaque path condition and to
/// check such conditions for unsatisfiability.
pub trait ConstraintOracle {
    /// The opaque path-condition representation owned by the host.
    type PathCondition: Clone + Debug;

    /// Conjoins `predicate` (negated when `negate` is set) onto
    /// `condition`, returning the strengthened condition together with any
    /// equalities the oracle discovered while normalising it.
    fn assume(
        &self,
        condition: &Self::PathCondition,
        predicate: &Predicate,
        negate: bool,
    ) -> (Self::PathCondition, Vec<Predicate>);

    /// Checks whether `condition` is definitely unsatisfiable.
    #[must_use]
    fn is_unsatisfiable(&self, condition: &Self::PathCondition) -> bool;
}

/// An implementation of the [`ConstraintOracle`] trait that considers every
/// condition satisfiable and learns nothing.
///
/// Under this oracle no partial run is ever pruned, so the monitor tracks
/// every hypothesis the automaton admits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TrivialOracle;

impl ConstraintOracle for TrivialOracle {
    type PathCondition = ();

    fn assume(
        &self,
        _condition: &Self::PathCondition,
        _predicate: &Predicate,
        _negate: bool,
    ) -> (Self::PathCondition, Vec<Predicate>) {
        ((), Vec::new())
    }

    fn is_unsatisfiable(&self, _condition: &Self::PathCondition) -> bool {
        false
    }
}

/// An oracle whose path condition is the set of predicates assumed so far,
/// refuting a condition only when it contains a directly contradictory pair
/// or a false literal comparison.
///
/// This is deliberately weak: it knows nothing about transitivity or
/// arithmetic. It exists for hosts without a real solver and for exercising
/// the feasibility gates in tests.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SyntacticOracle;

impl ConstraintOracle for SyntacticOracle {
    type PathCondition = BTreeSet<Predicate>;

    fn assume(
        &self,
        condition: &Self::PathCondition,
        predicate: &Predicate,
        negate: bool,
    ) -> (Self::PathCondition, Vec<Predicate>) {
        let assumed = if negate {
            predicate.negated()
        } else {
            *predicate
        };

        let mut condition = condition.clone();
        condition.insert(assumed);
        (condition, Vec::new())
    }

    fn is_unsatisfiable(&self, condition: &Self::PathCondition) -> bool {
        condition.iter().any(|predicate| {
            predicate.constant_truth() == Some(false)
                || condition.contains(&predicate.negated())
        })
    }
}
