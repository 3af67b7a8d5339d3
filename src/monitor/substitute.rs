//! This module contains the substitution that maps abstract values from a
//! callee's local scope into the caller's scope when a callee summary is
//! spliced into the caller's run.

use std::collections::HashMap;

use crate::{
    predicate::{Operand, Predicate},
    state::{Configuration, Memory, SimpleState},
    value::{AbstractValue, ValueSource},
};

/// A value-to-value mapping from callee scope into caller scope, built
/// lazily: resolving a not-yet-mapped value allocates a fresh caller-scope
/// value and extends the mapping.
///
/// Substitutions share the monitor's value pool, so the values they allocate
/// can never collide with values minted elsewhere in the analysis.
#[derive(Clone, Debug)]
pub struct Substitution {
    map: HashMap<AbstractValue, AbstractValue>,
    values: ValueSource,
}

impl Substitution {
    /// Creates a new, empty, substitution allocating out of `values`.
    #[must_use]
    pub fn new(values: ValueSource) -> Self {
        let map = HashMap::new();
        Self { map, values }
    }

    /// Gets the existing mapping for `value`, without allocating.
    #[must_use]
    pub fn lookup(&self, value: AbstractValue) -> Option<AbstractValue> {
        self.map.get(&value).copied()
    }

    /// Extends the substitution with the mapping `from -> to` directly.
    ///
    /// This is the cheapest form of unification: binding an unmapped callee
    /// value straight to its caller counterpart needs no equality predicate
    /// at all.
    pub fn bind(&mut self, from: AbstractValue, to: AbstractValue) {
        self.map.insert(from, to);
    }

    /// Resolves `value` through the substitution, allocating and recording a
    /// fresh target value if `value` has not been mapped yet.
    #[must_use]
    pub fn resolve(&mut self, value: AbstractValue) -> AbstractValue {
        match self.map.get(&value) {
            Some(mapped) => *mapped,
            None => {
                let fresh = self.values.fresh();
                self.map.insert(value, fresh);
                fresh
            }
        }
    }

    /// Applies the substitution to a predicate operand; literals pass through
    /// untouched.
    pub fn apply_operand(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Constant(_) => operand,
            Operand::Value(value) => Operand::Value(self.resolve(value)),
        }
    }

    /// Applies the substitution to a predicate.
    pub fn apply_predicate(&mut self, predicate: &Predicate) -> Predicate {
        Predicate {
            op: predicate.op,
            lhs: self.apply_operand(predicate.lhs),
            rhs: self.apply_operand(predicate.rhs),
        }
    }

    /// Applies the substitution to a configuration, rebinding the memory's
    /// values but never its register names.
    pub fn apply_configuration(&mut self, configuration: &Configuration) -> Configuration {
        let mut memory = Memory::with_capacity(configuration.memory.len());
        for (register, value) in configuration.memory.iter() {
            memory.insert(register.clone(), self.resolve(*value));
        }

        Configuration {
            vertex: configuration.vertex,
            memory,
        }
    }

    /// Applies the substitution to a whole simple state: `pre`, `post`, and
    /// `pruned`.
    ///
    /// The lineage chain is deliberately left untouched, both because trace
    /// reconstruction does not need substituted identities and because
    /// rewriting a shared history would be wasted work.
    pub fn apply_simple_state(&mut self, state: &SimpleState) -> SimpleState {
        SimpleState {
            pre: self.apply_configuration(&state.pre),
            post: self.apply_configuration(&state.post),
            pruned: state
                .pruned
                .iter()
                .map(|predicate| self.apply_predicate(predicate))
                .collect(),
            last_step: state.last_step.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        automaton::Register,
        monitor::substitute::Substitution,
        predicate::{Operand, Predicate, RelOp},
        state::{Configuration, Memory},
        value::ValueSource,
    };

    #[test]
    fn resolving_unmapped_values_allocates_fresh_targets() {
        let mut values = ValueSource::new();
        let source_value = values.fresh();
        let mut substitution = Substitution::new(values);

        let first = substitution.resolve(source_value);
        let second = substitution.resolve(source_value);

        assert_ne!(first, source_value);
        assert_eq!(first, second);
    }

    #[test]
    fn bound_values_resolve_without_allocation() {
        let mut values = ValueSource::new();
        let from = values.fresh();
        let to = values.fresh();
        let mut substitution = Substitution::new(values.clone());

        substitution.bind(from, to);
        let allocated_before = values.allocated_count();

        assert_eq!(substitution.resolve(from), to);
        assert_eq!(values.allocated_count(), allocated_before);
    }

    #[test]
    fn literals_pass_through_untouched() {
        let values = ValueSource::new();
        let mut substitution = Substitution::new(values);

        assert_eq!(
            substitution.apply_operand(Operand::Constant(7)),
            Operand::Constant(7)
        );
    }

    #[test]
    fn substitution_with_a_fixed_map_is_deterministic() {
        let mut values = ValueSource::new();
        let from = values.fresh();
        let to = values.fresh();
        let vertex_automaton = crate::automaton::Automaton::builder(1).build().unwrap();
        let vertex = vertex_automaton.vertices().next().unwrap();

        let mut memory = Memory::new();
        memory.insert(Register::new("r"), from);
        let configuration = Configuration { vertex, memory };

        let mut substitution = Substitution::new(values);
        substitution.bind(from, to);

        let first = substitution.apply_configuration(&configuration);
        let second = substitution.apply_configuration(&configuration);
        assert_eq!(first, second);
    }

    #[test]
    fn predicates_rebind_value_operands_only() {
        let mut values = ValueSource::new();
        let from = values.fresh();
        let to = values.fresh();
        let mut substitution = Substitution::new(values);
        substitution.bind(from, to);

        let predicate = Predicate::new(RelOp::Ge, from, 3);
        let substituted = substitution.apply_predicate(&predicate);

        assert_eq!(substituted, Predicate::new(RelOp::Ge, to, 3));
    }
}
