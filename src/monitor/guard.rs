//! This module contains the evaluation of transition guards into predicate
//! lists and the application of register-update actions.

use crate::{
    automaton::{GuardClause, GuardOperand, Register},
    constant::BARE_CLAUSE_LITERAL,
    error::invariant_violation,
    monitor::matcher::TransitionContext,
    predicate::{Operand, Predicate, RelOp},
    state::Memory,
};

/// Folds the conjunctive `guard` clause list into a predicate list, resolving
/// operands against the configuration's `memory` and the match's `context`.
///
/// Clause order is preserved. Equalities between one and the same abstract
/// value are trivially true and are not emitted at all, which keeps
/// functionally useless predicates from accumulating in pruned lists.
///
/// # Panics
///
/// Panics if a clause references a register absent from `memory` or a
/// variable absent from `context`; both are invariants the automaton builder
/// establishes.
pub(crate) fn eval_guard(
    memory: &Memory,
    context: &TransitionContext,
    guard: &[GuardClause],
) -> Vec<Predicate> {
    let mut predicates = Vec::with_capacity(guard.len());

    for clause in guard {
        let predicate = match clause {
            GuardClause::Comparison { op, lhs, rhs } => Predicate {
                op: *op,
                lhs: resolve_operand(memory, context, lhs),
                rhs: resolve_operand(memory, context, rhs),
            },
            GuardClause::Bare(operand) => Predicate {
                op: RelOp::Ne,
                lhs: resolve_operand(memory, context, operand),
                rhs: Operand::Constant(BARE_CLAUSE_LITERAL),
            },
        };

        if !predicate.is_trivially_true() {
            predicates.push(predicate);
        }
    }

    predicates
}

/// Resolves one guard operand to a predicate operand.
fn resolve_operand(
    memory: &Memory,
    context: &TransitionContext,
    operand: &GuardOperand,
) -> Operand {
    match operand {
        GuardOperand::Constant(literal) => Operand::Constant(*literal),
        GuardOperand::Register(register) => match memory.get(register) {
            Some(value) => Operand::Value(*value),
            None => invariant_violation(format_args!(
                "the register {register} is absent from the configuration's memory"
            )),
        },
        GuardOperand::Variable(variable) => match context.get(variable) {
            Some(value) => Operand::Value(*value),
            None => invariant_violation(format_args!(
                "the variable {variable:?} is absent from the transition context"
            )),
        },
    }
}

/// Applies the register-update `action` to `memory`: each `(register,
/// variable)` pair rebinds `register` to the value bound to `variable` by the
/// match.
///
/// # Panics
///
/// Panics if a variable is absent from `context`, an invariant the automaton
/// builder establishes.
pub(crate) fn apply_action(
    context: &TransitionContext,
    action: &[(Register, String)],
    memory: &mut Memory,
) {
    for (register, variable) in action {
        match context.get(variable) {
            Some(value) => memory.insert(register.clone(), *value),
            None => invariant_violation(format_args!(
                "the variable {variable:?} is absent from the transition context"
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        automaton::{GuardClause, GuardOperand, Register},
        monitor::{
            guard::{apply_action, eval_guard},
            matcher::TransitionContext,
        },
        predicate::{Operand, Predicate, RelOp},
        state::Memory,
        value::ValueSource,
    };

    #[test]
    fn preserves_clause_order() {
        let mut values = ValueSource::new();
        let held = values.fresh();
        let bound = values.fresh();

        let mut memory = Memory::new();
        memory.insert(Register::new("r"), held);
        let mut context = TransitionContext::new();
        context.insert("x".to_owned(), bound);

        let guard = vec![
            GuardClause::compare(
                RelOp::Lt,
                GuardOperand::register("r"),
                GuardOperand::constant(10),
            ),
            GuardClause::compare(
                RelOp::Eq,
                GuardOperand::register("r"),
                GuardOperand::variable("x"),
            ),
        ];

        let predicates = eval_guard(&memory, &context, &guard);
        assert_eq!(
            predicates,
            vec![
                Predicate::new(RelOp::Lt, held, 10),
                Predicate::equal(held, bound),
            ]
        );
    }

    #[test]
    fn drops_trivial_equalities() {
        let mut values = ValueSource::new();
        let held = values.fresh();

        let mut memory = Memory::new();
        memory.insert(Register::new("r"), held);
        let mut context = TransitionContext::new();
        context.insert("x".to_owned(), held);

        let guard = vec![GuardClause::compare(
            RelOp::Eq,
            GuardOperand::register("r"),
            GuardOperand::variable("x"),
        )];

        assert!(eval_guard(&memory, &context, &guard).is_empty());
    }

    #[test]
    fn desugars_bare_clauses() {
        let mut values = ValueSource::new();
        let bound = values.fresh();

        let memory = Memory::new();
        let mut context = TransitionContext::new();
        context.insert("x".to_owned(), bound);

        let guard = vec![GuardClause::Bare(GuardOperand::variable("x"))];
        let predicates = eval_guard(&memory, &context, &guard);

        assert_eq!(
            predicates,
            vec![Predicate::new(RelOp::Ne, Operand::Value(bound), Operand::Constant(1))]
        );
    }

    #[test]
    fn actions_rebind_registers() {
        let mut values = ValueSource::new();
        let old = values.fresh();
        let new = values.fresh();

        let mut memory = Memory::new();
        memory.insert(Register::new("r"), old);
        let mut context = TransitionContext::new();
        context.insert("x".to_owned(), new);

        let action = vec![(Register::new("r"), "x".to_owned())];
        apply_action(&context, &action, &mut memory);

        assert_eq!(memory.get(&Register::new("r")), Some(&new));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    #[should_panic(expected = "internal monitor invariant violated")]
    fn missing_registers_are_fatal() {
        let memory = Memory::new();
        let context = TransitionContext::new();
        let guard = vec![GuardClause::Bare(GuardOperand::register("missing"))];

        let _ = eval_guard(&memory, &context, &guard);
    }
}
