//! This module contains the definition of the temporal-safety automaton: its
//! vertices, registers, and guarded transitions, along with the builder that
//! validates a definition before the monitor is allowed to simulate it.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::automaton::{Error, Result},
    predicate::RelOp,
};

/// An index into the automaton's vertex set.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Vertex {
    index: usize,
}

impl Vertex {
    /// Creates a new vertex wrapping the provided `index`.
    ///
    /// This function is not public so that every vertex in circulation refers
    /// to a vertex that its automaton actually declares.
    #[must_use]
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    /// Gets the index of the vertex within the automaton's vertex set.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl Display for Vertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.index)
    }
}

/// A register name drawn from the automaton's declared register set.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Register {
    name: String,
}

impl Register {
    /// Constructs a new register with the provided `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { name }
    }

    /// Gets the name of the register.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.name)
    }
}

/// The shape of event that a transition label matches.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Matches array-write events.
    ArrayWrite,

    /// Matches call events whose callee's display name matches the regular
    /// expression over the full name.
    ProcedureName(Regex),
}

/// A guard operand before resolution against a configuration's memory and a
/// transition context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GuardOperand {
    /// A literal integer.
    Constant(i64),

    /// The current contents of a declared register.
    Register(Register),

    /// A transition-local variable bound by the label's pattern match.
    Variable(String),
}

impl GuardOperand {
    /// Constructs an operand denoting a literal integer.
    #[must_use]
    pub fn constant(literal: i64) -> Self {
        Self::Constant(literal)
    }

    /// Constructs an operand denoting the contents of the named register.
    pub fn register(name: impl Into<String>) -> Self {
        Self::Register(Register::new(name))
    }

    /// Constructs an operand denoting a transition-local variable.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }
}

/// One conjunctive clause of a transition guard.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GuardClause {
    /// A relational comparison between two operands.
    Comparison {
        op: RelOp,
        lhs: GuardOperand,
        rhs: GuardOperand,
    },

    /// A bare operand clause, asserting that the bound value differs from the
    /// literal one.
    Bare(GuardOperand),
}

impl GuardClause {
    /// Constructs a comparison clause `lhs op rhs`.
    #[must_use]
    pub fn compare(op: RelOp, lhs: GuardOperand, rhs: GuardOperand) -> Self {
        Self::Comparison { op, lhs, rhs }
    }
}

/// The label on a transition: the event pattern it matches, the formals the
/// match binds, the guard that must hold for the transition to fire, and the
/// register updates applied when it does.
#[derive(Clone, Debug)]
pub struct Label {
    pattern: Pattern,
    formals: Option<Vec<String>>,
    guard: Vec<GuardClause>,
    action: Vec<(Register, String)>,
}

impl Label {
    /// Gets the event pattern of the label.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Gets the label's declared formals, or [`None`] when the label ignores
    /// arguments entirely.
    #[must_use]
    pub fn formals(&self) -> Option<&[String]> {
        self.formals.as_deref()
    }

    /// Gets the conjunctive guard clauses of the label.
    #[must_use]
    pub fn guard(&self) -> &[GuardClause] {
        &self.guard
    }

    /// Gets the register-update action of the label as `(register, variable)`
    /// pairs.
    #[must_use]
    pub fn action(&self) -> &[(Register, String)] {
        &self.action
    }
}

/// One transition of the automaton.
#[derive(Clone, Debug)]
pub struct Transition {
    source: Vertex,
    target: Vertex,
    label: Option<Label>,
}

impl Transition {
    /// Gets the source vertex of the transition.
    #[must_use]
    pub fn source(&self) -> Vertex {
        self.source
    }

    /// Gets the target vertex of the transition.
    #[must_use]
    pub fn target(&self) -> Vertex {
        self.target
    }

    /// Gets the label of the transition, or [`None`] for an "any" transition
    /// that matches every event unconditionally.
    #[must_use]
    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }
}

/// The user-specified temporal-safety property: vertices, registers, and
/// guarded transitions, together with the designated start and error vertices
/// and a message template per error vertex.
///
/// An automaton can only be obtained through [`AutomatonBuilder`], which
/// validates the definition upfront. The monitoring-time invariants that the
/// engine treats as fatal are exactly the properties established here.
#[derive(Clone, Debug)]
pub struct Automaton {
    vertex_count: usize,
    registers: Vec<Register>,
    transitions: Vec<Transition>,
    start_vertices: Vec<bool>,
    error_messages: Vec<Option<String>>,
    active: bool,
}

impl Automaton {
    /// Creates a builder for an automaton with `vertex_count` vertices.
    #[must_use]
    pub fn builder(vertex_count: usize) -> AutomatonBuilder {
        AutomatonBuilder::new(vertex_count)
    }

    /// Gets the number of vertices in the automaton.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// An iterator over every vertex of the automaton.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> {
        (0..self.vertex_count).map(Vertex::new)
    }

    /// Gets the automaton's declared register set.
    #[must_use]
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Gets the automaton's transitions, in declaration order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Checks whether `vertex` is a designated start vertex.
    #[must_use]
    pub fn is_start(&self, vertex: Vertex) -> bool {
        self.start_vertices[vertex.index()]
    }

    /// Checks whether `vertex` is a designated error vertex.
    #[must_use]
    pub fn is_error(&self, vertex: Vertex) -> bool {
        self.error_messages[vertex.index()].is_some()
    }

    /// Gets the message template declared for the error vertex `vertex`, or
    /// [`None`] if `vertex` is not an error vertex.
    #[must_use]
    pub fn message_for(&self, vertex: Vertex) -> Option<&str> {
        self.error_messages[vertex.index()].as_deref()
    }

    /// Checks whether this monitor is active for the current run.
    ///
    /// An inactive monitor does no work: its disjunctions are empty from
    /// [`crate::monitor::Monitor::start`] onwards.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// The specification of a transition label handed to the builder.
///
/// Patterns are carried as source text here; they are compiled and validated
/// by [`AutomatonBuilder::build`] so that failures carry the transition they
/// belong to.
#[derive(Clone, Debug)]
pub struct LabelSpec {
    pattern: PatternSpec,
    formals: Option<Vec<String>>,
    guard: Vec<GuardClause>,
    action: Vec<(Register, String)>,
}

/// The as-yet-uncompiled pattern of a [`LabelSpec`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum PatternSpec {
    ArrayWrite,
    ProcedureName(String),
}

impl LabelSpec {
    /// Creates a label matching call events whose callee's display name
    /// matches `pattern` in full.
    ///
    /// The label ignores arguments until formals are declared with
    /// [`Self::with_formals`].
    pub fn on_call(pattern: impl Into<String>) -> Self {
        let pattern = PatternSpec::ProcedureName(pattern.into());
        Self {
            pattern,
            formals: None,
            guard: Vec::new(),
            action: Vec::new(),
        }
    }

    /// Creates a label matching array-write events, binding the written
    /// array's value to the formal `array` and the index's value to the
    /// formal `index`.
    pub fn on_array_write(array: impl Into<String>, index: impl Into<String>) -> Self {
        let pattern = PatternSpec::ArrayWrite;
        let formals = Some(vec![array.into(), index.into()]);
        Self {
            pattern,
            formals,
            guard: Vec::new(),
            action: Vec::new(),
        }
    }

    /// Declares the formals bound by the label's pattern match.
    ///
    /// For call labels, the return value (when present) binds to the last
    /// formal and the remaining formals bind positionally to the arguments.
    #[must_use]
    pub fn with_formals<S>(mut self, formals: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        self.formals = Some(formals.into_iter().map(Into::into).collect());
        self
    }

    /// Appends `clause` to the label's conjunctive guard.
    #[must_use]
    pub fn with_guard(mut self, clause: GuardClause) -> Self {
        self.guard.push(clause);
        self
    }

    /// Appends the register update `register := variable` to the label's
    /// action.
    pub fn with_action(mut self, register: impl Into<String>, variable: impl Into<String>) -> Self {
        self.action.push((Register::new(register), variable.into()));
        self
    }
}

/// An assembler for [`Automaton`] values that validates the definition as a
/// whole when [`Self::build`] is called.
#[derive(Clone, Debug)]
pub struct AutomatonBuilder {
    vertex_count: usize,
    registers: Vec<Register>,
    transitions: Vec<(usize, usize, Option<LabelSpec>)>,
    start_vertices: BTreeSet<usize>,
    error_messages: Vec<(usize, String)>,
    active: bool,
}

impl AutomatonBuilder {
    /// Creates a builder for an automaton with `vertex_count` vertices.
    ///
    /// The built monitor is active unless [`Self::inactive`] is called.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            registers: Vec::new(),
            transitions: Vec::new(),
            start_vertices: BTreeSet::new(),
            error_messages: Vec::new(),
            active: true,
        }
    }

    /// Declares a register named `name`.
    pub fn register(mut self, name: impl Into<String>) -> Self {
        self.registers.push(Register::new(name));
        self
    }

    /// Designates `vertex` as a start vertex.
    #[must_use]
    pub fn start(mut self, vertex: usize) -> Self {
        self.start_vertices.insert(vertex);
        self
    }

    /// Designates `vertex` as an error vertex carrying the provided `message`
    /// template.
    pub fn error(mut self, vertex: usize, message: impl Into<String>) -> Self {
        self.error_messages.push((vertex, message.into()));
        self
    }

    /// Declares a labelled transition from `source` to `target`.
    #[must_use]
    pub fn transition(mut self, source: usize, target: usize, label: LabelSpec) -> Self {
        self.transitions.push((source, target, Some(label)));
        self
    }

    /// Declares an unlabelled "any" transition from `source` to `target`,
    /// which matches every event unconditionally.
    #[must_use]
    pub fn any_transition(mut self, source: usize, target: usize) -> Self {
        self.transitions.push((source, target, None));
        self
    }

    /// Marks the monitor as inactive for this run.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Validates the accumulated definition and assembles the automaton.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if any vertex reference is out of bounds, a register
    /// is declared twice, an array-write label does not declare exactly two
    /// formals, a pattern fails to compile, or a guard or action references
    /// an undeclared register or variable.
    pub fn build(self) -> Result<Automaton> {
        if self.vertex_count == 0 {
            return Err(Error::NoVertices);
        }

        let mut seen_registers = BTreeSet::new();
        for register in &self.registers {
            if !seen_registers.insert(register.name().to_owned()) {
                return Err(Error::DuplicateRegister {
                    register: register.name().to_owned(),
                });
            }
        }

        for vertex in self
            .start_vertices
            .iter()
            .copied()
            .chain(self.error_messages.iter().map(|(vertex, _)| *vertex))
        {
            if vertex >= self.vertex_count {
                return Err(Error::DesignatedVertexOutOfBounds {
                    vertex,
                    count: self.vertex_count,
                });
            }
        }

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for (index, (source, target, label)) in self.transitions.into_iter().enumerate() {
            for vertex in [source, target] {
                if vertex >= self.vertex_count {
                    return Err(Error::VertexOutOfBounds {
                        transition: index,
                        vertex,
                        count: self.vertex_count,
                    });
                }
            }

            let label = match label {
                None => None,
                Some(spec) => Some(Self::build_label(index, spec, &seen_registers)?),
            };

            transitions.push(Transition {
                source: Vertex::new(source),
                target: Vertex::new(target),
                label,
            });
        }

        let mut start_vertices = vec![false; self.vertex_count];
        for vertex in self.start_vertices {
            start_vertices[vertex] = true;
        }

        let mut error_messages = vec![None; self.vertex_count];
        for (vertex, message) in self.error_messages {
            error_messages[vertex] = Some(message);
        }

        Ok(Automaton {
            vertex_count: self.vertex_count,
            registers: self.registers,
            transitions,
            start_vertices,
            error_messages,
            active: self.active,
        })
    }

    /// Validates and compiles one label specification.
    fn build_label(
        transition: usize,
        spec: LabelSpec,
        registers: &BTreeSet<String>,
    ) -> Result<Label> {
        let pattern = match spec.pattern {
            PatternSpec::ArrayWrite => {
                let declared = spec.formals.as_ref().map_or(0, Vec::len);
                if declared != 2 {
                    return Err(Error::BadArrayWriteArity {
                        transition,
                        declared,
                    });
                }
                Pattern::ArrayWrite
            }
            PatternSpec::ProcedureName(pattern) => {
                // Anchor the pattern so matching is over the full display
                // name rather than any substring of it.
                let anchored = format!("^(?:{pattern})$");
                let regex = Regex::new(&anchored).map_err(|e| Error::InvalidPattern {
                    transition,
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                Pattern::ProcedureName(regex)
            }
        };

        let formals: BTreeSet<&str> = spec
            .formals
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();

        let check_operand = |operand: &GuardOperand| -> Result<()> {
            match operand {
                GuardOperand::Constant(_) => Ok(()),
                GuardOperand::Register(register) => {
                    if registers.contains(register.name()) {
                        Ok(())
                    } else {
                        Err(Error::UndeclaredRegister {
                            transition,
                            register: register.name().to_owned(),
                        })
                    }
                }
                GuardOperand::Variable(variable) => {
                    if formals.contains(variable.as_str()) {
                        Ok(())
                    } else {
                        Err(Error::UndeclaredVariable {
                            transition,
                            variable: variable.clone(),
                        })
                    }
                }
            }
        };

        for clause in &spec.guard {
            match clause {
                GuardClause::Comparison { lhs, rhs, .. } => {
                    check_operand(lhs)?;
                    check_operand(rhs)?;
                }
                GuardClause::Bare(operand) => check_operand(operand)?,
            }
        }

        for (register, variable) in &spec.action {
            if !registers.contains(register.name()) {
                return Err(Error::UndeclaredRegister {
                    transition,
                    register: register.name().to_owned(),
                });
            }
            if !formals.contains(variable.as_str()) {
                return Err(Error::UndeclaredVariable {
                    transition,
                    variable: variable.clone(),
                });
            }
        }

        Ok(Label {
            pattern,
            formals: spec.formals,
            guard: spec.guard,
            action: spec.action,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        automaton::{Automaton, GuardClause, GuardOperand, LabelSpec, Vertex},
        error::automaton::Error,
        predicate::RelOp,
    };

    #[test]
    fn builds_a_valid_automaton() -> anyhow::Result<()> {
        let automaton = Automaton::builder(3)
            .register("handle")
            .start(0)
            .error(2, "resource used after release")
            .transition(
                0,
                1,
                LabelSpec::on_call("acquire")
                    .with_formals(["out"])
                    .with_action("handle", "out"),
            )
            .transition(
                1,
                2,
                LabelSpec::on_call("release").with_formals(["res"]).with_guard(
                    GuardClause::compare(
                        RelOp::Eq,
                        GuardOperand::register("handle"),
                        GuardOperand::variable("res"),
                    ),
                ),
            )
            .build()?;

        assert_eq!(automaton.vertex_count(), 3);
        assert_eq!(automaton.registers().len(), 1);
        assert_eq!(automaton.transitions().len(), 2);
        assert!(automaton.is_start(Vertex::new(0)));
        assert!(automaton.is_error(Vertex::new(2)));
        assert!(!automaton.is_error(Vertex::new(1)));
        assert!(automaton.is_active());

        Ok(())
    }

    #[test]
    fn rejects_out_of_bounds_vertices() {
        let result = Automaton::builder(2).any_transition(0, 5).build();

        assert_eq!(
            result.unwrap_err(),
            Error::VertexOutOfBounds {
                transition: 0,
                vertex: 5,
                count: 2,
            }
        );
    }

    #[test]
    fn rejects_array_write_labels_without_two_formals() {
        let label = LabelSpec::on_array_write("a", "i").with_formals(["a"]);
        let result = Automaton::builder(2).transition(0, 1, label).build();

        assert_eq!(
            result.unwrap_err(),
            Error::BadArrayWriteArity {
                transition: 0,
                declared: 1,
            }
        );
    }

    #[test]
    fn rejects_invalid_patterns() {
        let result = Automaton::builder(2)
            .transition(0, 1, LabelSpec::on_call("("))
            .build();

        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPattern { transition: 0, .. }
        ));
    }

    #[test]
    fn rejects_undeclared_registers_in_actions() {
        let label = LabelSpec::on_call("f").with_formals(["x"]).with_action("missing", "x");
        let result = Automaton::builder(2).transition(0, 1, label).build();

        assert_eq!(
            result.unwrap_err(),
            Error::UndeclaredRegister {
                transition: 0,
                register: "missing".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_guard_variables_outside_the_formals() {
        let label = LabelSpec::on_call("f").with_formals(["x"]).with_guard(
            GuardClause::Bare(GuardOperand::variable("y")),
        );
        let result = Automaton::builder(2).transition(0, 1, label).build();

        assert_eq!(
            result.unwrap_err(),
            Error::UndeclaredVariable {
                transition: 0,
                variable: "y".to_owned(),
            }
        );
    }
}
