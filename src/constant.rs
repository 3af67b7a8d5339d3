//! This module contains constants that are needed throughout the codebase.

/// The disjunction size beyond which the engine logs a warning.
///
/// Small-step evolution can grow a disjunction multiplicatively per event.
/// Feasibility filtering and simplification are expected to keep sizes far
/// below this bound; crossing it suggests the host is not simplifying between
/// steps or that the automaton's guards are too weak to prune anything.
pub const DISJUNCTION_WARN_SIZE: usize = 512;

/// The literal that a bare guard clause asserts its operand differs from.
///
/// A bare clause `v` desugars to the predicate `v != BARE_CLAUSE_LITERAL`.
pub const BARE_CLAUSE_LITERAL: i64 = 1;
