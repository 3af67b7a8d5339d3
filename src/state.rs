//! This module contains the definition of monitor configurations, partial
//! runs, and the disjunctions of partial runs that the engine evolves.

use std::rc::Rc;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::{
    automaton::{Register, Vertex},
    data::LinearMap,
    event::{Event, Location, ProcedureName},
    predicate::Predicate,
    value::AbstractValue,
};

/// The register memory of a configuration: a unique-key mapping from the
/// automaton's declared registers to abstract values.
pub type Memory = LinearMap<Register, AbstractValue>;

/// "The monitor is at this automaton vertex with these register contents."
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Configuration {
    /// The automaton vertex the monitor has reached.
    pub vertex: Vertex,

    /// The register contents at that vertex.
    pub memory: Memory,
}

impl Configuration {
    /// Brings the configuration into canonical form by sorting its memory by
    /// register name.
    pub fn normalize(&mut self) {
        self.memory.sort_keys();
    }
}

/// One transcript entry in a partial run's lineage.
///
/// Steps are shared, immutable, and strictly older than every simple state
/// referring to them, so the lineage graph is acyclic by construction.
#[derive(Clone, Debug)]
pub struct Step {
    /// The program location at which the step was taken.
    pub location: Location,

    /// The simple state the step was taken from.
    pub predecessor: SimpleState,

    /// What the step consisted of.
    pub data: StepData,
}

/// The payload of one transcript entry.
#[derive(Clone, Debug)]
pub enum StepData {
    /// One event was consumed in the current procedure.
    Small {
        /// The event that advanced the monitor.
        event: Event,
    },

    /// A callee's summary was composed in at a call site.
    Large {
        /// The identity of the callee.
        callee: ProcedureName,

        /// The callee's substituted post-summary, carrying the callee's own
        /// lineage for nested trace reconstruction.
        post_summary: SimpleState,
    },
}

/// One hypothesis about the monitor's progress: the monitor entered the
/// current procedure at `pre` and has so far reached `post`, subject to the
/// accumulated `pruned` predicates.
///
/// The `last_step` back-link forms the run's lineage. It is used only for
/// trace reconstruction and is therefore excluded from equality, hashing,
/// and serialization: two runs that agree on `pre`, `post`, and `pruned` are
/// the same hypothesis however they were arrived at.
#[derive(Clone, Debug, Derivative, Deserialize, Serialize)]
#[derivative(PartialEq, Hash)]
pub struct SimpleState {
    /// The configuration the monitor held at procedure entry.
    pub pre: Configuration,

    /// The configuration the monitor holds now.
    pub post: Configuration,

    /// The conjunctive predicates under which this hypothesis is reachable.
    pub pruned: Vec<Predicate>,

    /// The most recent transcript entry of this run, if any step has been
    /// recorded.
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    #[serde(skip)]
    pub last_step: Option<Rc<Step>>,
}

impl Eq for SimpleState {}

impl SimpleState {
    /// Constructs the partial run of a fresh procedure invocation sitting at
    /// `configuration`, with nothing assumed and nothing recorded.
    #[must_use]
    pub fn initial(configuration: Configuration) -> Self {
        Self {
            pre: configuration.clone(),
            post: configuration,
            pruned: Vec::new(),
            last_step: None,
        }
    }

    /// Brings the simple state into canonical structural form: both
    /// configurations' memories sorted by register name and the pruned list
    /// sorted by the predicates' fixed total order.
    ///
    /// Canonical form is what makes structural deduplication and
    /// deterministic comparison independent of construction order.
    pub fn normalize(&mut self) {
        self.pre.normalize();
        self.post.normalize();
        self.pruned.sort_unstable();
    }
}

/// A disjunction of partial runs: the monitor is in exactly one of these
/// configurations, we don't yet know which.
///
/// The order of the simple states within a state carries no meaning.
pub type State = Vec<SimpleState>;
