//! This module contains the definition of the abstract value type and the
//! source of fresh abstract values used by the monitor.

use std::{
    fmt::{Display, Formatter},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};

/// A source of new, unique, abstract values.
///
/// It is guaranteed that no matter how many times you clone the source, the
/// clones all draw from the same underlying pool and hence cannot mint
/// duplicate values.
///
/// # Value Pools
///
/// Care must be taken not to mix abstract values from independent pools, as
/// these _could_ produce duplicates. In practice one source is created per
/// analysis run and shared between the monitor and every substitution derived
/// from it.
#[derive(Clone, Debug)]
pub struct ValueSource {
    last_value: Arc<AtomicUsize>,
}

impl ValueSource {
    /// Creates a new source of unique abstract values.
    #[must_use]
    pub fn new() -> Self {
        let last_value = Arc::new(AtomicUsize::from(0));
        Self { last_value }
    }

    /// Requests a new unique abstract value from the source.
    #[must_use]
    pub fn fresh(&mut self) -> AbstractValue {
        let source = self.last_value.fetch_add(1, Ordering::Relaxed);
        unsafe { AbstractValue::wrapping(source) }
    }

    /// Gets the number of abstract values that have been allocated by this
    /// source.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.last_value.load(Ordering::Relaxed)
    }
}

impl Default for ValueSource {
    fn default() -> Self {
        Self::new()
    }
}

/// An abstract value is an opaque, totally ordered identifier standing for a
/// symbolic runtime value owned by the host abstract domain.
///
/// The monitor only ever creates these, compares them, and substitutes them
/// across procedure-call boundaries; it attaches no arithmetic meaning to
/// them.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct AbstractValue {
    id: usize,
}

impl AbstractValue {
    /// Creates a new abstract value wrapping the provided `id`.
    ///
    /// This function is not public as it is intended to only be accessible in
    /// the current module so that the [`ValueSource`] is the only source of
    /// abstract values for a program.
    ///
    /// # Safety
    ///
    /// Calling this function allows uncontrolled creation of abstract values,
    /// so care must be taken even when accounting for its only being
    /// accessible in this module.
    #[must_use]
    unsafe fn wrapping(id: usize) -> Self {
        AbstractValue { id }
    }
}

impl Display for AbstractValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v[{}]", &self.id)
    }
}

impl From<&AbstractValue> for AbstractValue {
    fn from(value: &AbstractValue) -> Self {
        *value
    }
}

#[cfg(test)]
mod test {
    use crate::value::ValueSource;

    #[test]
    fn mints_distinct_values() {
        let mut source = ValueSource::new();
        let first = source.fresh();
        let second = source.fresh();

        assert_ne!(first, second);
        assert_eq!(source.allocated_count(), 2);
    }

    #[test]
    fn clones_share_the_pool() {
        let mut source = ValueSource::new();
        let mut clone = source.clone();

        let from_source = source.fresh();
        let from_clone = clone.fresh();

        assert_ne!(from_source, from_clone);
        assert_eq!(source.allocated_count(), 2);
    }

    #[test]
    fn values_are_totally_ordered() {
        let mut source = ValueSource::new();
        let first = source.fresh();
        let second = source.fresh();

        assert!(first < second);
    }
}
