use im::HashMap;

use crate::csp::{value::Value, variable::VarId};

/// A snapshot mapping assigned variables to the value they held at capture
/// time.
///
/// Backed by a persistent map, so checkpointing inside a search loop and
/// carrying populations of candidate assignments clone in O(1) with
/// structural sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<T> {
    values: HashMap<VarId, T>,
}

impl<T: Value> Assignment<T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, var: VarId, value: T) {
        self.values.insert(var, value);
    }

    pub fn get(&self, var: VarId) -> Option<&T> {
        self.values.get(&var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &T)> {
        self.values.iter().map(|(&var, value)| (var, value))
    }
}

impl<T: Value> Default for Assignment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> FromIterator<(VarId, T)> for Assignment<T> {
    fn from_iter<I: IntoIterator<Item = (VarId, T)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// An ordered log of assignment events, `None` denoting an unassign.
///
/// Solvers append to a history only when the caller opts in; the log is for
/// debugging and visualization, not for round-tripping state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentHistory<T> {
    events: Vec<(VarId, Option<T>)>,
}

impl<T: Value> AssignmentHistory<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push_assign(&mut self, var: VarId, value: T) {
        self.events.push((var, Some(value)));
    }

    pub fn push_unassign(&mut self, var: VarId) {
        self.events.push((var, None));
    }

    pub fn events(&self) -> &[(VarId, Option<T>)] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T: Value> Default for AssignmentHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends an event to an optional history without obliging every call site
/// to unwrap the option.
pub(crate) fn record<T: Value>(
    history: &mut Option<&mut AssignmentHistory<T>>,
    var: VarId,
    value: Option<T>,
) {
    if let Some(history) = history {
        match value {
            Some(value) => history.push_assign(var, value),
            None => history.push_unassign(var),
        }
    }
}
