use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::{
    csp::{
        value::Value,
        variable::{VarId, Variable},
    },
    error::{CspError, Result},
};

/// A stable integer handle to a constraint stored in a [`Problem`] arena.
///
/// [`Problem`]: crate::csp::Problem
pub type ConstraintId = usize;

/// The relation a constraint enforces, as a first-class value.
///
/// The predicate receives the values of the *currently assigned* variables
/// among the constraint's variable list, in variable order. It must accept
/// any prefix of a satisfying assignment: return `true` while the partial
/// values could still be extended to a satisfying whole. Monotone relations
/// such as all-different are prefix-tolerant by nature; arity-sensitive
/// relations need an adapter that treats short inputs as provisionally true
/// (see [`evaluators::exact_length_exact_sum`]).
///
/// [`evaluators::exact_length_exact_sum`]: crate::csp::evaluators::exact_length_exact_sum
pub type Predicate<T> = Arc<dyn Fn(&[T]) -> bool + Send + Sync>;

/// One n-ary relation over a fixed list of problem variables.
///
/// Constraints are immutable after construction and refer to variables by
/// [`VarId`]; all state-dependent queries take the owning problem's variable
/// arena as an argument.
#[derive(Clone)]
pub struct Constraint<T> {
    vars: Vec<VarId>,
    var_set: HashSet<VarId>,
    predicate: Predicate<T>,
}

impl<T: Value> Constraint<T> {
    /// Creates a constraint over `vars`, rejecting repeated variables.
    pub fn new(
        vars: Vec<VarId>,
        predicate: impl Fn(&[T]) -> bool + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::with_predicate(vars, Arc::new(predicate))
    }

    /// Like [`new`](Self::new), for an already-shared predicate.
    pub fn with_predicate(vars: Vec<VarId>, predicate: Predicate<T>) -> Result<Self> {
        let mut var_set = HashSet::with_capacity(vars.len());
        for &var in &vars {
            if !var_set.insert(var) {
                return Err(CspError::DuplicateVariable(var).into());
            }
        }
        Ok(Self {
            vars,
            var_set,
            predicate,
        })
    }

    /// The fixed variable list, in predicate-argument order.
    pub fn variables(&self) -> &[VarId] {
        &self.vars
    }

    /// Whether `var` participates in this constraint.
    pub fn contains(&self, var: VarId) -> bool {
        self.var_set.contains(&var)
    }

    pub(crate) fn shares_predicate_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.predicate, &other.predicate)
    }

    /// Whether every referenced variable is assigned.
    pub fn is_completely_assigned(&self, vars: &[Variable<T>]) -> bool {
        self.vars.iter().all(|&var| vars[var].is_assigned())
    }

    /// Applies the predicate to the currently assigned values, ignoring
    /// unassigned variables. This is what lets partial assignments be
    /// pruned early.
    pub fn is_consistent(&self, vars: &[Variable<T>]) -> bool {
        let values: Vec<T> = self
            .vars
            .iter()
            .filter_map(|&var| vars[var].value_opt().cloned())
            .collect();
        (self.predicate)(&values)
    }

    /// Completely assigned *and* consistent.
    pub fn is_satisfied(&self, vars: &[Variable<T>]) -> bool {
        self.is_completely_assigned(vars) && self.is_consistent(vars)
    }

    /// The subset of `var`'s domain for which, with `var` temporarily set to
    /// each candidate, the predicate holds. Any prior assignment of `var` is
    /// restored on exit.
    pub fn consistent_domain(&self, vars: &mut [Variable<T>], var: VarId) -> Result<Vec<T>> {
        if !self.contains(var) {
            return Err(CspError::UncontainedVariable(var).into());
        }

        let prior = vars[var].value_opt().cloned();
        vars[var].unassign();

        let mut consistent = Vec::with_capacity(vars[var].domain().len());
        for index in 0..vars[var].domain().len() {
            vars[var].assign_by_index(index)?;
            if self.is_consistent(vars) {
                consistent.push(vars[var].value()?.clone());
            }
            vars[var].unassign();
        }

        if let Some(value) = prior {
            vars[var].assign(&value)?;
        }
        Ok(consistent)
    }

    /// Renders the constraint against the given variable state, in the shape
    /// used by [`Problem`](crate::csp::Problem)'s `Display`.
    pub fn render(&self, vars: &[Variable<T>]) -> String {
        let mut out = String::from("[");
        for &var in &self.vars {
            out.push_str(&vars[var].to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "constraint is completely assigned: {}. \
             constraint is consistent: {}. \
             constraint is satisfied: {}]",
            self.is_completely_assigned(vars),
            self.is_consistent(vars),
            self.is_satisfied(vars),
        ));
        out
    }
}

impl<T> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}
