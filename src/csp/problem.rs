use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::Rng;
use tracing::trace;

use crate::{
    csp::{
        assignment::{record, Assignment, AssignmentHistory},
        constraint::{Constraint, ConstraintId},
        value::Value,
        variable::{VarId, Variable},
    },
    error::{CspError, Result},
};

/// A finite-domain constraint satisfaction problem.
///
/// The problem owns both arenas, variables and constraints, plus the
/// derived indices over them: which constraints each variable appears in,
/// and the (symmetric) neighbor graph of variables sharing a constraint.
/// The topology never changes after construction; all mutation flows
/// through the contained variables via [`variable_mut`](Self::variable_mut)
/// and the bulk assignment helpers.
///
/// Solvers assume exclusive access to one problem for the duration of a
/// call. To run several solvers at once, give each its own replica from
/// [`deep_copy`](Self::deep_copy).
#[derive(Debug, Clone)]
pub struct Problem<T> {
    variables: Vec<Variable<T>>,
    constraints: Vec<Constraint<T>>,
    var_constraints: Vec<Vec<ConstraintId>>,
    neighbors: Vec<Vec<VarId>>,
    names: HashMap<String, VarId>,
}

impl<T: Value> Problem<T> {
    /// Builds a problem from its variable and constraint arenas.
    ///
    /// Rejects constraints referencing unknown variable ids and repeated
    /// constraints (same variable list, same shared predicate). Unary
    /// constraints are enforced here, once: each prunes its variable's
    /// domain down to the consistent subset.
    pub fn new(variables: Vec<Variable<T>>, constraints: Vec<Constraint<T>>) -> Result<Self> {
        Self::with_names(variables, constraints, HashMap::new())
    }

    /// Like [`new`](Self::new), with a name → variable directory for user
    /// convenience.
    pub fn with_names(
        mut variables: Vec<Variable<T>>,
        constraints: Vec<Constraint<T>>,
        names: HashMap<String, VarId>,
    ) -> Result<Self> {
        for constraint in &constraints {
            for &var in constraint.variables() {
                if variables.len() <= var {
                    return Err(CspError::UnknownVariable(var).into());
                }
            }
        }
        for &var in names.values() {
            if variables.len() <= var {
                return Err(CspError::UnknownVariable(var).into());
            }
        }
        for (id, constraint) in constraints.iter().enumerate() {
            let duplicate = constraints[..id].iter().any(|earlier| {
                earlier.shares_predicate_with(constraint)
                    && earlier.variables() == constraint.variables()
            });
            if duplicate {
                return Err(CspError::DuplicateConstraint(id).into());
            }
        }

        let mut var_constraints = vec![Vec::new(); variables.len()];
        for (id, constraint) in constraints.iter().enumerate() {
            for &var in constraint.variables() {
                var_constraints[var].push(id);
            }
        }

        let mut neighbors = Vec::with_capacity(variables.len());
        for var in 0..variables.len() {
            let mut adjacent: HashSet<VarId> = HashSet::new();
            for &cid in &var_constraints[var] {
                adjacent.extend(constraints[cid].variables().iter().copied());
            }
            adjacent.remove(&var);
            let mut adjacent: Vec<VarId> = adjacent.into_iter().collect();
            adjacent.sort_unstable();
            neighbors.push(adjacent);
        }

        for constraint in &constraints {
            if let [var] = *constraint.variables() {
                if !variables[var].is_assigned() {
                    let consistent = constraint.consistent_domain(&mut variables, var)?;
                    variables[var].set_subset_domain(&consistent)?;
                }
            }
        }

        Ok(Self {
            variables,
            constraints,
            var_constraints,
            neighbors,
            names,
        })
    }

    /// An independent replica with fresh variable and constraint storage.
    ///
    /// Handles carry over unchanged: `VarId` n in the copy denotes the
    /// copied variable n. Restart-based local search uses this to explore
    /// without disturbing the caller's problem.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    // ------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------

    pub fn variables(&self) -> &[Variable<T>] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &Variable<T> {
        &self.variables[var]
    }

    /// Mutable access to one variable; this is the designated mutation path
    /// for assignment and domain operations.
    pub fn variable_mut(&mut self, var: VarId) -> &mut Variable<T> {
        &mut self.variables[var]
    }

    pub fn variable_ids(&self) -> std::ops::Range<VarId> {
        0..self.variables.len()
    }

    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint<T> {
        &self.constraints[id]
    }

    pub fn constraint_ids(&self) -> std::ops::Range<ConstraintId> {
        0..self.constraints.len()
    }

    pub fn variable_by_name(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied()
    }

    // ------------------------------------------------------------------
    // Variable-state queries
    // ------------------------------------------------------------------

    pub fn assigned_variables(&self) -> Vec<VarId> {
        self.variable_ids()
            .filter(|&var| self.variables[var].is_assigned())
            .collect()
    }

    pub fn unassigned_variables(&self) -> Vec<VarId> {
        self.variable_ids()
            .filter(|&var| !self.variables[var].is_assigned())
            .collect()
    }

    pub fn is_completely_assigned(&self) -> bool {
        self.variables.iter().all(Variable::is_assigned)
    }

    pub fn is_completely_unassigned(&self) -> bool {
        !self.variables.iter().any(Variable::is_assigned)
    }

    pub fn is_consistently_assigned(&self) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.is_consistent(&self.variables))
    }

    pub fn is_completely_consistently_assigned(&self) -> bool {
        self.is_completely_assigned() && self.is_consistently_assigned()
    }

    pub fn unassign_all(&mut self) {
        for variable in &mut self.variables {
            variable.unassign();
        }
    }

    // ------------------------------------------------------------------
    // Graph queries
    // ------------------------------------------------------------------

    /// Variables sharing at least one constraint with `var`, excluding
    /// `var` itself.
    pub fn neighbors(&self, var: VarId) -> &[VarId] {
        &self.neighbors[var]
    }

    pub fn assigned_neighbors(&self, var: VarId) -> Vec<VarId> {
        self.neighbors[var]
            .iter()
            .copied()
            .filter(|&neighbor| self.variables[neighbor].is_assigned())
            .collect()
    }

    pub fn unassigned_neighbors(&self, var: VarId) -> Vec<VarId> {
        self.neighbors[var]
            .iter()
            .copied()
            .filter(|&neighbor| !self.variables[neighbor].is_assigned())
            .collect()
    }

    pub fn constraints_containing(&self, var: VarId) -> &[ConstraintId] {
        &self.var_constraints[var]
    }

    /// The lowest-id constraint containing both endpoints, if any. This is
    /// the deterministic "shared constraint" choice the arc-consistency
    /// algorithms revise against.
    pub fn shared_constraint(&self, a: VarId, b: VarId) -> Option<ConstraintId> {
        self.var_constraints[a]
            .iter()
            .copied()
            .find(|&cid| self.constraints[cid].contains(b))
    }

    // ------------------------------------------------------------------
    // Constraint-state queries
    // ------------------------------------------------------------------

    pub fn consistent_constraints(&self) -> Vec<ConstraintId> {
        self.constraint_ids()
            .filter(|&cid| self.constraints[cid].is_consistent(&self.variables))
            .collect()
    }

    pub fn inconsistent_constraints(&self) -> Vec<ConstraintId> {
        self.constraint_ids()
            .filter(|&cid| !self.constraints[cid].is_consistent(&self.variables))
            .collect()
    }

    pub fn satisfied_constraints(&self) -> Vec<ConstraintId> {
        self.constraint_ids()
            .filter(|&cid| self.constraints[cid].is_satisfied(&self.variables))
            .collect()
    }

    pub fn unsatisfied_constraints(&self) -> Vec<ConstraintId> {
        self.constraint_ids()
            .filter(|&cid| !self.constraints[cid].is_satisfied(&self.variables))
            .collect()
    }

    pub fn consistent_constraints_count(&self) -> usize {
        self.constraints
            .iter()
            .filter(|constraint| constraint.is_consistent(&self.variables))
            .count()
    }

    pub fn unsatisfied_constraints_count(&self) -> usize {
        self.constraints
            .iter()
            .filter(|constraint| !constraint.is_satisfied(&self.variables))
            .count()
    }

    /// The consistent domain of `var` under one specific constraint; the
    /// per-constraint building block of [`consistent_domain`](Self::consistent_domain).
    pub fn constraint_consistent_domain(
        &mut self,
        id: ConstraintId,
        var: VarId,
    ) -> Result<Vec<T>> {
        let Self {
            variables,
            constraints,
            ..
        } = self;
        constraints[id].consistent_domain(variables, var)
    }

    /// The values of `var`'s domain offered by *every* constraint containing
    /// it: the intersection of the per-constraint consistent domains. A
    /// variable in no constraint keeps its whole domain.
    pub fn consistent_domain(&mut self, var: VarId) -> Result<Vec<T>> {
        let Self {
            variables,
            constraints,
            var_constraints,
            ..
        } = self;

        let mut admitted: Vec<HashSet<T>> = Vec::with_capacity(var_constraints[var].len());
        for &cid in &var_constraints[var] {
            let consistent = constraints[cid].consistent_domain(variables, var)?;
            admitted.push(consistent.into_iter().collect());
        }

        Ok(variables[var]
            .domain()
            .iter()
            .filter(|value| admitted.iter().all(|offered| offered.contains(*value)))
            .cloned()
            .collect())
    }

    /// True iff every variable's domain and consistent domain are non-empty.
    pub fn is_potentially_solvable(&mut self) -> Result<bool> {
        for var in self.variable_ids() {
            if self.variables[var].domain().is_empty() || self.consistent_domain(var)?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Bulk assignment
    // ------------------------------------------------------------------

    /// Snapshots the values of all currently assigned variables.
    pub fn current_assignment(&self) -> Assignment<T> {
        self.variable_ids()
            .filter_map(|var| {
                self.variables[var]
                    .value_opt()
                    .map(|value| (var, value.clone()))
            })
            .collect()
    }

    /// Restores an assignment snapshot, re-assigning variables whose current
    /// value differs and leaving matching assignments untouched.
    pub fn assign_from_assignment(&mut self, assignment: &Assignment<T>) -> Result<()> {
        for (var, value) in assignment.iter() {
            let variable = &mut self.variables[var];
            if variable.value_opt() != Some(value) {
                variable.unassign();
                variable.assign(value)?;
            }
        }
        Ok(())
    }

    /// Assigns every non-read-only variable a uniformly random domain value,
    /// unassigning first where needed.
    pub fn assign_random_values(
        &mut self,
        read_only: Option<&HashSet<VarId>>,
        mut history: Option<&mut AssignmentHistory<T>>,
        rng: &mut impl Rng,
    ) -> Result<()> {
        for var in 0..self.variables.len() {
            if read_only.is_some_and(|read_only| read_only.contains(&var)) {
                continue;
            }
            let variable = &mut self.variables[var];
            if variable.is_assigned() {
                variable.unassign();
                record(&mut history, var, None);
            }
            let value = variable.assign_random(rng)?.clone();
            record(&mut history, var, Some(value));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Domain snapshots
    // ------------------------------------------------------------------

    /// Captures every variable's current domain, for replay on backtrack
    /// after an inference hook has pruned provisionally.
    pub fn domains_snapshot(&self) -> Vec<Vec<T>> {
        self.variables
            .iter()
            .map(|variable| variable.domain().to_vec())
            .collect()
    }

    /// Replays a snapshot taken by [`domains_snapshot`](Self::domains_snapshot).
    pub fn restore_domains(&mut self, snapshot: Vec<Vec<T>>) {
        trace!("restoring {} domains", snapshot.len());
        for (variable, domain) in self.variables.iter_mut().zip(snapshot) {
            variable.restore_domain(domain);
        }
    }

    // ------------------------------------------------------------------
    // Stringification
    // ------------------------------------------------------------------

    pub fn variable_to_string(&self, var: VarId) -> String {
        self.variables[var].to_string()
    }

    pub fn constraint_to_string(&self, id: ConstraintId) -> String {
        self.constraints[id].render(&self.variables)
    }
}

impl<T: Value> fmt::Display for Problem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for id in self.constraint_ids() {
            writeln!(f, "{}", self.constraint_to_string(id))?;
        }
        writeln!(
            f,
            "problem is completely assigned: {}.",
            self.is_completely_assigned()
        )?;
        writeln!(
            f,
            "problem is consistently assigned: {}.",
            self.is_consistently_assigned()
        )?;
        write!(
            f,
            "problem is completely consistently assigned: {}}}",
            self.is_completely_consistently_assigned()
        )
    }
}
