use std::collections::HashSet;

use rand::{rngs::StdRng, seq::IndexedRandom};
use tracing::debug;

use crate::{
    csp::{
        assignment::{record, AssignmentHistory},
        Problem, Value, VarId,
    },
    error::{CspError, Result},
    solver::SolveStatus,
};

/// Min-conflicts local search.
///
/// Starts from a uniformly random assignment (honoring the read-only set),
/// then repeatedly re-assigns a random conflicted variable to the value
/// minimizing the number of unsatisfied constraints, breaking ties
/// uniformly. The best assignment seen is tracked across all steps and
/// restored when the step budget runs out, so the final state is never
/// worse than anything visited.
///
/// `tabu_size` is reserved for a future tabu list; it is validated against
/// the invariant `tabu + |read_only| < |variables|` and otherwise unused.
pub fn min_conflicts<T: Value>(
    problem: &mut Problem<T>,
    max_steps: usize,
    read_only: Option<&HashSet<VarId>>,
    tabu_size: usize,
    rng: &mut StdRng,
    mut history: Option<&mut AssignmentHistory<T>>,
) -> Result<SolveStatus> {
    let read_only_len = read_only.map_or(0, HashSet::len);
    if problem.variables().len() <= tabu_size + read_only_len {
        return Err(CspError::InvalidTabuSize {
            tabu: tabu_size,
            read_only: read_only_len,
            variables: problem.variables().len(),
        }
        .into());
    }

    problem.assign_random_values(read_only, history.as_deref_mut(), rng)?;

    let mut best_conflicts = problem.unsatisfied_constraints_count();
    let mut best = problem.current_assignment();

    for step in 0..max_steps {
        if problem.is_completely_consistently_assigned() {
            debug!(step, "min-conflicts solved");
            return Ok(SolveStatus::Solved);
        }

        let conflicted = conflicted_variables(problem, read_only);
        let Some(&var) = conflicted.choose(rng) else {
            // Every conflict sits on read-only variables; no move can help.
            break;
        };

        problem.variable_mut(var).unassign();
        record(&mut history, var, None);
        let value = min_conflict_value(problem, var, rng)?;
        problem.variable_mut(var).assign(&value)?;
        record(&mut history, var, Some(value));

        let conflicts = problem.unsatisfied_constraints_count();
        if conflicts < best_conflicts {
            best_conflicts = conflicts;
            best = problem.current_assignment();
        }
    }

    problem.unassign_all();
    problem.assign_from_assignment(&best)?;
    if problem.is_completely_consistently_assigned() {
        Ok(SolveStatus::Solved)
    } else {
        debug!(best_conflicts, "min-conflicts budget exhausted");
        Ok(SolveStatus::BestEffort)
    }
}

/// The variables appearing in at least one unsatisfied constraint, minus
/// the read-only set, in id order.
fn conflicted_variables<T: Value>(
    problem: &Problem<T>,
    read_only: Option<&HashSet<VarId>>,
) -> Vec<VarId> {
    let mut conflicted: HashSet<VarId> = HashSet::new();
    for cid in problem.unsatisfied_constraints() {
        conflicted.extend(problem.constraint(cid).variables().iter().copied());
    }
    if let Some(read_only) = read_only {
        conflicted.retain(|var| !read_only.contains(var));
    }
    let mut conflicted: Vec<VarId> = conflicted.into_iter().collect();
    conflicted.sort_unstable();
    conflicted
}

/// The domain value producing the fewest unsatisfied constraints, ties
/// broken uniformly. The variable must arrive unassigned and leaves
/// unassigned.
fn min_conflict_value<T: Value>(
    problem: &mut Problem<T>,
    var: VarId,
    rng: &mut StdRng,
) -> Result<T> {
    let mut fewest = usize::MAX;
    let mut tied: Vec<T> = Vec::new();

    for index in 0..problem.variable(var).domain().len() {
        problem.variable_mut(var).assign_by_index(index)?;
        let conflicts = problem.unsatisfied_constraints_count();
        let value = problem.variable(var).value()?.clone();
        problem.variable_mut(var).unassign();

        if conflicts < fewest {
            fewest = conflicts;
            tied.clear();
            tied.push(value);
        } else if conflicts == fewest {
            tied.push(value);
        }
    }

    Ok(tied
        .choose(rng)
        .cloned()
        .ok_or(CspError::EmptyDomain)?)
}
