use std::cmp::Reverse;
use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::{
    csp::{
        assignment::{record, AssignmentHistory},
        ConstraintId, Problem, Value, VarId,
    },
    error::Result,
    solver::{tree::tree_csp_solver, SolveStatus},
};

/// Cutset conditioning with a naive cutset choice.
///
/// Constraints are sorted by arity, longest first; the variables of the k
/// longest constraints form the candidate cutset, with k growing until
/// removing the cutset leaves a tree. Every consistent assignment of the
/// cutset (the Cartesian product of its domains, filtered by the
/// constraints living entirely inside the cutset) conditions the rest of
/// the problem, which the tree solver then finishes. All conditioning is
/// undone between attempts.
///
/// Incomplete by design: a minimal cutset is NP-hard to find, so a failure
/// over every tested cutset is reported as [`SolveStatus::Exhausted`], not
/// as proof of unsatisfiability.
pub fn naive_cycle_cutset<T: Value>(
    problem: &mut Problem<T>,
    mut history: Option<&mut AssignmentHistory<T>>,
) -> Result<SolveStatus> {
    let unassigned: HashSet<VarId> = problem.unassigned_variables().into_iter().collect();
    if unassigned.is_empty() {
        return Ok(SolveStatus::Exhausted);
    }

    let mut by_arity: Vec<ConstraintId> = problem.constraint_ids().collect();
    by_arity.sort_by_key(|&cid| Reverse(problem.constraint(cid).variables().len()));

    for k in 1..=by_arity.len() {
        // Exactly the variables of the k longest constraints.
        let cutset: HashSet<VarId> = by_arity[..k]
            .iter()
            .flat_map(|&cid| problem.constraint(cid).variables().iter().copied())
            .filter(|var| unassigned.contains(var))
            .collect();
        let remainder: Vec<VarId> = unassigned
            .iter()
            .copied()
            .filter(|var| !cutset.contains(var))
            .collect();

        if cutset.is_empty() || remainder.is_empty() {
            continue;
        }
        if !is_tree(problem, &remainder) {
            continue;
        }
        debug!(k, cutset = cutset.len(), "cutset induces a tree");

        if condition_on_cutset(problem, &cutset, &mut history)? {
            return Ok(SolveStatus::Solved);
        }
    }

    Ok(SolveStatus::Exhausted)
}

/// Enumerates consistent cutset assignments and hands each to the tree
/// solver. Returns whether one of them completed into a solution.
fn condition_on_cutset<T: Value>(
    problem: &mut Problem<T>,
    cutset: &HashSet<VarId>,
    history: &mut Option<&mut AssignmentHistory<T>>,
) -> Result<bool> {
    let mut cutset_vars: Vec<VarId> = cutset.iter().copied().collect();
    cutset_vars.sort_unstable();
    if cutset_vars
        .iter()
        .any(|&var| problem.variable(var).domain().is_empty())
    {
        return Ok(false);
    }

    let cutset_constraints: Vec<ConstraintId> = problem
        .constraint_ids()
        .filter(|&cid| {
            problem
                .constraint(cid)
                .variables()
                .iter()
                .all(|var| cutset.contains(var) || problem.variable(*var).is_assigned())
        })
        .collect();

    // Odometer over the cutset domains.
    let mut indices = vec![0usize; cutset_vars.len()];
    loop {
        for (&var, &index) in cutset_vars.iter().zip(&indices) {
            problem.variable_mut(var).assign_by_index(index)?;
        }

        let consistent = cutset_constraints
            .iter()
            .all(|&cid| problem.constraint(cid).is_consistent(problem.variables()));
        if consistent {
            for &var in &cutset_vars {
                record(history, var, Some(problem.variable(var).value()?.clone()));
            }
            if solve_conditioned_remainder(problem, cutset, history)? {
                return Ok(true);
            }
            for &var in &cutset_vars {
                record(history, var, None);
            }
        }

        for &var in &cutset_vars {
            problem.variable_mut(var).unassign();
        }
        if !advance(&mut indices, problem, &cutset_vars) {
            return Ok(false);
        }
    }
}

/// Restricts the non-cutset domains to values consistent with the current
/// cutset assignment, runs the tree solver, and rolls the domains back
/// unless it solved.
fn solve_conditioned_remainder<T: Value>(
    problem: &mut Problem<T>,
    cutset: &HashSet<VarId>,
    history: &mut Option<&mut AssignmentHistory<T>>,
) -> Result<bool> {
    let snapshot = problem.domains_snapshot();

    let mut feasible = true;
    for var in problem.unassigned_variables() {
        if cutset.contains(&var) {
            continue;
        }
        let consistent = problem.consistent_domain(var)?;
        if consistent.is_empty() {
            feasible = false;
            break;
        }
        problem.variable_mut(var).set_subset_domain(&consistent)?;
    }

    let solved = feasible
        && tree_csp_solver(problem, history.as_deref_mut())? == SolveStatus::Solved;
    if !solved {
        problem.restore_domains(snapshot);
    }
    Ok(solved)
}

fn advance<T: Value>(indices: &mut [usize], problem: &Problem<T>, vars: &[VarId]) -> bool {
    for (slot, &var) in indices.iter_mut().zip(vars).rev() {
        *slot += 1;
        if *slot < problem.variable(var).domain().len() {
            return true;
        }
        *slot = 0;
    }
    false
}

/// A tree is an acyclic connected graph: exactly n - 1 edges plus
/// connectivity over the induced subgraph.
fn is_tree<T: Value>(problem: &Problem<T>, members: &[VarId]) -> bool {
    if members.is_empty() {
        return false;
    }
    let member_set: HashSet<VarId> = members.iter().copied().collect();

    let mut edges = 0usize;
    for &var in members {
        edges += problem
            .neighbors(var)
            .iter()
            .filter(|&&neighbor| var < neighbor && member_set.contains(&neighbor))
            .count();
    }
    if edges != members.len() - 1 {
        return false;
    }

    let mut visited: HashSet<VarId> = HashSet::from([members[0]]);
    let mut frontier = VecDeque::from([members[0]]);
    while let Some(var) = frontier.pop_front() {
        for &neighbor in problem.neighbors(var) {
            if member_set.contains(&neighbor) && visited.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    visited.len() == members.len()
}
