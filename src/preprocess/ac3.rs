use tracing::debug;

use crate::{
    csp::{Problem, Value, VarId},
    error::Result,
    preprocess::{PropagationStats, WorkList},
};

/// A directed dependency between two variables sharing a constraint: revising
/// `(x, y)` prunes values of `x` that no value of `y` supports.
pub type DirectedArc = (VarId, VarId);

/// Runs AC-3 to its fixed point over every arc between unassigned variables
/// and their neighbors.
///
/// Returns [`is_potentially_solvable`](Problem::is_potentially_solvable) at
/// the fixed point; `false` as soon as any domain empties.
pub fn ac3<T: Value>(problem: &mut Problem<T>) -> Result<bool> {
    let arcs = initial_arcs(problem);
    ac3_with_queue(problem, arcs, None)
}

/// [`ac3`] with per-constraint revision counters, for
/// [`render_propagation_table`](crate::solver::stats::render_propagation_table).
pub fn ac3_with_stats<T: Value>(
    problem: &mut Problem<T>,
    stats: &mut PropagationStats,
) -> Result<bool> {
    let arcs = initial_arcs(problem);
    ac3_with_queue(problem, arcs, Some(stats))
}

fn initial_arcs<T: Value>(problem: &Problem<T>) -> WorkList<DirectedArc> {
    let mut arcs = WorkList::new();
    for var in problem.unassigned_variables() {
        for &neighbor in problem.neighbors(var) {
            arcs.push_back((var, neighbor));
        }
    }
    arcs
}

/// The AC-3 main loop over a caller-provided arc set. MAC seeds this with
/// only the arcs pointing at a freshly assigned variable.
pub(crate) fn ac3_with_queue<T: Value>(
    problem: &mut Problem<T>,
    mut arcs: WorkList<DirectedArc>,
    mut stats: Option<&mut PropagationStats>,
) -> Result<bool> {
    while let Some((var, against)) = arcs.pop_front() {
        if !revise(problem, var, against, &mut stats)? {
            continue;
        }
        if problem.variable(var).domain().is_empty() {
            debug!(var, "AC-3: domain emptied, infeasible");
            return Ok(false);
        }
        for &other in problem.neighbors(var) {
            if other != against {
                arcs.push_back((other, var));
            }
        }
    }
    problem.is_potentially_solvable()
}

/// Removes every value of `var` for which the shared constraint admits no
/// available value of `against`: its assigned value when it has one, any of
/// its domain values otherwise. Returns whether anything was removed.
fn revise<T: Value>(
    problem: &mut Problem<T>,
    var: VarId,
    against: VarId,
    stats: &mut Option<&mut PropagationStats>,
) -> Result<bool> {
    if problem.variable(var).is_assigned() {
        return Ok(false);
    }
    let Some(shared) = problem.shared_constraint(var, against) else {
        return Ok(false);
    };
    if let Some(stats) = stats {
        stats.record_revision(shared);
    }

    let mut revised = false;
    // High to low so removal keeps the remaining indices valid.
    for index in (0..problem.variable(var).domain().len()).rev() {
        problem.variable_mut(var).assign_by_index(index)?;
        let supported = if problem.variable(against).is_assigned() {
            problem.constraint(shared).is_consistent(problem.variables())
        } else {
            !problem.constraint_consistent_domain(shared, against)?.is_empty()
        };
        problem.variable_mut(var).unassign();

        if !supported {
            problem.variable_mut(var).remove_from_domain(index)?;
            revised = true;
            if let Some(stats) = stats {
                stats.record_pruning(shared);
            }
        }
    }
    Ok(revised)
}
