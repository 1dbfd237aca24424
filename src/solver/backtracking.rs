use tracing::debug;

use crate::{
    csp::{
        assignment::{record, Assignment, AssignmentHistory},
        Problem, Value,
    },
    error::Result,
    solver::{SearchStats, SolveStatus},
};

/// Plain chronological backtracking.
///
/// Descends on the last unassigned variable (the cheapest pick with the best
/// locality), tries its domain values in order, and retracts on failure.
/// Complete: returns [`SolveStatus::Exhausted`] only after the whole space
/// was covered.
pub fn solve<T: Value>(
    problem: &mut Problem<T>,
    mut history: Option<&mut AssignmentHistory<T>>,
) -> Result<(SolveStatus, SearchStats)> {
    let mut stats = SearchStats::default();
    let solved = search(problem, &mut history, &mut stats)?;
    debug!(solved, nodes = stats.nodes_visited, "backtracking finished");
    let status = if solved {
        SolveStatus::Solved
    } else {
        SolveStatus::Exhausted
    };
    Ok((status, stats))
}

fn search<T: Value>(
    problem: &mut Problem<T>,
    history: &mut Option<&mut AssignmentHistory<T>>,
    stats: &mut SearchStats,
) -> Result<bool> {
    stats.nodes_visited += 1;

    let Some(&var) = problem.unassigned_variables().last() else {
        return Ok(problem.is_consistently_assigned());
    };

    for index in 0..problem.variable(var).domain().len() {
        problem.variable_mut(var).assign_by_index(index)?;
        record(history, var, Some(problem.variable(var).value()?.clone()));

        if search(problem, history, stats)? {
            return Ok(true);
        }

        problem.variable_mut(var).unassign();
        record(history, var, None);
        stats.backtracks += 1;
    }
    Ok(false)
}

/// Exhaustively enumerates every complete consistent assignment.
///
/// Never short-circuits on success; each solution is recorded and the sweep
/// continues. The enumeration visits each complete assignment exactly once,
/// so the result carries no duplicates.
pub fn find_all_solutions<T: Value>(problem: &mut Problem<T>) -> Result<Vec<Assignment<T>>> {
    let mut solutions = Vec::new();
    search_all(problem, &mut solutions)?;
    Ok(solutions)
}

fn search_all<T: Value>(
    problem: &mut Problem<T>,
    solutions: &mut Vec<Assignment<T>>,
) -> Result<()> {
    let Some(&var) = problem.unassigned_variables().last() else {
        if problem.is_consistently_assigned() {
            solutions.push(problem.current_assignment());
        }
        return Ok(());
    };

    for index in 0..problem.variable(var).domain().len() {
        problem.variable_mut(var).assign_by_index(index)?;
        search_all(problem, solutions)?;
        problem.variable_mut(var).unassign();
    }
    Ok(())
}
