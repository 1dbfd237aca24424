use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::{
    csp::{
        assignment::{record, AssignmentHistory},
        Problem, Value, VarId,
    },
    error::Result,
    solver::SolveStatus,
};

/// Solves a problem whose constraint graph over the unassigned variables is
/// a tree, in O(n·d²) and without backtracking.
///
/// Three stages: a Kahn topological order rooted so every variable follows
/// its parent, directional arc consistency from the leaves up, and one
/// assignment sweep from the root down. Returns
/// [`SolveStatus::Infeasible`] when the graph is not a tree or any stage
/// fails; a failed sweep unassigns its own partial work first.
pub fn tree_csp_solver<T: Value>(
    problem: &mut Problem<T>,
    mut history: Option<&mut AssignmentHistory<T>>,
) -> Result<SolveStatus> {
    let Some(order) = topological_order(problem) else {
        debug!("tree solver: constraint graph is not a tree");
        return Ok(SolveStatus::Infeasible);
    };

    // Directional arc consistency, leaves towards the root.
    for i in (1..order.len()).rev() {
        let var = order[i];
        let parent = order[i - 1];
        for index in (0..problem.variable(var).domain().len()).rev() {
            problem.variable_mut(var).assign_by_index(index)?;
            let starved = problem.consistent_domain(parent)?.is_empty();
            problem.variable_mut(var).unassign();
            if starved {
                problem.variable_mut(var).remove_from_domain(index)?;
            }
        }
        if problem.variable(var).domain().is_empty() {
            debug!(var, "tree solver: domain emptied during DAC");
            return Ok(SolveStatus::Infeasible);
        }
    }

    // Assignment sweep, root towards the leaves.
    for (assigned, &var) in order.iter().enumerate() {
        let consistent = problem.consistent_domain(var)?;
        let Some(value) = consistent.last().cloned() else {
            for &settled in &order[..assigned] {
                problem.variable_mut(settled).unassign();
                record(&mut history, settled, None);
            }
            debug!(var, "tree solver: no consistent value in the sweep");
            return Ok(SolveStatus::Infeasible);
        };
        problem.variable_mut(var).assign(&value)?;
        record(&mut history, var, Some(value));
    }

    Ok(SolveStatus::Solved)
}

/// Orders the unassigned variables parent-before-child, or `None` when
/// their constraint graph is not a tree (cyclic, disconnected, or empty).
fn topological_order<T: Value>(problem: &Problem<T>) -> Option<Vec<VarId>> {
    let unassigned = problem.unassigned_variables();
    if unassigned.is_empty() {
        return None;
    }

    // Orient each undirected edge in first-visit direction.
    let mut children: HashMap<VarId, Vec<VarId>> = HashMap::new();
    let mut oriented: HashSet<(VarId, VarId)> = HashSet::new();
    let mut edge_count = 0usize;
    for &var in &unassigned {
        for neighbor in problem.unassigned_neighbors(var) {
            if !oriented.contains(&(neighbor, var)) && oriented.insert((var, neighbor)) {
                children.entry(var).or_default().push(neighbor);
                edge_count += 1;
            }
        }
    }

    // A tree has exactly n - 1 edges and is connected.
    if edge_count != unassigned.len() - 1 || !is_connected(problem, &unassigned) {
        return None;
    }

    let mut in_degree: HashMap<VarId, usize> = unassigned.iter().map(|&var| (var, 0)).collect();
    for targets in children.values() {
        for &child in targets {
            *in_degree.entry(child).or_insert(0) += 1;
        }
    }

    let mut ready: VecDeque<VarId> = unassigned
        .iter()
        .copied()
        .filter(|var| in_degree[var] == 0)
        .collect();
    let mut order = Vec::with_capacity(unassigned.len());
    while let Some(var) = ready.pop_front() {
        order.push(var);
        for &child in children.get(&var).map(Vec::as_slice).unwrap_or(&[]) {
            let degree = in_degree.get_mut(&child).expect("child is unassigned");
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(child);
            }
        }
    }

    (order.len() == unassigned.len()).then_some(order)
}

fn is_connected<T: Value>(problem: &Problem<T>, unassigned: &[VarId]) -> bool {
    let members: HashSet<VarId> = unassigned.iter().copied().collect();
    let mut visited = HashSet::new();
    let mut frontier = VecDeque::from([unassigned[0]]);
    visited.insert(unassigned[0]);
    while let Some(var) = frontier.pop_front() {
        for &neighbor in problem.neighbors(var) {
            if members.contains(&neighbor) && visited.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }
    visited.len() == unassigned.len()
}
