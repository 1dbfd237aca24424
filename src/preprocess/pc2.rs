use tracing::debug;

use crate::{
    csp::{Problem, Value, VarId},
    error::Result,
    preprocess::WorkList,
};

/// An ordered triple (xᵢ, xⱼ, xₖ): xⱼ is a neighbor of xᵢ, xₖ a third
/// variable whose consistent domain must survive any (xᵢ, xⱼ) value pair.
type Triple = (VarId, VarId, VarId);

/// Runs PC-2, pruning value pairs that no intermediate variable can live
/// with.
///
/// For each queued triple, every value of xᵢ must find some value of xⱼ that
/// is compatible under their shared constraints *and* leaves xₖ a non-empty
/// consistent domain; failing values of xᵢ are removed and the surviving
/// values of xⱼ are intersected into xⱼ's domain. Dependent triples are
/// re-enqueued on every revision.
///
/// Returns [`is_potentially_solvable`](Problem::is_potentially_solvable) at
/// the fixed point; `false` as soon as any domain empties.
pub fn pc2<T: Value>(problem: &mut Problem<T>) -> Result<bool> {
    let mut triples: WorkList<Triple> = WorkList::new();
    for var in problem.variable_ids() {
        for &neighbor in problem.neighbors(var) {
            for other in problem.variable_ids() {
                if other != var && other != neighbor {
                    triples.push_back((var, neighbor, other));
                }
            }
        }
    }

    while let Some((var, neighbor, other)) = triples.pop_front() {
        if !revise_triple(problem, var, neighbor, other)? {
            continue;
        }
        if problem.variable(var).domain().is_empty()
            || problem.variable(neighbor).domain().is_empty()
        {
            debug!(var, neighbor, "PC-2: domain emptied, infeasible");
            return Ok(false);
        }
        for dependent in problem.variable_ids() {
            if dependent != var && dependent != neighbor {
                triples.push_back((dependent, var, neighbor));
                triples.push_back((dependent, neighbor, var));
            }
        }
    }

    problem.is_potentially_solvable()
}

/// One triple revision. Returns whether any domain changed.
fn revise_triple<T: Value>(
    problem: &mut Problem<T>,
    var: VarId,
    neighbor: VarId,
    other: VarId,
) -> Result<bool> {
    if problem.variable(var).is_assigned() || problem.variable(neighbor).is_assigned() {
        return Ok(false);
    }

    let pair_constraints: Vec<_> = problem
        .constraints_containing(var)
        .iter()
        .copied()
        .filter(|&cid| problem.constraint(cid).contains(neighbor))
        .collect();

    let mut survivors: Vec<T> = Vec::new();
    let mut revised = false;

    // High to low so removing a failed value keeps earlier indices valid.
    for index in (0..problem.variable(var).domain().len()).rev() {
        problem.variable_mut(var).assign_by_index(index)?;

        let mut supported = false;
        for neighbor_index in 0..problem.variable(neighbor).domain().len() {
            problem.variable_mut(neighbor).assign_by_index(neighbor_index)?;

            let compatible = pair_constraints
                .iter()
                .all(|&cid| problem.constraint(cid).is_consistent(problem.variables()));
            if compatible && !problem.consistent_domain(other)?.is_empty() {
                supported = true;
                let witness = problem.variable(neighbor).value()?.clone();
                if !survivors.contains(&witness) {
                    survivors.push(witness);
                }
            }

            problem.variable_mut(neighbor).unassign();
        }

        problem.variable_mut(var).unassign();
        if !supported {
            problem.variable_mut(var).remove_from_domain(index)?;
            revised = true;
        }
    }

    if !problem.variable(var).domain().is_empty() {
        revised |= problem.variable_mut(neighbor).set_subset_domain(&survivors)?;
    }
    Ok(revised)
}

#[cfg(test)]
mod tests {
    use super::pc2;
    use crate::csp::{evaluators, Constraint, Problem, Variable};

    #[test]
    fn three_colouring_triangle_stays_solvable() {
        let variables: Vec<_> = (0..3)
            .map(|_| Variable::new(["r", "g", "b"]).unwrap())
            .collect();
        let constraints = vec![
            Constraint::new(vec![0, 1], evaluators::all_different).unwrap(),
            Constraint::new(vec![1, 2], evaluators::all_different).unwrap(),
            Constraint::new(vec![0, 2], evaluators::all_different).unwrap(),
        ];
        let mut problem = Problem::new(variables, constraints).unwrap();

        assert!(pc2(&mut problem).unwrap());
        for var in problem.variable_ids() {
            assert!(!problem.variable(var).domain().is_empty());
        }
    }

    #[test]
    fn two_colouring_triangle_is_infeasible() {
        let variables: Vec<_> = (0..3)
            .map(|_| Variable::new(["r", "g"]).unwrap())
            .collect();
        let constraints = vec![
            Constraint::new(vec![0, 1], evaluators::all_different).unwrap(),
            Constraint::new(vec![1, 2], evaluators::all_different).unwrap(),
            Constraint::new(vec![0, 2], evaluators::all_different).unwrap(),
        ];
        let mut problem = Problem::new(variables, constraints).unwrap();
        assert!(!pc2(&mut problem).unwrap());
    }

    #[test]
    fn reduction_only_removes_values() {
        let variables: Vec<_> = (0..3)
            .map(|_| Variable::new([1, 2, 3]).unwrap())
            .collect();
        let less_than = |values: &[i64]| match values {
            [a, b] => a < b,
            _ => values.len() < 2,
        };
        let constraints = vec![
            Constraint::new(vec![0, 1], less_than).unwrap(),
            Constraint::new(vec![1, 2], less_than).unwrap(),
        ];
        let mut problem = Problem::new(variables, constraints).unwrap();
        let before: Vec<Vec<i64>> = problem
            .variables()
            .iter()
            .map(|var| var.domain().to_vec())
            .collect();

        assert!(pc2(&mut problem).unwrap());
        for (var, original) in problem.variables().iter().zip(before) {
            assert!(var.domain().iter().all(|value| original.contains(value)));
        }
        // The chain 0 < 1 < 2 over {1,2,3} forces each variable to one value.
        assert_eq!(problem.variable(0).domain(), &[1]);
        assert_eq!(problem.variable(1).domain(), &[2]);
        assert_eq!(problem.variable(2).domain(), &[3]);
    }
}
