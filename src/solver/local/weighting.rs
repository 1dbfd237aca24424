use std::collections::HashSet;

use rand::rngs::StdRng;
use tracing::debug;

use crate::{
    csp::{
        assignment::{record, AssignmentHistory},
        Problem, Value, VarId,
    },
    error::Result,
    solver::SolveStatus,
};

/// Constraint-weighting local search.
///
/// Every constraint carries a positive integer weight, starting at one.
/// Each restart begins from a random assignment; the inner loop greedily
/// applies the single (variable, value) swap with the largest weighted cost
/// reduction, then bumps the weight of every still-unsatisfied constraint
/// so chronic offenders grow expensive to ignore. The inner loop ends when
/// no swap reduces the cost. Variables assigned on entry are treated as
/// read-only.
pub fn constraint_weighting<T: Value>(
    problem: &mut Problem<T>,
    max_tries: usize,
    rng: &mut StdRng,
    mut history: Option<&mut AssignmentHistory<T>>,
) -> Result<SolveStatus> {
    let read_only: HashSet<VarId> = problem.assigned_variables().into_iter().collect();
    let mut weights: Vec<u64> = vec![1; problem.constraints().len()];

    for attempt in 0..max_tries {
        problem.assign_random_values(Some(&read_only), history.as_deref_mut(), rng)?;

        loop {
            if problem.is_completely_consistently_assigned() {
                debug!(attempt, "constraint weighting solved");
                return Ok(SolveStatus::Solved);
            }

            let Some((reduction, var, index)) = best_swap(problem, &read_only, &weights)? else {
                break;
            };
            if reduction <= 0 {
                break;
            }

            problem.variable_mut(var).unassign();
            record(&mut history, var, None);
            problem.variable_mut(var).assign_by_index(index)?;
            record(&mut history, var, Some(problem.variable(var).value()?.clone()));

            for cid in problem.unsatisfied_constraints() {
                weights[cid] += 1;
            }
        }

        for var in problem.variable_ids() {
            if !read_only.contains(&var) {
                problem.variable_mut(var).unassign();
            }
        }
    }

    debug!(max_tries, "constraint weighting exhausted its tries");
    Ok(SolveStatus::Exhausted)
}

/// The weighted cost of the current assignment: for every variable, the
/// weights of the unsatisfied constraints containing it. Counting per
/// member variable makes wide conflicts weigh more than narrow ones.
fn weighted_cost<T: Value>(problem: &Problem<T>, weights: &[u64]) -> i64 {
    let mut cost = 0i64;
    for var in problem.variable_ids() {
        for &cid in problem.constraints_containing(var) {
            if !problem.constraint(cid).is_satisfied(problem.variables()) {
                cost += weights[cid] as i64;
            }
        }
    }
    cost
}

/// Evaluates every single-variable swap against the current assignment and
/// returns the one with the largest cost reduction.
fn best_swap<T: Value>(
    problem: &mut Problem<T>,
    read_only: &HashSet<VarId>,
    weights: &[u64],
) -> Result<Option<(i64, VarId, usize)>> {
    let current_cost = weighted_cost(problem, weights);
    let mut best: Option<(i64, VarId, usize)> = None;

    for var in problem.variable_ids() {
        if read_only.contains(&var) {
            continue;
        }
        let prior = problem.variable(var).value_opt().cloned();
        problem.variable_mut(var).unassign();

        for index in 0..problem.variable(var).domain().len() {
            problem.variable_mut(var).assign_by_index(index)?;
            let reduction = current_cost - weighted_cost(problem, weights);
            problem.variable_mut(var).unassign();

            if best.map_or(true, |(top, _, _)| top < reduction) {
                best = Some((reduction, var, index));
            }
        }

        if let Some(value) = prior {
            problem.variable_mut(var).assign(&value)?;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::constraint_weighting;
    use crate::{
        csp::{evaluators, Constraint, Problem, Variable},
        solver::SolveStatus,
    };

    fn colouring_chain(len: usize) -> Problem<i64> {
        let variables = (0..len).map(|_| Variable::new([1, 2, 3]).unwrap()).collect();
        let constraints = (0..len - 1)
            .map(|i| Constraint::new(vec![i, i + 1], evaluators::all_different).unwrap())
            .collect();
        Problem::new(variables, constraints).unwrap()
    }

    #[test]
    fn solves_an_easy_chain() {
        let mut problem = colouring_chain(5);
        let mut rng = StdRng::seed_from_u64(17);
        let status = constraint_weighting(&mut problem, 20, &mut rng, None).unwrap();
        assert_eq!(status, SolveStatus::Solved);
        assert!(problem.is_completely_consistently_assigned());
    }

    #[test]
    fn pre_assigned_variables_are_read_only() {
        let mut problem = colouring_chain(4);
        problem.variable_mut(1).assign(&3).unwrap();
        let mut rng = StdRng::seed_from_u64(23);

        let status = constraint_weighting(&mut problem, 20, &mut rng, None).unwrap();
        assert_eq!(status, SolveStatus::Solved);
        assert_eq!(problem.variable(1).value().unwrap(), &3);
    }

    #[test]
    fn exhausts_on_an_unsatisfiable_problem() {
        let variables = vec![
            Variable::new([1]).unwrap(),
            Variable::new([1]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        let mut problem = Problem::new(variables, constraints).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let status = constraint_weighting(&mut problem, 3, &mut rng, None).unwrap();
        assert_eq!(status, SolveStatus::Exhausted);
    }
}
