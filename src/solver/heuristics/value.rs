use crate::{
    csp::{Problem, Value, VarId},
    error::Result,
};

/// Orders the values of a chosen variable into the trial order the solver
/// should follow.
pub trait ValueOrderingHeuristic<T: Value> {
    fn order(&self, problem: &mut Problem<T>, var: VarId) -> Result<Vec<T>>;
}

/// The variable's consistent domain in its stored order. No preference,
/// but values that cannot work are never tried at all.
pub struct ConsistentDomainOrder;

impl<T: Value> ValueOrderingHeuristic<T> for ConsistentDomainOrder {
    fn order(&self, problem: &mut Problem<T>, var: VarId) -> Result<Vec<T>> {
        problem.consistent_domain(var)
    }
}

/// Least constraining value: provisionally assigns each candidate value and
/// sums the consistent-domain sizes of the unassigned neighbors; values are
/// emitted in ascending total.
pub struct LeastConstrainingValue;

impl<T: Value> ValueOrderingHeuristic<T> for LeastConstrainingValue {
    fn order(&self, problem: &mut Problem<T>, var: VarId) -> Result<Vec<T>> {
        let neighbors = problem.unassigned_neighbors(var);
        let candidates = problem.consistent_domain(var)?;

        let mut scored: Vec<(usize, T)> = Vec::with_capacity(candidates.len());
        for value in candidates {
            problem.variable_mut(var).assign(&value)?;
            let mut room = 0;
            for &neighbor in &neighbors {
                room += problem.consistent_domain(neighbor)?.len();
            }
            problem.variable_mut(var).unassign();
            scored.push((room, value));
        }

        scored.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(scored.into_iter().map(|(_, value)| value).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ConsistentDomainOrder, LeastConstrainingValue, ValueOrderingHeuristic};
    use crate::csp::{evaluators, Constraint, Problem, Variable};

    #[test]
    fn consistent_domain_order_drops_impossible_values() {
        let variables = vec![
            Variable::new([1, 2, 3]).unwrap(),
            Variable::new([2]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        let mut problem = Problem::new(variables, constraints).unwrap();
        problem.variable_mut(1).assign(&2).unwrap();

        let order = ConsistentDomainOrder.order(&mut problem, 0).unwrap();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn lcv_orders_values_by_ascending_neighbor_room() {
        // Variable 0 over {1, 2}; neighbor 1 over {1}. Value 1 leaves the
        // neighbor total 0, value 2 leaves total 1.
        let variables = vec![
            Variable::new([1, 2]).unwrap(),
            Variable::new([1]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        let mut problem = Problem::new(variables, constraints).unwrap();

        let order = LeastConstrainingValue.order(&mut problem, 0).unwrap();
        assert_eq!(order, vec![1, 2]);
        // The provisional assignments left no trace.
        assert!(!problem.variable(0).is_assigned());
    }
}
