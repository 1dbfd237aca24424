use crate::{
    csp::{Problem, Value, VarId},
    error::Result,
    preprocess::{ac3::ac3_with_queue, WorkList},
};

/// What an inference hook concluded about the branch below a fresh
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inference {
    /// Keep searching under the current assignment.
    Viable,
    /// No completion exists down here; backtrack.
    DeadEnd,
}

/// Reactive domain pruning run right after a variable is assigned.
///
/// Hooks may shrink the domains of unassigned variables; every change is
/// provisional within the current search branch. The *caller* owns the
/// rollback: it snapshots domains before invoking the hook and replays the
/// snapshot when the branch fails (see
/// [`Problem::domains_snapshot`](crate::csp::Problem::domains_snapshot)).
pub trait InferencePolicy<T: Value> {
    fn prune(&self, problem: &mut Problem<T>, assigned: VarId) -> Result<Inference>;
}

/// Forward checking: a dead end as soon as any unassigned neighbor of the
/// just-assigned variable has an empty consistent domain.
pub struct ForwardChecking;

impl<T: Value> InferencePolicy<T> for ForwardChecking {
    fn prune(&self, problem: &mut Problem<T>, assigned: VarId) -> Result<Inference> {
        for neighbor in problem.unassigned_neighbors(assigned) {
            if problem.consistent_domain(neighbor)?.is_empty() {
                return Ok(Inference::DeadEnd);
            }
        }
        Ok(Inference::Viable)
    }
}

/// MAC: seeds AC-3 with the arcs from every unassigned neighbor towards the
/// just-assigned variable and propagates to the fixed point. A dead end iff
/// AC-3 reports infeasibility.
pub struct MaintainArcConsistency;

impl<T: Value> InferencePolicy<T> for MaintainArcConsistency {
    fn prune(&self, problem: &mut Problem<T>, assigned: VarId) -> Result<Inference> {
        let mut arcs = WorkList::new();
        for neighbor in problem.unassigned_neighbors(assigned) {
            arcs.push_back((neighbor, assigned));
        }
        if ac3_with_queue(problem, arcs, None)? {
            Ok(Inference::Viable)
        } else {
            Ok(Inference::DeadEnd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ForwardChecking, Inference, InferencePolicy, MaintainArcConsistency};
    use crate::csp::{evaluators, Constraint, Problem, Variable};

    fn pair_problem() -> Problem<i64> {
        let variables = vec![
            Variable::new([1]).unwrap(),
            Variable::new([1, 2]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        Problem::new(variables, constraints).unwrap()
    }

    #[test]
    fn forward_checking_flags_a_starved_neighbor() {
        let mut problem = pair_problem();
        problem.variable_mut(1).assign(&1).unwrap();
        // Variable 0's only value collides with the assignment.
        let outcome = ForwardChecking.prune(&mut problem, 1).unwrap();
        assert_eq!(outcome, Inference::DeadEnd);
    }

    #[test]
    fn forward_checking_passes_a_viable_branch() {
        let mut problem = pair_problem();
        problem.variable_mut(1).assign(&2).unwrap();
        let outcome = ForwardChecking.prune(&mut problem, 1).unwrap();
        assert_eq!(outcome, Inference::Viable);
    }

    #[test]
    fn mac_prunes_the_neighbors_domains() {
        let variables = vec![
            Variable::new([1, 2]).unwrap(),
            Variable::new([1, 2]).unwrap(),
            Variable::new([1, 2]).unwrap(),
        ];
        let constraints = vec![
            Constraint::new(vec![0, 1], evaluators::all_different).unwrap(),
            Constraint::new(vec![1, 2], evaluators::all_different).unwrap(),
        ];
        let mut problem = Problem::new(variables, constraints).unwrap();

        problem.variable_mut(0).assign(&1).unwrap();
        let outcome = MaintainArcConsistency.prune(&mut problem, 0).unwrap();
        assert_eq!(outcome, Inference::Viable);
        // Propagation fixed the chain: 1 → {2}, 2 → {1}.
        assert_eq!(problem.variable(1).domain(), &[2]);
        assert_eq!(problem.variable(2).domain(), &[1]);
    }

    #[test]
    fn mac_detects_a_dead_end() {
        let mut problem = pair_problem();
        problem.variable_mut(1).assign(&1).unwrap();
        let outcome = MaintainArcConsistency.prune(&mut problem, 1).unwrap();
        assert_eq!(outcome, Inference::DeadEnd);
    }
}
