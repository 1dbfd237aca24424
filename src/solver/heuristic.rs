use tracing::debug;

use crate::{
    csp::{
        assignment::{record, Assignment, AssignmentHistory},
        Problem, Value,
    },
    error::Result,
    solver::{
        heuristics::{TieBreakHeuristic, ValueOrderingHeuristic, VariableSelectionHeuristic},
        inference::{Inference, InferencePolicy},
        SearchStats, SolveStatus,
    },
};

/// Backtracking parameterized by four pluggable components.
///
/// The primary selector proposes candidate variables, the tie break settles
/// on one, the optional value orderer decides the trial order, and the
/// optional inference hook prunes domains after every assignment. Domains
/// are snapshotted before the hook runs and replayed on backtrack, so hook
/// pruning never leaks out of a failed branch.
///
/// ```
/// use vincula::csp::{evaluators, Constraint, Problem, Variable};
/// use vincula::solver::heuristic::HeuristicBacktracking;
/// use vincula::solver::heuristics::{FirstCandidate, MinimumRemainingValues};
///
/// let variables = vec![
///     Variable::new([1, 2]).unwrap(),
///     Variable::new([1, 2]).unwrap(),
/// ];
/// let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
/// let mut problem = Problem::new(variables, constraints).unwrap();
///
/// let solver = HeuristicBacktracking::new(
///     Box::new(MinimumRemainingValues),
///     Box::new(FirstCandidate),
/// );
/// let (status, _stats) = solver.solve(&mut problem, None).unwrap();
/// assert!(status.is_solved());
/// ```
pub struct HeuristicBacktracking<T: Value> {
    primary: Box<dyn VariableSelectionHeuristic<T>>,
    tie_break: Box<dyn TieBreakHeuristic<T>>,
    value_order: Option<Box<dyn ValueOrderingHeuristic<T>>>,
    inference: Option<Box<dyn InferencePolicy<T>>>,
}

impl<T: Value> HeuristicBacktracking<T> {
    pub fn new(
        primary: Box<dyn VariableSelectionHeuristic<T>>,
        tie_break: Box<dyn TieBreakHeuristic<T>>,
    ) -> Self {
        Self {
            primary,
            tie_break,
            value_order: None,
            inference: None,
        }
    }

    /// Adds a value-ordering heuristic; without one, values are tried in
    /// domain order.
    pub fn with_value_ordering(mut self, orderer: Box<dyn ValueOrderingHeuristic<T>>) -> Self {
        self.value_order = Some(orderer);
        self
    }

    /// Adds a post-assignment inference hook.
    pub fn with_inference(mut self, inference: Box<dyn InferencePolicy<T>>) -> Self {
        self.inference = Some(inference);
        self
    }

    pub fn solve(
        &self,
        problem: &mut Problem<T>,
        mut history: Option<&mut AssignmentHistory<T>>,
    ) -> Result<(SolveStatus, SearchStats)> {
        let mut stats = SearchStats::default();
        let solved = self.search(problem, &mut history, &mut stats)?;
        debug!(
            solved,
            nodes = stats.nodes_visited,
            dead_ends = stats.dead_ends,
            "heuristic backtracking finished"
        );
        let status = if solved {
            SolveStatus::Solved
        } else {
            SolveStatus::Exhausted
        };
        Ok((status, stats))
    }

    /// Enumerates every solution instead of stopping at the first.
    pub fn find_all_solutions(&self, problem: &mut Problem<T>) -> Result<Vec<Assignment<T>>> {
        let mut solutions = Vec::new();
        self.search_all(problem, &mut solutions)?;
        Ok(solutions)
    }

    fn select_variable(&self, problem: &mut Problem<T>) -> Result<usize> {
        let candidates = self.primary.candidates(problem)?;
        if candidates.len() == 1 {
            Ok(candidates[0])
        } else {
            self.tie_break.pick(problem, &candidates)
        }
    }

    fn trial_values(&self, problem: &mut Problem<T>, var: usize) -> Result<Vec<T>> {
        match &self.value_order {
            Some(orderer) => orderer.order(problem, var),
            None => Ok(problem.variable(var).domain().to_vec()),
        }
    }

    fn search(
        &self,
        problem: &mut Problem<T>,
        history: &mut Option<&mut AssignmentHistory<T>>,
        stats: &mut SearchStats,
    ) -> Result<bool> {
        stats.nodes_visited += 1;

        if problem.is_completely_assigned() {
            return Ok(problem.is_consistently_assigned());
        }

        let var = self.select_variable(problem)?;
        for value in self.trial_values(problem, var)? {
            problem.variable_mut(var).assign(&value)?;
            record(history, var, Some(value));

            let mut viable = true;
            let mut snapshot = None;
            if let Some(inference) = &self.inference {
                snapshot = Some(problem.domains_snapshot());
                if inference.prune(problem, var)? == Inference::DeadEnd {
                    stats.dead_ends += 1;
                    viable = false;
                }
            }

            if viable && self.search(problem, history, stats)? {
                return Ok(true);
            }

            if let Some(snapshot) = snapshot {
                problem.restore_domains(snapshot);
            }
            problem.variable_mut(var).unassign();
            record(history, var, None);
            stats.backtracks += 1;
        }
        Ok(false)
    }

    fn search_all(
        &self,
        problem: &mut Problem<T>,
        solutions: &mut Vec<Assignment<T>>,
    ) -> Result<()> {
        if problem.is_completely_assigned() {
            if problem.is_consistently_assigned() {
                solutions.push(problem.current_assignment());
            }
            return Ok(());
        }

        let var = self.select_variable(problem)?;
        for value in self.trial_values(problem, var)? {
            problem.variable_mut(var).assign(&value)?;

            let mut viable = true;
            let mut snapshot = None;
            if let Some(inference) = &self.inference {
                snapshot = Some(problem.domains_snapshot());
                viable = inference.prune(problem, var)? == Inference::Viable;
            }

            if viable {
                self.search_all(problem, solutions)?;
            }

            if let Some(snapshot) = snapshot {
                problem.restore_domains(snapshot);
            }
            problem.variable_mut(var).unassign();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::HeuristicBacktracking;
    use crate::{
        csp::{evaluators, Constraint, Problem, Variable},
        solver::{
            heuristics::{
                DegreeHeuristic, FirstCandidate, LeastConstrainingValue, MinimumRemainingValues,
            },
            inference::{ForwardChecking, MaintainArcConsistency},
        },
    };

    fn triangle(colours: i64) -> Problem<i64> {
        let variables = (0..3)
            .map(|_| Variable::new(1..=colours).unwrap())
            .collect();
        let constraints = vec![
            Constraint::new(vec![0, 1], evaluators::all_different).unwrap(),
            Constraint::new(vec![1, 2], evaluators::all_different).unwrap(),
            Constraint::new(vec![0, 2], evaluators::all_different).unwrap(),
        ];
        Problem::new(variables, constraints).unwrap()
    }

    #[test]
    fn mrv_with_forward_checking_solves() {
        let mut problem = triangle(3);
        let solver = HeuristicBacktracking::new(
            Box::new(MinimumRemainingValues),
            Box::new(FirstCandidate),
        )
        .with_inference(Box::new(ForwardChecking));

        let (status, _) = solver.solve(&mut problem, None).unwrap();
        assert!(status.is_solved());
        assert!(problem.is_completely_consistently_assigned());
    }

    #[test]
    fn degree_with_lcv_and_mac_solves() {
        let mut problem = triangle(3);
        let solver =
            HeuristicBacktracking::new(Box::new(DegreeHeuristic), Box::new(MinimumRemainingValues))
                .with_value_ordering(Box::new(LeastConstrainingValue))
                .with_inference(Box::new(MaintainArcConsistency));

        let (status, _) = solver.solve(&mut problem, None).unwrap();
        assert!(status.is_solved());
        assert!(problem.is_completely_consistently_assigned());
    }

    #[test]
    fn inference_pruning_is_undone_on_failure() {
        let mut problem = triangle(2);
        let before: Vec<Vec<i64>> = problem
            .variables()
            .iter()
            .map(|var| var.domain().to_vec())
            .collect();

        let solver = HeuristicBacktracking::new(
            Box::new(MinimumRemainingValues),
            Box::new(FirstCandidate),
        )
        .with_inference(Box::new(MaintainArcConsistency));

        let (status, stats) = solver.solve(&mut problem, None).unwrap();
        assert!(!status.is_solved());
        assert!(stats.dead_ends > 0);
        // Every provisional prune was rolled back on the way out.
        for (var, original) in problem.variables().iter().zip(before) {
            assert_eq!(var.domain(), original.as_slice());
        }
    }

    #[test]
    fn finds_all_solutions_with_heuristics() {
        let mut problem = triangle(3);
        let solver = HeuristicBacktracking::new(
            Box::new(MinimumRemainingValues),
            Box::new(FirstCandidate),
        )
        .with_inference(Box::new(ForwardChecking));

        let solutions = solver.find_all_solutions(&mut problem).unwrap();
        // 3 colours on a triangle: 3! proper colourings.
        assert_eq!(solutions.len(), 6);
    }
}
