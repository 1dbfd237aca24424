use crate::{
    csp::{Problem, Value, VarId},
    error::Result,
};

/// A primary selector: proposes a non-empty list of candidate variables from
/// the unassigned set, all tied under the heuristic's score.
pub trait VariableSelectionHeuristic<T: Value> {
    fn candidates(&self, problem: &mut Problem<T>) -> Result<Vec<VarId>>;
}

/// A secondary selector: breaks the tie when the primary proposed more than
/// one candidate.
pub trait TieBreakHeuristic<T: Value> {
    fn pick(&self, problem: &mut Problem<T>, candidates: &[VarId]) -> Result<VarId>;
}

/// Takes the first candidate as proposed. The trivial tie break.
pub struct FirstCandidate;

impl<T: Value> TieBreakHeuristic<T> for FirstCandidate {
    fn pick(&self, _problem: &mut Problem<T>, candidates: &[VarId]) -> Result<VarId> {
        Ok(candidates[0])
    }
}

/// Minimum remaining values: the unassigned variables tied for the smallest
/// current consistent-domain size. A fail-first strategy; the most
/// constrained variables are tackled while the search is still shallow.
pub struct MinimumRemainingValues;

impl MinimumRemainingValues {
    fn scores<T: Value>(
        problem: &mut Problem<T>,
        vars: &[VarId],
    ) -> Result<Vec<(usize, VarId)>> {
        vars.iter()
            .map(|&var| Ok((problem.consistent_domain(var)?.len(), var)))
            .collect()
    }
}

impl<T: Value> VariableSelectionHeuristic<T> for MinimumRemainingValues {
    fn candidates(&self, problem: &mut Problem<T>) -> Result<Vec<VarId>> {
        let unassigned = problem.unassigned_variables();
        let scored = Self::scores(problem, &unassigned)?;
        let smallest = scored.iter().map(|&(size, _)| size).min().unwrap_or(0);
        Ok(scored
            .into_iter()
            .filter(|&(size, _)| size == smallest)
            .map(|(_, var)| var)
            .collect())
    }
}

impl<T: Value> TieBreakHeuristic<T> for MinimumRemainingValues {
    fn pick(&self, problem: &mut Problem<T>, candidates: &[VarId]) -> Result<VarId> {
        let scored = Self::scores(problem, candidates)?;
        Ok(scored
            .into_iter()
            .min_by_key(|&(size, _)| size)
            .map(|(_, var)| var)
            .unwrap_or(candidates[0]))
    }
}

/// Degree heuristic: the unassigned variables tied for the largest number of
/// unassigned neighbors, i.e. those involved in the most still-open
/// constraints.
pub struct DegreeHeuristic;

impl<T: Value> VariableSelectionHeuristic<T> for DegreeHeuristic {
    fn candidates(&self, problem: &mut Problem<T>) -> Result<Vec<VarId>> {
        let unassigned = problem.unassigned_variables();
        let scored: Vec<(usize, VarId)> = unassigned
            .iter()
            .map(|&var| (problem.unassigned_neighbors(var).len(), var))
            .collect();
        let largest = scored.iter().map(|&(degree, _)| degree).max().unwrap_or(0);
        Ok(scored
            .into_iter()
            .filter(|&(degree, _)| degree == largest)
            .map(|(_, var)| var)
            .collect())
    }
}

impl<T: Value> TieBreakHeuristic<T> for DegreeHeuristic {
    fn pick(&self, problem: &mut Problem<T>, candidates: &[VarId]) -> Result<VarId> {
        Ok(candidates
            .iter()
            .copied()
            .max_by_key(|&var| problem.unassigned_neighbors(var).len())
            .unwrap_or(candidates[0]))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DegreeHeuristic, MinimumRemainingValues, VariableSelectionHeuristic};
    use crate::csp::{evaluators, Constraint, Problem, Variable};

    /// A star: variable 0 shares a constraint with each of 1..=3.
    fn star() -> Problem<i64> {
        let variables = vec![
            Variable::new([1, 2, 3, 4]).unwrap(),
            Variable::new([1, 2]).unwrap(),
            Variable::new([1, 2, 3]).unwrap(),
            Variable::new([1, 2, 3]).unwrap(),
        ];
        let constraints = vec![
            Constraint::new(vec![0, 1], evaluators::all_different).unwrap(),
            Constraint::new(vec![0, 2], evaluators::all_different).unwrap(),
            Constraint::new(vec![0, 3], evaluators::all_different).unwrap(),
        ];
        Problem::new(variables, constraints).unwrap()
    }

    #[test]
    fn mrv_proposes_the_tightest_variables() {
        let mut problem = star();
        let candidates = MinimumRemainingValues.candidates(&mut problem).unwrap();
        assert_eq!(candidates, vec![1]);
    }

    #[test]
    fn mrv_reacts_to_assignments() {
        let mut problem = star();
        problem.variable_mut(1).assign(&1).unwrap();
        // Variable 0 loses value 1 through its constraint with 1, leaving
        // consistent domains of size 3 for all remaining variables.
        let candidates = MinimumRemainingValues.candidates(&mut problem).unwrap();
        assert_eq!(candidates, vec![0, 2, 3]);
    }

    #[test]
    fn degree_prefers_the_hub() {
        let mut problem = star();
        let candidates = DegreeHeuristic.candidates(&mut problem).unwrap();
        assert_eq!(candidates, vec![0]);
    }
}
