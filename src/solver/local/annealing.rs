use rand::{rngs::StdRng, Rng};
use tracing::debug;

use crate::{
    csp::{Problem, Value},
    error::Result,
    solver::{
        local::{ScoreCalculator, StartStateGenerator, SuccessorGenerator},
        SolveStatus,
    },
};

/// Simulated annealing over a single trajectory.
///
/// Each step proposes one successor; with Δ the score change, the move is
/// accepted when Δ > 0 or with probability `exp(Δ/T)`, and the temperature
/// decays geometrically by `cooling_rate` every step. Early on the walk
/// crosses score valleys freely; as T falls it hardens into hill climbing.
/// The global best is tracked and returned. The input problem is never
/// touched.
#[allow(clippy::too_many_arguments)]
pub fn simulated_annealing<T: Value>(
    problem: &Problem<T>,
    max_steps: usize,
    mut temperature: f64,
    cooling_rate: f64,
    start: &dyn StartStateGenerator<T>,
    successor: &dyn SuccessorGenerator<T>,
    score: &dyn ScoreCalculator<T>,
    rng: &mut StdRng,
) -> Result<(SolveStatus, Problem<T>)> {
    let mut best = start.generate(problem, rng)?;
    if best.is_completely_consistently_assigned() {
        return Ok((SolveStatus::Solved, best));
    }
    let mut best_score = score.score(&best);
    let mut current = best.deep_copy();

    for step in 0..max_steps {
        if current.is_completely_consistently_assigned() {
            debug!(step, "annealing solved");
            return Ok((SolveStatus::Solved, current));
        }

        let current_score = score.score(&current);
        if best_score < current_score {
            best_score = current_score;
            best = current.deep_copy();
        }

        let candidate = successor.generate(&current, rng)?;
        let delta = score.score(&candidate) as f64 - current_score as f64;
        if delta > 0.0 || rng.random::<f64>() < (delta / temperature).exp() {
            current = candidate;
        }
        temperature *= cooling_rate;
    }

    debug!(best_score, "annealing steps exhausted");
    let status = if best.is_completely_consistently_assigned() {
        SolveStatus::Solved
    } else {
        SolveStatus::BestEffort
    };
    Ok((status, best))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::simulated_annealing;
    use crate::{
        csp::{evaluators, Constraint, Problem, Variable},
        solver::local::{AlterRandomVariable, ConsistentConstraintsScore, RandomStartState},
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
    fn anneals_an_easy_chain_to_a_solution() {
        let problem = colouring_chain(5);
        let mut rng = StdRng::seed_from_u64(19);
        let (status, state) = simulated_annealing(
            &problem,
            5_000,
            2.0,
            0.999,
            &RandomStartState,
            &AlterRandomVariable,
            &ConsistentConstraintsScore,
            &mut rng,
        )
        .unwrap();

        assert_eq!(status, SolveStatus::Solved);
        assert!(state.is_completely_consistently_assigned());
        assert!(problem.is_completely_unassigned());
    }

    #[test]
    fn budget_exhaustion_returns_the_best_state() {
        let variables = vec![
            Variable::new([1]).unwrap(),
            Variable::new([1]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        let problem = Problem::new(variables, constraints).unwrap();
        let mut rng = StdRng::seed_from_u64(6);

        let (status, state) = simulated_annealing(
            &problem,
            100,
            1.0,
            0.99,
            &RandomStartState,
            &AlterRandomVariable,
            &ConsistentConstraintsScore,
            &mut rng,
        )
        .unwrap();

        assert_eq!(status, SolveStatus::BestEffort);
        assert!(state.is_completely_assigned());
    }
}
