use rand::rngs::StdRng;
use tracing::debug;

use crate::{
    csp::{Problem, Value},
    error::Result,
    solver::{
        local::{ScoreCalculator, StartStateGenerator, SuccessorGenerator},
        SolveStatus,
    },
};

/// Random-restart, first-improvement hill climbing.
///
/// Each of up to `max_restarts` independent start states climbs for up to
/// `max_steps` rounds. A round samples up to `max_successors` neighbors and
/// moves to the first one scoring strictly better; a round with no
/// improvement ends the restart. The global best across every restart is
/// returned together with its status. The input problem itself is never
/// touched; all work happens on replicas.
#[allow(clippy::too_many_arguments)]
pub fn hill_climbing<T: Value>(
    problem: &Problem<T>,
    max_restarts: usize,
    max_steps: usize,
    max_successors: usize,
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

    for restart in 1..max_restarts {
        let mut current = start.generate(problem, rng)?;

        for _ in 0..max_steps {
            if current.is_completely_consistently_assigned() {
                debug!(restart, "hill climbing solved");
                return Ok((SolveStatus::Solved, current));
            }

            let current_score = score.score(&current);
            if best_score < current_score {
                best_score = current_score;
                best = current.deep_copy();
            }

            let mut improved = false;
            for _ in 0..max_successors {
                let candidate = successor.generate(&current, rng)?;
                if current_score < score.score(&candidate) {
                    current = candidate;
                    improved = true;
                    break;
                }
            }
            if !improved {
                break;
            }
        }

        let final_score = score.score(&current);
        if best_score < final_score {
            best_score = final_score;
            best = current;
        }
    }

    debug!(best_score, "hill climbing restarts exhausted");
    let status = if best.is_completely_consistently_assigned() {
        SolveStatus::Solved
    } else {
        SolveStatus::BestEffort
    };
    Ok((status, best))
}
