//! Local-search solvers over fully assigned states.
//!
//! Every solver here moves one variable at a time through complete
//! assignments, steering by the number of satisfied or consistent
//! constraints. All randomness flows through one caller-supplied seedable
//! generator, so a seeded run replays exactly.

pub mod annealing;
pub mod genetic;
pub mod hill_climbing;
pub mod min_conflicts;
pub mod weighting;

use rand::{rngs::StdRng, seq::IndexedRandom, Rng};

use crate::{
    csp::{Problem, Value},
    error::Result,
};

pub use annealing::simulated_annealing;
pub use genetic::{genetic_local_search, GeneralGeneticSearch, GeneticSearch};
pub use hill_climbing::hill_climbing;
pub use min_conflicts::min_conflicts;
pub use weighting::constraint_weighting;

/// Produces the fully assigned replica a restart begins from.
pub trait StartStateGenerator<T: Value> {
    fn generate(&self, problem: &Problem<T>, rng: &mut StdRng) -> Result<Problem<T>>;
}

/// Produces a neighboring replica, one local move away.
pub trait SuccessorGenerator<T: Value> {
    fn generate(&self, problem: &Problem<T>, rng: &mut StdRng) -> Result<Problem<T>>;
}

/// Scores a state; higher is better.
pub trait ScoreCalculator<T: Value> {
    fn score(&self, problem: &Problem<T>) -> usize;
}

/// A fresh replica with every variable re-assigned uniformly at random.
pub struct RandomStartState;

impl<T: Value> StartStateGenerator<T> for RandomStartState {
    fn generate(&self, problem: &Problem<T>, rng: &mut StdRng) -> Result<Problem<T>> {
        let mut replica = problem.deep_copy();
        replica.unassign_all();
        replica.assign_random_values(None, None, rng)?;
        Ok(replica)
    }
}

/// A replica with one uniformly chosen variable flipped to a new random
/// value (re-drawing while the draw matches the old value, when the domain
/// offers an alternative).
pub struct AlterRandomVariable;

impl<T: Value> SuccessorGenerator<T> for AlterRandomVariable {
    fn generate(&self, problem: &Problem<T>, rng: &mut StdRng) -> Result<Problem<T>> {
        let mut replica = problem.deep_copy();
        let var = rng.random_range(0..replica.variables().len());

        let old = replica.variable(var).value_opt().cloned();
        let domain = replica.variable(var).domain().to_vec();
        let Some(mut value) = domain.choose(rng).cloned() else {
            return Err(crate::error::CspError::EmptyDomain.into());
        };
        while domain.len() > 1 && Some(&value) == old.as_ref() {
            if let Some(redrawn) = domain.choose(rng).cloned() {
                value = redrawn;
            }
        }

        replica.variable_mut(var).unassign();
        replica.variable_mut(var).assign(&value)?;
        Ok(replica)
    }
}

/// The default score: how many constraints are consistent.
pub struct ConsistentConstraintsScore;

impl<T: Value> ScoreCalculator<T> for ConsistentConstraintsScore {
    fn score(&self, problem: &Problem<T>) -> usize {
        problem.consistent_constraints_count()
    }
}
