use std::collections::HashSet;

use rand::{rngs::StdRng, seq::IndexedRandom, Rng};
use tracing::debug;

use crate::{
    csp::{Assignment, Problem, Value, VarId},
    error::Result,
    solver::SolveStatus,
};

/// The evolutionary operators a genetic search runs on. Implement this to
/// customize representation, selection, or mutation;
/// [`GeneralGeneticSearch`] is the stock implementation over full
/// assignments.
pub trait GeneticSearch<T: Value> {
    fn problem(&self) -> &Problem<T>;

    fn problem_mut(&mut self) -> &mut Problem<T>;

    /// The initial population of complete assignments.
    fn generate_population(
        &mut self,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>>;

    /// Higher is fitter.
    fn fitness(&mut self, individual: &Assignment<T>) -> Result<usize>;

    /// The individuals allowed to reproduce.
    fn natural_selection(
        &mut self,
        population: &[Assignment<T>],
        rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>>;

    /// The offspring generation bred from the survivors.
    fn next_generation(
        &mut self,
        survivors: &[Assignment<T>],
        rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>>;

    /// Mutates offspring in place, each with probability
    /// `mutation_probability`.
    fn mutate(
        &mut self,
        generation: &mut [Assignment<T>],
        mutation_probability: f64,
        rng: &mut StdRng,
    ) -> Result<()>;

    /// Scans the population for an individual that solves the problem,
    /// leaving the problem assigned to it when found.
    fn solution(&mut self, population: &[Assignment<T>]) -> Result<Option<Assignment<T>>> {
        for individual in population {
            let problem = self.problem_mut();
            problem.unassign_all();
            problem.assign_from_assignment(individual)?;
            if problem.is_completely_consistently_assigned() {
                return Ok(Some(individual.clone()));
            }
        }
        Ok(None)
    }
}

/// The stock genetic operators: random initial individuals, fitness by
/// consistent-constraint count, half-truncation selection, per-variable
/// coin-flip crossover, and fraction mutation with a single retry against
/// drawing the old value. Read-only variables keep the caller's values in
/// every individual.
pub struct GeneralGeneticSearch<T: Value> {
    problem: Problem<T>,
    mutation_fraction: f64,
    read_only: HashSet<VarId>,
}

impl<T: Value> GeneralGeneticSearch<T> {
    pub fn new(problem: Problem<T>, mutation_fraction: f64) -> Self {
        Self::with_read_only(problem, mutation_fraction, HashSet::new())
    }

    pub fn with_read_only(
        problem: Problem<T>,
        mutation_fraction: f64,
        read_only: HashSet<VarId>,
    ) -> Self {
        Self {
            problem,
            mutation_fraction,
            read_only,
        }
    }

    /// Hands the problem back once the search is over.
    pub fn into_problem(self) -> Problem<T> {
        self.problem
    }

    fn reproduce(
        &self,
        first: &Assignment<T>,
        second: &Assignment<T>,
        rng: &mut StdRng,
    ) -> Assignment<T> {
        let mut child = Assignment::new();
        for var in self.problem.variable_ids() {
            let parent = if rng.random::<f64>() < 0.5 { first } else { second };
            if let Some(value) = parent.get(var).or_else(|| {
                let other = if std::ptr::eq(parent, first) { second } else { first };
                other.get(var)
            }) {
                child.insert(var, value.clone());
            }
        }
        child
    }

    fn mutate_individual(&self, individual: &mut Assignment<T>, rng: &mut StdRng) {
        let mutations = (individual.len() as f64 * self.mutation_fraction) as usize;
        if mutations == 0 {
            return;
        }

        let candidates: Vec<VarId> = self
            .problem
            .variable_ids()
            .filter(|var| !self.read_only.contains(var))
            .collect();
        let mut sampled = candidates;
        // Partial Fisher-Yates: the first `mutations` slots end up a
        // uniform sample without replacement.
        for i in 0..mutations.min(sampled.len()) {
            let j = rng.random_range(i..sampled.len());
            sampled.swap(i, j);
        }
        sampled.truncate(mutations);

        for var in sampled {
            let domain = self.problem.variable(var).domain();
            let Some(mut value) = domain.choose(rng).cloned() else {
                continue;
            };
            if domain.len() > 1 && individual.get(var) == Some(&value) {
                if let Some(redrawn) = domain.choose(rng).cloned() {
                    value = redrawn;
                }
            }
            individual.insert(var, value);
        }
    }
}

impl<T: Value> GeneticSearch<T> for GeneralGeneticSearch<T> {
    fn problem(&self) -> &Problem<T> {
        &self.problem
    }

    fn problem_mut(&mut self) -> &mut Problem<T> {
        &mut self.problem
    }

    fn generate_population(
        &mut self,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>> {
        let read_only = self.read_only.clone();
        let mut population = Vec::with_capacity(size);
        for _ in 0..size {
            self.problem
                .assign_random_values(Some(&read_only), None, rng)?;
            population.push(self.problem.current_assignment());
            for var in self.problem.variable_ids() {
                if !read_only.contains(&var) {
                    self.problem.variable_mut(var).unassign();
                }
            }
        }
        Ok(population)
    }

    fn fitness(&mut self, individual: &Assignment<T>) -> Result<usize> {
        self.problem.unassign_all();
        self.problem.assign_from_assignment(individual)?;
        Ok(self.problem.consistent_constraints_count())
    }

    fn natural_selection(
        &mut self,
        population: &[Assignment<T>],
        _rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>> {
        let mut scored: Vec<(usize, &Assignment<T>)> = Vec::with_capacity(population.len());
        for individual in population {
            scored.push((self.fitness(individual)?, individual));
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let surviving = population.len() / 2;
        Ok(scored
            .into_iter()
            .take(surviving)
            .map(|(_, individual)| individual.clone())
            .collect())
    }

    fn next_generation(
        &mut self,
        survivors: &[Assignment<T>],
        rng: &mut StdRng,
    ) -> Result<Vec<Assignment<T>>> {
        let mut offspring = Vec::with_capacity(survivors.len() * 2);
        for _ in 0..survivors.len() * 2 {
            let first = survivors
                .choose(rng)
                .cloned()
                .unwrap_or_default();
            let second = survivors.choose(rng).cloned().unwrap_or_else(|| first.clone());
            offspring.push(self.reproduce(&first, &second, rng));
        }
        Ok(offspring)
    }

    fn mutate(
        &mut self,
        generation: &mut [Assignment<T>],
        mutation_probability: f64,
        rng: &mut StdRng,
    ) -> Result<()> {
        for individual in generation {
            if rng.random::<f64>() < mutation_probability {
                self.mutate_individual(individual, rng);
            }
        }
        Ok(())
    }
}

/// Drives a [`GeneticSearch`] for up to `max_generations` generations.
///
/// Terminates as soon as any individual solves the problem (leaving the
/// problem assigned to it); otherwise the all-time fittest individual is
/// restored to the problem when the budget runs out.
pub fn genetic_local_search<T: Value>(
    search: &mut impl GeneticSearch<T>,
    population_size: usize,
    max_generations: usize,
    mutation_probability: f64,
    rng: &mut StdRng,
) -> Result<SolveStatus> {
    let mut population = search.generate_population(population_size, rng)?;
    let mut best: Option<(usize, Assignment<T>)> = None;

    for generation in 0..max_generations {
        if search.solution(&population)?.is_some() {
            debug!(generation, "genetic search solved");
            return Ok(SolveStatus::Solved);
        }

        let survivors = search.natural_selection(&population, rng)?;
        let mut offspring = search.next_generation(&survivors, rng)?;
        search.mutate(&mut offspring, mutation_probability, rng)?;
        population = offspring;

        for individual in &population {
            let fitness = search.fitness(individual)?;
            if best.as_ref().map_or(true, |(top, _)| *top < fitness) {
                best = Some((fitness, individual.clone()));
            }
        }
    }

    if let Some((fitness, individual)) = best {
        debug!(fitness, "genetic search restoring its best individual");
        let problem = search.problem_mut();
        problem.unassign_all();
        problem.assign_from_assignment(&individual)?;
        if problem.is_completely_consistently_assigned() {
            return Ok(SolveStatus::Solved);
        }
    }
    Ok(SolveStatus::BestEffort)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, SeedableRng};

    use super::{genetic_local_search, GeneralGeneticSearch, GeneticSearch};
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
    fn evolves_an_easy_chain_to_a_solution() {
        let mut search = GeneralGeneticSearch::new(colouring_chain(4), 0.5);
        let mut rng = StdRng::seed_from_u64(13);

        let status = genetic_local_search(&mut search, 20, 200, 0.3, &mut rng).unwrap();
        assert_eq!(status, SolveStatus::Solved);
        assert!(search.problem().is_completely_consistently_assigned());
    }

    #[test]
    fn read_only_variables_survive_every_generation() {
        let mut problem = colouring_chain(4);
        problem.variable_mut(0).assign(&2).unwrap();
        let mut search =
            GeneralGeneticSearch::with_read_only(problem, 0.5, HashSet::from([0]));
        let mut rng = StdRng::seed_from_u64(21);

        genetic_local_search(&mut search, 10, 30, 0.3, &mut rng).unwrap();
        assert_eq!(search.problem().variable(0).value().unwrap(), &2);
    }

    #[test]
    fn timeout_restores_a_complete_best_effort_state() {
        let variables = vec![
            Variable::new([1]).unwrap(),
            Variable::new([1]).unwrap(),
        ];
        let constraints = vec![Constraint::new(vec![0, 1], evaluators::all_different).unwrap()];
        let problem = Problem::new(variables, constraints).unwrap();
        let mut search = GeneralGeneticSearch::new(problem, 0.5);
        let mut rng = StdRng::seed_from_u64(3);

        let status = genetic_local_search(&mut search, 4, 5, 0.5, &mut rng).unwrap();
        assert_eq!(status, SolveStatus::BestEffort);
        assert!(search.problem().is_completely_assigned());
    }
}
