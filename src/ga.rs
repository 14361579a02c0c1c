//! Genetic search over a real-valued parameter vector.
//!
//! [`GaSearch`] is a black-box optimizer: it never looks inside the vectors
//! it evolves, only at the objective scores. [`GaTrainer`] wires a network's
//! aggregate RMSE in as the objective and installs the best candidate back
//! into the network.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::config::GaConfig;
use crate::network::Network;
use crate::pattern::{check_dimensions, Pattern};
use crate::trainer::TrainingReport;

/// Whether the objective should be driven down or up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptimizationMode {
    #[default]
    Minimize,
    Maximize,
}

impl OptimizationMode {
    #[inline]
    fn is_better(self, candidate: f32, incumbent: f32) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }
}

/// Evolutionary search engine.
///
/// Owns its population and mutation/crossover policy. One [`Self::evolve`]
/// call advances a single generation; the incumbent best candidate is only
/// ever replaced by a strictly better one, so its score never worsens.
pub struct GaSearch<F: FnMut(&[f32]) -> f32> {
    objective: F,
    mode: OptimizationMode,
    config: GaConfig,
    population: Vec<Vec<f32>>,
    best: Vec<f32>,
    best_score: f32,
    generation: usize,
    rng: ChaCha8Rng,
}

impl<F: FnMut(&[f32]) -> f32> GaSearch<F> {
    /// Create a search seeded with one initial parameter vector.
    ///
    /// The population starts as the seed plus gaussian-jittered copies; the
    /// seed itself is kept verbatim so the incumbent never starts worse than
    /// the caller's vector.
    pub fn new(
        initial: &[f32],
        mut objective: F,
        mode: OptimizationMode,
        config: GaConfig,
    ) -> Self {
        assert!(!initial.is_empty(), "empty parameter vector");
        assert!(config.population_size >= 2, "population_size must be >= 2");
        assert!(
            config.elitism < config.population_size,
            "elitism must be smaller than population_size"
        );

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let mut population = Vec::with_capacity(config.population_size);
        population.push(initial.to_vec());
        for _ in 1..config.population_size {
            let member = initial
                .iter()
                .map(|&v| v + config.mutation_strength * rng.sample::<f32, _>(StandardNormal))
                .collect();
            population.push(member);
        }

        let best_score = objective(initial);

        Self {
            objective,
            mode,
            config,
            population,
            best: initial.to_vec(),
            best_score,
            generation: 0,
            rng,
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best candidate found so far.
    pub fn best(&self) -> &[f32] {
        &self.best
    }

    pub fn best_score(&self) -> f32 {
        self.best_score
    }

    /// Consume the search, releasing the objective's borrows.
    pub fn into_best(self) -> (Vec<f32>, f32) {
        (self.best, self.best_score)
    }

    /// Advance one generation: score the population, update the incumbent,
    /// then breed the next population from elites and tournament winners.
    pub fn evolve(&mut self) {
        let scores: Vec<f32> = self
            .population
            .iter()
            .map(|member| (self.objective)(member))
            .collect();

        // Rank members, best first.
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| {
            if self.mode.is_better(scores[a], scores[b]) {
                std::cmp::Ordering::Less
            } else if self.mode.is_better(scores[b], scores[a]) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });

        let leader = order[0];
        if self.mode.is_better(scores[leader], self.best_score) {
            self.best = self.population[leader].clone();
            self.best_score = scores[leader];
        }

        let mut next = Vec::with_capacity(self.population.len());
        for &idx in order.iter().take(self.config.elitism) {
            next.push(self.population[idx].clone());
        }
        while next.len() < self.population.len() {
            let a = self.tournament(&scores);
            let b = self.tournament(&scores);
            let mut child = self.crossover(a, b);
            self.mutate(&mut child);
            next.push(child);
        }

        self.population = next;
        self.generation += 1;
    }

    /// Tournament selection: the best of a few random members.
    fn tournament(&mut self, scores: &[f32]) -> usize {
        let rounds = self.config.tournament_size.max(1);
        let mut winner = self.rng.gen_range(0..self.population.len());
        for _ in 1..rounds {
            let challenger = self.rng.gen_range(0..self.population.len());
            if self.mode.is_better(scores[challenger], scores[winner]) {
                winner = challenger;
            }
        }
        winner
    }

    /// Uniform crossover between two parents, or a clone of the first.
    fn crossover(&mut self, a: usize, b: usize) -> Vec<f32> {
        if self.rng.gen::<f32>() < self.config.crossover_rate {
            let (pa, pb) = (&self.population[a], &self.population[b]);
            pa.iter()
                .zip(pb)
                .map(|(&ga, &gb)| if self.rng.gen::<bool>() { ga } else { gb })
                .collect()
        } else {
            self.population[a].clone()
        }
    }

    /// Gaussian perturbation of individual genes.
    fn mutate(&mut self, genome: &mut [f32]) {
        for gene in genome.iter_mut() {
            if self.rng.gen::<f32>() < self.config.mutation_rate {
                *gene += self.config.mutation_strength * self.rng.sample::<f32, _>(StandardNormal);
            }
        }
    }
}

/// Black-box trainer: evolves the network's whole weight vector as a genome
/// scored by aggregate RMSE.
#[derive(Clone, Debug, Default)]
pub struct GaTrainer {
    pub config: GaConfig,
}

impl GaTrainer {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    /// Train the network in place, running the configured number of
    /// generations and installing the best weight vector found.
    pub fn train(&self, network: &mut Network, patterns: &[Pattern]) -> TrainingReport {
        assert!(!patterns.is_empty(), "training on an empty pattern set");
        check_dimensions(patterns, network.num_inputs(), network.num_outputs());

        let initial = network.weights().to_vec();
        let generations = self.config.generations;
        let mut trace = Vec::with_capacity(generations);

        let best = {
            let objective = |candidate: &[f32]| {
                network.set_weights(candidate);
                network.rmse(patterns)
            };
            let mut search = GaSearch::new(
                &initial,
                objective,
                OptimizationMode::Minimize,
                self.config.clone(),
            );

            for generation in 0..generations {
                search.evolve();
                trace.push(search.best_score());
                if generation % 100 == 0 {
                    log::debug!(
                        "ga generation {:6} : rmse {:12.4e}",
                        generation,
                        search.best_score()
                    );
                }
            }

            search.into_best().0
        };

        network.set_weights(&best);

        TrainingReport {
            epochs: generations,
            rmse_trace: trace,
            converged: false,
        }
    }
}
