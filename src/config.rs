//! Training configuration.
//!
//! Serde-backed structs with sensible defaults and YAML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for both training strategies.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrainingConfig {
    #[serde(default)]
    pub backprop: BackpropConfig,
    #[serde(default)]
    pub ga: GaConfig,
}

/// Gradient-descent training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackpropConfig {
    /// Step size for the weight update.
    pub learning_rate: f32,
    /// Maximum number of passes over the training set.
    pub max_epochs: usize,
    /// Stop once aggregate RMSE drops below this.
    pub tolerance: f32,
    /// Epochs between progress log lines.
    pub log_interval: usize,
}

impl Default for BackpropConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_epochs: 4000,
            tolerance: 0.05,
            log_interval: 100,
        }
    }
}

/// Genetic-search training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Number of candidate weight vectors per generation.
    pub population_size: usize,
    /// Generations to run.
    pub generations: usize,
    /// Per-gene probability of a mutation.
    pub mutation_rate: f32,
    /// Standard deviation of a mutation perturbation.
    pub mutation_strength: f32,
    /// Probability that a child mixes genes from both parents.
    pub crossover_rate: f32,
    /// Top candidates copied unchanged into the next generation.
    pub elitism: usize,
    /// Candidates drawn per tournament selection round.
    pub tournament_size: usize,
    /// RNG seed, for reproducible runs.
    pub seed: u64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 32,
            generations: 1000,
            mutation_rate: 0.1,
            mutation_strength: 0.25,
            crossover_rate: 0.6,
            elitism: 2,
            tournament_size: 3,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: TrainingConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.backprop.learning_rate <= 0.0 {
            return Err("learning_rate must be > 0".to_string());
        }
        if self.backprop.max_epochs == 0 {
            return Err("max_epochs must be > 0".to_string());
        }
        if self.backprop.tolerance < 0.0 {
            return Err("tolerance must be >= 0".to_string());
        }
        if self.ga.population_size < 2 {
            return Err("population_size must be >= 2".to_string());
        }
        if self.ga.elitism >= self.ga.population_size {
            return Err("elitism must be smaller than population_size".to_string());
        }
        if self.ga.tournament_size == 0 {
            return Err("tournament_size must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.ga.mutation_rate) {
            return Err("mutation_rate must be in [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.ga.crossover_rate) {
            return Err("crossover_rate must be in [0, 1]".to_string());
        }
        Ok(())
    }
}
