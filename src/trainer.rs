//! Backpropagation training loop.

use crate::config::BackpropConfig;
use crate::network::Network;
use crate::pattern::{check_dimensions, Pattern};

/// Outcome of a training run.
///
/// `rmse_trace` holds one aggregate RMSE value per epoch (or generation),
/// ready for a host to log or plot.
#[derive(Clone, Debug)]
pub struct TrainingReport {
    /// Epochs (or generations) actually run.
    pub epochs: usize,
    /// Aggregate RMSE after each epoch.
    pub rmse_trace: Vec<f32>,
    /// Whether training stopped because RMSE fell below tolerance.
    pub converged: bool,
}

impl TrainingReport {
    /// RMSE after the final epoch.
    pub fn final_rmse(&self) -> f32 {
        self.rmse_trace.last().copied().unwrap_or(f32::INFINITY)
    }
}

/// Per-pattern gradient-descent driver.
///
/// Runs one backpropagation update per pattern per epoch, recomputes the
/// aggregate RMSE, and stops early once it drops below the configured
/// tolerance.
#[derive(Clone, Debug, Default)]
pub struct BackpropTrainer {
    pub config: BackpropConfig,
}

impl BackpropTrainer {
    pub fn new(config: BackpropConfig) -> Self {
        Self { config }
    }

    /// Train the network in place on the given pattern set.
    pub fn train(&self, network: &mut Network, patterns: &[Pattern]) -> TrainingReport {
        assert!(!patterns.is_empty(), "training on an empty pattern set");
        check_dimensions(patterns, network.num_inputs(), network.num_outputs());

        let mut trace = Vec::new();
        let mut converged = false;

        for epoch in 0..self.config.max_epochs {
            for pattern in patterns {
                network.train_pattern(&pattern.input, &pattern.target, self.config.learning_rate);
            }

            let rmse = network.rmse(patterns);
            trace.push(rmse);

            if self.config.log_interval > 0 && epoch % self.config.log_interval == 0 {
                log::debug!("backprop epoch {:6} : rmse {:12.4e}", epoch, rmse);
            }

            if rmse < self.config.tolerance {
                converged = true;
                break;
            }
        }

        TrainingReport {
            epochs: trace.len(),
            rmse_trace: trace,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use approx::assert_relative_eq;

    fn simple_patterns() -> Vec<Pattern> {
        vec![
            Pattern::new(vec![0.2, 0.1], vec![0.3]),
            Pattern::new(vec![-0.4, 0.5], vec![-0.2]),
        ]
    }

    #[test]
    fn test_rmse_non_negative_and_zero_iff_exact() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let patterns = simple_patterns();
        assert!(net.rmse(&patterns) > 0.0);

        // Targets equal to the network's own predictions give zero RMSE.
        let mut exact = Vec::new();
        for p in &patterns {
            let mut out = [0.0];
            net.evaluate(&p.input, &mut out);
            exact.push(Pattern::new(p.input.clone(), vec![out[0]]));
        }
        assert_relative_eq!(net.rmse(&exact), 0.0);
    }

    #[test]
    fn test_training_reduces_rmse() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let patterns = simple_patterns();
        let before = net.rmse(&patterns);

        let trainer = BackpropTrainer::new(BackpropConfig {
            max_epochs: 200,
            tolerance: 0.0,
            ..BackpropConfig::default()
        });
        let report = trainer.train(&mut net, &patterns);

        assert_eq!(report.epochs, 200);
        assert!(!report.converged);
        assert!(report.final_rmse() < before);
    }

    #[test]
    fn test_early_stop_on_tolerance() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let patterns = simple_patterns();

        // Tolerance above the starting error stops after the first epoch.
        let tolerance = net.rmse(&patterns) * 2.0;
        let trainer = BackpropTrainer::new(BackpropConfig {
            tolerance,
            ..BackpropConfig::default()
        });
        let report = trainer.train(&mut net, &patterns);

        assert!(report.converged);
        assert_eq!(report.epochs, 1);
        assert!(report.final_rmse() < tolerance);
    }

    #[test]
    #[should_panic(expected = "input length mismatch")]
    fn test_rejects_mismatched_patterns() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let patterns = vec![Pattern::new(vec![0.1], vec![0.3])];
        BackpropTrainer::default().train(&mut net, &patterns);
    }
}
