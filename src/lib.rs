//! # annet
//!
//! Small feed-forward neural network with a flat weight layout and two
//! interchangeable training strategies: per-pattern backpropagation and a
//! black-box genetic search over the whole weight vector.
//!
//! The network owns one contiguous weight buffer and one contiguous
//! activation buffer; layers hold `(offset, length)` views into disjoint
//! regions of each. Both trainers mutate the weight vector in place to
//! reduce aggregate RMSE and are drop-in replacements for each other.
//!
//! ## Quick Start
//!
//! ```rust
//! use annet::{Activation, BackpropTrainer, GaTrainer, Network, Pattern, TrainingConfig};
//!
//! let mut network = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
//!
//! let patterns = vec![
//!     Pattern::new(vec![0.0, 0.0], vec![0.0]),
//!     Pattern::new(vec![0.0, 1.0], vec![1.0]),
//!     Pattern::new(vec![1.0, 0.0], vec![1.0]),
//!     Pattern::new(vec![1.0, 1.0], vec![0.0]),
//! ];
//!
//! let config = TrainingConfig::default();
//!
//! // Gradient-based training...
//! let report = BackpropTrainer::new(config.backprop.clone()).train(&mut network, &patterns);
//! println!("rmse after {} epochs: {}", report.epochs, report.final_rmse());
//!
//! // ...or black-box genetic search over the same network.
//! let report = GaTrainer::new(config.ga.clone()).train(&mut network, &patterns);
//! println!("rmse after {} generations: {}", report.epochs, report.final_rmse());
//! ```

pub mod activation;
pub mod config;
pub mod ga;
pub mod layer;
pub mod network;
pub mod pattern;
pub mod trainer;

pub use activation::Activation;
pub use config::{BackpropConfig, GaConfig, TrainingConfig};
pub use ga::{GaSearch, GaTrainer, OptimizationMode};
pub use layer::{Layer, Region};
pub use network::{Network, NetworkError, MAX_NETWORK_SIZE};
pub use pattern::Pattern;
pub use trainer::{BackpropTrainer, TrainingReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
