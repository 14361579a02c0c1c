//! Network structure, forward evaluation, and the per-pattern
//! backpropagation update.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::activation::Activation;
use crate::layer::{Layer, Region};
use crate::pattern::Pattern;

/// Upper bound on the total weight count of a network.
///
/// Downstream buffers and optimizer state are sized against this, so
/// construction fails rather than exceeding it.
pub const MAX_NETWORK_SIZE: usize = 1024;

/// Errors raised while constructing a [`Network`].
#[derive(Debug, PartialEq, Eq)]
pub enum NetworkError {
    /// A network needs at least an input and an output layer.
    TooFewLayers(usize),
    /// Layer at the given index has no nodes.
    EmptyLayer(usize),
    /// Total weight count exceeds [`MAX_NETWORK_SIZE`].
    TooLarge { num_weights: usize, max: usize },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewLayers(n) => {
                write!(f, "network must have at least 2 layers, got {}", n)
            }
            Self::EmptyLayer(i) => write!(f, "layer {} has no nodes", i),
            Self::TooLarge { num_weights, max } => {
                write!(f, "network size exceeded: {} weights > {} max", num_weights, max)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// Fully-connected feed-forward network over flat shared buffers.
///
/// One contiguous weight vector and one contiguous activation buffer are
/// partitioned across the layers at construction time; layers hold
/// `(offset, length)` views into disjoint regions of each.
#[derive(Debug)]
pub struct Network {
    weights: Vec<f32>,
    /// Per-pattern gradient, same length as `weights`. Refilled by every
    /// backpropagation update; untouched by the GA path.
    gradient: Vec<f32>,
    activations: Vec<f32>,
    structure: Vec<usize>,
    layers: Vec<Layer>,
    num_inputs: usize,
    num_outputs: usize,
    num_nodes: usize,
}

impl Network {
    /// Create a network from an ordered list of layer sizes.
    ///
    /// Requires at least two layers (input and output), every size >= 1,
    /// and a total weight count within [`MAX_NETWORK_SIZE`]. Weights start
    /// from a deterministic alternating-sign ramp; see
    /// [`Self::randomize_weights`] for a stochastic starting point.
    pub fn new(structure: &[usize], activation: Activation) -> Result<Self, NetworkError> {
        if structure.len() < 2 {
            return Err(NetworkError::TooFewLayers(structure.len()));
        }
        for (i, &size) in structure.iter().enumerate() {
            if size == 0 {
                return Err(NetworkError::EmptyLayer(i));
            }
        }

        let num_inputs = structure[0];
        let num_outputs = structure[structure.len() - 1];

        // The input layer reserves (1+1) weight slots per node even though
        // it performs no weighted sum; the flat layout keeps them as dead
        // storage so layer offsets stay compatible.
        let mut num_weights = 2 * structure[0];
        let mut num_nodes = structure[0];
        for i in 1..structure.len() {
            num_weights += (structure[i - 1] + 1) * structure[i];
            num_nodes += structure[i];
        }

        if num_weights > MAX_NETWORK_SIZE {
            return Err(NetworkError::TooLarge { num_weights, max: MAX_NETWORK_SIZE });
        }

        let mut weights = vec![0.0; num_weights];
        for (i, w) in weights.iter_mut().enumerate() {
            let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
            *w = sign * 0.1 * i as f32 / num_weights as f32;
        }

        // Wire layers to consecutive buffer regions: each layer reads where
        // the previous one wrote.
        let mut layers = Vec::with_capacity(structure.len());
        let mut nw = 0;
        let mut nx = 0;
        let mut ny = num_inputs;
        for (i, &size) in structure.iter().enumerate() {
            let layer_inputs = if i == 0 { 1 } else { structure[i - 1] };
            let layer_weights = (layer_inputs + 1) * size;
            let input_len = if i == 0 { structure[0] } else { structure[i - 1] };

            layers.push(Layer::new(
                Region::new(nw, layer_weights),
                Region::new(nx, input_len),
                Region::new(ny, size),
                layer_inputs,
                size,
                i == 0,
                i == structure.len() - 1,
                activation,
            ));

            nw += layer_weights;
            nx += input_len;
            ny += size;
        }
        debug_assert_eq!(nw, num_weights);
        debug_assert_eq!(ny, num_nodes + num_inputs);

        Ok(Self {
            weights,
            gradient: vec![0.0; num_weights],
            activations: vec![0.0; num_nodes + num_inputs],
            structure: structure.to_vec(),
            layers,
            num_inputs,
            num_outputs,
            num_nodes,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn structure(&self) -> &[usize] {
        &self.structure
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Replace the full weight vector. Panics if the length differs.
    pub fn set_weights(&mut self, weights: &[f32]) {
        assert_eq!(
            weights.len(),
            self.weights.len(),
            "weight vector length mismatch"
        );
        self.weights.copy_from_slice(weights);
    }

    /// Reinitialize every weight from a standard normal distribution.
    pub fn randomize_weights<R: Rng>(&mut self, rng: &mut R) {
        for w in self.weights.iter_mut() {
            *w = rng.sample(StandardNormal);
        }
    }

    /// Forward-evaluate the network, overwriting `output`.
    ///
    /// Panics if `input` or `output` lengths do not match the structure;
    /// dimension mismatches are caller contract violations.
    pub fn evaluate(&mut self, input: &[f32], output: &mut [f32]) {
        assert_eq!(input.len(), self.num_inputs, "input length mismatch");
        assert_eq!(output.len(), self.num_outputs, "output length mismatch");

        self.activations[..self.num_inputs].copy_from_slice(input);
        for layer in &self.layers {
            layer.forward(&self.weights, &mut self.activations);
        }

        let tail = self.activations.len() - self.num_outputs;
        output.copy_from_slice(&self.activations[tail..]);
    }

    /// One backpropagation update for a single training pair.
    ///
    /// Forward-evaluates, attributes `target - prediction` backwards layer
    /// by layer, then applies gradient descent on the whole weight vector
    /// at the given learning rate. The effect is purely the in-place weight
    /// mutation.
    pub fn train_pattern(&mut self, input: &[f32], target: &[f32], learning_rate: f32) {
        assert_eq!(target.len(), self.num_outputs, "target length mismatch");

        let mut prediction = vec![0.0; self.num_outputs];
        self.evaluate(input, &mut prediction);

        let error: Vec<f32> = target
            .iter()
            .zip(&prediction)
            .map(|(t, p)| t - p)
            .collect();

        // Reverse order: each layer consumes the error produced by the
        // layer after it; the last layer consumes the output error.
        for idx in (0..self.layers.len()).rev() {
            let (current, rest) = self.layers.split_at_mut(idx + 1);
            let downstream = match rest.first() {
                Some(next) => next.error(),
                None => error.as_slice(),
            };
            current[idx].backward(&self.weights, &self.activations, downstream);
        }

        self.gradient.fill(0.0);
        for layer in &self.layers {
            layer.accumulate_gradient(&self.activations, &mut self.gradient);
        }
        for (w, g) in self.weights.iter_mut().zip(&self.gradient) {
            *w += learning_rate * g;
        }
    }

    /// Root-mean-square error across all patterns and output nodes.
    ///
    /// Pure with respect to the weights; the fitness signal for both
    /// training strategies.
    pub fn rmse(&mut self, patterns: &[Pattern]) -> f32 {
        assert!(!patterns.is_empty(), "rmse over an empty pattern set");

        let mut prediction = vec![0.0; self.num_outputs];
        let mut acc = 0.0f32;
        for pattern in patterns {
            assert_eq!(pattern.target.len(), self.num_outputs, "target length mismatch");
            self.evaluate(&pattern.input, &mut prediction);

            let mut e = 0.0f32;
            for (p, t) in prediction.iter().zip(&pattern.target) {
                let d = p - t;
                e += d * d;
            }
            acc += e / self.num_outputs as f32;
        }

        (acc / patterns.len() as f32).sqrt()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "perceptron network [")?;
        for (i, size) in self.structure.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", size)?;
        }
        writeln!(f, "]")?;
        writeln!(f, "    num weights : {}", self.num_weights())?;
        writeln!(f, "    num inputs  : {}", self.num_inputs)?;
        writeln!(f, "    num outputs : {}", self.num_outputs)?;
        writeln!(f, "    num nodes   : {}", self.num_nodes)?;
        writeln!(f, "    num layers  : {}", self.structure.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weight_and_node_counts() {
        // num_weights = 2*s[0] + sum (s[i-1]+1)*s[i]
        let net = Network::new(&[1, 1], Activation::Tanh).unwrap();
        assert_eq!(net.num_weights(), 2 + 2);
        assert_eq!(net.num_nodes(), 2);

        let net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        assert_eq!(net.num_weights(), 4 + 9 + 4);
        assert_eq!(net.num_nodes(), 6);

        let net = Network::new(&[4, 5, 5, 2], Activation::Tanh).unwrap();
        assert_eq!(net.num_weights(), 8 + 25 + 30 + 12);
        assert_eq!(net.num_nodes(), 16);
    }

    #[test]
    fn test_too_few_layers() {
        assert_eq!(
            Network::new(&[3], Activation::Tanh).unwrap_err(),
            NetworkError::TooFewLayers(1)
        );
        assert_eq!(
            Network::new(&[], Activation::Tanh).unwrap_err(),
            NetworkError::TooFewLayers(0)
        );
    }

    #[test]
    fn test_empty_layer() {
        assert_eq!(
            Network::new(&[2, 0, 1], Activation::Tanh).unwrap_err(),
            NetworkError::EmptyLayer(1)
        );
    }

    #[test]
    fn test_size_cap() {
        // 2*2 + (2+1)*600 = 1804 > 1024
        match Network::new(&[2, 600], Activation::Tanh) {
            Err(NetworkError::TooLarge { num_weights, max }) => {
                assert_eq!(num_weights, 1804);
                assert_eq!(max, MAX_NETWORK_SIZE);
            }
            other => panic!("expected TooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_ramp_init_deterministic() {
        let a = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let b = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        assert_eq!(a.weights(), b.weights());

        // Alternating sign, scaled by index over total count.
        let n = a.num_weights() as f32;
        assert_relative_eq!(a.weights()[0], 0.0);
        assert_relative_eq!(a.weights()[1], 0.1 * 1.0 / n);
        assert_relative_eq!(a.weights()[2], -0.1 * 2.0 / n);
    }

    #[test]
    fn test_regions_disjoint() {
        let net = Network::new(&[3, 4, 2], Activation::Tanh).unwrap();

        // Weight regions tile the weight buffer without overlap.
        let mut next = 0;
        for layer in net.layers() {
            assert_eq!(layer.weight_region().offset, next);
            next = layer.weight_region().end();
        }
        assert_eq!(next, net.num_weights());

        // Output regions tile the activation buffer after the raw input;
        // each layer's input region is the previous layer's output region.
        let mut next = net.num_inputs();
        for (i, layer) in net.layers().iter().enumerate() {
            assert_eq!(layer.output_region().offset, next);
            next = layer.output_region().end();
            if i > 0 {
                assert_eq!(layer.input_region(), net.layers()[i - 1].output_region());
            }
        }
        assert_eq!(next, net.num_nodes() + net.num_inputs());
    }

    #[test]
    fn test_evaluate_deterministic() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let input = [0.4, -0.9];
        let mut a = [0.0];
        let mut b = [0.0];

        net.evaluate(&input, &mut a);
        net.evaluate(&input, &mut b);

        assert_eq!(a[0].to_bits(), b[0].to_bits());
    }

    #[test]
    fn test_zero_weights_output_is_activated_bias() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let mut weights = vec![0.0; net.num_weights()];

        // Bias of the single output node sits at the end of its weight row.
        let out_layer = net.layers().last().unwrap();
        let bias_index = out_layer.weight_region().offset + out_layer.num_inputs();
        weights[bias_index] = 0.7;
        net.set_weights(&weights);

        let mut a = [0.0];
        let mut b = [0.0];
        net.evaluate(&[0.0, 0.0], &mut a);
        net.evaluate(&[1.0, -1.0], &mut b);

        // Hidden activations are tanh(0) = 0, so the output depends on the
        // bias alone, independent of the input.
        assert_relative_eq!(a[0], 0.7f32.tanh());
        assert_relative_eq!(b[0], 0.7f32.tanh());
    }

    #[test]
    fn test_randomize_weights_seeded() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        let mut a = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let mut b = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();

        a.randomize_weights(&mut rng1);
        b.randomize_weights(&mut rng2);

        assert_eq!(a.weights(), b.weights());
        assert_ne!(a.weights(), Network::new(&[2, 3, 1], Activation::Tanh).unwrap().weights());
    }

    #[test]
    fn test_backprop_update_decreases_error() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let input = [0.3, -0.2];
        let target = [0.5];

        let sq_error = |net: &mut Network| {
            let mut out = [0.0];
            net.evaluate(&input, &mut out);
            (target[0] - out[0]).powi(2)
        };

        let before = sq_error(&mut net);
        net.train_pattern(&input, &target, 0.01);
        let after = sq_error(&mut net);

        assert!(after < before, "expected {} < {}", after, before);
    }

    #[test]
    #[should_panic(expected = "input length mismatch")]
    fn test_evaluate_rejects_wrong_input_len() {
        let mut net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let mut out = [0.0];
        net.evaluate(&[1.0], &mut out);
    }

    #[test]
    fn test_display_summary() {
        let net = Network::new(&[2, 3, 1], Activation::Tanh).unwrap();
        let s = net.to_string();
        assert!(s.contains("[2 3 1]"));
        assert!(s.contains("num weights : 17"));
    }
}
