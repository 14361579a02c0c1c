//! Network layers over shared flat buffers.
//!
//! A layer owns no weights and no activations. It holds `(offset, length)`
//! regions into the network's flat weight and activation buffers; the
//! network passes the buffers in on every call. Region disjointness is
//! established once at construction and is the sole basis for safe reuse.

use ndarray::ArrayView1;

use crate::activation::Activation;

/// A contiguous `(offset, length)` view into a flat buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// End of the region, exclusive.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    fn slice<'a>(&self, buf: &'a [f32]) -> &'a [f32] {
        &buf[self.offset..self.end()]
    }

    #[inline]
    fn slice_mut<'a>(&self, buf: &'a mut [f32]) -> &'a mut [f32] {
        &mut buf[self.offset..self.end()]
    }
}

/// One stage of the feed-forward network.
///
/// Maps an input activation region to an output activation region through
/// a weighted sum plus bias and the activation function. The input layer is
/// an identity pass-through: its weight slots exist in the flat layout but
/// are never read.
#[derive(Clone, Debug)]
pub struct Layer {
    weights: Region,
    inputs: Region,
    outputs: Region,
    num_inputs: usize,
    num_outputs: usize,
    is_input_layer: bool,
    is_output_layer: bool,
    activation: Activation,
    /// Local error signal, one per output node (written during backward).
    delta: Vec<f32>,
    /// Error attributed to this layer's inputs, read by the previous layer.
    error: Vec<f32>,
}

impl Layer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        weights: Region,
        inputs: Region,
        outputs: Region,
        num_inputs: usize,
        num_outputs: usize,
        is_input_layer: bool,
        is_output_layer: bool,
        activation: Activation,
    ) -> Self {
        debug_assert_eq!(weights.len, (num_inputs + 1) * num_outputs);
        debug_assert_eq!(outputs.len, num_outputs);

        let error_len = if is_input_layer { num_outputs } else { num_inputs };

        Self {
            weights,
            inputs,
            outputs,
            num_inputs,
            num_outputs,
            is_input_layer,
            is_output_layer,
            activation,
            delta: vec![0.0; num_outputs],
            error: vec![0.0; error_len],
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn is_input_layer(&self) -> bool {
        self.is_input_layer
    }

    pub fn is_output_layer(&self) -> bool {
        self.is_output_layer
    }

    pub fn weight_region(&self) -> Region {
        self.weights
    }

    pub fn input_region(&self) -> Region {
        self.inputs
    }

    pub fn output_region(&self) -> Region {
        self.outputs
    }

    /// Error attributed to this layer's inputs by the last backward pass.
    pub fn error(&self) -> &[f32] {
        &self.error
    }

    /// Forward pass: read the input region, write the output region.
    ///
    /// Weight layout per output node `j`: `num_inputs` weights followed by
    /// one bias, at `weights.offset + j * (num_inputs + 1)`.
    pub(crate) fn forward(&self, weights: &[f32], activations: &mut [f32]) {
        // Input regions always precede output regions in the shared buffer.
        let (head, tail) = activations.split_at_mut(self.outputs.offset);
        let x = self.inputs.slice(head);
        let y = &mut tail[..self.outputs.len];

        if self.is_input_layer {
            y.copy_from_slice(x);
            return;
        }

        let w = self.weights.slice(weights);
        let xv = ArrayView1::from(x);
        let row_len = self.num_inputs + 1;
        for (j, out) in y.iter_mut().enumerate() {
            let row = &w[j * row_len..(j + 1) * row_len];
            let sum = ArrayView1::from(&row[..self.num_inputs]).dot(&xv) + row[self.num_inputs];
            *out = self.activation.apply(sum);
        }
    }

    /// Backward pass: attribute `downstream` (error on this layer's outputs)
    /// to this layer's inputs via the activation derivative and the transpose
    /// of the weight matrix.
    pub(crate) fn backward(
        &mut self,
        weights: &[f32],
        activations: &[f32],
        downstream: &[f32],
    ) {
        debug_assert_eq!(downstream.len(), self.num_outputs);

        if self.is_input_layer {
            // Identity stage: no derivative, no weights to transpose.
            self.delta.copy_from_slice(downstream);
            self.error.copy_from_slice(downstream);
            return;
        }

        let y = self.outputs.slice(activations);
        for j in 0..self.num_outputs {
            self.delta[j] = downstream[j] * self.activation.derivative_from_output(y[j]);
        }

        let w = self.weights.slice(weights);
        let row_len = self.num_inputs + 1;
        for i in 0..self.num_inputs {
            let mut e = 0.0;
            for j in 0..self.num_outputs {
                e += self.delta[j] * w[j * row_len + i];
            }
            self.error[i] = e;
        }
    }

    /// Write this layer's per-pattern gradient into its slice of the shared
    /// gradient buffer. Must run after [`Self::backward`].
    pub(crate) fn accumulate_gradient(&self, activations: &[f32], gradient: &mut [f32]) {
        if self.is_input_layer {
            // Dead weight storage, nothing to learn.
            return;
        }

        let x = self.inputs.slice(activations);
        let g = self.weights.slice_mut(gradient);
        let row_len = self.num_inputs + 1;
        for j in 0..self.num_outputs {
            let row = &mut g[j * row_len..(j + 1) * row_len];
            for i in 0..self.num_inputs {
                row[i] += self.delta[j] * x[i];
            }
            row[self.num_inputs] += self.delta[j];
        }
    }
}
