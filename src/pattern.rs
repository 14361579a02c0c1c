//! Training patterns.

/// One training example: an input vector and its target output vector.
///
/// Dimensions must match the network the pattern is used with; mismatches
/// are caller contract violations and surface as precondition panics.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
}

impl Pattern {
    pub fn new(input: Vec<f32>, target: Vec<f32>) -> Self {
        Self { input, target }
    }
}

/// Assert that every pattern matches the given input/output dimensions.
pub(crate) fn check_dimensions(patterns: &[Pattern], num_inputs: usize, num_outputs: usize) {
    for (i, p) in patterns.iter().enumerate() {
        assert_eq!(p.input.len(), num_inputs, "pattern {} input length mismatch", i);
        assert_eq!(p.target.len(), num_outputs, "pattern {} target length mismatch", i);
    }
}
