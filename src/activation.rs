//! Activation functions.

use serde::{Deserialize, Serialize};

/// Activation function applied by non-input layers.
///
/// Selected per-network at construction time. Only the hyperbolic tangent
/// ships; the enum keeps layers decoupled from a specific function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Saturating smooth odd function, output in (-1, 1).
    #[default]
    Tanh,
}

impl Activation {
    /// Apply the activation to a raw weighted sum.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Tanh => x.tanh(),
        }
    }

    /// Derivative expressed in terms of the activation *output*.
    ///
    /// For tanh, d/dx tanh(x) = 1 - tanh(x)^2, so the derivative can be
    /// recovered from the stored activation without keeping the raw sum.
    #[inline]
    pub fn derivative_from_output(self, y: f32) -> f32 {
        match self {
            Self::Tanh => 1.0 - y * y,
        }
    }
}
