use crate::math::matrix::Matrix;

/// Running sum of one linear layer's weight and bias gradients over the
/// current mini-batch.
///
/// Holds sums, not averages; the division by the batch size happens in
/// [`LinearLayer::apply_gradient`](super::linear::LinearLayer::apply_gradient).
#[derive(Debug, Clone, PartialEq)]
pub struct GradientAccumulator {
    d_weights: Matrix,
    d_bias: Vec<f64>,
}

impl GradientAccumulator {
    pub fn new(input_size: usize, output_size: usize) -> GradientAccumulator {
        GradientAccumulator {
            d_weights: Matrix::zeros(output_size, input_size),
            d_bias: vec![0.0; output_size],
        }
    }

    pub fn d_weights(&self) -> &Matrix {
        &self.d_weights
    }

    pub fn d_bias(&self) -> &[f64] {
        &self.d_bias
    }

    /// Adds one sample's contribution: `dW += signal ⊗ input`, `db += signal`.
    pub fn accumulate(&mut self, signal: &[f64], input: &[f64]) {
        self.d_weights.add_outer(signal, input);
        for (db, s) in self.d_bias.iter_mut().zip(signal) {
            *db += s;
        }
    }

    pub fn clear(&mut self) {
        self.d_weights.fill(0.0);
        self.d_bias.iter_mut().for_each(|x| *x = 0.0);
    }

    pub fn is_zero(&self) -> bool {
        self.d_weights.as_slice().iter().chain(&self.d_bias).all(|&x| x == 0.0)
    }
}
