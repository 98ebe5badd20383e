use rand::Rng;

use crate::error::{Error, Result};
use crate::layers::gradient::GradientAccumulator;
use crate::math::matrix::Matrix;

/// One affine transform `y = W·x + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearLayer {
    weights: Matrix, // out x in
    bias: Vec<f64>,
}

impl LinearLayer {
    /// Creates a layer with weights and bias drawn uniformly from `[-1, 1)`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> LinearLayer {
        let weights = Matrix::random(output_size, input_size, rng);
        let bias = (0..output_size).map(|_| rng.gen_range(-1.0..1.0)).collect();
        LinearLayer { weights, bias }
    }

    /// Builds a layer from explicit parameters.
    pub fn from_parts(weights: Matrix, bias: Vec<f64>) -> Result<LinearLayer> {
        if weights.rows != bias.len() {
            return Err(Error::Architecture(format!(
                "weight matrix has {} rows but bias has {} entries",
                weights.rows,
                bias.len()
            )));
        }
        if weights.rows == 0 || weights.cols == 0 {
            return Err(Error::Architecture(format!(
                "layer dimensions must be non-zero, got {}x{}",
                weights.rows, weights.cols
            )));
        }
        Ok(LinearLayer { weights, bias })
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn output_size(&self) -> usize {
        self.weights.rows
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    /// `W·x + b`.
    ///
    /// # Panics
    /// Panics if `x.len()` is not the layer's input size.
    pub fn calculate(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(
            x.len(),
            self.input_size(),
            "linear layer expects {} inputs, got {}",
            self.input_size(),
            x.len()
        );
        let mut y = self.weights.mul_vec(x);
        for (v, b) in y.iter_mut().zip(&self.bias) {
            *v += b;
        }
        y
    }

    /// Maps the gradient signal `upstream` (with respect to this layer's
    /// activated output) to the signal for the layer below:
    /// `(upstreamᵀ · jacobian · W)ᵀ`.
    pub fn backpropagate_error(&self, jacobian: &Matrix, upstream: &[f64]) -> Vec<f64> {
        assert_eq!(jacobian.rows, self.output_size(), "Jacobian does not match layer output");
        assert_eq!(jacobian.cols, self.output_size(), "Jacobian must be square");
        self.weights.transpose_mul_vec(&jacobian.transpose_mul_vec(upstream))
    }

    /// Applies the averaged batch gradient with unit learning rate.
    ///
    /// # Panics
    /// Panics if `batch_size` is zero or `accum` has a different shape.
    pub fn apply_gradient(&mut self, accum: &GradientAccumulator, batch_size: usize) {
        assert!(batch_size > 0, "batch_size must be at least 1");
        assert_eq!(accum.d_bias().len(), self.bias.len(), "accumulator does not match layer");

        let inv_batch = 1.0 / batch_size as f64;
        self.weights.sub_scaled(accum.d_weights(), inv_batch);
        for (b, db) in self.bias.iter_mut().zip(accum.d_bias()) {
            *b -= db * inv_batch;
        }
    }
}
