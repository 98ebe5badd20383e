use crate::activation::function::ActivationFunction;
use crate::math::matrix::Matrix;

/// The non-linear half of a network layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationLayer {
    function: ActivationFunction,
}

impl ActivationLayer {
    pub fn new(function: ActivationFunction) -> ActivationLayer {
        ActivationLayer { function }
    }

    pub fn function(&self) -> &ActivationFunction {
        &self.function
    }

    pub fn calculate(&self, x: &[f64]) -> Vec<f64> {
        self.function.compute(x)
    }

    /// Jacobian of the activation at the pre-activation values `x`.
    pub fn jacobian(&self, x: &[f64]) -> Matrix {
        self.function.jacobian(x)
    }
}
