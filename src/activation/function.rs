use std::fmt;
use std::sync::Arc;

use crate::math::matrix::Matrix;

/// Vector-to-vector forward map of a registered activation.
pub type ForwardFn = Arc<dyn Fn(&[f64]) -> Vec<f64> + Send + Sync>;
/// Jacobian of a registered activation, evaluated at the pre-activation input.
pub type JacobianFn = Arc<dyn Fn(&[f64]) -> Matrix + Send + Sync>;

/// A named non-linearity paired with its Jacobian.
///
/// The built-ins are plain variants; anything registered by a caller through
/// [`ActivationRegistry::insert`](super::ActivationRegistry::insert) becomes
/// `Custom`.
#[derive(Clone)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    /// Vector-valued: every output depends on every input, so its Jacobian
    /// is dense.
    Softmax,
    Custom {
        name: String,
        forward: ForwardFn,
        jacobian: JacobianFn,
    },
}

impl ActivationFunction {
    /// Name under which the function is registered and persisted.
    pub fn name(&self) -> &str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Softmax => "softmax",
            ActivationFunction::Custom { name, .. } => name.as_str(),
        }
    }

    pub fn compute(&self, x: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Sigmoid => x.iter().map(|&v| sigmoid(v)).collect(),
            ActivationFunction::ReLU => x.iter().map(|&v| v.max(0.0)).collect(),
            ActivationFunction::Softmax => softmax(x),
            ActivationFunction::Custom { forward, .. } => forward(x),
        }
    }

    /// Derivative of the activation with respect to its input, evaluated at
    /// `x`. Element-wise functions produce a diagonal matrix.
    pub fn jacobian(&self, x: &[f64]) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => {
                // e^-x / (1 + e^-x)^2, written as s(1 - s) so it stays finite
                // for large negative x.
                let diag: Vec<f64> = x
                    .iter()
                    .map(|&v| {
                        let s = sigmoid(v);
                        s * (1.0 - s)
                    })
                    .collect();
                Matrix::diagonal(&diag)
            }
            ActivationFunction::ReLU => {
                let diag: Vec<f64> = x.iter().map(|&v| if v > 0.0 { 1.0 } else { 0.0 }).collect();
                Matrix::diagonal(&diag)
            }
            ActivationFunction::Softmax => {
                let s = softmax(x);
                Matrix::diagonal(&s) - Matrix::outer(&s, &s)
            }
            ActivationFunction::Custom { jacobian, .. } => jacobian(x),
        }
    }
}

impl fmt::Debug for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFunction::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            _ => f.write_str(self.name()),
        }
    }
}

/// Activations compare by name; two customs registered under the same name
/// are considered the same function.
impl PartialEq for ActivationFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shifted by the maximum so large logits do not overflow `exp`.
fn softmax(x: &[f64]) -> Vec<f64> {
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = x.iter().map(|&v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn sigmoid_values_and_jacobian() {
        let f = ActivationFunction::Sigmoid;
        let y = f.compute(&[0.0, 2.0]);
        assert_close(y[0], 0.5);
        assert_close(y[1], 1.0 / (1.0 + (-2.0f64).exp()));

        let j = f.jacobian(&[0.0, 2.0]);
        assert_close(j[(0, 0)], 0.25);
        let e = (-2.0f64).exp();
        assert_close(j[(1, 1)], e / (1.0 + e).powi(2));
        assert_eq!(j[(0, 1)], 0.0);
        assert_eq!(j[(1, 0)], 0.0);
    }

    #[test]
    fn sigmoid_jacobian_is_finite_for_large_inputs() {
        let j = ActivationFunction::Sigmoid.jacobian(&[-1000.0, 1000.0]);
        assert!(j.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn relu_subgradient_at_zero_is_zero() {
        let f = ActivationFunction::ReLU;
        assert_eq!(f.compute(&[-1.0, 0.0, 3.0]), vec![0.0, 0.0, 3.0]);
        let j = f.jacobian(&[-1.0, 0.0, 3.0]);
        assert_eq!(j.as_slice(), &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn softmax_sums_to_one_and_has_dense_jacobian() {
        let f = ActivationFunction::Softmax;
        let x = [1.0, 2.0, 3.0];
        let s = f.compute(&x);
        assert_close(s.iter().sum(), 1.0);

        let j = f.jacobian(&x);
        for i in 0..3 {
            for k in 0..3 {
                let expected = if i == k { s[i] - s[i] * s[i] } else { -s[i] * s[k] };
                assert_close(j[(i, k)], expected);
            }
        }
    }

    #[test]
    fn softmax_handles_large_logits() {
        let s = ActivationFunction::Softmax.compute(&[1000.0, 1000.0]);
        assert_close(s[0], 0.5);
        assert_close(s[1], 0.5);
    }
}
