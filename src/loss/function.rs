use std::fmt;
use std::sync::Arc;

use crate::loss::square::SquareLoss;

/// Scalar loss of a prediction against its target.
pub type ValueFn = Arc<dyn Fn(&[f64], &[f64]) -> f64 + Send + Sync>;
/// Gradient of the loss with respect to the prediction.
pub type GradientFn = Arc<dyn Fn(&[f64], &[f64]) -> Vec<f64> + Send + Sync>;

/// A named loss paired with its gradient.
#[derive(Clone)]
pub enum LossFunction {
    Square,
    Custom {
        name: String,
        value: ValueFn,
        gradient: GradientFn,
    },
}

impl LossFunction {
    pub fn name(&self) -> &str {
        match self {
            LossFunction::Square => "square",
            LossFunction::Custom { name, .. } => name.as_str(),
        }
    }

    /// # Panics
    /// Panics if `prediction` and `target` differ in length.
    pub fn value(&self, prediction: &[f64], target: &[f64]) -> f64 {
        assert_same_len(prediction, target);
        match self {
            LossFunction::Square => SquareLoss::loss(prediction, target),
            LossFunction::Custom { value, .. } => value(prediction, target),
        }
    }

    /// # Panics
    /// Panics if `prediction` and `target` differ in length.
    pub fn gradient(&self, prediction: &[f64], target: &[f64]) -> Vec<f64> {
        assert_same_len(prediction, target);
        match self {
            LossFunction::Square => SquareLoss::derivative(prediction, target),
            LossFunction::Custom { gradient, .. } => gradient(prediction, target),
        }
    }
}

fn assert_same_len(prediction: &[f64], target: &[f64]) {
    assert_eq!(
        prediction.len(),
        target.len(),
        "prediction has {} values but target has {}",
        prediction.len(),
        target.len()
    );
}

impl fmt::Debug for LossFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossFunction::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            _ => f.write_str(self.name()),
        }
    }
}

impl PartialEq for LossFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_loss_value_and_gradient() {
        let loss = LossFunction::Square;
        let p = [1.0, 0.0];
        let t = [0.0, 0.0];
        assert_eq!(loss.value(&p, &t), 0.5);
        assert_eq!(loss.gradient(&p, &t), vec![2.0, 0.0]);
        assert_eq!(loss.value(&t, &t), 0.0);
    }

    #[test]
    #[should_panic]
    fn mismatched_lengths_panic() {
        LossFunction::Square.value(&[1.0, 2.0], &[1.0]);
    }
}
