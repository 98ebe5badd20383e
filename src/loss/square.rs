pub struct SquareLoss;

impl SquareLoss {
    /// Scalar loss: ||predicted - expected||² / n
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>() / n
    }

    /// Gradient with respect to `predicted`: 2·(predicted - expected)
    ///
    /// This is the gradient of the unscaled sum of squares, i.e. `n` times
    /// the gradient of `loss`. The two agree only for a single output.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| 2.0 * (a - b))
            .collect()
    }
}
