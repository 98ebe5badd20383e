//! Compares backpropagated gradients against central finite differences.
//!
//! The `square` gradient is `2(p - t)`, the derivative of the plain sum of
//! squares; the reported loss divides that sum by the output width. The
//! numeric side therefore differentiates `n * value`.

use ferrite_mlp::{ActivationFunction, LinearLayer, LossFunction, Matrix, Network};

const EPSILON: f64 = 1e-6;
const TOLERANCE: f64 = 1e-5;

type Params = Vec<(Matrix, Vec<f64>, ActivationFunction)>;

fn build(params: &Params) -> Network {
    let layers = params
        .iter()
        .map(|(w, b, f)| (LinearLayer::from_parts(w.clone(), b.clone()).unwrap(), f.clone()))
        .collect();
    Network::from_layers(layers, LossFunction::Square).unwrap()
}

fn loss_at(params: &Params, input: &[f64], target: &[f64]) -> f64 {
    let network = build(params);
    let prediction = network.predict(input);
    prediction.len() as f64 * network.loss().value(&prediction, target)
}

fn check(params: Params, input: &[f64], target: &[f64]) {
    let mut network = build(&params);
    network.backpropagate(input, target);
    let analytic: Vec<_> = network.gradients().cloned().collect();

    for (layer, grad) in analytic.iter().enumerate() {
        let (rows, cols) = (params[layer].0.rows, params[layer].0.cols);

        for i in 0..rows {
            for j in 0..cols {
                let mut plus = params.clone();
                plus[layer].0[(i, j)] += EPSILON;
                let mut minus = params.clone();
                minus[layer].0[(i, j)] -= EPSILON;

                let numeric = (loss_at(&plus, input, target) - loss_at(&minus, input, target)) / (2.0 * EPSILON);
                let a = grad.d_weights()[(i, j)];
                assert!(
                    (a - numeric).abs() < TOLERANCE,
                    "layer {layer} weight ({i}, {j}): analytic {a}, numeric {numeric}"
                );
            }

            let mut plus = params.clone();
            plus[layer].1[i] += EPSILON;
            let mut minus = params.clone();
            minus[layer].1[i] -= EPSILON;

            let numeric = (loss_at(&plus, input, target) - loss_at(&minus, input, target)) / (2.0 * EPSILON);
            let a = grad.d_bias()[i];
            assert!(
                (a - numeric).abs() < TOLERANCE,
                "layer {layer} bias {i}: analytic {a}, numeric {numeric}"
            );
        }
    }
}

#[test]
fn single_output_matches_the_mean_loss_directly() {
    let params = vec![(
        Matrix::from_rows(vec![vec![0.3, -0.7, 0.2]]),
        vec![0.05],
        ActivationFunction::Sigmoid,
    )];
    let input = [0.5, -1.0, 2.0];
    let target = [1.0];

    let mut network = build(&params);
    network.backpropagate(&input, &target);
    let grad = network.gradients().next().unwrap().clone();

    for j in 0..3 {
        let mut plus = params.clone();
        plus[0].0[(0, j)] += EPSILON;
        let mut minus = params.clone();
        minus[0].0[(0, j)] -= EPSILON;

        let value = |p: &Params| {
            let net = build(p);
            net.loss().value(&net.predict(&input), &target)
        };
        let numeric = (value(&plus) - value(&minus)) / (2.0 * EPSILON);
        let a = grad.d_weights()[(0, j)];
        assert!((a - numeric).abs() < TOLERANCE, "weight {j}: analytic {a}, numeric {numeric}");
    }
}

#[test]
fn single_sigmoid_layer() {
    let params = vec![(
        Matrix::from_rows(vec![vec![0.3, -0.7, 0.2], vec![-0.1, 0.4, 0.9]]),
        vec![0.05, -0.2],
        ActivationFunction::Sigmoid,
    )];
    check(params, &[0.5, -1.0, 2.0], &[1.0, 0.0]);
}

#[test]
fn single_softmax_layer() {
    let params = vec![(
        Matrix::from_rows(vec![vec![0.3, -0.7], vec![-0.1, 0.4], vec![0.8, 0.6]]),
        vec![0.1, 0.0, -0.3],
        ActivationFunction::Softmax,
    )];
    check(params, &[1.0, -0.5], &[0.0, 1.0, 0.0]);
}

#[test]
fn stacked_relu_sigmoid_softmax() {
    // Pre-activations of the relu layer stay well away from the kink at 0.
    let params = vec![
        (
            Matrix::from_rows(vec![vec![0.5, 0.25], vec![-0.75, 0.5], vec![0.2, 0.9]]),
            vec![0.1, -0.3, 0.2],
            ActivationFunction::ReLU,
        ),
        (
            Matrix::from_rows(vec![vec![0.4, -0.6, 0.3], vec![-0.2, 0.7, 0.5]]),
            vec![0.0, 0.1],
            ActivationFunction::Sigmoid,
        ),
        (
            Matrix::from_rows(vec![vec![1.2, -0.8], vec![-0.4, 0.9]]),
            vec![0.05, -0.05],
            ActivationFunction::Softmax,
        ),
    ];
    check(params, &[1.0, 0.5], &[1.0, 0.0]);
}
