use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::activation::function::ActivationFunction;
use crate::activation::registry::ActivationRegistry;
use crate::error::{Error, Result};
use crate::layers::{ActivationLayer, GradientAccumulator, LinearLayer};
use crate::loss::function::LossFunction;
use crate::loss::registry::LossRegistry;
use crate::network::codec;
use crate::network::spec::NetworkSpec;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::{TrainConfig, DEFAULT_BATCH_SIZE};

#[derive(Debug, Clone)]
struct Layer {
    linear: LinearLayer,
    activation: ActivationLayer,
    gradient: GradientAccumulator,
}

/// A feed-forward network: affine layers interleaved with activations,
/// trained by mini-batch gradient descent on a single loss.
///
/// The network exclusively owns every weight matrix and gradient buffer;
/// nothing outside it can mutate them except through training.
#[derive(Debug, Clone)]
pub struct Network {
    input_size: usize,
    output_size: usize,
    layers: Vec<Layer>,
    loss: LossFunction,
}

impl Network {
    /// Builds a randomly initialized network, resolving function names
    /// against the built-in registries.
    ///
    /// `widths` lists every layer width including the input, so it must be
    /// one longer than `activations`.
    pub fn new<S: AsRef<str>>(widths: &[usize], activations: &[S], loss: &str) -> Result<Network> {
        NetworkSpec::new(widths, activations, loss)
            .build(&ActivationRegistry::new(), &LossRegistry::new())
    }

    /// Assembles a network from explicit layers, checking that their
    /// dimensions chain.
    pub fn from_layers(
        layers: Vec<(LinearLayer, ActivationFunction)>,
        loss: LossFunction,
    ) -> Result<Network> {
        let (first, last) = match (layers.first(), layers.last()) {
            (Some((first, _)), Some((last, _))) => (first.input_size(), last.output_size()),
            _ => return Err(Error::Architecture("a network needs at least one layer".into())),
        };

        for (i, pair) in layers.windows(2).enumerate() {
            let (below, above) = (&pair[0].0, &pair[1].0);
            if below.output_size() != above.input_size() {
                return Err(Error::Architecture(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    below.output_size(),
                    i + 1,
                    above.input_size()
                )));
            }
        }

        let layers = layers
            .into_iter()
            .map(|(linear, function)| Layer {
                gradient: GradientAccumulator::new(linear.input_size(), linear.output_size()),
                activation: ActivationLayer::new(function),
                linear,
            })
            .collect();

        Ok(Network {
            input_size: first,
            output_size: last,
            layers,
            loss,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn loss(&self) -> &LossFunction {
        &self.loss
    }

    /// Linear and activation halves of every layer, input side first.
    pub fn layers(&self) -> impl Iterator<Item = (&LinearLayer, &ActivationLayer)> {
        self.layers.iter().map(|l| (&l.linear, &l.activation))
    }

    /// Gradient sums of the current, not yet applied, mini-batch.
    pub fn gradients(&self) -> impl Iterator<Item = &GradientAccumulator> {
        self.layers.iter().map(|l| &l.gradient)
    }

    /// Forward pass.
    ///
    /// # Panics
    /// Panics if `input.len()` is not the network's input size.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.assert_input(input);
        self.layers.iter().fold(input.to_vec(), |current, layer| {
            layer.activation.calculate(&layer.linear.calculate(&current))
        })
    }

    /// Mean loss over a dataset, without touching the gradients.
    pub fn mean_loss(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> f64 {
        assert_eq!(inputs.len(), targets.len(), "inputs and targets must have equal length");
        if inputs.is_empty() {
            return 0.0;
        }
        let total: f64 = inputs
            .iter()
            .zip(targets)
            .map(|(input, target)| self.loss.value(&self.predict(input), target))
            .sum();
        total / inputs.len() as f64
    }

    /// Backpropagates one sample, adding its gradient to every layer's
    /// accumulator. Returns the sample's loss before any update.
    ///
    /// # Panics
    /// Panics if `input` or `target` have the wrong length.
    pub fn backpropagate(&mut self, input: &[f64], target: &[f64]) -> f64 {
        self.assert_input(input);
        assert_eq!(
            target.len(),
            self.output_size,
            "network produces {} outputs but target has {}",
            self.output_size,
            target.len()
        );

        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();
        for layer in &self.layers {
            let z = layer.linear.calculate(&current);
            let a = layer.activation.calculate(&z);
            layer_inputs.push(current);
            pre_activations.push(z);
            current = a;
        }

        let loss = self.loss.value(&current, target);
        let mut upstream = self.loss.gradient(&current, target);

        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            let jacobian = layer.activation.jacobian(&pre_activations[i]);
            // Gradient with respect to the pre-activation output.
            let signal = jacobian.transpose_mul_vec(&upstream);
            layer.gradient.accumulate(&signal, &layer_inputs[i]);

            if i > 0 {
                upstream = layer.linear.backpropagate_error(&jacobian, &upstream);
            }
        }

        loss
    }

    /// Applies the accumulated gradients averaged over `batch_size` samples,
    /// then clears every accumulator.
    pub fn apply_gradients(&mut self, batch_size: usize) {
        for layer in &mut self.layers {
            layer.linear.apply_gradient(&layer.gradient, batch_size);
            layer.gradient.clear();
        }
    }

    /// Trains for `epochs` passes over the data in batches of
    /// [`DEFAULT_BATCH_SIZE`]. Returns the mean loss of the last epoch.
    ///
    /// # Panics
    /// Panics if `inputs` and `targets` differ in length or contain vectors
    /// of the wrong size.
    pub fn train(&mut self, epochs: usize, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> f64 {
        train_loop(self, inputs, targets, &TrainConfig::new(epochs, DEFAULT_BATCH_SIZE))
    }

    pub fn train_with(&mut self, inputs: &[Vec<f64>], targets: &[Vec<f64>], config: &TrainConfig) -> f64 {
        train_loop(self, inputs, targets, config)
    }

    /// Writes the binary model file described in [`codec`].
    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        codec::write_model(&mut writer, self)?;
        writer.flush()?;
        debug!(?path, layers = self.layers.len(), "Model saved.");
        Ok(())
    }

    /// Reads a model written by [`save_model`](Network::save_model).
    ///
    /// Function names are resolved against the given registries, with the
    /// registries' fallback for names they do not know.
    pub fn load_model(
        path: impl AsRef<Path>,
        activations: &ActivationRegistry,
        losses: &LossRegistry,
    ) -> Result<Network> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let network = codec::read_model(&mut reader, activations, losses)?;
        debug!(?path, layers = network.layers.len(), "Model loaded.");
        Ok(network)
    }

    fn assert_input(&self, input: &[f64]) {
        assert_eq!(
            input.len(),
            self.input_size,
            "network expects {} inputs, got {}",
            self.input_size,
            input.len()
        );
    }
}
