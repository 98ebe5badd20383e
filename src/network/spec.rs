use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::registry::ActivationRegistry;
use crate::error::{Error, Result};
use crate::layers::LinearLayer;
use crate::loss::registry::LossRegistry;
use crate::network::network::Network;

/// A serializable description of a network architecture: layer widths,
/// one activation name per layer and the loss name.
///
/// Names are resolved only when the spec is built, so a spec can be stored
/// as JSON before any custom functions are registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Every layer width, input first; one longer than `activations`.
    pub widths: Vec<usize>,
    pub activations: Vec<String>,
    pub loss: String,
}

impl NetworkSpec {
    pub fn new<S: AsRef<str>>(widths: &[usize], activations: &[S], loss: &str) -> NetworkSpec {
        NetworkSpec {
            widths: widths.to_vec(),
            activations: activations.iter().map(|a| a.as_ref().to_owned()).collect(),
            loss: loss.to_owned(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.widths.len() < 2 {
            return Err(Error::Architecture(format!(
                "need at least an input and an output width, got {} widths",
                self.widths.len()
            )));
        }
        if self.activations.len() + 1 != self.widths.len() {
            return Err(Error::Architecture(format!(
                "{} widths need {} activations, got {}",
                self.widths.len(),
                self.widths.len() - 1,
                self.activations.len()
            )));
        }
        if let Some(i) = self.widths.iter().position(|&w| w == 0) {
            return Err(Error::Architecture(format!("width {i} is zero")));
        }
        Ok(())
    }

    /// Builds a randomly initialized network.
    pub fn build(&self, activations: &ActivationRegistry, losses: &LossRegistry) -> Result<Network> {
        self.build_with_rng(activations, losses, &mut rand::thread_rng())
    }

    /// Like [`build`](NetworkSpec::build), drawing initial weights from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        activations: &ActivationRegistry,
        losses: &LossRegistry,
        rng: &mut R,
    ) -> Result<Network> {
        self.validate()?;

        let layers = self
            .widths
            .windows(2)
            .zip(&self.activations)
            .map(|(dims, name)| (LinearLayer::new(dims[0], dims[1], &mut *rng), activations.get(name)))
            .collect();

        Network::from_layers(layers, losses.get(&self.loss))
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
