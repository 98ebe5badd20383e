//! A small multilayer perceptron: affine layers interleaved with activation
//! layers, trained by mini-batch gradient descent with backpropagation, and
//! persisted in a compact binary format.
//!
//! ```no_run
//! use ferrite_mlp::{ActivationRegistry, LossRegistry, Network};
//!
//! let mut network = Network::new(&[2, 2, 1], &["relu", "sigmoid"], "square")?;
//! let inputs = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
//! let targets = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! network.train(1000, &inputs, &targets);
//!
//! network.save_model("xor.model")?;
//! let reloaded = Network::load_model("xor.model", &ActivationRegistry::new(), &LossRegistry::new())?;
//! assert_eq!(reloaded.predict(&[1.0, 0.0]), network.predict(&[1.0, 0.0]));
//! # Ok::<(), ferrite_mlp::Error>(())
//! ```

pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::{ActivationFunction, ActivationRegistry};
pub use error::{Error, Result};
pub use layers::{ActivationLayer, GradientAccumulator, LinearLayer};
pub use loss::{LossFunction, LossRegistry};
pub use math::matrix::Matrix;
pub use network::{Network, NetworkSpec};
pub use train::{train_loop, EpochStats, TrainConfig, DEFAULT_BATCH_SIZE};
