pub mod activation;
pub mod gradient;
pub mod linear;

pub use activation::ActivationLayer;
pub use gradient::GradientAccumulator;
pub use linear::LinearLayer;
