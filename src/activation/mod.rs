pub mod function;
pub mod registry;

pub use function::ActivationFunction;
pub use registry::ActivationRegistry;
