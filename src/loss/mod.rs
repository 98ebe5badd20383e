pub mod function;
pub mod registry;
pub mod square;

pub use function::LossFunction;
pub use registry::LossRegistry;
pub use square::SquareLoss;
