use std::sync::Arc;

use tracing::warn;

use crate::activation::function::ActivationFunction;
use crate::math::matrix::Matrix;

/// Name-keyed set of activation functions.
///
/// Networks never build activations ad hoc; construction and model loading
/// resolve names against a registry owned by the caller.
///
/// # Fallback policy
/// Resolving a name that is not registered is not an error: [`get`] returns
/// the default, `sigmoid`, and logs a warning. Model files rely on this, so a
/// model that names a function the loading side does not know still loads.
///
/// [`get`]: ActivationRegistry::get
#[derive(Debug, Clone)]
pub struct ActivationRegistry {
    // Index 0 is always the fallback.
    functions: Vec<ActivationFunction>,
}

impl ActivationRegistry {
    pub const DEFAULT: &'static str = "sigmoid";

    /// A registry holding only the built-ins: `sigmoid`, `relu`, `softmax`.
    pub fn new() -> ActivationRegistry {
        ActivationRegistry {
            functions: builtins(),
        }
    }

    /// Registers a custom activation. An existing entry with the same name,
    /// built-in or not, is replaced.
    pub fn insert<F, J>(&mut self, name: impl Into<String>, forward: F, jacobian: J)
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
        J: Fn(&[f64]) -> Matrix + Send + Sync + 'static,
    {
        let function = ActivationFunction::Custom {
            name: name.into(),
            forward: Arc::new(forward),
            jacobian: Arc::new(jacobian),
        };
        match self.functions.iter_mut().find(|f| f.name() == function.name()) {
            Some(slot) => *slot = function,
            None => self.functions.push(function),
        }
    }

    /// Resolves `name`, falling back to `sigmoid` when it is unknown.
    pub fn get(&self, name: &str) -> ActivationFunction {
        match self.functions.iter().find(|f| f.name() == name) {
            Some(f) => f.clone(),
            None => {
                warn!(function = name, fallback = Self::DEFAULT, "Unknown activation function; using the default.");
                self.functions[0].clone()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.iter().any(|f| f.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name())
    }

    /// Drops every custom registration and restores the built-ins.
    pub fn clear(&mut self) {
        self.functions = builtins();
    }
}

impl Default for ActivationRegistry {
    fn default() -> Self {
        ActivationRegistry::new()
    }
}

fn builtins() -> Vec<ActivationFunction> {
    vec![
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::Softmax,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tanh_registry() -> ActivationRegistry {
        let mut registry = ActivationRegistry::new();
        registry.insert(
            "tanh",
            |x: &[f64]| x.iter().map(|v| v.tanh()).collect(),
            |x: &[f64]| {
                let diag: Vec<f64> = x.iter().map(|v| 1.0 - v.tanh().powi(2)).collect();
                Matrix::diagonal(&diag)
            },
        );
        registry
    }

    #[test]
    fn resolves_builtins_by_name() {
        let registry = ActivationRegistry::new();
        assert_eq!(registry.get("sigmoid"), ActivationFunction::Sigmoid);
        assert_eq!(registry.get("relu"), ActivationFunction::ReLU);
        assert_eq!(registry.get("softmax"), ActivationFunction::Softmax);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["sigmoid", "relu", "softmax"]);
    }

    #[test]
    fn unknown_name_falls_back_to_sigmoid() {
        let registry = ActivationRegistry::new();
        assert!(!registry.contains("bogus"));
        assert_eq!(registry.get("bogus"), ActivationFunction::Sigmoid);
    }

    #[test]
    fn custom_functions_are_resolvable() {
        let registry = tanh_registry();
        let tanh = registry.get("tanh");
        assert_eq!(tanh.name(), "tanh");
        assert_eq!(tanh.compute(&[0.0]), vec![0.0]);
        assert_eq!(tanh.jacobian(&[0.0])[(0, 0)], 1.0);
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut registry = tanh_registry();
        registry.insert("tanh", |x: &[f64]| x.to_vec(), |x: &[f64]| Matrix::diagonal(&vec![1.0; x.len()]));
        assert_eq!(registry.names().filter(|n| *n == "tanh").count(), 1);
        assert_eq!(registry.get("tanh").compute(&[2.0]), vec![2.0]);
    }

    #[test]
    fn clear_restores_builtins() {
        let mut registry = tanh_registry();
        registry.clear();
        assert!(!registry.contains("tanh"));
        assert_eq!(registry.get("tanh"), ActivationFunction::Sigmoid);
    }
}
