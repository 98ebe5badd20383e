use std::sync::Arc;

use tracing::warn;

use crate::loss::function::LossFunction;

/// Name-keyed set of loss functions.
///
/// Same fallback policy as
/// [`ActivationRegistry`](crate::activation::ActivationRegistry): an unknown
/// name resolves to `square` with a warning instead of failing.
#[derive(Debug, Clone)]
pub struct LossRegistry {
    functions: Vec<LossFunction>,
}

impl LossRegistry {
    pub const DEFAULT: &'static str = "square";

    pub fn new() -> LossRegistry {
        LossRegistry {
            functions: vec![LossFunction::Square],
        }
    }

    /// Registers a custom loss, replacing any entry with the same name.
    pub fn insert<V, G>(&mut self, name: impl Into<String>, value: V, gradient: G)
    where
        V: Fn(&[f64], &[f64]) -> f64 + Send + Sync + 'static,
        G: Fn(&[f64], &[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        let function = LossFunction::Custom {
            name: name.into(),
            value: Arc::new(value),
            gradient: Arc::new(gradient),
        };
        match self.functions.iter_mut().find(|f| f.name() == function.name()) {
            Some(slot) => *slot = function,
            None => self.functions.push(function),
        }
    }

    /// Resolves `name`, falling back to `square` when it is unknown.
    pub fn get(&self, name: &str) -> LossFunction {
        match self.functions.iter().find(|f| f.name() == name) {
            Some(f) => f.clone(),
            None => {
                warn!(function = name, fallback = Self::DEFAULT, "Unknown loss function; using the default.");
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

    pub fn clear(&mut self) {
        self.functions = vec![LossFunction::Square];
    }
}

impl Default for LossRegistry {
    fn default() -> Self {
        LossRegistry::new()
    }
}
