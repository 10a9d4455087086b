//! User-function contract.

use thiserror::Error;

use super::registry::GlobalPartRegistry;

/// Failures raised while loading plugin modules or binding global parts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PluginError {
    #[error("module '{module}' could not be loaded: {reason}")]
    ModuleLoad { module: String, reason: String },

    #[error("global part {index} holds a value of another type")]
    GlobalPartType { index: usize },

    #[error("global part {index} could not be initialized: {reason}")]
    GlobalPartInit { index: usize, reason: String },
}

/// A relaxation function supplied from outside the built-in kernel library.
///
/// Instances are created by a registered factory, owned by their tree node and
/// evaluated under the same contract as the built-in kernels: a pure function
/// of time and the resolved parameter values of the `userFcn` line.
pub trait UserFunction: Send {
    fn evaluate(&self, t: f64, params: &[f64]) -> f64;

    /// True if instances share state through the global-part registry.
    fn needs_global_part(&self) -> bool {
        false
    }

    /// Attach (constructing on first use) the shared state for `index`.
    fn bind_global_part(
        &mut self,
        _registry: &GlobalPartRegistry,
        _index: usize,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}
