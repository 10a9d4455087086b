//! Factory and global-part registries.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::traits::{PluginError, UserFunction};

/// Creates a fresh user-function instance.
pub type Factory = Arc<dyn Fn() -> Box<dyn UserFunction> + Send + Sync>;

/// Maps user-function type names to their factories.
///
/// Registration goes through `&self` so that a loader can add the factories
/// of a module while trees are being built from the same session.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: RwLock<HashMap<String, Factory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn UserFunction> + Send + Sync + 'static,
    {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.into(), Arc::new(factory));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_name)
    }

    /// Instantiate `type_name`, `None` if no factory is registered for it.
    pub fn create(&self, type_name: &str) -> Option<Box<dyn UserFunction>> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .cloned()?;
        Some(factory())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/// Shared per-instance state of user functions, keyed by instance index.
///
/// The first bind for an index constructs the value, later binds (from other
/// trees of the same session) receive the same `Arc`. Values are dropped with
/// the registry.
#[derive(Default)]
pub struct GlobalPartRegistry {
    parts: Mutex<HashMap<usize, Arc<dyn Any + Send + Sync>>>,
}

impl GlobalPartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the part at `index`, constructing it with `init` if absent.
    pub fn get_or_try_insert<T, F>(&self, index: usize, init: F) -> Result<Arc<T>, PluginError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, PluginError>,
    {
        let mut parts = self.parts.lock().unwrap_or_else(PoisonError::into_inner);
        let part = match parts.get(&index) {
            Some(existing) => Arc::clone(existing),
            None => {
                let created: Arc<dyn Any + Send + Sync> = Arc::new(init()?);
                parts.insert(index, Arc::clone(&created));
                created
            }
        };
        part.downcast::<T>()
            .map_err(|_| PluginError::GlobalPartType { index })
    }

    pub fn len(&self) -> usize {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for GlobalPartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalPartRegistry")
            .field("parts", &self.len())
            .finish()
    }
}
