//! Plugin module loading.
//!
//! A `userFcn` line names a module and a type. When the type has no factory
//! yet, the module is handed to a `PluginLoader`, which registers the factories
//! it provides. The default loader knows a fixed set of compiled-in modules;
//! shared-library loading sits behind the `dylib-plugins` feature.

use std::collections::HashMap;

use tracing::warn;

use super::builtin;
use super::registry::FactoryRegistry;
use super::traits::PluginError;

/// Registers the factories a module provides.
pub type ModuleInit = fn(&FactoryRegistry);

/// Module name under which the built-in user functions are published.
pub const BUILTIN_MODULE: &str = "libBuiltinUserFcn";

pub trait PluginLoader: Send + Sync {
    /// Load `module` and register its factories into `registry`.
    fn load(&self, module: &str, registry: &FactoryRegistry) -> Result<(), PluginError>;
}

/// Loader for modules that are compiled into the binary.
#[derive(Debug, Clone)]
pub struct StaticPluginLoader {
    modules: HashMap<String, ModuleInit>,
}

impl StaticPluginLoader {
    /// Loader that knows no modules.
    pub fn empty() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Loader that knows the built-in module.
    pub fn new() -> Self {
        Self::empty().with_module(BUILTIN_MODULE, builtin::register)
    }

    pub fn with_module(mut self, module: impl Into<String>, init: ModuleInit) -> Self {
        self.modules.insert(module.into(), init);
        self
    }
}

impl Default for StaticPluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLoader for StaticPluginLoader {
    fn load(&self, module: &str, registry: &FactoryRegistry) -> Result<(), PluginError> {
        match self.modules.get(module) {
            Some(init) => {
                init(registry);
                Ok(())
            }
            None => Err(PluginError::ModuleLoad {
                module: module.to_string(),
                reason: "no compiled-in module with this name".to_string(),
            }),
        }
    }
}

#[cfg(feature = "dylib-plugins")]
pub use dylib::LibraryPluginLoader;

#[cfg(feature = "dylib-plugins")]
mod dylib {
    use std::path::PathBuf;
    use std::sync::{Mutex, PoisonError};

    use libloading::{Library, Symbol};
    use tracing::warn;

    use super::{FactoryRegistry, PluginError, PluginLoader};

    /// Symbol every plugin library exports to register its factories.
    pub const REGISTER_SYMBOL: &[u8] = b"musr_register_user_functions";

    type RegisterFn = fn(&FactoryRegistry);

    /// Loads plugin modules from shared libraries in a search directory.
    ///
    /// Loaded libraries stay mapped for the lifetime of the loader, so the
    /// loader must outlive every tree built with functions from it.
    #[derive(Debug)]
    pub struct LibraryPluginLoader {
        search_dir: PathBuf,
        libraries: Mutex<Vec<Library>>,
    }

    impl LibraryPluginLoader {
        pub fn new(search_dir: impl Into<PathBuf>) -> Self {
            Self {
                search_dir: search_dir.into(),
                libraries: Mutex::new(Vec::new()),
            }
        }

        fn library_path(&self, module: &str) -> PathBuf {
            let direct = self.search_dir.join(module);
            if direct.is_file() {
                direct
            } else {
                self.search_dir.join(libloading::library_filename(module))
            }
        }
    }

    impl PluginLoader for LibraryPluginLoader {
        fn load(&self, module: &str, registry: &FactoryRegistry) -> Result<(), PluginError> {
            let path = self.library_path(module);
            warn!(module, path = %path.display(), "loading user-function library");

            let load_err = |reason: String| PluginError::ModuleLoad {
                module: module.to_string(),
                reason,
            };
            // SAFETY: the library is trusted user code whose initializers are
            // expected to be sound; it stays loaded for the loader's lifetime.
            let library = unsafe { Library::new(&path) }.map_err(|e| load_err(e.to_string()))?;
            {
                // SAFETY: plugin libraries export the registration function
                // with exactly the `RegisterFn` signature.
                let register: Symbol<'_, RegisterFn> =
                    unsafe { library.get(REGISTER_SYMBOL) }.map_err(|e| load_err(e.to_string()))?;
                register(registry);
            }
            self.libraries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(library);
            Ok(())
        }
    }
}

/// Loader that tries `primary` first and falls back to `fallback`.
pub struct ChainedPluginLoader {
    primary: Box<dyn PluginLoader>,
    fallback: Box<dyn PluginLoader>,
}

impl ChainedPluginLoader {
    pub fn new(primary: Box<dyn PluginLoader>, fallback: Box<dyn PluginLoader>) -> Self {
        Self { primary, fallback }
    }
}

impl PluginLoader for ChainedPluginLoader {
    fn load(&self, module: &str, registry: &FactoryRegistry) -> Result<(), PluginError> {
        match self.primary.load(module, registry) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(module, %err, "primary plugin loader failed, trying fallback");
                self.fallback.load(module, registry)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_loader_registers_builtin_module() {
        let registry = FactoryRegistry::new();
        let loader = StaticPluginLoader::new();
        assert!(!registry.contains("TabulatedExpFcn"));
        loader.load(BUILTIN_MODULE, &registry).unwrap();
        assert!(registry.contains("TabulatedExpFcn"));
        assert!(registry.contains("StretchedExpFcn"));
    }

    #[test]
    fn unknown_module_is_an_error() {
        let registry = FactoryRegistry::new();
        let err = StaticPluginLoader::new()
            .load("libNope", &registry)
            .unwrap_err();
        assert!(matches!(err, PluginError::ModuleLoad { ref module, .. } if module == "libNope"));
    }

    #[test]
    fn chained_loader_falls_back() {
        let registry = FactoryRegistry::new();
        let loader = ChainedPluginLoader::new(
            Box::new(StaticPluginLoader::empty()),
            Box::new(StaticPluginLoader::new()),
        );
        loader.load(BUILTIN_MODULE, &registry).unwrap();
        assert!(registry.contains("StretchedExpFcn"));
    }
}
