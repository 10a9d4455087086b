//! External (user) functions.
//!
//! User functions join the theory tree through the `userFcn` kernel. They are
//! created from registered factories; a `PluginLoader` supplies factories for
//! modules that are not registered yet, and a session-wide
//! `GlobalPartRegistry` holds state shared between instances.

pub mod builtin;
pub mod loader;
pub mod registry;
pub mod traits;

#[cfg(feature = "dylib-plugins")]
pub use loader::LibraryPluginLoader;
pub use loader::{BUILTIN_MODULE, ChainedPluginLoader, PluginLoader, StaticPluginLoader};
pub use registry::{Factory, FactoryRegistry, GlobalPartRegistry};
pub use traits::{PluginError, UserFunction};
