//! Relaxation-function library.
//!
//! Kernels are implemented as small, pure functions of time and a resolved
//! parameter vector so that the theory tree can stay generic. The registry
//! maps theory-block names to kernel kinds and carries their arity rules.

pub mod kernels;
pub mod registry;

pub use registry::{Arity, KernelInfo, KernelKind, kernel_table, search};
