//! Theory expression engine.
//!
//! Turns the lines of a theory block into a sum-of-products tree of kernel
//! nodes and evaluates it. Lines inside a block multiply; a `+` line starts
//! the next additive term.

pub mod builder;
pub mod node;
pub mod tidy;

pub use builder::{BuildContext, TheorySession, TheoryTree};
pub use node::TheoryNode;
pub use tidy::tidy_theory_block;
