//! Numerical building blocks: special functions and sampled tables.

pub mod special;
pub mod table;

pub use special::*;
pub use table::SampledTable;
