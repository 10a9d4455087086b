//! Synthetic data generation.
//!
//! `simulate` turns evaluated model curves into noisy "measured" data so the
//! output of a theory block can be inspected the way a fit would see it.

pub mod sample;

pub use sample::*;
