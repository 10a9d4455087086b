//! `musr-theory` library crate.
//!
//! Composes µSR polarization functions from a line-oriented theory block into
//! an evaluation tree. The binary (`musrth`) is a thin wrapper around this
//! library so that:
//!
//! - the engine is testable without spawning processes
//! - fitting front-ends can embed the engine directly

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod integral;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod plugin;
pub mod report;
pub mod theory;
