//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - theory-block input lines (`TheoryLine`)
//! - resolved parameter references (`ParamRef`) and the function-offset convention
//! - the model/curve JSON schemas used by the CLI

pub mod types;

pub use types::*;
