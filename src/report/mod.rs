//! Formatted terminal output.
//!
//! Formatting lives in one place so the engine stays free of presentation and
//! output changes stay localized.

pub mod format;

pub use format::*;
