//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of an evaluation:
//! - the theory block and parameter values it was evaluated with
//! - one `(t, value)` series per run, for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::CurveFile;
use crate::error::AppError;

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    if let Some(bad) = curve.curves.iter().find(|c| c.t.len() != c.value.len()) {
        return Err(AppError::new(
            2,
            format!("Curve '{}' has {} times but {} values.", bad.run, bad.t.len(), bad.value.len()),
        ));
    }
    Ok(curve)
}
