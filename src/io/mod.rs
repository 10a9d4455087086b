//! Input/output helpers.
//!
//! - model description JSON (`read_model`)
//! - evaluated-curve exports (CSV) (`export`)
//! - curve JSON read/write (`curve`)

use std::fs::File;
use std::path::Path;

use crate::domain::ModelFile;
use crate::error::AppError;

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;

/// Read and validate a model description file.
pub fn read_model(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model '{}': {e}", path.display())))?;
    let model: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    validate_model(&model)?;
    Ok(model)
}

fn validate_model(model: &ModelFile) -> Result<(), AppError> {
    if model.theory.iter().all(|line| line.trim().is_empty()) {
        return Err(AppError::new(2, "Model has an empty THEORY block."));
    }
    if let Some(idx) = model.parameters.iter().position(|p| !p.is_finite()) {
        return Err(AppError::new(2, format!("Parameter {} is not a finite number.", idx + 1)));
    }
    let grid = model.time;
    if !(grid.step.is_finite() && grid.step > 0.0 && grid.end >= grid.start) {
        return Err(AppError::new(
            2,
            format!(
                "Invalid time grid: start={}, end={}, step={}.",
                grid.start, grid.end, grid.step
            ),
        ));
    }
    Ok(())
}
