//! Export evaluated and simulated curves to CSV.
//!
//! Long format (one row per run and time point) so the output loads directly
//! into spreadsheets or dataframe tools.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::SimulatedRun;
use crate::domain::RunCurve;
use crate::error::AppError;

/// Write evaluated curves to a CSV file.
pub fn write_curves_csv(path: &Path, curves: &[RunCurve]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_curves(&mut file, curves)
}

/// Write simulated data (model value, noisy value, error bar) to a CSV file.
pub fn write_samples_csv(path: &Path, runs: &[SimulatedRun]) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_samples(&mut file, runs)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_curves<W: Write>(out: &mut W, curves: &[RunCurve]) -> Result<(), AppError> {
    writeln!(out, "run,t_us,value").map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    for curve in curves {
        for (t, v) in curve.t.iter().zip(&curve.value) {
            writeln!(out, "{},{t:.6},{v:.10}", curve.run)
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }
    Ok(())
}

fn write_samples<W: Write>(out: &mut W, runs: &[SimulatedRun]) -> Result<(), AppError> {
    writeln!(out, "run,t_us,model,observed,sigma")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    for run in runs {
        for p in &run.points {
            writeln!(out, "{},{:.6},{:.10},{:.10},{:.10}", run.run, p.t, p.model, p.observed, p.sigma)
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_are_written_in_long_format() {
        let curves = vec![
            RunCurve {
                run: "a".to_string(),
                t: vec![0.0, 1.0],
                value: vec![1.0, 0.5],
            },
            RunCurve {
                run: "b".to_string(),
                t: vec![0.0],
                value: vec![0.25],
            },
        ];
        let mut buf = Vec::new();
        write_curves(&mut buf, &curves).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "run,t_us,value");
        assert_eq!(lines[2], "a,1.000000,0.5000000000");
        assert_eq!(lines[3], "b,0.000000,0.2500000000");
    }
}
