//! Shared evaluation pipeline used by the `eval` and `simulate` commands.
//!
//! model file -> one tree per run (parallel) -> curve on the time grid

use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::domain::{ModelFile, RunCurve, RunDef};
use crate::error::AppError;
use crate::theory::{TheorySession, TheoryTree};

/// Evaluated curve of one run plus build statistics.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub curve: RunCurve,
    pub terms: usize,
    pub factors: usize,
    /// Integral tables computed while evaluating the curve.
    pub solves: usize,
}

/// Build and evaluate every run of `model`.
///
/// Runs are independent: each rayon task owns its tree, while the session's
/// factories and global parts are shared.
pub fn evaluate_model(model: &ModelFile, session: &TheorySession) -> Result<Vec<RunOutput>, AppError> {
    let lines = model.theory_lines();
    let functions = model.function_table();
    let funcs = model.function_values();
    let times = model.time.points();

    model
        .effective_runs()
        .par_iter()
        .map(|run| -> Result<RunOutput, AppError> {
            let _span = info_span!("run", name = %run.name).entered();
            let ctx = session.context(model.parameters.len(), &run.map, &functions);
            let tree = TheoryTree::build(&lines, &ctx)?;
            Ok(evaluate_run(run, &tree, &times, &model.parameters, &funcs))
        })
        .collect()
}

fn evaluate_run(run: &RunDef, tree: &TheoryTree, times: &[f64], params: &[f64], funcs: &[f64]) -> RunOutput {
    let value: Vec<f64> = times.iter().map(|&t| tree.evaluate(t, params, funcs)).collect();
    let terms = tree.terms().count();
    let factors = tree.terms().map(|term| term.count()).sum();
    let solves = tree.solve_count();
    debug!(points = times.len(), solves, "run evaluated");

    RunOutput {
        curve: RunCurve {
            run: run.name.clone(),
            t: times.to_vec(),
            value,
        },
        terms,
        factors,
        solves,
    }
}
