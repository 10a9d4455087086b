//! Command-line parsing for `musrth`.
//!
//! Argument parsing and command dispatch stay separate from the engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "musrth", version, about = "µSR theory-function evaluator")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the theory tree of every run and evaluate it on the model's time grid.
    Eval(EvalArgs),
    /// Generate noisy synthetic data from the model.
    Simulate(SimulateArgs),
    /// List the known theory functions.
    Kernels,
    /// Print the model's theory block in canonical layout.
    Tidy(ModelArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// The model description file.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Model description JSON (theory, parameters, functions, runs, time grid).
    #[arg(short, long, value_name = "JSON")]
    pub model: PathBuf,
}

/// Options for evaluating a model.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Export evaluated curves to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export evaluated curves to JSON (plot later with `musrth plot`).
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    #[command(flatten)]
    pub size: PlotSize,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Gaussian noise width (absolute, in units of the theory value).
    #[arg(long, default_value_t = 0.01)]
    pub sigma: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Plot the first run with its simulated points.
    #[arg(long)]
    pub plot: bool,

    #[command(flatten)]
    pub size: PlotSize,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Curve JSON file produced by `musrth eval --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    #[command(flatten)]
    pub size: PlotSize,
}

#[derive(Debug, Args, Clone, Copy)]
pub struct PlotSize {
    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
