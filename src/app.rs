//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the real main that:
//! - parses CLI arguments and sets up logging
//! - reads model files
//! - builds and evaluates theory trees
//! - prints summaries/plots and writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EvalArgs, ModelArgs, PlotArgs, SimulateArgs};
use crate::domain::CurveFile;
use crate::error::AppError;
use crate::plugin::{PluginLoader, StaticPluginLoader};
use crate::theory::{TheorySession, tidy_theory_block};

pub mod pipeline;

/// Environment variable naming the directory searched for plugin modules.
pub const PLUGIN_PATH_ENV: &str = "MUSR_PLUGIN_PATH";

/// Entry point for the `musrth` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Eval(args) => handle_eval(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Kernels => {
            print!("{}", crate::report::format_kernel_table(crate::models::kernel_table()));
            Ok(())
        }
        Command::Tidy(args) => handle_tidy(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "musr_theory=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Session whose loader consults the plugin directory first (when dynamic
/// modules are enabled) and the built-in modules second.
pub fn default_session() -> TheorySession {
    TheorySession::new(plugin_loader(std::env::var_os(PLUGIN_PATH_ENV).map(PathBuf::from)))
}

#[cfg(feature = "dylib-plugins")]
fn plugin_loader(search_dir: Option<PathBuf>) -> Box<dyn PluginLoader> {
    use crate::plugin::{ChainedPluginLoader, LibraryPluginLoader};

    match search_dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "user-function modules enabled");
            Box::new(ChainedPluginLoader::new(
                Box::new(LibraryPluginLoader::new(dir)),
                Box::new(StaticPluginLoader::new()),
            ))
        }
        None => Box::new(StaticPluginLoader::new()),
    }
}

#[cfg(not(feature = "dylib-plugins"))]
fn plugin_loader(search_dir: Option<PathBuf>) -> Box<dyn PluginLoader> {
    if let Some(dir) = search_dir {
        debug!(
            dir = %dir.display(),
            "{PLUGIN_PATH_ENV} ignored, built without the dylib-plugins feature"
        );
    }
    Box::new(StaticPluginLoader::new())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let model = crate::io::read_model(&args.model.model)?;
    let session = default_session();
    let runs = pipeline::evaluate_model(&model, &session)?;

    println!("{}", crate::report::format_run_summary(&model, &runs));

    let curves: Vec<_> = runs.into_iter().map(|r| r.curve).collect();
    if args.plot {
        println!("{}", crate::plot::render_ascii_plot(&curves, args.size.width, args.size.height));
    }

    if let Some(path) = &args.export {
        crate::io::write_curves_csv(path, &curves)?;
    }
    if let Some(path) = &args.export_curve {
        let file = CurveFile {
            tool: "musrth".to_string(),
            generated: chrono::Utc::now().to_rfc3339(),
            title: model.title.clone(),
            theory: model.theory.clone(),
            parameters: model.parameters.clone(),
            curves,
        };
        crate::io::write_curve_json(path, &file)?;
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let model = crate::io::read_model(&args.model.model)?;
    let session = default_session();
    let runs = pipeline::evaluate_model(&model, &session)?;
    let curves: Vec<_> = runs.into_iter().map(|r| r.curve).collect();

    let simulated = crate::data::simulate(&curves, args.sigma, args.seed)?;
    crate::io::write_samples_csv(&args.out, &simulated)?;
    let total: usize = simulated.iter().map(|r| r.points.len()).sum();
    println!(
        "Wrote {total} points ({} run(s), sigma={}, seed={}) to {}",
        simulated.len(),
        args.sigma,
        args.seed,
        args.out.display()
    );

    if args.plot {
        if let (Some(curve), Some(run)) = (curves.first(), simulated.first()) {
            let points: Vec<(f64, f64)> = run.points.iter().map(|p| (p.t, p.observed)).collect();
            println!(
                "{}",
                crate::plot::render_ascii_plot_with_points(
                    std::slice::from_ref(curve),
                    &points,
                    args.size.width,
                    args.size.height
                )
            );
        }
    }
    Ok(())
}

fn handle_tidy(args: ModelArgs) -> Result<(), AppError> {
    let model = crate::io::read_model(&args.model)?;
    let tidy = tidy_theory_block(&model.theory_lines());
    print!("{}", crate::report::format_theory_block(&tidy));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.size.width, args.size.height);
    println!("{plot}");
    Ok(())
}
