//! Kernel listings, run summaries and tidied theory blocks.

use crate::app::pipeline::RunOutput;
use crate::domain::{ModelFile, TheoryLine};
use crate::models::KernelInfo;

/// Format the kernel registry as a table.
pub fn format_kernel_table(kernels: &[KernelInfo]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<11} {:<8} {:<12} {:<4} {}", "name", "abbrev", "parameters", "tab", "comment").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<11} {:-<8} {:-<12} {:-<4} {:-<7}", "", "", "", "", "").trim_end());
    out.push('\n');

    for k in kernels {
        let tab = if k.tabulated { "yes" } else { "" };
        out.push_str(
            format!(
                "{:<11} {:<8} {:<12} {:<4} {}",
                k.name,
                k.abbrev,
                k.arity.describe(),
                tab,
                k.comment
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Format the summary of an evaluated model.
pub fn format_run_summary(model: &ModelFile, runs: &[RunOutput]) -> String {
    let mut out = String::new();

    out.push_str("=== musrth - theory evaluation ===\n");
    if !model.title.is_empty() {
        out.push_str(&format!("Title: {}\n", model.title));
    }
    out.push_str(&format!(
        "Time: [{:.3}, {:.3}] us, step {} | parameters: {} | functions: {}\n",
        model.time.start,
        model.time.end,
        model.time.step,
        model.parameters.len(),
        model.functions.len()
    ));

    out.push_str("\nTheory:\n");
    for line in model.theory_lines() {
        out.push_str(&format!("{:>4}  {}\n", line.line_no, line.text));
    }

    out.push_str("\nRuns:\n");
    out.push_str(
        format!(
            "{:<16} {:>5} {:>7} {:>6} {:>12} {:>12} {:>12}",
            "run", "terms", "factors", "solves", "P(t0)", "min", "max"
        )
        .trim_end(),
    );
    out.push('\n');
    for r in runs {
        let (min, max) = value_range(&r.curve.value);
        let first = r.curve.value.first().copied().unwrap_or(f64::NAN);
        out.push_str(
            format!(
                "{:<16} {:>5} {:>7} {:>6} {:>12.6} {:>12.6} {:>12.6}",
                truncate(&r.curve.run, 16),
                r.terms,
                r.factors,
                r.solves,
                first,
                min,
                max
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a theory block for printing.
pub fn format_theory_block(lines: &[TheoryLine]) -> String {
    let mut out = String::from("THEORY\n");
    for line in lines {
        out.push_str(line.text.trim_end());
        out.push('\n');
    }
    out
}

fn value_range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::NAN, f64::NAN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
