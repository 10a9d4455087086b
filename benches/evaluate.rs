//! Criterion benchmarks for the hot paths:
//!   - closed-form tree evaluation over a full time grid
//!   - cached LF table lookups
//!   - static LF integration and the dynamic Volterra solve

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use musr_theory::domain::{FunctionTable, TheoryLine};
use musr_theory::integral::{DynamicKt, LfFamily, StaticLf};
use musr_theory::theory::{TheorySession, TheoryTree};

fn grid() -> Vec<f64> {
    (0..2000).map(|i| i as f64 * 0.005).collect()
}

fn build(session: &TheorySession, theory: &[&str], param_count: usize) -> TheoryTree {
    let lines = TheoryLine::numbered(1, theory.iter().copied());
    let functions = FunctionTable::new();
    let ctx = session.context(param_count, &[], &functions);
    TheoryTree::build(&lines, &ctx).expect("benchmark theory builds")
}

fn bench_closed_form(c: &mut Criterion) {
    let session = TheorySession::default();
    let tree = build(
        &session,
        &["asymmetry 1", "simplExpo 2", "TFieldCos 3 4", "+", "asymmetry 5", "statGssKT 6"],
        6,
    );
    let params = [0.2, 0.3, 0.0, 1.35, 0.05, 0.4];
    let times = grid();

    c.bench_function("tree_closed_form_2000_points", |b| {
        b.iter(|| {
            let sum: f64 = times.iter().map(|&t| tree.evaluate(t, &params, &[])).sum();
            black_box(sum)
        })
    });
}

fn bench_cached_lookup(c: &mut Criterion) {
    let session = TheorySession::default();
    let tree = build(&session, &["asymmetry 1", "dgktlf 2 3 4"], 4);
    let params = [0.2, 0.1, 0.5, 1.0];
    let times = grid();
    // first pass fills the table
    black_box(tree.evaluate(1.0, &params, &[]));

    c.bench_function("tree_dynamic_kt_cached_2000_points", |b| {
        b.iter(|| {
            let sum: f64 = times.iter().map(|&t| tree.evaluate(t, &params, &[])).sum();
            black_box(sum)
        })
    });
}

fn bench_solvers(c: &mut Criterion) {
    c.bench_function("static_gauss_lf_integral", |b| {
        b.iter(|| black_box(StaticLf::compute(LfFamily::Gauss, black_box(0.1), black_box(0.5))))
    });
    c.bench_function("dynamic_gauss_kt_volterra", |b| {
        b.iter(|| black_box(DynamicKt::compute(LfFamily::Gauss, black_box(0.1), black_box(0.5), black_box(1.0))))
    });
    c.bench_function("dynamic_lorentz_kt_volterra", |b| {
        b.iter(|| black_box(DynamicKt::compute(LfFamily::Lorentz, black_box(0.1), black_box(0.5), black_box(1.0))))
    });
}

criterion_group!(benches, bench_closed_form, bench_cached_lookup, bench_solvers);
criterion_main!(benches);
