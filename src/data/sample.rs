//! Synthetic noisy data from evaluated model curves.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::RunCurve;
use crate::error::AppError;

/// One simulated time bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedPoint {
    pub t: f64,
    pub model: f64,
    pub observed: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone)]
pub struct SimulatedRun {
    pub run: String,
    pub points: Vec<SimulatedPoint>,
}

/// Add Gaussian noise of width `sigma` to every curve point.
///
/// Each run draws from its own generator seeded from `seed` and the run name,
/// so adding or reordering runs does not change the noise of the others.
pub fn simulate(curves: &[RunCurve], sigma: f64, seed: u64) -> Result<Vec<SimulatedRun>, AppError> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(AppError::new(2, format!("Noise sigma must be finite and >= 0, got {sigma}.")));
    }
    let normal = Normal::new(0.0, sigma).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(curves.len());
    for curve in curves {
        if curve.t.len() != curve.value.len() {
            return Err(AppError::new(4, format!("Run '{}' has mismatched time/value lengths.", curve.run)));
        }
        let mut rng = StdRng::seed_from_u64(run_seed(seed, &curve.run));
        let points = curve
            .t
            .iter()
            .zip(&curve.value)
            .map(|(&t, &model)| SimulatedPoint {
                t,
                model,
                observed: model + normal.sample(&mut rng),
                sigma,
            })
            .collect();
        out.push(SimulatedRun {
            run: curve.run.clone(),
            points,
        });
    }
    Ok(out)
}

fn run_seed(seed: u64, run: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    run.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(run: &str, n: usize) -> RunCurve {
        let t: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let value = t.iter().map(|t| (-t).exp()).collect();
        RunCurve {
            run: run.to_string(),
            t,
            value,
        }
    }

    #[test]
    fn zero_sigma_reproduces_the_model() {
        let runs = simulate(&[curve("a", 20)], 0.0, 42).unwrap();
        assert_eq!(runs[0].points.len(), 20);
        for p in &runs[0].points {
            assert_eq!(p.observed, p.model);
        }
    }

    #[test]
    fn noise_is_seeded_per_run() {
        let first = simulate(&[curve("a", 50), curve("b", 50)], 0.01, 7).unwrap();
        let again = simulate(&[curve("b", 50)], 0.01, 7).unwrap();
        assert_eq!(first[1].points, again[0].points);

        let other_seed = simulate(&[curve("b", 50)], 0.01, 8).unwrap();
        assert_ne!(first[1].points, other_seed[0].points);
    }

    #[test]
    fn noise_has_roughly_the_requested_width() {
        let runs = simulate(&[curve("a", 4000)], 0.05, 1).unwrap();
        let n = runs[0].points.len() as f64;
        let var = runs[0]
            .points
            .iter()
            .map(|p| (p.observed - p.model).powi(2))
            .sum::<f64>()
            / n;
        assert!((var.sqrt() - 0.05).abs() < 0.005, "std = {}", var.sqrt());
    }

    #[test]
    fn invalid_sigma_is_rejected() {
        assert!(simulate(&[curve("a", 3)], -1.0, 1).is_err());
        assert!(simulate(&[curve("a", 3)], f64::NAN, 1).is_err());
    }
}
