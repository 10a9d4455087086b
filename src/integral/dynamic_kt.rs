//! Dynamic (strong-collision) longitudinal-field Kubo-Toyabe polarization.
//!
//! With hopping rate `ν_c` the polarization obeys the Volterra equation
//!
//! `P(t) = p₀(t) e^{-ν_c t} + ν_c ∫₀^t p₀(t-s) e^{-ν_c (t-s)} P(s) ds`,
//!
//! where `p₀` is the static LF polarization. The equation is discretized with
//! the trapezoid rule and solved by forward substitution into a table. When the
//! hopping dominates, cheaper approximations replace the solve: Keren's formula
//! for the Gaussian and the dominant pole of the strong-collision resolvent
//! for the Lorentzian.

use std::f64::consts::TAU as TWO_PI;

use tracing::{debug, trace};

use crate::domain::T_MAX_US;
use crate::math::SampledTable;

use super::static_lf::{LfFamily, StaticLf};

/// Gaussian `ν_c / Δ` above which Keren's formula is used.
pub const GAUSS_FAST_RATIO: f64 = 5.0;
/// Lorentzian `ν_c / a` above which the single-pole form is always used.
pub const LORENTZ_FAST_RATIO: f64 = 30.0;
/// Lorentzian `ν_c / a` above which the single-pole form is used when the
/// hopping also dominates the Larmor frequency.
pub const LORENTZ_FAST_RATIO_LF: f64 = 5.0;

const MIN_STEPS: f64 = 300.0;
const MAX_STEPS: f64 = 1.0e6;
/// Steps per mean time between collisions.
const STEPS_PER_HOP: f64 = 20.0;
const POLE_BISECTIONS: usize = 60;
/// The single-pole form needs `e^{-z·T_MAX}` negligible at the pole.
const POLE_MIN_DECAY: f64 = 14.0;

#[derive(Debug, Clone, PartialEq)]
enum Form {
    /// `ν_c = 0`: the static kernel itself.
    Static(StaticLf),
    /// Keren's Gaussian motional-narrowing formula.
    Keren { delta: f64, omega: f64, nu_c: f64 },
    /// `exp(-Γτ)` with `-Γ` the dominant pole of the resolvent.
    Pole { gamma: f64 },
    Table(SampledTable),
}

/// Dynamic LF polarization for one `(ν, rate, ν_c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicKt {
    form: Form,
}

impl Default for DynamicKt {
    fn default() -> Self {
        Self {
            form: Form::Static(StaticLf::default()),
        }
    }
}

impl DynamicKt {
    pub fn compute(family: LfFamily, nu: f64, rate: f64, nu_c: f64) -> Self {
        let omega = TWO_PI * nu;

        if nu_c == 0.0 {
            return Self {
                form: Form::Static(StaticLf::compute(family, nu, rate)),
            };
        }

        match family {
            LfFamily::Gauss if nu_c > GAUSS_FAST_RATIO * rate => {
                trace!(nu, delta = rate, nu_c, "dynamic KT: Keren approximation");
                return Self {
                    form: Form::Keren {
                        delta: rate,
                        omega,
                        nu_c,
                    },
                };
            }
            LfFamily::Lorentz
                if nu_c >= LORENTZ_FAST_RATIO * rate
                    || (nu_c > LORENTZ_FAST_RATIO_LF * rate && nu_c >= 10.0 * omega) =>
            {
                let gamma = dominant_pole(&StaticLf::compute(family, nu, rate), nu_c);
                if (nu_c - gamma) * T_MAX_US >= POLE_MIN_DECAY {
                    trace!(nu, a = rate, nu_c, gamma, "dynamic KT: single-pole approximation");
                    return Self {
                        form: Form::Pole { gamma },
                    };
                }
            }
            _ => {}
        }

        let table = solve(family, nu, rate, nu_c);
        debug!(
            family = family.name(),
            nu,
            rate,
            nu_c,
            dt = table.dt(),
            samples = table.len(),
            "dynamic KT: Volterra solve"
        );
        Self {
            form: Form::Table(table),
        }
    }

    /// The solved table, `None` on the closed-form paths.
    pub fn table(&self) -> Option<&SampledTable> {
        match &self.form {
            Form::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Polarization at `tau`; 1 before time zero, except without hopping
    /// where the static kernel decides.
    pub fn value(&self, tau: f64) -> f64 {
        match &self.form {
            Form::Static(lf) => lf.value(tau),
            _ if tau < 0.0 => 1.0,
            Form::Keren { delta, omega, nu_c } => keren(*delta, *omega, *nu_c, tau),
            Form::Pole { gamma } => (-gamma * tau).exp(),
            Form::Table(table) => table.lookup(tau, 1.0),
        }
    }
}

/// Keren's generalization of the Abragam formula to finite field.
fn keren(delta: f64, omega: f64, nu_c: f64, tau: f64) -> f64 {
    let w2 = omega * omega;
    let n2 = nu_c * nu_c;
    let sum = w2 + n2;
    let decay = (-nu_c * tau).exp();
    let gamma_t = 2.0 * delta * delta / (sum * sum)
        * (sum * nu_c * tau + (w2 - n2) * (1.0 - decay * (omega * tau).cos())
            - 2.0 * nu_c * omega * decay * (omega * tau).sin());
    (-gamma_t).exp()
}

/// Laplace transform `∫₀^∞ p₀(t) e^{-zt} dt`.
///
/// Trapezoid rule up to `min(T_MAX, 40/z)`; beyond `T_MAX` the kernel is
/// taken as constant at its last value.
fn laplace(p0: &StaticLf, z: f64) -> f64 {
    let t_end = T_MAX_US.min(40.0 / z);
    let n = (t_end / (1.0 / (40.0 * z)).min(0.01)).ceil().max(1.0) as usize;
    let h = t_end / n as f64;
    let inner: f64 = (1..n)
        .map(|i| {
            let t = i as f64 * h;
            p0.value(t) * (-z * t).exp()
        })
        .sum();
    let last = p0.value(t_end) * (-z * t_end).exp();
    let body = h * (inner + 0.5 * (p0.value(0.0) + last));
    if t_end < T_MAX_US { body } else { body + last / z }
}

/// Relaxation rate `Γ` of the slowest mode.
///
/// The resolvent `p̃₀(s+ν_c) / (1 - ν_c p̃₀(s+ν_c))` has its dominant pole where
/// `ν_c p̃₀(z) = 1`, `z = s + ν_c ∈ (0, ν_c]`; `ν_c p̃₀(z)` decreases in `z`, so
/// the root is bracketed and found by bisection.
fn dominant_pole(p0: &StaticLf, nu_c: f64) -> f64 {
    let (mut lo, mut hi) = (1e-9 * nu_c, nu_c);
    for _ in 0..POLE_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if nu_c * laplace(p0, mid) > 1.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    nu_c - 0.5 * (lo + hi)
}

/// Number of integration steps over `[0, T_MAX]`.
pub fn step_count(family: LfFamily, nu: f64, rate: f64, nu_c: f64) -> usize {
    let mut n = 16.0 * T_MAX_US * nu;
    if rate > 0.1 {
        let t_char = match family {
            LfFamily::Gauss => 3.0_f64.sqrt() / rate,
            LfFamily::Lorentz => 2.0 / rate,
        };
        n = n.max(25.0 * T_MAX_US / t_char);
    }
    n = n.max(STEPS_PER_HOP * T_MAX_US * nu_c);
    n.clamp(MIN_STEPS, MAX_STEPS).ceil() as usize
}

fn solve(family: LfFamily, nu: f64, rate: f64, nu_c: f64) -> SampledTable {
    let n = step_count(family, nu, rate, nu_c);
    let dt = T_MAX_US / n as f64;
    let p0 = StaticLf::compute(family, nu, rate);

    let p0exp: Vec<f64> = (0..=n)
        .map(|i| {
            let t = i as f64 * dt;
            p0.value(t) * (-nu_c * t).exp()
        })
        .collect();

    let h = dt * nu_c;
    let norm = 1.0 - 0.5 * h * p0exp[0];
    let mut values = Vec::with_capacity(n + 1);
    values.push(p0exp[0]);
    for i in 1..=n {
        let memory: f64 = (1..i).map(|j| p0exp[i - j] * values[j]).sum();
        let v = (p0exp[i] + h * (0.5 * p0exp[i] * values[0] + memory)) / norm;
        values.push(v);
    }
    SampledTable::new(dt, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn step_count_rules() {
        assert_eq!(step_count(LfFamily::Gauss, 0.0, 0.05, 0.0), 300);
        assert_eq!(step_count(LfFamily::Gauss, 10.0, 0.05, 0.0), 3200);
        // width raises the resolution: 25·20·Δ/√3
        assert_eq!(step_count(LfFamily::Gauss, 0.0, 3.0_f64.sqrt(), 0.0), 500);
        assert_eq!(step_count(LfFamily::Lorentz, 0.0, 4.0, 0.0), 1000);
        // and so does the hopping rate
        assert_eq!(step_count(LfFamily::Lorentz, 0.0, 4.0, 5.0), 2000);
        assert_eq!(step_count(LfFamily::Gauss, 1e6, 1.0, 0.0), 1_000_000);
    }

    #[test]
    fn no_hopping_is_the_static_kernel() {
        let dynamic = DynamicKt::compute(LfFamily::Gauss, 0.5, 1.0, 0.0);
        let stat = StaticLf::compute(LfFamily::Gauss, 0.5, 1.0);
        assert!(dynamic.table().is_none());
        for &t in &[0.0_f64, 0.3, 1.2, 7.0] {
            assert_eq!(dynamic.value(t), stat.value(t));
        }
    }

    #[test]
    fn vanishing_hopping_converges_to_static() {
        for family in [LfFamily::Gauss, LfFamily::Lorentz] {
            let stat = StaticLf::compute(family, 0.0, 1.0);
            let dynamic = DynamicKt::compute(family, 0.0, 1.0, 1e-4);
            assert!(dynamic.table().is_some());
            for &t in &[0.5_f64, 1.0, 2.0, 5.0] {
                assert_abs_diff_eq!(dynamic.value(t), stat.value(t), epsilon = 5e-3);
            }
        }
    }

    #[test]
    fn solved_table_starts_at_one() {
        let dynamic = DynamicKt::compute(LfFamily::Gauss, 0.0, 1.0, 1.0);
        let table = dynamic.table().cloned().unwrap_or_default();
        assert_eq!(table.values()[0], 1.0);
        assert_eq!(dynamic.value(-1.0), 1.0);
        assert_eq!(dynamic.value(0.0), 1.0);
        // hopping destroys the 1/3 tail
        assert!(dynamic.value(15.0) < 0.2);
        assert!(table.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn fast_paths_are_selected() {
        let keren = DynamicKt::compute(LfFamily::Gauss, 0.1, 1.0, 6.0);
        assert!(keren.table().is_none());
        // zero field Keren is the Abragam form
        let t: f64 = 1.5;
        let x: f64 = 6.0 * t;
        let abragam = (-2.0 / 36.0 * ((-x).exp() - 1.0 + x)).exp();
        let keren_zf = DynamicKt::compute(LfFamily::Gauss, 0.0, 1.0, 6.0);
        assert_abs_diff_eq!(keren_zf.value(t), abragam, epsilon = 1e-14);

        let pole = DynamicKt::compute(LfFamily::Lorentz, 0.0, 1.0, 40.0);
        assert!(pole.table().is_none());
        // without narrowing the Lorentzian relaxes at roughly 4a/3
        let rate = -pole.value(1.0).ln();
        assert!((1.2..1.4).contains(&rate), "{rate}");

        let slow = DynamicKt::compute(LfFamily::Lorentz, 1.0, 1.0, 8.0);
        assert!(slow.table().is_some());
    }

    #[test]
    fn narrow_lorentzian_stays_close_to_the_solver() {
        // a = 0: nothing relaxes, with or without hopping
        let slow = DynamicKt::compute(LfFamily::Lorentz, 0.0, 0.0, 0.1);
        assert!(slow.table().is_some());
        for &t in &[5.0_f64, 19.0] {
            assert_abs_diff_eq!(slow.value(t), 1.0, epsilon = 1e-3);
        }
        let fast = DynamicKt::compute(LfFamily::Lorentz, 0.0, 0.0, 40.0);
        assert!(fast.table().is_none());
        for &t in &[1.0_f64, 5.0, 19.0] {
            assert_abs_diff_eq!(fast.value(t), 1.0, epsilon = 1e-6);
        }

        // pole too slow to leave the window: solved instead
        let routed = DynamicKt::compute(LfFamily::Lorentz, 0.0, 0.01, 0.3);
        let table = solve(LfFamily::Lorentz, 0.0, 0.01, 0.3);
        assert!(routed.table().is_some());
        for &t in &[5.0_f64, 19.0] {
            assert_eq!(routed.value(t), table.lookup(t, 1.0));
        }

        // small width, fast hopping: single pole
        let pole = DynamicKt::compute(LfFamily::Lorentz, 0.0, 0.02, 2.0);
        assert!(pole.table().is_none());
        let table = solve(LfFamily::Lorentz, 0.0, 0.02, 2.0);
        for &t in &[0.3_f64, 1.0, 5.0, 19.0] {
            assert_abs_diff_eq!(pole.value(t), table.lookup(t, 1.0), epsilon = 6e-3);
        }
    }

    #[test]
    fn fast_paths_agree_with_the_solver() {
        let keren = DynamicKt::compute(LfFamily::Gauss, 0.0, 0.5, 10.0);
        let table = solve(LfFamily::Gauss, 0.0, 0.5, 10.0);
        for &t in &[1.0_f64, 3.0, 6.0] {
            assert_abs_diff_eq!(keren.value(t), table.lookup(t, 1.0), epsilon = 2e-2);
        }

        let pole = DynamicKt::compute(LfFamily::Lorentz, 0.0, 1.0, 8.0);
        assert!(pole.table().is_none());
        let table = solve(LfFamily::Lorentz, 0.0, 1.0, 8.0);
        for &t in &[0.3_f64, 1.0, 3.0] {
            assert_abs_diff_eq!(pole.value(t), table.lookup(t, 1.0), epsilon = 5e-3);
        }
    }
}
