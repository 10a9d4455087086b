//! Static longitudinal-field Kubo-Toyabe polarization.
//!
//! The LF polarization contains a running integral that has no closed form.
//! It is integrated once per `(ν, rate)` with the trapezoid rule on a uniform
//! grid over `[0, 20 µs]` and afterwards read back by interpolation. Outside
//! the range where the numerics are meaningful (vanishing field, or a field far
//! below the internal width) the zero-field closed form is used instead.

use std::f64::consts::TAU as TWO_PI;

use tracing::debug;

use crate::domain::T_MAX_US;
use crate::math::{SampledTable, spherical_j0, spherical_j1};
use crate::models::kernels::{gauss_kt_zf, lorentz_kt_zf};

/// Fields below this (MHz) are treated as zero field.
pub const ZERO_FIELD_NU: f64 = 0.02;
/// Gaussian width / field ratio above which the zero-field form is used.
pub const GAUSS_ZF_RATIO: f64 = 79.5775;
/// Lorentzian width / field ratio above which the zero-field form is used.
pub const LORENTZ_ZF_RATIO: f64 = 159.1549;

const DEFAULT_DT: f64 = 0.001;
const STOP_BOUND: f64 = 1e-10;
/// Below this `|ωτ|` the spherical Bessel terms take their τ → 0 values.
const SMALL_OMEGA_T: f64 = 0.001;

/// Local field distribution of the Kubo-Toyabe family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LfFamily {
    Gauss,
    Lorentz,
}

impl LfFamily {
    pub fn name(self) -> &'static str {
        match self {
            LfFamily::Gauss => "gauss",
            LfFamily::Lorentz => "lorentz",
        }
    }

    /// Zero-field static Kubo-Toyabe of this family.
    pub fn zero_field(self, rate: f64, tau: f64) -> f64 {
        match self {
            LfFamily::Gauss => gauss_kt_zf(rate, tau),
            LfFamily::Lorentz => lorentz_kt_zf(rate, tau),
        }
    }

    /// True if `(ν, rate)` is handled by the zero-field closed form.
    pub fn uses_zero_field(self, nu: f64, rate: f64) -> bool {
        if nu < ZERO_FIELD_NU {
            return true;
        }
        let ratio = rate / nu;
        match self {
            LfFamily::Gauss => ratio > GAUSS_ZF_RATIO,
            LfFamily::Lorentz => ratio > LORENTZ_ZF_RATIO,
        }
    }
}

/// Step width for a given field and rate.
pub fn step_width(nu: f64, rate: f64) -> f64 {
    let mut dt = DEFAULT_DT;
    if nu > rate && 1.0 / (20.0 * nu) < dt {
        dt = 1.0 / (20.0 * nu);
    }
    if rate > nu && 1.0 / (3000.0 * rate) < dt {
        dt = 1.0 / (3000.0 * rate);
    }
    dt
}

#[derive(Debug, Clone, PartialEq)]
enum Form {
    ZeroField,
    Table(SampledTable),
}

/// Static LF polarization for one `(ν, rate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticLf {
    family: LfFamily,
    rate: f64,
    form: Form,
}

impl Default for StaticLf {
    fn default() -> Self {
        Self {
            family: LfFamily::Gauss,
            rate: 0.0,
            form: Form::ZeroField,
        }
    }
}

impl StaticLf {
    /// Integrate (or select the zero-field form) for field `nu` (MHz) and
    /// width `rate` (1/µs).
    pub fn compute(family: LfFamily, nu: f64, rate: f64) -> Self {
        if family.uses_zero_field(nu, rate) {
            debug!(family = family.name(), nu, rate, "static LF: zero-field form");
            return Self {
                family,
                rate,
                form: Form::ZeroField,
            };
        }

        let dt = step_width(nu, rate);
        let values = match family {
            LfFamily::Gauss => integrate_gauss(nu, rate, dt),
            LfFamily::Lorentz => integrate_lorentz(nu, rate, dt),
        };
        debug!(
            family = family.name(),
            nu,
            rate,
            dt,
            samples = values.len(),
            "static LF: integrated"
        );
        Self {
            family,
            rate,
            form: Form::Table(SampledTable::new(dt, values)),
        }
    }

    pub fn family(&self) -> LfFamily {
        self.family
    }

    /// The tabulated samples, `None` when the zero-field form is in use.
    pub fn table(&self) -> Option<&SampledTable> {
        match &self.form {
            Form::ZeroField => None,
            Form::Table(table) => Some(table),
        }
    }

    /// Polarization at `tau`.
    ///
    /// The zero-field form is the closed form for every `tau`, so a shifted
    /// curve matches the corresponding zero-field kernel. The table reads 1
    /// before time zero.
    pub fn value(&self, tau: f64) -> f64 {
        match &self.form {
            Form::ZeroField => self.family.zero_field(self.rate, tau),
            Form::Table(table) => table.lookup(tau, 1.0),
        }
    }
}

fn sample_count(dt: f64) -> usize {
    (T_MAX_US / dt).round() as usize + 1
}

/// `P(τ) = 1 - 2(Δ/ω)²(1 - e^{-½Δ²τ²} cos ωτ) + 2Δ⁴/ω³ ∫₀^τ e^{-½Δ²s²} sin ωs ds`
fn integrate_gauss(nu: f64, delta: f64, dt: f64) -> Vec<f64> {
    let omega = TWO_PI * nu;
    let d2 = delta * delta;
    let c1 = 2.0 * d2 / (omega * omega);
    let c2 = 2.0 * d2 * d2 / omega.powi(3);
    let integrand = |s: f64| (-0.5 * d2 * s * s).exp() * (omega * s).sin();

    // grown on demand, the envelope usually ends the loop long before `n`
    let n = sample_count(dt);
    let mut values = vec![1.0];

    let mut integral = 0.0;
    let mut prev = integrand(0.0);
    for i in 1..n {
        let tau = i as f64 * dt;
        let cur = integrand(tau);
        integral += 0.5 * dt * (prev + cur);
        prev = cur;

        let gauss = (-0.5 * d2 * tau * tau).exp();
        values.push(1.0 - c1 * (1.0 - gauss * (omega * tau).cos()) + c2 * integral);

        // nothing time dependent is left above the bound
        if gauss * (c1 + c2 * dt) < STOP_BOUND {
            break;
        }
    }
    values
}

/// `P(τ) = 1 - (a/ω) j₁(ωτ) e^{-aτ} - (a/ω)² (j₀(ωτ) e^{-aτ} - 1)
///        - a (1 + (a/ω)²) ∫₀^τ j₀(ωs) e^{-as} ds`
fn integrate_lorentz(nu: f64, a: f64, dt: f64) -> Vec<f64> {
    let omega = TWO_PI * nu;
    let r = a / omega;
    let r2 = r * r;
    let c3 = a * (1.0 + r2);
    // j0 takes its x → 0 limit in the first bin
    let integrand = |s: f64| spherical_j0(omega * s) * (-a * s).exp();

    // grown on demand, the envelope usually ends the loop long before `n`
    let n = sample_count(dt);
    let mut values = vec![1.0];

    let mut integral = 0.0;
    let mut prev = integrand(0.0);
    for i in 1..n {
        let tau = i as f64 * dt;
        let cur = integrand(tau);
        integral += 0.5 * dt * (prev + cur);
        prev = cur;

        let x = omega * tau;
        let (j0, j1) = if x.abs() < SMALL_OMEGA_T {
            (1.0, 0.0)
        } else {
            (spherical_j0(x), spherical_j1(x))
        };
        let damping = (-a * tau).exp();
        values.push(1.0 - r * j1 * damping - r2 * (j0 * damping - 1.0) - c3 * integral);

        if damping * (r + r2 + c3 * dt) < STOP_BOUND {
            break;
        }
    }
    values
}
