//! Special functions needed by the relaxation kernels.
//!
//! - `bessel_j0`: Bessel function of the first kind, order 0 (rational
//!   approximation for `|x| < 8`, asymptotic form otherwise; ~1e-8 absolute).
//! - `dawson`: Dawson's integral `D(x) = e^{-x²} ∫₀ˣ e^{y²} dy`.
//! - `gauss_scaled_erfi`: `e^{-x²}·erfi(x)`, which is what the skewed Gaussian
//!   needs (`2x/√π · ₁F₁(½; 3/2; x²) · e^{-x²}`) without overflowing.
//! - `spherical_j0` / `spherical_j1` with their small-argument limits.

use std::f64::consts::PI;

/// Bessel function `J0(x)`.
pub fn bessel_j0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = 57_568_490_574.0
            + y * (-13_362_590_354.0
                + y * (651_619_640.7 + y * (-11_214_424.18 + y * (77_392.330_17 + y * (-184.905_245_6)))));
        let den = 57_568_490_411.0
            + y * (1_029_532_985.0 + y * (9_494_680.718 + y * (59_272.648_53 + y * (267.853_271_2 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 0.785_398_164;
        let p = 1.0
            + y * (-0.109_862_862_7e-2
                + y * (0.273_451_040_7e-4 + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
        let q = -0.156_249_999_5e-1
            + y * (0.143_048_876_5e-3
                + y * (-0.691_114_765_1e-5 + y * (0.762_109_516_1e-6 - y * 0.934_935_152e-7)));
        (0.636_619_772 / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q)
    }
}

/// Switch from the power series to the asymptotic expansion.
const DAWSON_ASYMPTOTIC: f64 = 10.0;

/// Dawson's integral.
pub fn dawson(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let ax = x.abs();
    if ax >= DAWSON_ASYMPTOTIC {
        // D(x) ~ 1/(2x) Σ (2n-1)!! / (2x²)^n
        let inv = 1.0 / (2.0 * x * x);
        let mut term = 1.0;
        let mut sum = 1.0;
        for n in 1..=8 {
            term *= (2 * n - 1) as f64 * inv;
            sum += term;
        }
        return sum / (2.0 * x);
    }

    // e^{-x²} Σ x^{2n+1} / (n! (2n+1)), all terms positive for x > 0.
    let x2 = x * x;
    let mut term = x;
    let mut sum = x;
    let mut n = 1.0_f64;
    loop {
        term *= x2 / n * (2.0 * n - 1.0) / (2.0 * n + 1.0);
        sum += term;
        if n > x2 && term.abs() <= 1e-17 * sum.abs() {
            break;
        }
        n += 1.0;
    }
    (-x2).exp() * sum
}

/// `e^{-x²}·erfi(x)`.
pub fn gauss_scaled_erfi(x: f64) -> f64 {
    2.0 / PI.sqrt() * dawson(x)
}

/// Below this `|x|` the spherical Bessel functions use their `x → 0` limits.
const SPHERICAL_SMALL_X: f64 = 1e-3;

/// Spherical Bessel `j0(x) = sin(x)/x`.
pub fn spherical_j0(x: f64) -> f64 {
    if x.abs() < SPHERICAL_SMALL_X {
        1.0 - x * x / 6.0
    } else {
        x.sin() / x
    }
}

/// Spherical Bessel `j1(x) = (sin(x) - x cos(x)) / x²`.
pub fn spherical_j1(x: f64) -> f64 {
    if x.abs() < SPHERICAL_SMALL_X {
        x / 3.0
    } else {
        (x.sin() - x * x.cos()) / (x * x)
    }
}
