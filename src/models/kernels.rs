//! Closed-form relaxation kernels.
//!
//! Every kernel is a pure function of the time `t` (µs) and its resolved
//! parameter vector `val`. When `val` holds one entry more than the kernel's
//! physical parameter count, the last entry is a time shift and the kernel is
//! evaluated at `τ = t - tshift`.
//!
//! Phases are given in degrees, frequencies in MHz and rates in 1/µs.

use std::f64::consts::{FRAC_1_SQRT_2, TAU as TWO_PI};

use crate::math::{bessel_j0, gauss_scaled_erfi};

use super::registry::KernelKind;

pub const DEG_TO_RAD: f64 = 0.017_453_292_519_943_295_5;

/// Returned by the skewed Gaussian once its argument leaves the stable range.
pub const SKEWED_GAUSS_SENTINEL: f64 = 2.0e6;

/// Below this field (MHz) the internal-field kernels use their ν → 0 form.
const ZERO_FIELD_NU: f64 = 0.01;

const ONE_THIRD: f64 = 1.0 / 3.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Time relative to the optional trailing time shift.
#[inline]
pub fn shifted_time(t: f64, val: &[f64], n_params: usize) -> f64 {
    match val.get(n_params) {
        Some(tshift) if val.len() == n_params + 1 => t - tshift,
        _ => t,
    }
}

/// Evaluate a closed-form kernel.
///
/// Returns `None` for kinds that need per-node state (tabulated LF/dynamic
/// kernels and user functions); the tree evaluates those itself.
pub fn evaluate(kind: KernelKind, t: f64, val: &[f64]) -> Option<f64> {
    let n = kind.info().arity.min();
    let tau = shifted_time(t, val, n);

    let value = match kind {
        KernelKind::Const | KernelKind::Asymmetry => val[0],
        KernelKind::SimpleExp => (-val[0] * tau).exp(),
        KernelKind::GeneralExp => stretched_exp(val[0] * tau, val[1]),
        KernelKind::SimpleGauss => (-0.5 * (val[0] * tau).powi(2)).exp(),
        KernelKind::StaticGaussKt => gauss_kt_zf(val[0], tau),
        KernelKind::StaticLorentzKt => lorentz_kt_zf(val[0], tau),
        KernelKind::CombiLgKt => combi_lgkt(val[0], val[1], tau),
        KernelKind::StrKt => stretched_kt(val[0], val[1], tau),
        KernelKind::SpinGlass => spin_glass(val[0], val[1], val[2], tau),
        KernelKind::RandomAnisotropicHyperfine => random_anisotropic_hf(val[0], val[1], tau),
        KernelKind::Abragam => abragam(val[0], val[1], tau),
        KernelKind::InternalField => {
            let (alpha, phase, nu, lambda_t, lambda_l) = (val[0], val[1], val[2], val[3], val[4]);
            alpha * (DEG_TO_RAD * phase + TWO_PI * nu * tau).cos() * (-lambda_t * tau).exp()
                + (1.0 - alpha) * (-lambda_l * tau).exp()
        }
        KernelKind::InternalFieldGk => internal_field_gk(val, tau),
        KernelKind::InternalFieldLl => internal_field_ll(val, tau),
        KernelKind::TfCos => (DEG_TO_RAD * val[0] + TWO_PI * val[1] * tau).cos(),
        KernelKind::Bessel => bessel_j0(DEG_TO_RAD * val[0] + TWO_PI * val[1] * tau),
        KernelKind::InternalBessel => {
            let (alpha, phase, nu, lambda_t, lambda_l) = (val[0], val[1], val[2], val[3], val[4]);
            alpha * bessel_j0(DEG_TO_RAD * phase + TWO_PI * nu * tau) * (-lambda_t * tau).exp()
                + (1.0 - alpha) * (-lambda_l * tau).exp()
        }
        KernelKind::SkewedGauss => skewed_gauss(val[0], val[1], val[2], val[3], tau),
        KernelKind::StaticNkZf => static_nk_zf(val[0], val[1], tau),
        KernelKind::StaticNkTf => {
            static_nk_tf_envelope(val[2], val[3], tau)
                * (TWO_PI * val[1] * tau + DEG_TO_RAD * val[0]).cos()
        }
        KernelKind::DynamicNkZf => dynamic_nk_zf(val[0], val[1], val[2], tau),
        KernelKind::DynamicNkTf => {
            dynamic_nk_tf_envelope(val[2], val[3], val[4], tau)
                * (TWO_PI * val[1] * tau + DEG_TO_RAD * val[0]).cos()
        }
        KernelKind::MuMinusExpTf => mu_minus_exp_tf(val, tau),
        KernelKind::FMuF => f_mu_f(val[0], tau),
        KernelKind::Polynom => polynom(t, val),
        KernelKind::StaticGaussKtLf
        | KernelKind::DynamicGaussKtLf
        | KernelKind::StaticLorentzKtLf
        | KernelKind::DynamicLorentzKtLf
        | KernelKind::UserFcn => return None,
    };
    Some(value)
}

/// `exp(-x^β)`, 0 when `x < 0` and β is not an integer.
pub fn stretched_exp(x: f64, beta: f64) -> f64 {
    if x < 0.0 && beta.fract() != 0.0 {
        return 0.0;
    }
    (-x.powf(beta)).exp()
}

/// Zero-field static Gaussian Kubo-Toyabe.
pub fn gauss_kt_zf(delta: f64, tau: f64) -> f64 {
    let s2 = (delta * tau).powi(2);
    ONE_THIRD + TWO_THIRDS * (1.0 - s2) * (-0.5 * s2).exp()
}

/// Zero-field static Lorentzian Kubo-Toyabe.
pub fn lorentz_kt_zf(a: f64, tau: f64) -> f64 {
    let at = a * tau;
    ONE_THIRD + TWO_THIRDS * (1.0 - at) * (-at).exp()
}

fn combi_lgkt(lambda: f64, sigma: f64, tau: f64) -> f64 {
    let lt = lambda * tau;
    let s2 = (sigma * tau).powi(2);
    ONE_THIRD * (1.0 + 2.0 * (1.0 - lt - s2) * (-(lt + 0.5 * s2)).exp())
}

fn stretched_kt(sigma: f64, beta: f64, tau: f64) -> f64 {
    let base = sigma * tau;
    if base < 0.0 && beta.fract() != 0.0 {
        return 0.0;
    }
    let x = base.powf(beta);
    if !x.is_finite() {
        return ONE_THIRD;
    }
    let damping = (-x / beta).exp();
    if damping == 0.0 {
        return ONE_THIRD;
    }
    ONE_THIRD + TWO_THIRDS * (1.0 - x) * damping
}

/// Uemura spin-glass function (rate λ, hopping rate ν, order parameter q).
fn spin_glass(lambda: f64, nu: f64, q: f64, tau: f64) -> f64 {
    if lambda == 0.0 || tau <= 0.0 {
        return 1.0;
    }
    let lambda_2 = lambda * lambda;
    let lambda_t_2_q = tau * tau * lambda_2 * q;
    let numerator = 4.0 * lambda_2 * (1.0 - q) * tau;
    let rate_2 = if numerator == 0.0 {
        0.0
    } else if nu == 0.0 {
        f64::INFINITY
    } else {
        (numerator / nu).max(0.0)
    };

    let rate_l = rate_2.sqrt();
    let rate_t = (rate_2 + lambda_t_2_q).max(0.0).sqrt();
    let ratio = if rate_t == 0.0 || rate_t.is_infinite() {
        0.0
    } else {
        lambda_t_2_q / rate_t
    };

    ONE_THIRD * ((-rate_l).exp() + 2.0 * (1.0 - ratio) * (-rate_t).exp())
}

fn random_anisotropic_hf(nu: f64, lambda: f64, tau: f64) -> f64 {
    let nu_t = nu * tau;
    let lambda_t = lambda * tau;
    (1.0 / 6.0) * (1.0 - 0.5 * nu_t) * (-0.5 * nu_t).exp()
        + ONE_THIRD * (1.0 - 0.25 * nu_t) * (-0.25 * (nu_t + 2.449_49 * lambda_t)).exp()
}

fn abragam(sigma: f64, gamma: f64, tau: f64) -> f64 {
    if gamma == 0.0 {
        return (-0.5 * (sigma * tau).powi(2)).exp();
    }
    let gamma_t = gamma * tau;
    (-(sigma / gamma).powi(2) * ((-gamma_t).exp() - 1.0 + gamma_t)).exp()
}

/// Gaussian internal field with stretched longitudinal part.
/// `val = [α, ν, σ, λ, β]`.
fn internal_field_gk(val: &[f64], tau: f64) -> f64 {
    let (alpha, nu, sigma, lambda, beta) = (val[0], val[1], val[2], val[3], val[4]);
    let s2 = sigma * sigma;
    let gauss = (-0.5 * s2 * tau * tau).exp();
    let transverse = if nu < ZERO_FIELD_NU {
        (1.0 - s2 * tau * tau) * gauss
    } else {
        let omega = TWO_PI * nu;
        ((omega * tau).cos() - s2 * tau / omega * (omega * tau).sin()) * gauss
    };
    alpha * transverse + (1.0 - alpha) * stretched_exp(lambda * tau, beta)
}

/// Lorentzian internal field. `val = [α, ν, a, λ]`.
fn internal_field_ll(val: &[f64], tau: f64) -> f64 {
    let (alpha, nu, a, lambda) = (val[0], val[1], val[2], val[3]);
    let damping = (-a * tau).exp();
    let transverse = if nu < ZERO_FIELD_NU {
        (1.0 - a * tau) * damping
    } else {
        let omega = TWO_PI * nu;
        ((omega * tau).cos() - a / omega * (omega * tau).sin()) * damping
    };
    alpha * transverse + (1.0 - alpha) * (-lambda * tau).exp()
}

/// Skewed Gaussian field distribution with widths σ₋ / σ₊.
fn skewed_gauss(phase: f64, nu: f64, sigma_m: f64, sigma_p: f64, tau: f64) -> f64 {
    let (sm, sp) = (sigma_m.abs(), sigma_p.abs());
    let zp = sp * tau * FRAC_1_SQRT_2;
    let zm = sm * tau * FRAC_1_SQRT_2;
    if zp >= 25.0 || zm >= 25.0 {
        return SKEWED_GAUSS_SENTINEL;
    }

    let arg = DEG_TO_RAD * phase + TWO_PI * nu * tau;
    let gp = (-0.5 * (tau * sigma_p).powi(2)).exp();
    if sm == sp {
        return arg.cos() * gp;
    }

    let gm = (-0.5 * (tau * sigma_m).powi(2)).exp();
    let wp = sp / (sm + sp);
    let wm = 1.0 - wp;
    // g(z)·erfi(z) == e^{-z²}·erfi(z)
    arg.cos() * (wm * gm + wp * gp)
        + arg.sin() * (wm * gauss_scaled_erfi(zm) - wp * gauss_scaled_erfi(zp))
}

fn static_nk_zf(delta0: f64, rb: f64, tau: f64) -> f64 {
    let d2t2 = (delta0 * tau).powi(2);
    let theta = 1.0 + rb * rb * d2t2;
    ONE_THIRD + TWO_THIRDS * theta.powf(-1.5) * (1.0 - d2t2 / theta) * (-0.5 * d2t2 / theta).exp()
}

fn static_nk_tf_envelope(delta0: f64, rb: f64, tau: f64) -> f64 {
    let d2t2 = (delta0 * tau).powi(2);
    let theta = 1.0 + rb * rb * d2t2;
    theta.powf(-0.5) * (-0.5 * d2t2 / theta).exp()
}

/// `∫₀^τ (τ-s) e^{-ν s} ds`, the dynamic NK memory integral.
fn nk_theta(nu_c: f64, tau: f64) -> f64 {
    if nu_c < 1e-6 {
        0.5 * tau * tau
    } else {
        ((-nu_c * tau).exp() - 1.0 + nu_c * tau) / (nu_c * nu_c)
    }
}

fn dynamic_nk_zf(delta0: f64, rb: f64, nu_c: f64, tau: f64) -> f64 {
    let d2 = delta0 * delta0;
    let theta = nk_theta(nu_c, tau);
    let denom = 1.0 + 4.0 * rb * rb * d2 * theta;
    denom.powf(-0.5) * (-2.0 * d2 * theta / denom).exp()
}

fn dynamic_nk_tf_envelope(delta0: f64, rb: f64, nu_c: f64, tau: f64) -> f64 {
    let d2 = delta0 * delta0;
    let theta = nk_theta(nu_c, tau);
    let denom = 1.0 + 2.0 * rb * rb * d2 * theta;
    denom.powf(-0.5) * (-d2 * theta / denom).exp()
}

/// Negative-muon decay with a TF precession. `val = [N₀, τ_µ, A, λ, φ, ν]`.
/// A non-positive lifetime disables the decay factor.
fn mu_minus_exp_tf(val: &[f64], tau: f64) -> f64 {
    let (n0, tau_mu, asym, lambda, phase, nu) = (val[0], val[1], val[2], val[3], val[4], val[5]);
    let decay = if tau_mu > 0.0 { (-tau / tau_mu).exp() } else { 1.0 };
    n0 * decay
        * (1.0 + asym * (-lambda * tau).exp() * (TWO_PI * nu * tau + DEG_TO_RAD * phase).cos())
}

/// F-µ-F dipolar polarization for the dipolar angular frequency `omega_d`.
fn f_mu_f(omega_d: f64, tau: f64) -> f64 {
    let s3 = 3.0_f64.sqrt();
    let wt = omega_d * tau;
    (1.0 / 6.0)
        * (3.0
            + (s3 * wt).cos()
            + (1.0 - 1.0 / s3) * ((3.0 - s3) / 2.0 * wt).cos()
            + (1.0 + 1.0 / s3) * ((3.0 + s3) / 2.0 * wt).cos())
}

/// `Σ a_k (t - tshift)^k` with `val = [tshift, a_0, a_1, ...]`.
fn polynom(t: f64, val: &[f64]) -> f64 {
    let Some((tshift, coeffs)) = val.split_first() else {
        return 0.0;
    };
    let x = t - tshift;
    coeffs.iter().rev().fold(0.0, |acc, &a| acc * x + a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::registry::{Arity, kernel_table};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn eval(kind: KernelKind, t: f64, val: &[f64]) -> f64 {
        evaluate(kind, t, val).unwrap_or(f64::NAN)
    }

    #[test]
    fn simple_exponential_and_time_shift() {
        assert_abs_diff_eq!(eval(KernelKind::SimpleExp, 2.0, &[0.5]), (-1.0_f64).exp(), epsilon = 1e-15);
        // tshift 1.0 moves the curve
        assert_abs_diff_eq!(eval(KernelKind::SimpleExp, 3.0, &[0.5, 1.0]), (-1.0_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn kubo_toyabe_limits() {
        assert_abs_diff_eq!(eval(KernelKind::StaticGaussKt, 0.0, &[1.0]), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(eval(KernelKind::StaticGaussKt, 50.0, &[1.0]), ONE_THIRD, epsilon = 1e-12);
        assert_abs_diff_eq!(eval(KernelKind::StaticLorentzKt, 0.0, &[1.0]), 1.0, epsilon = 1e-15);
        // minimum of the Gaussian KT sits at στ = √3
        let t_min = 3.0_f64.sqrt();
        let v_min = eval(KernelKind::StaticGaussKt, t_min, &[1.0]);
        assert!(v_min < eval(KernelKind::StaticGaussKt, t_min - 0.05, &[1.0]));
        assert!(v_min < eval(KernelKind::StaticGaussKt, t_min + 0.05, &[1.0]));
    }

    #[test]
    fn combi_lgkt_reduces_to_pure_forms() {
        for &t in &[0.3_f64, 1.0, 2.5] {
            assert_abs_diff_eq!(
                eval(KernelKind::CombiLgKt, t, &[0.0, 0.8]),
                gauss_kt_zf(0.8, t),
                epsilon = 1e-14
            );
            assert_abs_diff_eq!(
                eval(KernelKind::CombiLgKt, t, &[0.8, 0.0]),
                lorentz_kt_zf(0.8, t),
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn general_exponential_negative_base() {
        assert_eq!(stretched_exp(-1.0, 0.5), 0.0);
        assert_abs_diff_eq!(stretched_exp(-1.0, 2.0), (-1.0_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(eval(KernelKind::GeneralExp, 1.0, &[2.0, 1.0]), (-2.0_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn spin_glass_edge_cases() {
        assert_eq!(eval(KernelKind::SpinGlass, 1.0, &[0.0, 1.0, 0.5]), 1.0);
        assert_eq!(eval(KernelKind::SpinGlass, 0.0, &[1.0, 1.0, 0.5]), 1.0);
        let frozen = eval(KernelKind::SpinGlass, 1.0, &[1.0, 0.0, 0.5]);
        assert!(frozen.is_finite());
        assert!(eval(KernelKind::SpinGlass, 1.0, &[1.0, 2.0, 1.0]).is_finite());
    }

    #[test]
    fn abragam_gaussian_limit() {
        let sigma = 0.7;
        for &t in &[0.0_f64, 0.5, 3.0] {
            assert_abs_diff_eq!(
                eval(KernelKind::Abragam, t, &[sigma, 0.0]),
                eval(KernelKind::SimpleGauss, t, &[sigma]),
                epsilon = 1e-15
            );
        }
        // slow fluctuations approach the Gaussian as well
        assert_abs_diff_eq!(
            eval(KernelKind::Abragam, 1.0, &[sigma, 1e-4]),
            eval(KernelKind::SimpleGauss, 1.0, &[sigma]),
            epsilon = 1e-4
        );
    }

    #[test]
    fn internal_field_zero_field_branch() {
        // [α, ν, σ, λ, β]
        let v = eval(KernelKind::InternalFieldGk, 1.0, &[1.0, 0.0, 1.0, 0.0, 1.0]);
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-15);
        let v = eval(KernelKind::InternalFieldLl, 0.0, &[0.6, 5.0, 1.0, 0.3]);
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn skewed_gauss_symmetric_and_sentinel() {
        let sym = eval(KernelKind::SkewedGauss, 0.4, &[10.0, 2.0, 1.5, 1.5]);
        let expected = (DEG_TO_RAD * 10.0 + TWO_PI * 2.0 * 0.4).cos() * (-0.5 * (0.4_f64 * 1.5).powi(2)).exp();
        assert_abs_diff_eq!(sym, expected, epsilon = 1e-14);
        assert_eq!(eval(KernelKind::SkewedGauss, 100.0, &[0.0, 1.0, 1.0, 2.0]), SKEWED_GAUSS_SENTINEL);
        // nearly symmetric widths stay close to the plain Gaussian
        let near = eval(KernelKind::SkewedGauss, 0.4, &[10.0, 2.0, 1.5, 1.500_001]);
        assert_abs_diff_eq!(near, expected, epsilon = 1e-5);
    }

    #[test]
    fn noakes_kalvius_reduces_to_kubo_toyabe() {
        // R_b = 0 recovers the Gaussian KT
        for &t in &[0.2_f64, 1.0, 2.0] {
            assert_abs_diff_eq!(
                eval(KernelKind::StaticNkZf, t, &[0.9, 0.0]),
                gauss_kt_zf(0.9, t),
                epsilon = 1e-14
            );
        }
        // ν_c → 0 uses the ½τ² memory integral
        assert_abs_diff_eq!(nk_theta(0.0, 2.0), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(nk_theta(1e-3, 2.0), 2.0, epsilon = 2e-3);
    }

    #[test]
    fn f_mu_f_starts_at_one() {
        assert_abs_diff_eq!(eval(KernelKind::FMuF, 0.0, &[1.3]), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn polynom_horner() {
        // tshift 1, 2 + 3x + x²
        assert_abs_diff_eq!(eval(KernelKind::Polynom, 3.0, &[1.0, 2.0, 3.0, 1.0]), 12.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval(KernelKind::Polynom, 3.0, &[1.0, 2.0]), 2.0, epsilon = 1e-15);
    }

    #[test]
    fn reference_values() {
        #[rustfmt::skip]
        let cases: &[(KernelKind, f64, &[f64], f64)] = &[
            (KernelKind::TfCos, 0.1, &[30.0, 1.2], 0.28903179694447159),
            (KernelKind::TfCos, 0.35, &[30.0, 1.2], -0.99978068347484548),
            (KernelKind::TfCos, 1.0, &[30.0, 1.2], -0.20791169081775934),
            (KernelKind::Bessel, 0.2, &[0.0, 0.8], 0.76285659712518398),
            (KernelKind::Bessel, 0.5, &[0.0, 0.8], -0.054960360243452289),
            (KernelKind::Bessel, 1.7, &[0.0, 0.8], 0.029606858645381879),
            (KernelKind::InternalField, 0.1, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.47217134617264957),
            (KernelKind::InternalField, 0.6, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.68244507185337259),
            (KernelKind::InternalField, 2.0, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.33390048149605473),
            (KernelKind::InternalBessel, 0.1, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.69759509926647513),
            (KernelKind::InternalBessel, 0.6, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.33179852552311808),
            (KernelKind::InternalBessel, 2.0, &[0.7, 20.0, 1.5, 0.8, 0.2], 0.22434512702553144),
            (KernelKind::RandomAnisotropicHyperfine, 0.3, &[1.5, 0.4], 0.34876804149318296),
            (KernelKind::RandomAnisotropicHyperfine, 1.0, &[1.5, 0.4], 0.13175941333516737),
            (KernelKind::RandomAnisotropicHyperfine, 4.0, &[1.5, 0.4], -0.030555741281432031),
            (KernelKind::StaticNkTf, 0.2, &[15.0, 2.0, 1.2, 0.3], -0.90486914283428299),
            (KernelKind::StaticNkTf, 0.9, &[15.0, 2.0, 1.2, 0.3], 0.30564282379221991),
            (KernelKind::StaticNkTf, 2.5, &[15.0, 2.0, 1.2, 0.3], 0.059753978773250232),
            (KernelKind::DynamicNkZf, 0.2, &[1.2, 0.3, 2.0], 0.94676034881308842),
            (KernelKind::DynamicNkZf, 0.9, &[1.2, 0.3, 2.0], 0.50830579565364737),
            (KernelKind::DynamicNkZf, 2.5, &[1.2, 0.3, 2.0], 0.12148646261355121),
            (KernelKind::DynamicNkTf, 0.2, &[15.0, 2.0, 1.2, 0.3, 2.0], -0.90828075822139872),
            (KernelKind::DynamicNkTf, 0.9, &[15.0, 2.0, 1.2, 0.3, 2.0], 0.3809760857526181),
            (KernelKind::DynamicNkTf, 2.5, &[15.0, 2.0, 1.2, 0.3, 2.0], 0.27384517383811433),
            (KernelKind::MuMinusExpTf, 0.1, &[100.0, 2.0, 0.25, 0.5, 10.0, 3.0], 84.503056532259094),
            (KernelKind::MuMinusExpTf, 0.7, &[100.0, 2.0, 0.25, 0.5, 10.0, 3.0], 79.09273742001201),
            (KernelKind::MuMinusExpTf, 3.0, &[100.0, 2.0, 0.25, 0.5, 10.0, 3.0], 23.538783288053515),
            (KernelKind::SkewedGauss, 0.15, &[10.0, 2.0, 0.8, 2.0], -0.57622906331351293),
            (KernelKind::SkewedGauss, 0.5, &[10.0, 2.0, 0.8, 2.0], 0.62968349812559042),
            (KernelKind::SkewedGauss, 1.2, &[10.0, 2.0, 0.8, 2.0], -0.25868217710928194),
            (KernelKind::SpinGlass, 0.3, &[1.0, 2.0, 0.4], 0.51792548600311687),
            (KernelKind::SpinGlass, 1.0, &[1.0, 2.0, 0.4], 0.24013328270591697),
            (KernelKind::SpinGlass, 3.0, &[1.0, 2.0, 0.4], 0.034422852007391456),
            (KernelKind::FMuF, 0.4, &[1.3], 0.75794875642987911),
            (KernelKind::FMuF, 1.5, &[1.3], 0.335188876713178),
            (KernelKind::FMuF, 5.0, &[1.3], 0.25519969753287699),
        ];
        for &(kind, t, val, expected) in cases {
            let epsilon = match kind {
                KernelKind::Bessel | KernelKind::InternalBessel => 1e-7,
                _ => 1e-10 * expected.abs().max(1.0),
            };
            assert_abs_diff_eq!(eval(kind, t, val), expected, epsilon = epsilon);
        }
    }

    #[test]
    fn asymmetric_skewed_gauss_matches_at_zero() {
        // both branches start from cos(φ)
        let v = eval(KernelKind::SkewedGauss, 0.0, &[10.0, 2.0, 0.8, 2.0]);
        assert_abs_diff_eq!(v, (10.0 * DEG_TO_RAD).cos(), epsilon = 1e-15);
    }

    #[test]
    fn stateful_kinds_are_not_closed_form() {
        assert!(evaluate(KernelKind::StaticGaussKtLf, 1.0, &[1.0, 1.0]).is_none());
        assert!(evaluate(KernelKind::UserFcn, 1.0, &[1.0]).is_none());
    }

    #[test]
    fn closed_forms_are_finite_and_deterministic() {
        let mut rng = StdRng::seed_from_u64(17);
        for info in kernel_table() {
            let Arity::Fixed(n) = info.arity else {
                continue;
            };
            if info.tabulated {
                continue;
            }
            for _ in 0..200 {
                let mut val: Vec<f64> = (0..n)
                    .map(|_| {
                        let magnitude = rng.gen_range(0.05..5.0);
                        if rng.gen_bool(0.5) { -magnitude } else { magnitude }
                    })
                    .collect();
                if info.kind == KernelKind::StrKt {
                    // negative stretching exponents blow up near τ = 0
                    val[1] = val[1].abs();
                }
                if rng.gen_bool(0.5) {
                    val.push(rng.gen_range(-5.0..5.0));
                }
                let t = rng.gen_range(0.0..20.0);
                let a = eval(info.kind, t, &val);
                let b = eval(info.kind, t, &val);
                assert!(a.is_finite(), "{} at t={t} val={val:?} -> {a}", info.name);
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }
}
