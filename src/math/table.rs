//! Uniformly sampled tables over `[0, T_MAX]` with linear interpolation.

/// `|x - round(x)|` below which a lookup returns the stored sample.
const SNAP_EPS: f64 = 1e-9;

/// Values sampled at `i * dt`, `i = 0..len`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledTable {
    dt: f64,
    values: Vec<f64>,
}

impl SampledTable {
    pub fn new(dt: f64, values: Vec<f64>) -> Self {
        Self { dt, values }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Interpolated value at `t`.
    ///
    /// Returns `before_start` for `t < 0` and the last sample beyond the end.
    /// At (or within 1e-9 steps of) a sample point the stored sample is
    /// returned exactly.
    pub fn lookup(&self, t: f64, before_start: f64) -> f64 {
        if t < 0.0 {
            return before_start;
        }
        let Some(&last) = self.values.last() else {
            return before_start;
        };
        if !(self.dt > 0.0) {
            return last;
        }

        let x = t / self.dt;
        let nearest = x.round();
        if (x - nearest).abs() < SNAP_EPS {
            let idx = nearest as usize;
            return self.values.get(idx).copied().unwrap_or(last);
        }

        let i = x.floor() as usize;
        if i + 1 >= self.values.len() {
            return last;
        }
        let frac = x - i as f64;
        self.values[i] + (self.values[i + 1] - self.values[i]) * frac
    }
}
