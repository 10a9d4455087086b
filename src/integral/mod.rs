//! Numerically defined kernels.
//!
//! - `static_lf`: static LF Kubo-Toyabe, integrated once per `(ν, rate)`
//! - `dynamic_kt`: dynamic LF Kubo-Toyabe, Volterra solve per `(ν, rate, ν_c)`
//! - `cache`: the per-node memo both of them sit behind
//!
//! The node-level wrappers below own one cache each. The trailing time shift
//! is not part of the cache key, so shifting a curve never triggers a solve.

pub mod cache;
pub mod dynamic_kt;
pub mod static_lf;

pub use cache::TableCache;
pub use dynamic_kt::DynamicKt;
pub use static_lf::{LfFamily, StaticLf};

use crate::models::kernels::shifted_time;

/// `statGssKTLF` / `statExpKTLF` node state. `val = [ν, rate, (tshift)]`.
#[derive(Debug)]
pub struct StaticLfKernel {
    family: LfFamily,
    cache: TableCache<StaticLf>,
}

impl StaticLfKernel {
    pub fn new(family: LfFamily) -> Self {
        Self {
            family,
            cache: TableCache::new(),
        }
    }

    pub fn value(&self, t: f64, val: &[f64]) -> f64 {
        let tau = shifted_time(t, val, 2);
        let (nu, rate) = (val[0], val[1]);
        self.cache
            .get_or_compute(&[nu, rate], || StaticLf::compute(self.family, nu, rate))
            .value(tau)
    }

    pub fn solve_count(&self) -> usize {
        self.cache.solve_count()
    }
}

/// `dynGssKTLF` / `dynExpKTLF` node state. `val = [ν, rate, ν_c, (tshift)]`.
#[derive(Debug)]
pub struct DynamicKtKernel {
    family: LfFamily,
    cache: TableCache<DynamicKt>,
}

impl DynamicKtKernel {
    pub fn new(family: LfFamily) -> Self {
        Self {
            family,
            cache: TableCache::new(),
        }
    }

    pub fn value(&self, t: f64, val: &[f64]) -> f64 {
        let tau = shifted_time(t, val, 3);
        let (nu, rate, nu_c) = (val[0], val[1], val[2]);
        self.cache
            .get_or_compute(&[nu, rate, nu_c], || {
                DynamicKt::compute(self.family, nu, rate, nu_c)
            })
            .value(tau)
    }

    pub fn solve_count(&self) -> usize {
        self.cache.solve_count()
    }
}
