//! User functions shipped with the library.
//!
//! `TabulatedExpFcn` keeps an exponential table in a global part shared by all
//! trees of a session, recomputed whenever its rate changes. It exercises the
//! global-part path end to end. `StretchedExpFcn` is stateless.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::T_MAX_US;
use crate::math::SampledTable;
use crate::models::kernels::stretched_exp;

use super::registry::{FactoryRegistry, GlobalPartRegistry};
use super::traits::{PluginError, UserFunction};

const TABLE_DT: f64 = 1e-3;

/// Registers the built-in user functions.
pub fn register(registry: &FactoryRegistry) {
    registry.register("TabulatedExpFcn", || Box::new(TabulatedExpFcn::default()));
    registry.register("StretchedExpFcn", || Box::new(StretchedExpFcn));
}

/// Global part of `TabulatedExpFcn`: `exp(-λt)` sampled over `[0, 20 µs)`.
#[derive(Debug, Default)]
pub struct ExpTable {
    rate_bits: Option<u64>,
    table: SampledTable,
}

impl ExpTable {
    fn ensure(&mut self, rate: f64) {
        if self.rate_bits == Some(rate.to_bits()) {
            return;
        }
        let n = (T_MAX_US / TABLE_DT).round() as usize;
        let values = (0..n).map(|i| (-rate * i as f64 * TABLE_DT).exp()).collect();
        self.table = SampledTable::new(TABLE_DT, values);
        self.rate_bits = Some(rate.to_bits());
    }

    fn value(&self, t: f64) -> f64 {
        self.table.lookup(t, 1.0)
    }
}

/// `exp(-λt)` read from a shared table. Parameters: `[λ]`.
///
/// Returns 1 for `t ≤ 0` and 0 from 20 µs on.
#[derive(Debug, Default)]
pub struct TabulatedExpFcn {
    global: Option<Arc<Mutex<ExpTable>>>,
}

impl UserFunction for TabulatedExpFcn {
    fn evaluate(&self, t: f64, params: &[f64]) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        if t >= T_MAX_US {
            return 0.0;
        }
        let rate = params.first().copied().unwrap_or_default();
        match &self.global {
            Some(global) => {
                let mut table = global.lock().unwrap_or_else(PoisonError::into_inner);
                table.ensure(rate);
                table.value(t)
            }
            None => (-rate * t).exp(),
        }
    }

    fn needs_global_part(&self) -> bool {
        true
    }

    fn bind_global_part(
        &mut self,
        registry: &GlobalPartRegistry,
        index: usize,
    ) -> Result<(), PluginError> {
        let part = registry.get_or_try_insert(index, || Ok(Mutex::new(ExpTable::default())))?;
        self.global = Some(part);
        Ok(())
    }
}

/// `exp(-(λt)^β)`. Parameters: `[λ, β]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StretchedExpFcn;

impl UserFunction for StretchedExpFcn {
    fn evaluate(&self, t: f64, params: &[f64]) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        let rate = params.first().copied().unwrap_or_default();
        let beta = params.get(1).copied().unwrap_or(1.0);
        stretched_exp(rate * t, beta)
    }
}
