//! Single-slot memo for tabulated kernels.
//!
//! A fit evaluates the same parameter set at many times before moving on, so
//! one slot keyed on the exact bit pattern of the defining parameters is
//! enough. The slot lives in a `RefCell`, which makes the owning tree `!Sync`.

use std::cell::{Cell, Ref, RefCell};

/// Maximum number of defining parameters.
const KEY_LEN: usize = 3;

type KeyBits = [u64; KEY_LEN];

fn key_bits(key: &[f64]) -> KeyBits {
    let mut bits = [0; KEY_LEN];
    for (slot, value) in bits.iter_mut().zip(key) {
        *slot = value.to_bits();
    }
    bits
}

#[derive(Debug, Default)]
struct Entry<V> {
    key: Option<KeyBits>,
    value: V,
}

#[derive(Debug, Default)]
pub struct TableCache<V> {
    entry: RefCell<Entry<V>>,
    solves: Cell<usize>,
}

impl<V: Default> TableCache<V> {
    pub fn new() -> Self {
        Self {
            entry: RefCell::new(Entry::default()),
            solves: Cell::new(0),
        }
    }
}

impl<V> TableCache<V> {
    /// Return the value for `key`, recomputing it first if the key changed.
    pub fn get_or_compute(&self, key: &[f64], compute: impl FnOnce() -> V) -> Ref<'_, V> {
        let bits = key_bits(key);
        if self.entry.borrow().key != Some(bits) {
            let value = compute();
            let mut entry = self.entry.borrow_mut();
            entry.key = Some(bits);
            entry.value = value;
            self.solves.set(self.solves.get() + 1);
        }
        Ref::map(self.entry.borrow(), |entry| &entry.value)
    }

    /// Number of recomputations so far.
    pub fn solve_count(&self) -> usize {
        self.solves.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recomputes_only_on_key_change() {
        let cache: TableCache<f64> = TableCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let v = *cache.get_or_compute(&[1.0, 2.0], || {
                calls += 1;
                3.0
            });
            assert_eq!(v, 3.0);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.solve_count(), 1);

        let v = *cache.get_or_compute(&[1.0, 2.5], || 4.0);
        assert_eq!(v, 4.0);
        assert_eq!(cache.solve_count(), 2);
    }

    #[test]
    fn compares_bit_patterns() {
        let cache: TableCache<u8> = TableCache::new();
        cache.get_or_compute(&[0.0], || 1);
        // -0.0 == 0.0 numerically but not bit for bit
        cache.get_or_compute(&[-0.0], || 2);
        assert_eq!(cache.solve_count(), 2);
        // NaN keys are stable
        cache.get_or_compute(&[f64::NAN], || 3);
        cache.get_or_compute(&[f64::NAN], || 4);
        assert_eq!(cache.solve_count(), 3);
    }
}
