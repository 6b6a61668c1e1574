//! The shared `(current, total)` pair behind a progress bar.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{Error, Result};

/// Progress counter that any number of threads may update concurrently.
///
/// `current` is clamped into `[0, total]` on every write, so every reader
/// observes a value inside that range.
#[derive(Debug)]
pub struct ProgressState {
    total: i64,
    current: AtomicI64,
}

impl ProgressState {
    /// Creates a counter at zero. Fails if `total` is not positive.
    pub fn new(total: i64) -> Result<ProgressState> {
        if total <= 0 {
            return Err(Error::InvalidTotal { total });
        }
        Ok(ProgressState {
            total,
            current: AtomicI64::new(0),
        })
    }

    /// Advances the counter by one.
    pub fn increment(&self) {
        self.increment_by(1);
    }

    /// Adds `amount` to the counter, saturating at `0` and `total`.
    ///
    /// Negative amounts are accepted for corrections.
    pub fn increment_by(&self, amount: i64) {
        let total = self.total;
        // The closure never returns None, so the update always succeeds.
        let _ = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(amount).clamp(0, total))
            });
    }

    /// Stores an absolute value, clamped into `[0, total]`.
    pub fn set(&self, value: i64) {
        self.current
            .store(value.clamp(0, self.total), Ordering::Release);
    }

    /// Resets the counter to zero.
    pub fn reset(&self) {
        self.current.store(0, Ordering::Release);
    }

    /// Returns true once the counter has reached its total.
    pub fn finished(&self) -> bool {
        self.current() == self.total
    }

    pub fn current(&self) -> i64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Completed share of the work, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        (self.current() as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Number of decimal digits needed to print `total`.
    pub(crate) fn digits(&self) -> usize {
        self.total.ilog10() as usize + 1
    }
}
