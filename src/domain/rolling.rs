//! Rolling momentum/volatility estimation over per-asset return windows.
//!
//! Each asset owns a sliding window of its last `W` simple returns.
//! Momentum is the window mean, volatility the sample standard deviation
//! (divisor `count - 1`). Running sums make each update O(1); the sums are
//! rebuilt from the buffer once every `W` evictions so rounding error from
//! repeated add/subtract cannot accumulate over long runs, and immediately
//! when a non-finite value leaves the window.

use std::collections::{BTreeMap, VecDeque};

pub const DEFAULT_MOMENTUM_WINDOW: usize = 20;

/// Output of a single observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingStats {
    pub momentum: f64,
    pub volatility: f64,
    pub is_warm: bool,
}

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
    evictions: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        RollingWindow {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
            sum_sq: 0.0,
            evictions: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        let mut evicted_non_finite = false;
        if self.values.len() == self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
                self.evictions += 1;
                evicted_non_finite = !old.is_finite();
            }
        }
        self.values.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        // NaN - NaN is still NaN, so subtraction cannot clear it.
        if evicted_non_finite || self.evictions >= self.capacity {
            self.resync();
        }
    }

    fn resync(&mut self) {
        self.sum = self.values.iter().sum();
        self.sum_sq = self.values.iter().map(|v| v * v).sum();
        self.evictions = 0;
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.sum / self.values.len() as f64
    }

    /// Sample standard deviation; 0 with fewer than two observations.
    pub fn sample_std(&self) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return 0.0;
        }
        let n = n as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        if variance.is_nan() {
            return f64::NAN;
        }
        variance.max(0.0).sqrt()
    }

    pub fn stats(&self) -> RollingStats {
        RollingStats {
            momentum: self.mean(),
            volatility: self.sample_std(),
            is_warm: self.is_full(),
        }
    }
}

/// Per-asset rolling windows keyed by asset code.
#[derive(Debug, Clone)]
pub struct RollingStatEngine {
    window: usize,
    windows: BTreeMap<String, RollingWindow>,
}

impl RollingStatEngine {
    pub fn new(window: usize) -> Self {
        RollingStatEngine {
            window,
            windows: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Push a new return for `code` and report the refreshed statistics.
    pub fn observe(&mut self, code: &str, return_value: f64) -> RollingStats {
        let window = self.window;
        let slot = self
            .windows
            .entry(code.to_string())
            .or_insert_with(|| RollingWindow::new(window));
        slot.push(return_value);
        slot.stats()
    }

    /// Statistics for `code` without mutating; cold and zero when unseen.
    pub fn stats(&self, code: &str) -> RollingStats {
        self.windows
            .get(code)
            .map(RollingWindow::stats)
            .unwrap_or(RollingStats {
                momentum: 0.0,
                volatility: 0.0,
                is_warm: false,
            })
    }
}
