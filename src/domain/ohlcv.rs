//! OHLCV bar representation and the per-bar simple return.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// A single simple return `close[t] / close[t-1] - 1` stamped with `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl OhlcvBar {
    /// close / prev_close - 1
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        self.close / prev_close - 1.0
    }
}
