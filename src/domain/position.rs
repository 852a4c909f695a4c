//! Long-only position tracking.

use chrono::NaiveDate;

use super::rebalance::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub code: String,
    pub quantity: i64,
    pub avg_price: f64,
    pub opened: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Add shares, folding the fill price into the average cost.
    pub fn add(&mut self, quantity: i64, price: f64) {
        let total = self.quantity + quantity;
        if total > 0 {
            self.avg_price =
                (self.avg_price * self.quantity as f64 + price * quantity as f64) / total as f64;
        }
        self.quantity = total;
    }
}

/// An executed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub date: NaiveDate,
    pub code: String,
    pub side: Side,
    pub quantity: i64,
    pub price: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientCash,
    NoPosition,
    NoPrice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedOrder {
    pub date: NaiveDate,
    pub code: String,
    pub shares: i64,
    pub reason: RejectReason,
}
