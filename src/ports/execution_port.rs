//! Execution collaborator port.
//!
//! The rebalancer reads current state through this trait and hands it
//! order intents; how and when intents become fills is up to the
//! implementation. The backtest fold drives it with one `open_bar` and
//! one `mark_to_market` call per date.

use crate::domain::position::{Fill, RejectedOrder};
use crate::domain::rebalance::OrderIntent;
use chrono::NaiveDate;

pub trait ExecutionPort {
    fn total_value(&self) -> f64;

    fn cash(&self) -> f64;

    /// Shares currently held.
    fn position(&self, code: &str) -> i64;

    /// Mark-to-market value of the holding in `code`.
    fn position_value(&self, code: &str) -> f64;

    /// Latest known price, `None` before the first bar for `code`.
    fn price(&self, code: &str) -> Option<f64>;

    fn submit(&mut self, intent: OrderIntent);

    /// Start of bar: work pending intents against the opening prices of
    /// the assets that trade on `date`.
    fn open_bar(&mut self, date: NaiveDate, opens: &[(&str, f64)]);

    /// End of bar: record closing prices.
    fn mark_to_market(&mut self, date: NaiveDate, closes: &[(&str, f64)]);

    fn fills(&self) -> &[Fill];

    fn rejected(&self) -> &[RejectedOrder];
}
