//! Portfolio ledger: cash, positions and the fill/rejection logs.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::position::{Fill, Position, RejectedOrder};

/// Total portfolio value at a bar close.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: BTreeMap<String, Position>,
    pub fills: Vec<Fill>,
    pub rejected: Vec<RejectedOrder>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
            fills: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn get_position(&self, code: &str) -> Option<&Position> {
        self.positions.get(code)
    }

    pub fn quantity(&self, code: &str) -> i64 {
        self.positions.get(code).map(|p| p.quantity).unwrap_or(0)
    }

    pub fn record_fill(&mut self, fill: Fill) {
        self.fills.push(fill);
    }

    pub fn record_rejection(&mut self, rejected: RejectedOrder) {
        self.rejected.push(rejected);
    }

    pub fn total_equity(&self, price_map: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .filter_map(|pos| {
                price_map
                    .get(&pos.code)
                    .map(|&price| pos.market_value(price))
            })
            .sum();
        self.cash + position_value
    }
}
