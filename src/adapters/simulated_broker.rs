//! In-memory broker used by backtests.
//!
//! Submitted intents queue until the next `open_bar`, where each one is
//! worked in submission order at that bar's open. An intent for an asset
//! that does not trade on the bar stays queued.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::execution::{ExecutionConfig, ExecutionResult, execute_intent};
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{Fill, RejectedOrder};
use crate::domain::rebalance::OrderIntent;
use crate::ports::execution_port::ExecutionPort;

pub struct SimulatedBroker {
    portfolio: Portfolio,
    config: ExecutionConfig,
    prices: HashMap<String, f64>,
    pending: Vec<OrderIntent>,
}

impl SimulatedBroker {
    pub fn new(initial_capital: f64, config: ExecutionConfig) -> Self {
        SimulatedBroker {
            portfolio: Portfolio::new(initial_capital),
            config,
            prices: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn pending(&self) -> &[OrderIntent] {
        &self.pending
    }
}

impl ExecutionPort for SimulatedBroker {
    fn total_value(&self) -> f64 {
        self.portfolio.total_equity(&self.prices)
    }

    fn cash(&self) -> f64 {
        self.portfolio.cash
    }

    fn position(&self, code: &str) -> i64 {
        self.portfolio.quantity(code)
    }

    fn position_value(&self, code: &str) -> f64 {
        match (self.portfolio.get_position(code), self.prices.get(code)) {
            (Some(pos), Some(&price)) => pos.market_value(price),
            _ => 0.0,
        }
    }

    fn price(&self, code: &str) -> Option<f64> {
        self.prices.get(code).copied()
    }

    fn submit(&mut self, intent: OrderIntent) {
        self.pending.push(intent);
    }

    fn open_bar(&mut self, date: NaiveDate, opens: &[(&str, f64)]) {
        if self.pending.is_empty() {
            return;
        }
        let queued = std::mem::take(&mut self.pending);
        for intent in queued {
            let Some(&(_, open)) = opens.iter().find(|(code, _)| *code == intent.code) else {
                self.pending.push(intent);
                continue;
            };
            match execute_intent(&mut self.portfolio, &intent, open, date, &self.config) {
                ExecutionResult::Filled(fill) => debug!(
                    %date,
                    code = %fill.code,
                    side = %fill.side,
                    quantity = fill.quantity,
                    price = fill.price,
                    "filled"
                ),
                ExecutionResult::Rejected(reason) => debug!(
                    %date,
                    code = %intent.code,
                    shares = intent.shares,
                    ?reason,
                    "rejected"
                ),
            }
        }
    }

    fn mark_to_market(&mut self, _date: NaiveDate, closes: &[(&str, f64)]) {
        for &(code, close) in closes {
            self.prices.insert(code.to_string(), close);
        }
    }

    fn fills(&self) -> &[Fill] {
        &self.portfolio.fills
    }

    fn rejected(&self) -> &[RejectedOrder] {
        &self.portfolio.rejected
    }
}
