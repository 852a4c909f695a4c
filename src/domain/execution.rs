//! Order application against a portfolio ledger.
//!
//! Buys debit `notional + commission` and are rejected outright when cash
//! cannot cover both. Sells are clamped to the shares held (long-only) and
//! credit `notional - commission`. Commission is proportional to notional.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{Fill, Position, RejectReason, RejectedOrder};
use super::rebalance::{OrderIntent, Side};

pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of trade notional, e.g. 0.001 for 0.1%.
    pub commission_rate: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    trade_value * config.commission_rate
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Filled(Fill),
    Rejected(RejectReason),
}

/// Apply one intent at `price`, recording the fill or rejection.
pub fn execute_intent(
    portfolio: &mut Portfolio,
    intent: &OrderIntent,
    price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> ExecutionResult {
    let result = if !(price.is_finite() && price > 0.0) {
        ExecutionResult::Rejected(RejectReason::NoPrice)
    } else {
        match intent.side() {
            Side::Buy => buy(portfolio, &intent.code, intent.quantity(), price, date, config),
            Side::Sell => sell(portfolio, &intent.code, intent.quantity(), price, date, config),
        }
    };

    match &result {
        ExecutionResult::Filled(fill) => portfolio.record_fill(fill.clone()),
        ExecutionResult::Rejected(reason) => portfolio.record_rejection(RejectedOrder {
            date,
            code: intent.code.clone(),
            shares: intent.shares,
            reason: *reason,
        }),
    }
    result
}

fn buy(
    portfolio: &mut Portfolio,
    code: &str,
    quantity: i64,
    price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> ExecutionResult {
    let cost = quantity as f64 * price;
    let commission = calculate_commission(cost, config);
    if cost + commission > portfolio.cash {
        return ExecutionResult::Rejected(RejectReason::InsufficientCash);
    }

    portfolio.cash -= cost + commission;
    portfolio
        .positions
        .entry(code.to_string())
        .and_modify(|pos| pos.add(quantity, price))
        .or_insert_with(|| Position {
            code: code.to_string(),
            quantity,
            avg_price: price,
            opened: date,
        });

    ExecutionResult::Filled(Fill {
        date,
        code: code.to_string(),
        side: Side::Buy,
        quantity,
        price,
        commission,
    })
}

fn sell(
    portfolio: &mut Portfolio,
    code: &str,
    quantity: i64,
    price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> ExecutionResult {
    let held = portfolio.quantity(code);
    let quantity = quantity.min(held);
    if quantity <= 0 {
        return ExecutionResult::Rejected(RejectReason::NoPosition);
    }

    let proceeds = quantity as f64 * price;
    let commission = calculate_commission(proceeds, config);
    portfolio.cash += proceeds - commission;

    if quantity == held {
        portfolio.positions.remove(code);
    } else if let Some(pos) = portfolio.positions.get_mut(code) {
        pos.quantity -= quantity;
    }

    ExecutionResult::Filled(Fill {
        date,
        code: code.to_string(),
        side: Side::Sell,
        quantity,
        price,
        commission,
    })
}
