//! Strategy variants and their per-bar step.
//!
//! Every variant answers one question per bar: "what should the target
//! weights be now?", or `None` to leave the book alone. All mutable state
//! lives in an explicit [`EngineState`] that the caller threads through
//! [`StrategyKind::compute_target_weights`].

use chrono::NaiveDate;
use std::fmt;

use super::allocation::{TargetWeights, allocate};
use super::rolling::{DEFAULT_MOMENTUM_WINDOW, RollingStatEngine};
use super::signal::Signal;
use super::universe::Asset;

pub const DEFAULT_REBALANCE_EVERY: usize = 1;
pub const DEFAULT_CASH_RESERVE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    /// Risk-adjusted momentum rotation.
    Momentum,
    /// Invest once in a single benchmark asset and hold.
    BuyAndHold { benchmark: Asset },
    /// Invest once, equally across every asset, and hold.
    EqualWeight,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Momentum => write!(f, "Momentum"),
            StrategyKind::BuyAndHold { benchmark } => write!(f, "Buy & Hold {}", benchmark.name),
            StrategyKind::EqualWeight => write!(f, "Equal Weight"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub momentum_window: usize,
    pub rebalance_every: usize,
    /// Fraction of value the one-shot baselines leave in cash for commission.
    pub cash_reserve: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            momentum_window: DEFAULT_MOMENTUM_WINDOW,
            rebalance_every: DEFAULT_REBALANCE_EVERY,
            cash_reserve: DEFAULT_CASH_RESERVE,
        }
    }
}

/// What a strategy sees on one bar. Slices are aligned with `codes`.
pub struct BarContext<'a> {
    pub date: NaiveDate,
    pub codes: &'a [String],
    /// Return realised on this bar, `None` if the asset has no bar today.
    pub returns: &'a [Option<f64>],
    /// Whether a price is known for the asset as of this bar's close.
    pub priced: &'a [bool],
}

#[derive(Debug, Clone)]
pub struct EngineState {
    pub stats: RollingStatEngine,
    pub bars_since_rebalance: usize,
    pub invested: bool,
    pub last_signals: Vec<Signal>,
}

impl EngineState {
    pub fn new(params: &StrategyParams) -> Self {
        EngineState {
            stats: RollingStatEngine::new(params.momentum_window),
            bars_since_rebalance: 0,
            invested: false,
            last_signals: Vec::new(),
        }
    }
}

impl StrategyKind {
    pub fn compute_target_weights(
        &self,
        state: &mut EngineState,
        bar: &BarContext<'_>,
        params: &StrategyParams,
    ) -> Option<TargetWeights> {
        match self {
            StrategyKind::Momentum => momentum_step(state, bar, params),
            StrategyKind::BuyAndHold { benchmark } => {
                if state.invested {
                    return None;
                }
                let idx = bar.codes.iter().position(|c| *c == benchmark.code)?;
                if !bar.priced[idx] {
                    return None;
                }
                state.invested = true;
                let weight = 1.0 - params.cash_reserve;
                Some(TargetWeights::from_entries(
                    bar.codes
                        .iter()
                        .map(|c| {
                            let w = if *c == benchmark.code { weight } else { 0.0 };
                            (c.clone(), w)
                        })
                        .collect(),
                ))
            }
            StrategyKind::EqualWeight => {
                if state.invested || bar.codes.is_empty() || !bar.priced.iter().all(|&p| p) {
                    return None;
                }
                state.invested = true;
                let weight = (1.0 - params.cash_reserve) / bar.codes.len() as f64;
                Some(TargetWeights::from_entries(
                    bar.codes.iter().map(|c| (c.clone(), weight)).collect(),
                ))
            }
        }
    }
}

fn momentum_step(
    state: &mut EngineState,
    bar: &BarContext<'_>,
    params: &StrategyParams,
) -> Option<TargetWeights> {
    for (code, ret) in bar.codes.iter().zip(bar.returns) {
        if let Some(r) = ret {
            state.stats.observe(code, *r);
        }
    }

    state.bars_since_rebalance += 1;
    if state.bars_since_rebalance < params.rebalance_every {
        return None;
    }
    state.bars_since_rebalance = 0;

    state.last_signals = bar
        .codes
        .iter()
        .map(|code| Signal::from_stats(code, bar.date, state.stats.stats(code)))
        .collect();

    let scores: Vec<(String, f64)> = state
        .last_signals
        .iter()
        .map(|s| (s.code.clone(), s.score))
        .collect();
    Some(allocate(&scores))
}
