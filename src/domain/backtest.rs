//! Backtest fold and strategy comparison.
//!
//! A run walks the unified timeline once. On each date the broker first
//! works yesterday's intents at today's open, then marks to today's close;
//! the strategy then sees returns up to and including today and any new
//! intents are sized on today's close. Intents therefore fill one bar
//! later, and intents still pending after the final bar never fill.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use super::allocation::TargetWeights;
use super::code_data::MarketData;
use super::execution::DEFAULT_COMMISSION_RATE;
use super::metrics::{PerformanceReport, returns_from_equity};
use super::ohlcv::ReturnPoint;
use super::portfolio::EquityPoint;
use super::position::{Fill, RejectedOrder};
use super::rebalance::{AssetState, DEFAULT_REBALANCE_THRESHOLD, RebalanceEngine};
use super::rolling::DEFAULT_MOMENTUM_WINDOW;
use super::strategy::{
    BarContext, DEFAULT_CASH_RESERVE, DEFAULT_REBALANCE_EVERY, EngineState, StrategyKind,
    StrategyParams,
};
use super::universe::Asset;
use crate::ports::execution_port::ExecutionPort;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_rate: f64,
    /// Annual rate.
    pub risk_free_rate: f64,
    pub momentum_window: usize,
    pub rebalance_every: usize,
    pub rebalance_threshold: f64,
    pub baseline_cash_reserve: f64,
}

impl BacktestConfig {
    /// Defaults for everything but the date range.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            start_date,
            end_date,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_rate: DEFAULT_COMMISSION_RATE,
            risk_free_rate: 0.0,
            momentum_window: DEFAULT_MOMENTUM_WINDOW,
            rebalance_every: DEFAULT_REBALANCE_EVERY,
            rebalance_threshold: DEFAULT_REBALANCE_THRESHOLD,
            baseline_cash_reserve: DEFAULT_CASH_RESERVE,
        }
    }

    pub fn strategy_params(&self) -> StrategyParams {
        StrategyParams {
            momentum_window: self.momentum_window,
            rebalance_every: self.rebalance_every,
            cash_reserve: self.baseline_cash_reserve,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightRecord {
    pub date: NaiveDate,
    pub weights: TargetWeights,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub label: String,
    pub equity_curve: Vec<EquityPoint>,
    pub returns: Vec<ReturnPoint>,
    pub weights: Vec<WeightRecord>,
    pub fills: Vec<Fill>,
    pub rejected: Vec<RejectedOrder>,
}

impl RunResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.equity)
    }

    pub fn return_on(&self, date: NaiveDate) -> Option<f64> {
        self.returns
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.returns[i].value)
    }
}

#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub run: RunResult,
    pub report: PerformanceReport,
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub assets: Vec<Asset>,
    /// Momentum first, then the baselines, in the order they were run.
    pub outcomes: Vec<StrategyOutcome>,
}

impl ComparisonResult {
    pub fn primary(&self) -> Option<&StrategyOutcome> {
        self.outcomes.first()
    }

    pub fn reports(&self) -> impl Iterator<Item = &PerformanceReport> {
        self.outcomes.iter().map(|o| &o.report)
    }
}

/// Simulate one strategy over the whole timeline.
pub fn run_strategy<E: ExecutionPort>(
    kind: &StrategyKind,
    market: &MarketData,
    config: &BacktestConfig,
    broker: &mut E,
) -> RunResult {
    let label = kind.to_string();
    let params = config.strategy_params();
    let rebalancer = RebalanceEngine::new(config.rebalance_threshold);
    let mut state = EngineState::new(&params);

    let codes = market.codes();
    let mut equity_curve = Vec::with_capacity(market.timeline.len());
    let mut weights = Vec::new();
    let mut returns = vec![None; codes.len()];
    let mut priced = vec![false; codes.len()];

    for &date in &market.timeline {
        let bars: Vec<_> = market
            .data
            .iter()
            .filter_map(|cd| cd.get_bar(date).map(|bar| (cd.code(), bar)))
            .collect();

        let opens: Vec<(&str, f64)> = bars.iter().map(|(c, b)| (*c, b.open)).collect();
        broker.open_bar(date, &opens);

        let closes: Vec<(&str, f64)> = bars.iter().map(|(c, b)| (*c, b.close)).collect();
        broker.mark_to_market(date, &closes);

        for (i, cd) in market.data.iter().enumerate() {
            returns[i] = cd.return_on(date);
            priced[i] = broker.price(cd.code()).is_some();
        }

        let bar = BarContext {
            date,
            codes: &codes,
            returns: &returns,
            priced: &priced,
        };

        if let Some(targets) = kind.compute_target_weights(&mut state, &bar, &params) {
            let total_value = broker.total_value();
            let holdings: Vec<AssetState> = codes
                .iter()
                .map(|code| AssetState {
                    code: code.clone(),
                    current_value: broker.position_value(code),
                    price: broker.price(code).unwrap_or(0.0),
                })
                .collect();

            let intents = rebalancer.rebalance(&targets, total_value, &holdings);
            debug!(
                strategy = %label,
                %date,
                orders = intents.len(),
                "rebalance"
            );
            for intent in intents {
                broker.submit(intent);
            }
            weights.push(WeightRecord {
                date,
                weights: targets,
            });
        }

        equity_curve.push(EquityPoint {
            date,
            equity: broker.total_value(),
        });
    }

    let returns = returns_from_equity(&equity_curve);
    info!(
        strategy = %label,
        bars = equity_curve.len(),
        fills = broker.fills().len(),
        rejected = broker.rejected().len(),
        "run complete"
    );

    RunResult {
        label,
        equity_curve,
        returns,
        weights,
        fills: broker.fills().to_vec(),
        rejected: broker.rejected().to_vec(),
    }
}

/// The three strategies compared by default: momentum rotation, holding
/// the benchmark, and a one-shot equal split.
pub fn default_strategies(benchmark: Asset) -> Vec<StrategyKind> {
    vec![
        StrategyKind::Momentum,
        StrategyKind::BuyAndHold { benchmark },
        StrategyKind::EqualWeight,
    ]
}

/// Run each strategy as an independent simulation, in parallel, and score
/// it. `make_broker` supplies a fresh broker per run; output order follows
/// `strategies`.
pub fn run_comparison<E, F>(
    market: &MarketData,
    config: &BacktestConfig,
    strategies: &[StrategyKind],
    make_broker: F,
) -> ComparisonResult
where
    E: ExecutionPort,
    F: Fn() -> E + Sync,
{
    let outcomes = strategies
        .par_iter()
        .map(|kind| {
            let mut broker = make_broker();
            let run = run_strategy(kind, market, config, &mut broker);
            let report = PerformanceReport::evaluate(&run.label, &run.returns, config.risk_free_rate);
            StrategyOutcome { run, report }
        })
        .collect();

    ComparisonResult {
        assets: market.assets(),
        outcomes,
    }
}
