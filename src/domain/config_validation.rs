//! Run settings: read from configuration, apply command-line overrides,
//! validate.
//!
//! Every check names the offending `[section] key` so the user can find it
//! in the INI file.

use std::path::PathBuf;

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL};
use crate::domain::error::RotatraderError;
use crate::domain::execution::DEFAULT_COMMISSION_RATE;
use crate::domain::rebalance::DEFAULT_REBALANCE_THRESHOLD;
use crate::domain::rolling::DEFAULT_MOMENTUM_WINDOW;
use crate::domain::strategy::{DEFAULT_CASH_RESERVE, DEFAULT_REBALANCE_EVERY};
use crate::domain::universe::{Asset, parse_assets, parse_codes};
use crate::ports::config_port::{ConfigPort, get_date, get_f64, get_usize};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "momentum_strategy_backtest";

/// Values given on the command line; each replaces its INI counterpart.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub codes: Option<String>,
    pub momentum_window: Option<usize>,
    pub rebalance_every: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub backtest: BacktestConfig,
    pub assets: Vec<Asset>,
    pub benchmark: Asset,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

pub fn load_run_settings(
    config: &dyn ConfigPort,
    overrides: &SettingsOverrides,
) -> Result<RunSettings, RotatraderError> {
    let mut backtest = build_backtest_config(config)?;
    if let Some(window) = overrides.momentum_window {
        backtest.momentum_window = window;
    }
    if let Some(every) = overrides.rebalance_every {
        backtest.rebalance_every = every;
    }
    validate_backtest_config(&backtest)?;

    let (assets, benchmark) = build_universe(config, overrides.codes.as_deref())?;

    let data_dir = config
        .get_trimmed("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let output_dir = match &overrides.output_dir {
        Some(dir) => dir.clone(),
        None => PathBuf::from(
            config
                .get_trimmed("report", "output_dir")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        ),
    };

    Ok(RunSettings {
        backtest,
        assets,
        benchmark,
        data_dir: PathBuf::from(data_dir),
        output_dir,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, RotatraderError> {
    Ok(BacktestConfig {
        start_date: get_date(config, "backtest", "start_date")?,
        end_date: get_date(config, "backtest", "end_date")?,
        initial_capital: get_f64(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)?,
        commission_rate: get_f64(config, "backtest", "commission_rate", DEFAULT_COMMISSION_RATE)?,
        risk_free_rate: get_f64(config, "backtest", "risk_free_rate", 0.0)?,
        momentum_window: get_usize(config, "strategy", "momentum_window", DEFAULT_MOMENTUM_WINDOW)?,
        rebalance_every: get_usize(config, "strategy", "rebalance_every", DEFAULT_REBALANCE_EVERY)?,
        rebalance_threshold: get_f64(
            config,
            "strategy",
            "rebalance_threshold",
            DEFAULT_REBALANCE_THRESHOLD,
        )?,
        baseline_cash_reserve: get_f64(
            config,
            "strategy",
            "baseline_cash_reserve",
            DEFAULT_CASH_RESERVE,
        )?,
    })
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), RotatraderError> {
    if config.start_date >= config.end_date {
        return Err(RotatraderError::invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    if !(config.initial_capital.is_finite() && config.initial_capital > 0.0) {
        return Err(RotatraderError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    if !(config.commission_rate.is_finite() && (0.0..1.0).contains(&config.commission_rate)) {
        return Err(RotatraderError::invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be in [0, 1)",
        ));
    }
    if !(config.risk_free_rate.is_finite() && (0.0..1.0).contains(&config.risk_free_rate)) {
        return Err(RotatraderError::invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be in [0, 1)",
        ));
    }
    if config.momentum_window < 2 {
        return Err(RotatraderError::invalid(
            "strategy",
            "momentum_window",
            "momentum_window must be at least 2",
        ));
    }
    if config.rebalance_every < 1 {
        return Err(RotatraderError::invalid(
            "strategy",
            "rebalance_every",
            "rebalance_every must be at least 1",
        ));
    }
    if !(0.0..1.0).contains(&config.rebalance_threshold) {
        return Err(RotatraderError::invalid(
            "strategy",
            "rebalance_threshold",
            "rebalance_threshold must be in [0, 1)",
        ));
    }
    if !(0.0..1.0).contains(&config.baseline_cash_reserve) {
        return Err(RotatraderError::invalid(
            "strategy",
            "baseline_cash_reserve",
            "baseline_cash_reserve must be in [0, 1)",
        ));
    }
    Ok(())
}

/// Assets in configured order plus the benchmark. Overridden codes drop
/// the INI names, which would no longer line up. Without an explicit
/// benchmark the first asset is used.
pub fn build_universe(
    config: &dyn ConfigPort,
    codes_override: Option<&str>,
) -> Result<(Vec<Asset>, Asset), RotatraderError> {
    let assets = match codes_override {
        Some(codes) => parse_assets(codes, None)?,
        None => {
            let codes = config
                .get_trimmed("universe", "codes")
                .ok_or_else(|| RotatraderError::missing("universe", "codes"))?;
            let names = config.get_trimmed("universe", "names");
            parse_assets(&codes, names.as_deref())?
        }
    };

    let benchmark = match config.get_trimmed("universe", "benchmark") {
        Some(raw) => {
            let code = parse_codes(&raw)?
                .into_iter()
                .next()
                .ok_or_else(|| RotatraderError::missing("universe", "benchmark"))?;
            assets
                .iter()
                .find(|a| a.code == code)
                .cloned()
                .ok_or_else(|| {
                    RotatraderError::invalid(
                        "universe",
                        "benchmark",
                        format!("benchmark {code} is not one of the configured codes"),
                    )
                })?
        }
        None => assets
            .first()
            .cloned()
            .ok_or_else(|| RotatraderError::missing("universe", "codes"))?,
    };

    Ok((assets, benchmark))
}
