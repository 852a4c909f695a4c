#![allow(dead_code)]

use chrono::NaiveDate;
use rotatrader::domain::backtest::BacktestConfig;
use rotatrader::domain::code_data::CodeData;
use rotatrader::domain::error::RotatraderError;
pub use rotatrader::domain::ohlcv::OhlcvBar;
use rotatrader::domain::universe::Asset;
use rotatrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, RotatraderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(RotatraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RotatraderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(RotatraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(code: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1000,
    }
}

/// Bars on consecutive calendar days following `closes`. Each bar opens
/// at the previous close (no overnight gaps).
pub fn bars_from_closes(code: &str, start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            code: code.to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: if i == 0 { close } else { closes[i - 1] },
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000,
        })
        .collect()
}

/// Geometric series: `start_price * (1 + daily_return)^i`.
pub fn generate_bars(
    code: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    daily_return: f64,
) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price * (1.0 + daily_return).powi(i as i32))
        .collect();
    bars_from_closes(code, start_date, &closes)
}

/// Deterministic zig-zag around a drift, so the window has non-zero
/// variance.
pub fn generate_noisy_bars(
    code: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    drift: f64,
    swing: f64,
) -> Vec<OhlcvBar> {
    let mut price = start_price;
    let mut closes = Vec::with_capacity(count);
    for i in 0..count {
        closes.push(price);
        let shock = if i % 2 == 0 { swing } else { -swing };
        price *= 1.0 + drift + shock;
    }
    bars_from_closes(code, start_date, &closes)
}

/// Seeded random walk with returns uniform in `drift ± spread`, from a
/// small linear congruential generator so runs are reproducible.
pub fn generate_random_walk(
    code: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    drift: f64,
    spread: f64,
    seed: u64,
) -> Vec<OhlcvBar> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut price = start_price;
    let mut closes = Vec::with_capacity(count);
    for _ in 0..count {
        closes.push(price);
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        price *= 1.0 + drift + spread * (2.0 * unit - 1.0);
    }
    bars_from_closes(code, start_date, &closes)
}

pub fn make_code_data(code: &str, bars: Vec<OhlcvBar>) -> CodeData {
    CodeData::new(Asset::new(code, code), bars)
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::new(date(2020, 1, 1), date(2024, 12, 31))
}
