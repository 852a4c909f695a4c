//! Per-asset price history and the unified timeline.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::universe::Asset;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct CodeData {
    pub asset: Asset,
    pub ohlcv: Vec<OhlcvBar>,
    pub date_index: HashMap<NaiveDate, usize>,
}

impl CodeData {
    pub fn new(asset: Asset, ohlcv: Vec<OhlcvBar>) -> Self {
        let date_index = ohlcv
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            asset,
            ohlcv,
            date_index,
        }
    }

    pub fn code(&self) -> &str {
        &self.asset.code
    }

    pub fn bar_count(&self) -> usize {
        self.ohlcv.len()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&OhlcvBar> {
        self.date_index.get(&date).map(|&i| &self.ohlcv[i])
    }

    pub fn get_bar_index(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    /// Simple return realised on `date`, if the asset has a bar there and
    /// a bar before it.
    pub fn return_on(&self, date: NaiveDate) -> Option<f64> {
        let i = self.get_bar_index(date)?;
        if i == 0 {
            return None;
        }
        Some(self.ohlcv[i].simple_return(self.ohlcv[i - 1].close))
    }
}

/// Sorted union of every bar date across the universe.
pub fn build_unified_timeline(codes: &[CodeData]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = codes
        .iter()
        .flat_map(|cd| cd.ohlcv.iter().map(|bar| bar.date))
        .collect();
    unique_dates.into_iter().collect()
}

/// Read-only price history shared by every strategy run.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub data: Vec<CodeData>,
    pub timeline: Vec<NaiveDate>,
}

impl MarketData {
    pub fn new(data: Vec<CodeData>) -> Self {
        let timeline = build_unified_timeline(&data);
        MarketData { data, timeline }
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.data.iter().map(|d| d.asset.clone()).collect()
    }

    pub fn codes(&self) -> Vec<String> {
        self.data.iter().map(|d| d.asset.code.clone()).collect()
    }

    pub fn get(&self, code: &str) -> Option<&CodeData> {
        self.data.iter().find(|d| d.asset.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(code: &str, date: NaiveDate, close: f64) -> OhlcvBar {
        OhlcvBar {
            code: code.into(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn code_data(code: &str, bars: Vec<OhlcvBar>) -> CodeData {
        CodeData::new(Asset::new(code, code), bars)
    }

    #[test]
    fn get_bar_by_date() {
        let cd = code_data("A", vec![bar("A", d(1), 10.0), bar("A", d(3), 11.0)]);
        assert_eq!(cd.bar_count(), 2);
        assert_eq!(cd.get_bar(d(3)).unwrap().close, 11.0);
        assert!(cd.get_bar(d(2)).is_none());
    }

    #[test]
    fn return_on_uses_previous_available_bar() {
        let cd = code_data("A", vec![bar("A", d(1), 10.0), bar("A", d(3), 11.0)]);
        assert!(cd.return_on(d(1)).is_none());
        assert!(cd.return_on(d(2)).is_none());
        assert!((cd.return_on(d(3)).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn timeline_is_sorted_union() {
        let a = code_data("A", vec![bar("A", d(1), 1.0), bar("A", d(3), 1.0)]);
        let b = code_data("B", vec![bar("B", d(2), 1.0), bar("B", d(3), 1.0)]);
        assert_eq!(build_unified_timeline(&[a, b]), vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn market_data_keeps_configured_order() {
        let market = MarketData::new(vec![
            code_data("Z", vec![bar("Z", d(1), 1.0)]),
            code_data("A", vec![bar("A", d(1), 1.0)]),
        ]);
        assert_eq!(market.codes(), vec!["Z", "A"]);
        assert!(market.get("A").is_some());
        assert!(market.get("Q").is_none());
    }
}
