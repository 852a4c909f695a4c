//! Asset universe: parsing the configured asset list and loading price
//! history for it.
//!
//! Assets the data source cannot serve are dropped with a warning; the run
//! continues with whatever is left. Only an entirely empty universe is an
//! error.

use crate::domain::code_data::CodeData;
use crate::domain::error::RotatraderError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

/// Two bars are needed for a single return.
pub const MIN_OHLCV_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub code: String,
    pub name: String,
}

impl Asset {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Asset {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("{names} names given for {codes} codes")]
    NameCountMismatch { codes: usize, names: usize },
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Pair codes with display names. Without names each asset is named by
/// its code.
pub fn parse_assets(codes: &str, names: Option<&str>) -> Result<Vec<Asset>, UniverseError> {
    let codes = parse_codes(codes)?;
    let names: Vec<String> = match names.filter(|n| !n.trim().is_empty()) {
        Some(n) => n.split(',').map(|s| s.trim().to_string()).collect(),
        None => codes.clone(),
    };

    if names.len() != codes.len() {
        return Err(UniverseError::NameCountMismatch {
            codes: codes.len(),
            names: names.len(),
        });
    }
    if names.iter().any(|n| n.is_empty()) {
        return Err(UniverseError::EmptyToken);
    }

    Ok(codes
        .into_iter()
        .zip(names)
        .map(|(code, name)| Asset { code, name })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    FetchFailed(String),
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAsset {
    pub asset: Asset,
    pub reason: SkipReason,
}

pub struct LoadedUniverse {
    pub data: Vec<CodeData>,
    pub skipped: Vec<SkippedAsset>,
}

impl LoadedUniverse {
    pub fn assets(&self) -> Vec<Asset> {
        self.data.iter().map(|d| d.asset.clone()).collect()
    }
}

/// Fetch every asset once, keeping configured order and dropping those
/// without enough bars.
pub fn load_universe(
    data_port: &dyn DataPort,
    assets: &[Asset],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<LoadedUniverse, RotatraderError> {
    let mut data = Vec::with_capacity(assets.len());
    let mut skipped = Vec::new();

    for asset in assets {
        let bars = match data_port.fetch_ohlcv(&asset.code, start_date, end_date) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(code = %asset.code, error = %e, "skipping asset: fetch failed");
                skipped.push(SkippedAsset {
                    asset: asset.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        if bars.is_empty() {
            warn!(code = %asset.code, "skipping asset: no data in range");
            skipped.push(SkippedAsset {
                asset: asset.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars.len() < MIN_OHLCV_BARS {
            warn!(
                code = %asset.code,
                bars = bars.len(),
                minimum = MIN_OHLCV_BARS,
                "skipping asset: insufficient bars"
            );
            skipped.push(SkippedAsset {
                asset: asset.clone(),
                reason: SkipReason::InsufficientBars { bars: bars.len() },
            });
            continue;
        }

        info!(code = %asset.code, bars = bars.len(), "loaded price history");
        data.push(CodeData::new(asset.clone(), bars));
    }

    if data.is_empty() {
        return Err(RotatraderError::NoData {
            requested: assets.len(),
        });
    }

    if !skipped.is_empty() {
        warn!(
            active = data.len(),
            requested = assets.len(),
            "running with a partial universe"
        );
    }

    Ok(LoadedUniverse { data, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_basic() {
        let result = parse_codes("513100.SS,510300.SS,518880.SS").unwrap();
        assert_eq!(result, vec!["513100.SS", "510300.SS", "518880.SS"]);
    }

    #[test]
    fn parse_codes_trims_and_uppercases() {
        let result = parse_codes("  spy , qqq ,gld").unwrap();
        assert_eq!(result, vec!["SPY", "QQQ", "GLD"]);
    }

    #[test]
    fn parse_codes_empty_token() {
        assert!(matches!(
            parse_codes("SPY,,QQQ"),
            Err(UniverseError::EmptyToken)
        ));
    }

    #[test]
    fn parse_codes_duplicate() {
        let result = parse_codes("SPY,QQQ,spy");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "SPY"));
    }

    #[test]
    fn parse_assets_with_names() {
        let assets = parse_assets("SPY,GLD", Some("S&P 500, Gold")).unwrap();
        assert_eq!(
            assets,
            vec![Asset::new("SPY", "S&P 500"), Asset::new("GLD", "Gold")]
        );
    }

    #[test]
    fn parse_assets_defaults_names_to_codes() {
        let assets = parse_assets("SPY,GLD", None).unwrap();
        assert_eq!(assets[1].name, "GLD");
    }

    #[test]
    fn parse_assets_name_count_mismatch() {
        let result = parse_assets("SPY,GLD", Some("S&P 500"));
        assert!(matches!(
            result,
            Err(UniverseError::NameCountMismatch { codes: 2, names: 1 })
        ));
    }
}
