//! CSV file price feed.
//!
//! One file per asset, `<base>/<CODE>.csv` with `.` in the code replaced
//! by `_` (so `510300.SS` reads `510300_SS.csv`). Columns are
//! `date,open,high,low,close,volume`.

use crate::domain::error::RotatraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code.replace('.', "_")))
    }

    /// Every usable bar in the file, sorted by date with one bar per date
    /// (the first row for a repeated date wins). A missing file is an empty
    /// history rather than an error.
    fn read_all(&self, code: &str) -> Result<Vec<OhlcvBar>, RotatraderError> {
        let path = self.csv_path(code);
        if !path.exists() {
            debug!(code, path = %path.display(), "no price file");
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| data_error(&path, e))?;

        let mut bars = Vec::new();
        let mut dropped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(&path, e))?;
            let bar = parse_record(code, &record).map_err(|reason| RotatraderError::Data {
                reason: format!("{}: {}", path.display(), reason),
            })?;
            if bar.close.is_finite() && bar.close > 0.0 {
                bars.push(bar);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(code, dropped, "dropped rows without a usable close");
        }

        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        if bars.len() < before {
            warn!(code, duplicates = before - bars.len(), "dropped repeated dates");
        }
        Ok(bars)
    }
}

fn data_error(path: &Path, e: csv::Error) -> RotatraderError {
    RotatraderError::Data {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing {name} column"))
}

fn price(record: &StringRecord, index: usize, name: &str) -> Result<f64, String> {
    let raw = field(record, index, name)?;
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse()
        .map_err(|e| format!("invalid {name} value '{raw}': {e}"))
}

fn parse_record(code: &str, record: &StringRecord) -> Result<OhlcvBar, String> {
    let raw_date = field(record, 0, "date")?;
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw_date}': {e}"))?;

    let raw_volume = field(record, 5, "volume")?;
    let volume = if raw_volume.is_empty() {
        0
    } else {
        raw_volume
            .parse::<f64>()
            .map_err(|e| format!("invalid volume value '{raw_volume}': {e}"))? as i64
    };

    Ok(OhlcvBar {
        code: code.to_string(),
        date,
        open: price(record, 1, "open")?,
        high: price(record, 2, "high")?,
        low: price(record, 3, "low")?,
        close: price(record, 4, "close")?,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, RotatraderError> {
        let mut bars = self.read_all(code)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, RotatraderError> {
        let bars = self.read_all(code)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
