//! Configuration access port.
//!
//! Implementors supply raw string lookup; typed getters are provided on top
//! so that a present-but-malformed value is reported instead of silently
//! replaced by a default.

use crate::domain::error::RotatraderError;
use chrono::NaiveDate;
use std::str::FromStr;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Trimmed value, with blank treated as absent.
    fn get_trimmed(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Parse `[section] key` as `T`; `Ok(None)` when absent.
pub fn get_parsed<T: FromStr>(
    config: &(impl ConfigPort + ?Sized),
    section: &str,
    key: &str,
) -> Result<Option<T>, RotatraderError> {
    match config.get_trimmed(section, key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            RotatraderError::invalid(section, key, format!("cannot parse '{raw}'"))
        }),
    }
}

pub fn get_f64(
    config: &(impl ConfigPort + ?Sized),
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, RotatraderError> {
    Ok(get_parsed::<f64>(config, section, key)?.unwrap_or(default))
}

pub fn get_usize(
    config: &(impl ConfigPort + ?Sized),
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, RotatraderError> {
    Ok(get_parsed::<usize>(config, section, key)?.unwrap_or(default))
}

/// Required `YYYY-MM-DD` date.
pub fn get_date(
    config: &(impl ConfigPort + ?Sized),
    section: &str,
    key: &str,
) -> Result<NaiveDate, RotatraderError> {
    let raw = config
        .get_trimmed(section, key)
        .ok_or_else(|| RotatraderError::missing(section, key))?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        RotatraderError::invalid(section, key, "invalid date format (expected YYYY-MM-DD)")
    })
}
