//! Risk-adjusted momentum score.

use chrono::NaiveDate;

use super::rolling::RollingStats;

/// Volatility at or below this is treated as flat and scores 0.
pub const VOLATILITY_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub code: String,
    pub date: NaiveDate,
    pub momentum: f64,
    pub volatility: f64,
    pub score: f64,
}

/// momentum / volatility, or 0 when volatility is within epsilon of zero.
pub fn score(momentum: f64, volatility: f64) -> f64 {
    if volatility > VOLATILITY_EPSILON {
        momentum / volatility
    } else {
        0.0
    }
}

impl Signal {
    /// Build the signal for one asset; a cold window scores 0.
    pub fn from_stats(code: &str, date: NaiveDate, stats: RollingStats) -> Self {
        let score = if stats.is_warm {
            score(stats.momentum, stats.volatility)
        } else {
            0.0
        };
        Signal {
            code: code.to_string(),
            date,
            momentum: stats.momentum,
            volatility: stats.volatility,
            score,
        }
    }
}
