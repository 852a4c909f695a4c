//! Return-series statistics.
//!
//! Every metric is computed from a completed daily return series with 252
//! trading days per year. Standard deviations use the sample divisor
//! `n - 1`. Any metric whose denominator is zero (or undefined) reports 0;
//! `total_days` on the report lets callers tell "no data" from "flat".

use super::ohlcv::ReturnPoint;
use super::portfolio::EquityPoint;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub label: String,
    pub total_days: usize,
    pub positive_days: usize,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub win_rate: f64,
}

impl PerformanceReport {
    pub fn evaluate(label: &str, returns: &[ReturnPoint], risk_free_rate: f64) -> Self {
        let values: Vec<f64> = returns.iter().map(|p| p.value).collect();
        Self::from_values(label, &values, risk_free_rate)
    }

    pub fn from_values(label: &str, returns: &[f64], risk_free_rate: f64) -> Self {
        let annualized_return = annualized_return(returns);
        let max_drawdown = max_drawdown(returns);
        let positive_days = returns.iter().filter(|&&r| r > 0.0).count();

        PerformanceReport {
            label: label.to_string(),
            total_days: returns.len(),
            positive_days,
            annualized_return,
            annualized_volatility: annualized_volatility(returns),
            sharpe_ratio: sharpe_ratio(returns, risk_free_rate),
            sortino_ratio: sortino_ratio(returns, risk_free_rate),
            max_drawdown,
            calmar_ratio: calmar_ratio(annualized_return, max_drawdown),
            win_rate: win_rate(returns),
        }
    }
}

/// Day-over-day change of an equity curve, stamped with the later date.
pub fn returns_from_equity(curve: &[EquityPoint]) -> Vec<ReturnPoint> {
    curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let value = if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            };
            ReturnPoint {
                date: w[1].date,
                value,
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 with fewer than two points or when every
/// point is the same value.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    // The mean of equal values can be off by an ulp, which would leave a
    // tiny non-zero residual.
    if values.iter().all(|&v| v == values[0]) {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n as f64 - 1.0)).sqrt()
}

pub fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(TRADING_DAYS_PER_YEAR / returns.len() as f64) - 1.0
}

pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

fn excess_returns(returns: &[f64], risk_free_rate: f64) -> Vec<f64> {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    returns.iter().map(|r| r - daily_rf).collect()
}

pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    let std = sample_std(&excess);
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    TRADING_DAYS_PER_YEAR.sqrt() * mean(&excess) / std
}

/// Downside deviation is the sample std of the negative excess returns
/// only.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = excess_returns(returns, risk_free_rate);
    let downside: Vec<f64> = excess.iter().copied().filter(|&e| e < 0.0).collect();
    let downside_std = sample_std(&downside);
    if downside_std == 0.0 || !downside_std.is_finite() {
        return 0.0;
    }
    TRADING_DAYS_PER_YEAR.sqrt() * mean(&excess) / downside_std
}

pub fn max_drawdown(returns: &[f64]) -> f64 {
    drawdowns(returns).fold(0.0, f64::min)
}

pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown == 0.0 {
        return 0.0;
    }
    annualized_return / max_drawdown.abs()
}

pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|&&r| r > 0.0).count() as f64 / returns.len() as f64
}

/// Lazy drawdown series, one value per input return.
///
/// Cloning yields an independent iterator from the same position, so the
/// series can be walked more than once without recomputing from scratch.
#[derive(Debug, Clone)]
pub struct Drawdowns<'a> {
    returns: std::slice::Iter<'a, f64>,
    cumulative: f64,
    running_max: f64,
}

pub fn drawdowns(returns: &[f64]) -> Drawdowns<'_> {
    Drawdowns {
        returns: returns.iter(),
        cumulative: 1.0,
        running_max: f64::NEG_INFINITY,
    }
}

impl Iterator for Drawdowns<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let r = self.returns.next()?;
        self.cumulative *= 1.0 + r;
        self.running_max = self.running_max.max(self.cumulative);
        if self.running_max <= 0.0 {
            return Some(0.0);
        }
        Some((self.cumulative - self.running_max) / self.running_max)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.returns.size_hint()
    }
}

impl ExactSizeIterator for Drawdowns<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn empty_series_is_all_zero() {
        let report = PerformanceReport::from_values("x", &[], 0.0);
        assert_eq!(report.total_days, 0);
        assert_eq!(report.annualized_return, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_eq!(report.sortino_ratio, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.calmar_ratio, 0.0);
        assert_eq!(report.win_rate, 0.0);
    }

    #[test]
    fn single_point_has_no_volatility() {
        let report = PerformanceReport::from_values("x", &[0.01], 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert_eq!(report.sharpe_ratio, 0.0);
        assert_relative_eq!(report.annualized_return, 1.01_f64.powf(252.0) - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn zero_variance_returns_have_zero_sharpe() {
        for len in [2, 10, 50, 100, 252, 1000] {
            for value in [0.01, 0.001, 0.0005, -0.003, 1e-7, 0.0] {
                let returns = vec![value; len];
                assert_eq!(sample_std(&returns), 0.0, "std of {len} x {value}");
                assert_eq!(sharpe_ratio(&returns, 0.0), 0.0, "sharpe of {len} x {value}");
                assert_eq!(sharpe_ratio(&returns, 0.03), 0.0, "sharpe of {len} x {value}");
                assert_eq!(annualized_volatility(&returns), 0.0);
            }
        }
    }

    #[test]
    fn equal_downside_returns_have_zero_sortino() {
        for value in [-0.001, -0.0005, -0.003, -0.01] {
            let mut returns = vec![value; 37];
            returns.extend([0.02, 0.01]);
            assert_eq!(sortino_ratio(&returns, 0.0), 0.0, "downside {value}");
        }
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        assert_relative_eq!(sample_std(&[1.0, 2.0, 3.0, 4.0]), (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(sample_std(&[3.0]), 0.0);
    }

    #[test]
    fn annualized_return_compounds() {
        let returns = vec![0.001; 252];
        assert_relative_eq!(annualized_return(&returns), 1.001_f64.powi(252) - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn sharpe_matches_formula() {
        let returns = [0.01, -0.005, 0.02, 0.0, 0.004];
        let expected = 252.0_f64.sqrt() * mean(&returns) / sample_std(&returns);
        assert_relative_eq!(sharpe_ratio(&returns, 0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_subtracts_daily_risk_free() {
        let returns = [0.01, -0.005, 0.02, 0.0, 0.004];
        let rf = 0.0252;
        let shifted: Vec<f64> = returns.iter().map(|r| r - 0.0001).collect();
        let expected = 252.0_f64.sqrt() * mean(&shifted) / sample_std(&shifted);
        assert_relative_eq!(sharpe_ratio(&returns, rf), expected, epsilon = 1e-12);
    }

    #[test]
    fn sortino_uses_only_downside_points() {
        let returns = [0.02, -0.01, 0.03, -0.03, 0.01];
        let downside = [-0.01, -0.03];
        let expected = 252.0_f64.sqrt() * mean(&returns) / sample_std(&downside);
        assert_relative_eq!(sortino_ratio(&returns, 0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn sortino_without_downside_is_zero() {
        assert_eq!(sortino_ratio(&[0.01, 0.02, 0.03], 0.0), 0.0);
        // one downside point has no sample deviation
        assert_eq!(sortino_ratio(&[0.01, -0.02, 0.03], 0.0), 0.0);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        // cumulative: 1.1, 0.99, 1.089, 1.21
        let returns = [0.1, -0.1, 0.1, 1.21 / 1.089 - 1.0];
        let series: Vec<f64> = drawdowns(&returns).collect();
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], 0.0);
        assert_relative_eq!(series[1], -0.1, epsilon = 1e-12);
        assert_relative_eq!(series[2], 1.089 / 1.1 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(series[3], 0.0, epsilon = 1e-12);
        assert_relative_eq!(max_drawdown(&returns), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_iterator_restarts_from_clone() {
        let returns = [0.05, -0.02, -0.03, 0.04];
        let it = drawdowns(&returns);
        let first: Vec<f64> = it.clone().collect();
        let second: Vec<f64> = it.collect();
        assert_eq!(first, second);
        assert_eq!(drawdowns(&returns).len(), 4);
    }

    #[test]
    fn calmar_guards_zero_drawdown() {
        assert_eq!(calmar_ratio(0.2, 0.0), 0.0);
        assert_relative_eq!(calmar_ratio(0.2, -0.1), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn win_rate_counts_strictly_positive() {
        assert_relative_eq!(win_rate(&[0.01, 0.0, -0.01, 0.02]), 0.5, epsilon = 1e-12);
        let report = PerformanceReport::from_values("x", &[0.01, 0.0, -0.01, 0.02], 0.0);
        assert_eq!(report.positive_days, 2);
        assert_eq!(report.total_days, 4);
    }

    #[test]
    fn strictly_rising_curve_never_draws_down() {
        let returns: Vec<f64> = (0..260).map(|i| 0.001 + (i % 7) as f64 * 1e-4).collect();
        assert!(drawdowns(&returns).all(|dd| dd == 0.0));
        let report = PerformanceReport::from_values("up", &returns, 0.0);
        assert!(report.annualized_return > 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.calmar_ratio, 0.0);
    }

    #[test]
    fn returns_from_equity_drops_first_date() {
        let curve = vec![
            EquityPoint { date: d(1), equity: 100.0 },
            EquityPoint { date: d(2), equity: 110.0 },
            EquityPoint { date: d(3), equity: 99.0 },
        ];
        let returns = returns_from_equity(&curve);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].date, d(2));
        assert_relative_eq!(returns[0].value, 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1].value, -0.1, epsilon = 1e-12);
        assert!(returns_from_equity(&curve[..1]).is_empty());
    }

    #[test]
    fn evaluate_reads_return_points() {
        let points = vec![
            ReturnPoint { date: d(2), value: 0.01 },
            ReturnPoint { date: d(3), value: -0.02 },
        ];
        let report = PerformanceReport::evaluate("Momentum", &points, 0.0);
        assert_eq!(report.label, "Momentum");
        assert_eq!(report.total_days, 2);
        assert_relative_eq!(report.win_rate, 0.5, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn drawdown_is_never_positive(returns in prop::collection::vec(-0.5f64..0.5, 0..200)) {
            let series: Vec<f64> = drawdowns(&returns).collect();
            prop_assert_eq!(series.len(), returns.len());
            let mut cumulative = 1.0;
            let mut peak = f64::NEG_INFINITY;
            for (r, dd) in returns.iter().zip(&series) {
                prop_assert!(*dd <= 0.0);
                cumulative *= 1.0 + r;
                if cumulative >= peak {
                    peak = cumulative;
                    prop_assert!(dd.abs() < 1e-12);
                }
            }
        }

        #[test]
        fn win_rate_is_a_fraction(returns in prop::collection::vec(-0.1f64..0.1, 1..100)) {
            let w = win_rate(&returns);
            prop_assert!((0.0..=1.0).contains(&w));
        }
    }
}
