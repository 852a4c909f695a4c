//! CSV report writer.
//!
//! Produces three files in the output directory:
//! `performance_metrics.csv` (one row per strategy), `daily_weights.csv`
//! (the momentum run's target weights at each rebalance) and
//! `daily_returns.csv` (every strategy's daily return, aligned on the
//! momentum run's dates).

use std::fs;
use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::domain::backtest::ComparisonResult;
use crate::domain::error::RotatraderError;
use crate::domain::metrics::PerformanceReport;
use crate::ports::report_port::ReportPort;

pub const METRICS_FILE: &str = "performance_metrics.csv";
pub const WEIGHTS_FILE: &str = "daily_weights.csv";
pub const RETURNS_FILE: &str = "daily_returns.csv";

pub struct CsvReportAdapter;

fn report_error(path: &Path, e: impl std::fmt::Display) -> RotatraderError {
    RotatraderError::Report {
        reason: format!("{}: {}", path.display(), e),
    }
}

fn pct(value: f64) -> String {
    format!("{:.2}", value * 100.0)
}

fn ratio(value: f64) -> String {
    format!("{:.3}", value)
}

fn metrics_row(report: &PerformanceReport) -> Vec<String> {
    vec![
        report.label.clone(),
        pct(report.annualized_return),
        pct(report.annualized_volatility),
        ratio(report.sharpe_ratio),
        pct(report.max_drawdown),
        ratio(report.calmar_ratio),
        ratio(report.sortino_ratio),
        pct(report.win_rate),
        report.positive_days.to_string(),
        report.total_days.to_string(),
    ]
}

impl CsvReportAdapter {
    fn write_metrics(result: &ComparisonResult, path: &Path) -> Result<(), RotatraderError> {
        let mut wtr = Writer::from_path(path).map_err(|e| report_error(path, e))?;
        wtr.write_record([
            "strategy",
            "annualized_return_pct",
            "annualized_volatility_pct",
            "sharpe",
            "max_drawdown_pct",
            "calmar",
            "sortino",
            "win_rate_pct",
            "positive_days",
            "total_days",
        ])
        .map_err(|e| report_error(path, e))?;
        for report in result.reports() {
            wtr.write_record(metrics_row(report))
                .map_err(|e| report_error(path, e))?;
        }
        wtr.flush().map_err(|e| report_error(path, e))
    }

    fn write_weights(result: &ComparisonResult, path: &Path) -> Result<(), RotatraderError> {
        let mut wtr = Writer::from_path(path).map_err(|e| report_error(path, e))?;

        let mut header = vec!["date".to_string()];
        header.extend(result.assets.iter().map(|a| a.name.clone()));
        header.push("weight_sum".to_string());
        wtr.write_record(&header).map_err(|e| report_error(path, e))?;

        if let Some(primary) = result.primary() {
            for record in &primary.run.weights {
                let mut row = vec![record.date.format("%Y-%m-%d").to_string()];
                row.extend(
                    result
                        .assets
                        .iter()
                        .map(|a| format!("{:.6}", record.weights.get(&a.code))),
                );
                row.push(format!("{:.6}", record.weights.sum()));
                wtr.write_record(&row).map_err(|e| report_error(path, e))?;
            }
        }
        wtr.flush().map_err(|e| report_error(path, e))
    }

    fn write_returns(result: &ComparisonResult, path: &Path) -> Result<(), RotatraderError> {
        let mut wtr = Writer::from_path(path).map_err(|e| report_error(path, e))?;

        let mut header = vec!["date".to_string()];
        header.extend(result.outcomes.iter().map(|o| o.run.label.clone()));
        wtr.write_record(&header).map_err(|e| report_error(path, e))?;

        if let Some(primary) = result.primary() {
            for point in &primary.run.returns {
                let mut row = vec![point.date.format("%Y-%m-%d").to_string()];
                row.extend(result.outcomes.iter().map(|o| {
                    o.run
                        .return_on(point.date)
                        .map(|r| format!("{:.6}", r))
                        .unwrap_or_default()
                }));
                wtr.write_record(&row).map_err(|e| report_error(path, e))?;
            }
        }
        wtr.flush().map_err(|e| report_error(path, e))
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &ComparisonResult, output_dir: &Path) -> Result<(), RotatraderError> {
        fs::create_dir_all(output_dir).map_err(|e| report_error(output_dir, e))?;

        Self::write_metrics(result, &output_dir.join(METRICS_FILE))?;
        Self::write_weights(result, &output_dir.join(WEIGHTS_FILE))?;
        Self::write_returns(result, &output_dir.join(RETURNS_FILE))?;

        info!(dir = %output_dir.display(), "reports written");
        Ok(())
    }
}
