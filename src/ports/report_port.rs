//! Report generation port.

use crate::domain::backtest::ComparisonResult;
use crate::domain::error::RotatraderError;
use std::path::Path;

/// Port for persisting the result of a strategy comparison.
pub trait ReportPort {
    fn write(&self, result: &ComparisonResult, output_dir: &Path) -> Result<(), RotatraderError>;
}
