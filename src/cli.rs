//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::simulated_broker::SimulatedBroker;
use crate::domain::backtest::{ComparisonResult, default_strategies, run_comparison};
use crate::domain::code_data::MarketData;
use crate::domain::config_validation::{RunSettings, SettingsOverrides, load_run_settings};
use crate::domain::error::RotatraderError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::universe::load_universe;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "rotatrader",
    about = "Risk-adjusted momentum rotation backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run momentum rotation against buy-and-hold and equal-weight
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory for the CSV reports
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Momentum window in bars
        #[arg(long)]
        window: Option<usize>,
        /// Rebalance every N bars
        #[arg(long)]
        rebalance_every: Option<usize>,
        /// Comma-separated asset codes, replacing [universe] codes
        #[arg(long)]
        codes: Option<String>,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for each configured asset
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            window,
            rebalance_every,
            codes,
        } => {
            let overrides = SettingsOverrides {
                codes,
                momentum_window: window,
                rebalance_every,
                output_dir: output,
            };
            run_backtest(&config, &overrides)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

fn fail(err: RotatraderError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn run_backtest(config_path: &Path, overrides: &SettingsOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match load_run_settings(&adapter, overrides) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(&settings.data_dir);
    match run_backtest_pipeline(&data_port, &CsvReportAdapter, &settings) {
        Ok(result) => {
            print!("{}", format_metrics_table(&result));
            eprintln!("\nReports written to: {}", settings.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

/// Load the universe, run every strategy and persist the reports.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    settings: &RunSettings,
) -> Result<ComparisonResult, RotatraderError> {
    let bt = &settings.backtest;

    eprintln!(
        "Loading {} assets, {} to {}",
        settings.assets.len(),
        bt.start_date,
        bt.end_date
    );
    // Skipped assets are reported by `load_universe` through the log.
    let universe = load_universe(data_port, &settings.assets, bt.start_date, bt.end_date)?;

    let market = MarketData::new(universe.data);

    // A benchmark with no data leaves buy-and-hold in cash for the whole run.
    if market.get(&settings.benchmark.code).is_none() {
        eprintln!(
            "warning: benchmark {} has no data",
            settings.benchmark.code
        );
    }

    eprintln!(
        "Running backtest: {} assets, {} dates, window {}, rebalance every {}",
        market.data.len(),
        market.timeline.len(),
        bt.momentum_window,
        bt.rebalance_every
    );

    let strategies = default_strategies(settings.benchmark.clone());
    let execution = ExecutionConfig {
        commission_rate: bt.commission_rate,
    };
    let result = run_comparison(&market, bt, &strategies, || {
        SimulatedBroker::new(bt.initial_capital, execution)
    });

    report_port.write(&result, &settings.output_dir)?;
    Ok(result)
}

pub fn format_metrics_table(result: &ComparisonResult) -> String {
    let label_width = result
        .reports()
        .map(|r| r.label.len())
        .max()
        .unwrap_or(0)
        .max("Strategy".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<w$}  {:>10}  {:>10}  {:>7}  {:>9}  {:>7}  {:>7}  {:>8}\n",
        "Strategy",
        "Ann.Ret%",
        "Ann.Vol%",
        "Sharpe",
        "MaxDD%",
        "Calmar",
        "Sortino",
        "WinRate%",
        w = label_width
    ));
    for r in result.reports() {
        out.push_str(&format!(
            "{:<w$}  {:>10.2}  {:>10.2}  {:>7.3}  {:>9.2}  {:>7.3}  {:>7.3}  {:>8.2}\n",
            r.label,
            r.annualized_return * 100.0,
            r.annualized_volatility * 100.0,
            r.sharpe_ratio,
            r.max_drawdown * 100.0,
            r.calmar_ratio,
            r.sortino_ratio,
            r.win_rate * 100.0,
            w = label_width
        ));
    }
    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match load_run_settings(&adapter, &SettingsOverrides::default()) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    print!("{}", describe_settings(&settings));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

pub fn describe_settings(settings: &RunSettings) -> String {
    let bt = &settings.backtest;
    let mut out = String::new();
    out.push_str(&format!("Period:            {} to {}\n", bt.start_date, bt.end_date));
    out.push_str(&format!("Initial capital:   {:.2}\n", bt.initial_capital));
    out.push_str(&format!("Commission rate:   {}\n", bt.commission_rate));
    out.push_str(&format!("Risk-free rate:    {}\n", bt.risk_free_rate));
    out.push_str(&format!("Momentum window:   {}\n", bt.momentum_window));
    out.push_str(&format!("Rebalance every:   {}\n", bt.rebalance_every));
    out.push_str(&format!("Threshold:         {}\n", bt.rebalance_threshold));
    out.push_str(&format!("Baseline reserve:  {}\n", bt.baseline_cash_reserve));
    out.push_str(&format!("Data dir:          {}\n", settings.data_dir.display()));
    out.push_str(&format!("Output dir:        {}\n", settings.output_dir.display()));
    out.push_str(&format!(
        "Benchmark:         {} ({})\n",
        settings.benchmark.code, settings.benchmark.name
    ));
    out.push_str("Assets:\n");
    for asset in &settings.assets {
        out.push_str(&format!("  {}  {}\n", asset.code, asset.name));
    }
    out
}

fn run_info(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match load_run_settings(&adapter, &SettingsOverrides::default()) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(&settings.data_dir);
    for asset in &settings.assets {
        match data_port.get_data_range(&asset.code) {
            Ok(Some((first, last, count))) => {
                println!("{} ({}): {} bars, {} to {}", asset.code, asset.name, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", asset.code),
            Err(e) => eprintln!("error querying {}: {}", asset.code, e),
        }
    }
    ExitCode::SUCCESS
}
