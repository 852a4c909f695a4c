//! Core domain types and logic.

pub mod ohlcv;
pub mod universe;
pub mod code_data;
pub mod rolling;
pub mod signal;
pub mod allocation;
pub mod rebalance;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
