//! Threshold-gated order sizing.
//!
//! For each asset, in configured order:
//! 1. target_value = total_value * weight
//! 2. diff = target_value - current_value
//! 3. skip when |diff| <= total_value * threshold
//! 4. shares = trunc(diff / price), emitted when non-zero
//!
//! The output order is the order the execution side sees intents in, which
//! decides which buys get rejected when cash runs short.

use std::fmt;

use super::allocation::TargetWeights;

pub const DEFAULT_REBALANCE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A signed share delta for one asset: positive buys, negative sells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub code: String,
    pub shares: i64,
}

impl OrderIntent {
    pub fn side(&self) -> Side {
        if self.shares >= 0 { Side::Buy } else { Side::Sell }
    }

    pub fn quantity(&self) -> i64 {
        self.shares.abs()
    }
}

/// Current holding of one asset as seen by the rebalancer.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetState {
    pub code: String,
    pub current_value: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceEngine {
    threshold: f64,
}

impl Default for RebalanceEngine {
    fn default() -> Self {
        RebalanceEngine::new(DEFAULT_REBALANCE_THRESHOLD)
    }
}

impl RebalanceEngine {
    /// `threshold` is a fraction of total portfolio value.
    pub fn new(threshold: f64) -> Self {
        RebalanceEngine { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn rebalance(
        &self,
        targets: &TargetWeights,
        total_value: f64,
        assets: &[AssetState],
    ) -> Vec<OrderIntent> {
        let band = total_value * self.threshold;

        assets
            .iter()
            .filter_map(|asset| {
                if !(asset.price.is_finite() && asset.price > 0.0) {
                    return None;
                }
                let target_value = total_value * targets.get(&asset.code);
                let diff = target_value - asset.current_value;
                if diff.abs() <= band {
                    return None;
                }
                let shares = (diff / asset.price).trunc() as i64;
                if shares == 0 {
                    return None;
                }
                Some(OrderIntent {
                    code: asset.code.clone(),
                    shares,
                })
            })
            .collect()
    }
}
