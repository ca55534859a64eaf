//! Stock-level guidance derived from forecast statistics.

use crate::error::{DemandError, Result};

/// Tunable multipliers for inventory guidance.
#[derive(Debug, Clone)]
pub struct InventoryPolicy {
    /// Half-width of the expected daily demand range, in standard deviations.
    pub range_sigma: f64,
    /// Safety-stock allowance above mean demand, in standard deviations.
    pub safety_sigma: f64,
}

impl Default for InventoryPolicy {
    fn default() -> Self {
        Self {
            range_sigma: 1.5,
            safety_sigma: 1.2,
        }
    }
}

/// Expected low/high daily demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRange {
    pub low: f64,
    pub high: f64,
}

/// Recommended stock band over a restock horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockRecommendation {
    /// Stock to cover mean demand over the horizon.
    pub minimum: f64,
    /// Mean demand plus safety stock over the horizon.
    pub maximum: f64,
}

impl InventoryPolicy {
    /// Expected daily demand band around the mean. The band is reported as
    /// computed; a volatile low-volume series can produce a negative low end.
    pub fn expected_daily_range(&self, mean_daily: f64, std_daily: f64) -> DailyRange {
        DailyRange {
            low: mean_daily - self.range_sigma * std_daily,
            high: mean_daily + self.range_sigma * std_daily,
        }
    }

    /// Stock band for a restock horizon, scaled by the number of weeks the
    /// horizon covers.
    pub fn recommended_stock(
        &self,
        mean_daily: f64,
        std_daily: f64,
        horizon_days: usize,
    ) -> StockRecommendation {
        let weeks = horizon_days as f64 / 7.0;
        StockRecommendation {
            minimum: mean_daily * weeks,
            maximum: (mean_daily + self.safety_sigma * std_daily) * weeks,
        }
    }

    /// Mean daily demand under a what-if percentage shift.
    ///
    /// `pct` outside [-30, 30] is rejected; planning beyond that band is
    /// out of scope for a linear adjustment.
    pub fn scenario_demand(&self, mean_daily: f64, pct: f64) -> Result<f64> {
        if !(-30.0..=30.0).contains(&pct) {
            return Err(DemandError::InvalidParameter(format!(
                "scenario adjustment must be within [-30, 30] percent, got {pct}"
            )));
        }
        Ok(mean_daily * (1.0 + pct / 100.0))
    }
}
