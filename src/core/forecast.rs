//! Forecast result structure.

use crate::error::{DemandError, Result};
use crate::utils::stats;
use chrono::NaiveDate;

/// A forecast over future dates: point estimates plus optional interval bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    dates: Vec<NaiveDate>,
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create a point forecast.
    pub fn from_points(dates: Vec<NaiveDate>, point: Vec<f64>) -> Result<Self> {
        if dates.len() != point.len() {
            return Err(DemandError::DimensionMismatch {
                expected: dates.len(),
                got: point.len(),
            });
        }
        Ok(Self {
            dates,
            point,
            lower: None,
            upper: None,
        })
    }

    /// Create a forecast with prediction-interval bounds.
    pub fn with_intervals(
        dates: Vec<NaiveDate>,
        point: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        let n = dates.len();
        for len in [point.len(), lower.len(), upper.len()] {
            if len != n {
                return Err(DemandError::DimensionMismatch {
                    expected: n,
                    got: len,
                });
            }
        }
        Ok(Self {
            dates,
            point,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// An empty forecast (horizon zero).
    pub fn empty() -> Self {
        Self {
            dates: vec![],
            point: vec![],
            lower: None,
            upper: None,
        }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Forecast dates, aligned with the point estimates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Point estimates.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Lower interval bounds, when the backend produced them.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Upper interval bounds, when the backend produced them.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Mean of the point estimates.
    pub fn mean(&self) -> f64 {
        stats::mean(&self.point)
    }

    /// Sample standard deviation of the point estimates; 0 for a horizon of 1.
    pub fn std_dev(&self) -> f64 {
        if self.point.len() < 2 {
            return 0.0;
        }
        stats::std_dev(&self.point)
    }
}
