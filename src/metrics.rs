//! Forecast accuracy metrics.

use crate::error::{DemandError, Result};

/// Accuracy metrics for one actual-vs-predicted comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
    /// Mean Absolute Error.
    pub mae: f64,
    /// Mean Squared Error.
    pub mse: f64,
    /// Root Mean Squared Error.
    pub rmse: f64,
}

/// Calculate MAE/MSE/RMSE between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<ErrorMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(DemandError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(DemandError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;

    let mae = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let mse = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;

    Ok(ErrorMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
    })
}

/// MAE between two slices; NaN on length mismatch or empty input.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    calculate_metrics(actual, predicted)
        .map(|m| m.mae)
        .unwrap_or(f64::NAN)
}

/// RMSE between two slices; NaN on length mismatch or empty input.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    calculate_metrics(actual, predicted)
        .map(|m| m.rmse)
        .unwrap_or(f64::NAN)
}
