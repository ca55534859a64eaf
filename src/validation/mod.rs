//! Walk-forward validation and backend comparison.

use crate::core::SalesSeries;
use crate::error::{DemandError, Result};
use crate::metrics::calculate_metrics;
use crate::models::{Backend, Forecaster};
use crate::utils::stats::{mean, std_dev};
use chrono::NaiveDate;

/// Walk-forward configuration: an expanding training window that starts at
/// `initial_window` observations and advances by `step` days per fold.
#[derive(Debug, Clone)]
pub struct WalkForwardConfig {
    pub initial_window: usize,
    pub horizon: usize,
    pub step: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            initial_window: 28,
            horizon: 7,
            step: 7,
        }
    }
}

impl WalkForwardConfig {
    pub fn new(initial_window: usize, horizon: usize) -> Self {
        Self {
            initial_window,
            horizon,
            step: 1,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }
}

/// Out-of-sample accuracy for a single fold.
#[derive(Debug, Clone)]
pub struct FoldRecord {
    /// Last date included in the fold's training window.
    pub train_end: NaiveDate,
    pub mae: f64,
    pub rmse: f64,
}

/// Aggregate walk-forward results for one backend.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub backend: Backend,
    pub folds: Vec<FoldRecord>,
    pub mean_mae: f64,
    pub mean_rmse: f64,
    pub mae_std: f64,
}

impl ValidationReport {
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }
}

/// Walk the fold grid with any model factory.
///
/// Each fold trains on observations `[0, origin)` and scores the next
/// `horizon` days, with `origin` advancing from the initial window in steps
/// of `step` while a full test window still fits strictly inside the series.
/// Series too short for even one fold produce an empty fold list rather than
/// an error.
pub fn walk_forward_folds<F, Factory>(
    config: &WalkForwardConfig,
    series: &SalesSeries,
    model_factory: Factory,
) -> Result<Vec<FoldRecord>>
where
    F: Forecaster,
    Factory: Fn() -> F,
{
    if config.step == 0 {
        return Err(DemandError::InvalidParameter(
            "walk-forward step must be positive".into(),
        ));
    }
    if config.horizon == 0 {
        return Err(DemandError::InvalidParameter(
            "walk-forward horizon must be positive".into(),
        ));
    }

    let n = series.len();
    let values = series.values();
    let mut folds = Vec::new();

    let mut origin = config.initial_window;
    while origin + config.horizon < n {
        let train = series.slice(0, origin)?;

        let mut model = model_factory();
        model.fit(&train)?;
        let forecast = model.predict(config.horizon)?;

        let actual = &values[origin..origin + config.horizon];
        let metrics = calculate_metrics(actual, forecast.point())?;

        folds.push(FoldRecord {
            train_end: series.date_at(origin - 1),
            mae: metrics.mae,
            rmse: metrics.rmse,
        });

        origin += config.step;
    }

    Ok(folds)
}

/// Run walk-forward validation of one backend over a sales series.
pub fn walk_forward(
    config: &WalkForwardConfig,
    series: &SalesSeries,
    backend: Backend,
) -> Result<ValidationReport> {
    let folds = walk_forward_folds(config, series, || backend.create())?;

    let mae_values: Vec<f64> = folds.iter().map(|f| f.mae).collect();
    let rmse_values: Vec<f64> = folds.iter().map(|f| f.rmse).collect();
    let (mean_mae, mean_rmse, mae_std) = if folds.is_empty() {
        (f64::NAN, f64::NAN, f64::NAN)
    } else {
        (mean(&mae_values), mean(&rmse_values), std_dev(&mae_values))
    };

    Ok(ValidationReport {
        backend,
        folds,
        mean_mae,
        mean_rmse,
        mae_std,
    })
}

/// Walk-forward score for one backend in a comparison run.
#[derive(Debug, Clone)]
pub struct BackendScore {
    pub backend: Backend,
    pub mean_mae: f64,
    pub mean_rmse: f64,
    pub n_folds: usize,
}

/// Validate every backend on the same folds and rank by mean MAE.
///
/// Backends that cannot fit the training windows (typically from too little
/// history) are silently left out of the ranking.
pub fn compare_backends(
    config: &WalkForwardConfig,
    series: &SalesSeries,
) -> Result<Vec<BackendScore>> {
    let mut scores = Vec::new();
    for backend in Backend::ALL {
        match walk_forward(config, series, backend) {
            Ok(report) if report.n_folds() > 0 => scores.push(BackendScore {
                backend,
                mean_mae: report.mean_mae,
                mean_rmse: report.mean_rmse,
                n_folds: report.n_folds(),
            }),
            Ok(_) => {}
            Err(DemandError::InsufficientData { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    scores.sort_by(|a, b| {
        a.mean_mae
            .partial_cmp(&b.mean_mae)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly_series(n: usize) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let values: Vec<f64> = (0..n)
            .map(|i| 100.0 + 0.4 * i as f64 + 15.0 * ((i % 7) as f64 - 3.0))
            .collect();
        SalesSeries::new(start, values).unwrap()
    }

    #[test]
    fn fold_count_matches_window_arithmetic() {
        // n=50, window=28, horizon=7, step=7: origins 28, 35 (42+7 = 49 < 50
        // holds, 42 qualifies too).
        let series = weekly_series(50);
        let config = WalkForwardConfig::default();
        let report = walk_forward(&config, &series, Backend::Naive).unwrap();
        assert_eq!(report.n_folds(), 3);

        // First fold trains on the first 28 days.
        assert_eq!(report.folds[0].train_end, series.date_at(27));
    }

    #[test]
    fn folds_accept_any_model_factory() {
        let series = weekly_series(50);
        let config = WalkForwardConfig::default();
        let folds = walk_forward_folds(&config, &series, crate::models::Naive::new).unwrap();
        assert_eq!(folds.len(), 3);
    }

    #[test]
    fn short_series_yields_zero_folds() {
        let series = weekly_series(30);
        let config = WalkForwardConfig {
            initial_window: 28,
            horizon: 7,
            step: 7,
        };
        let report = walk_forward(&config, &series, Backend::Naive).unwrap();
        assert_eq!(report.n_folds(), 0);
        assert!(report.mean_mae.is_nan());
    }

    #[test]
    fn metrics_are_exact_for_a_constant_series() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = SalesSeries::new(start, vec![50.0; 40]).unwrap();
        let config = WalkForwardConfig::new(20, 5).with_step(5);

        let report = walk_forward(&config, &series, Backend::Naive).unwrap();
        assert!(report.n_folds() > 0);
        assert!(report.mean_mae.abs() < 1e-10);
        assert!(report.mean_rmse.abs() < 1e-10);
    }

    #[test]
    fn zero_step_is_rejected() {
        let series = weekly_series(50);
        let config = WalkForwardConfig {
            initial_window: 28,
            horizon: 7,
            step: 0,
        };
        assert!(matches!(
            walk_forward(&config, &series, Backend::Naive),
            Err(DemandError::InvalidParameter(_))
        ));
    }

    #[test]
    fn comparison_ranks_by_mae() {
        let series = weekly_series(90);
        let config = WalkForwardConfig::default();
        let scores = compare_backends(&config, &series).unwrap();

        assert!(!scores.is_empty());
        for pair in scores.windows(2) {
            assert!(pair[0].mean_mae <= pair[1].mean_mae);
        }
    }

    #[test]
    fn seasonal_backend_beats_naive_on_strong_weekly_pattern() {
        let series = weekly_series(120);
        let config = WalkForwardConfig::default();
        let scores = compare_backends(&config, &series).unwrap();

        let rank = |b: Backend| scores.iter().position(|s| s.backend == b);
        let additive = rank(Backend::AdditiveSeasonal);
        let naive = rank(Backend::Naive);
        if let (Some(a), Some(n)) = (additive, naive) {
            assert!(a < n, "seasonal model should outrank naive");
        }
    }
}
