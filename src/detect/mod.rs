//! Anomaly detection over residual series and raw sales values.

use crate::core::SalesSeries;
use crate::utils::stats::{mean, quantile, std_dev};
use chrono::NaiveDate;

/// A day whose residual deviates strongly from the fitted pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub date: NaiveDate,
    /// Observed sales on that day.
    pub actual: f64,
    /// Residual (observed minus explained).
    pub residual: f64,
    /// Standardized residual.
    pub z_score: f64,
}

/// Configuration for residual-based anomaly detection.
#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    /// Absolute z-score above which a day is flagged.
    pub z_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { z_threshold: 3.0 }
    }
}

impl AnomalyConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            z_threshold: threshold,
        }
    }
}

/// Flag days whose residual is an extreme standardized deviation.
///
/// Residuals shorter than the series (models with differencing or a warm-up
/// period) are aligned to the series end; leading NaN entries are skipped.
/// A zero-variance residual sequence yields no anomalies.
pub fn detect_anomalies(
    series: &SalesSeries,
    residuals: &[f64],
    config: &AnomalyConfig,
) -> Vec<Anomaly> {
    let valid: Vec<f64> = residuals.iter().copied().filter(|r| r.is_finite()).collect();
    if valid.len() < 2 {
        return Vec::new();
    }

    let mu = mean(&valid);
    let sigma = std_dev(&valid);
    if sigma < 1e-10 {
        return Vec::new();
    }

    let values = series.values();
    let offset = values.len().saturating_sub(residuals.len());
    residuals
        .iter()
        .enumerate()
        .filter(|(i, r)| r.is_finite() && i + offset < values.len())
        .filter_map(|(i, &r)| {
            let z = (r - mu) / sigma;
            if z.abs() > config.z_threshold {
                Some(Anomaly {
                    date: series.date_at(i + offset),
                    actual: values[i + offset],
                    residual: r,
                    z_score: z,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Count days outside the 1.5x-IQR fences, the data-quality outlier measure.
///
/// A degenerate distribution (zero IQR) reports no outliers.
pub fn iqr_outlier_count(values: &[f64]) -> usize {
    if values.len() < 4 {
        return 0;
    }

    let q1 = quantile(values, 0.25);
    let q3 = quantile(values, 0.75);
    let iqr = q3 - q1;
    if iqr < 1e-10 {
        return 0;
    }

    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;
    values.iter().filter(|&&v| v < lower || v > upper).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(values: Vec<f64>) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries::new(start, values).unwrap()
    }

    #[test]
    fn flags_a_large_residual_spike() {
        let mut residuals = vec![0.5, -0.3, 0.2, -0.4, 0.1, 0.3, -0.2, 0.4, -0.1, 0.2];
        residuals.push(50.0);
        residuals.extend([0.1, -0.3, 0.2]);
        let values = vec![100.0; residuals.len()];
        let series = make_series(values);

        let anomalies = detect_anomalies(&series, &residuals, &AnomalyConfig::default());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].date, series.date_at(10));
        assert!(anomalies[0].z_score > 3.0);
    }

    #[test]
    fn zero_variance_residuals_yield_nothing() {
        let residuals = vec![1.0; 20];
        let series = make_series(vec![100.0; 20]);
        let anomalies = detect_anomalies(&series, &residuals, &AnomalyConfig::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn warm_up_nans_are_skipped() {
        let mut residuals = vec![f64::NAN, f64::NAN];
        residuals.extend(vec![0.2, -0.1, 0.3, -0.2, 0.1, -0.3, 0.2, -0.1]);
        residuals.push(30.0);
        residuals.extend(vec![0.1, -0.2, 0.3, -0.1, 0.2]);
        let series = make_series(vec![100.0; residuals.len()]);

        let anomalies = detect_anomalies(&series, &residuals, &AnomalyConfig::default());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].date, series.date_at(10));
    }

    #[test]
    fn short_residuals_align_to_the_series_end() {
        // 14 residuals against a 17-day series: residual 0 maps to day 3.
        let mut residuals = vec![0.2, -0.1, 0.3, -0.2, 0.1];
        residuals.push(40.0);
        residuals.extend([0.1, -0.2, 0.2, -0.1, 0.3, -0.3, 0.1, -0.2]);
        let series = make_series(vec![100.0; 17]);

        let anomalies = detect_anomalies(&series, &residuals, &AnomalyConfig::default());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].date, series.date_at(8));
    }

    #[test]
    fn custom_threshold_widens_the_net() {
        let residuals = vec![0.1, -0.1, 0.1, -0.1, 0.1, -0.1, 0.1, -0.1, 1.0, 0.1];
        let series = make_series(vec![50.0; residuals.len()]);

        let strict = detect_anomalies(&series, &residuals, &AnomalyConfig::default());
        let loose = detect_anomalies(&series, &residuals, &AnomalyConfig::with_threshold(1.5));
        assert!(loose.len() >= strict.len());
    }

    #[test]
    fn iqr_count_finds_extreme_days() {
        // Fences for this fixture are [9.025, 11.225], so only the 100.0
        // spike falls outside them.
        let mut values = vec![10.0, 11.0, 9.5, 10.5, 10.2, 9.8, 10.1, 9.9, 10.3, 9.7];
        values.push(100.0);
        assert_eq!(iqr_outlier_count(&values), 1);
    }

    #[test]
    fn iqr_count_flags_low_and_high_tails() {
        let mut values = vec![10.0, 11.0, 9.5, 10.5, 10.2, 9.8, 10.1, 9.9, 10.3, 9.7];
        values.push(100.0);
        values.push(2.0);
        assert_eq!(iqr_outlier_count(&values), 2);
    }

    #[test]
    fn iqr_count_is_zero_for_flat_data() {
        assert_eq!(iqr_outlier_count(&[5.0; 30]), 0);
    }

    #[test]
    fn iqr_count_is_zero_for_tiny_samples() {
        assert_eq!(iqr_outlier_count(&[1.0, 2.0, 100.0]), 0);
    }
}
