//! Seasonal-trend decomposition using LOESS smoothing.

use crate::error::{DemandError, Result};
use crate::utils::stats::{quantile, variance};

/// Additive decomposition of a daily sales series.
///
/// The observed series equals `trend + seasonal + residual` at every index.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// Fraction of non-trend variation explained by seasonality, in [0, 1].
    pub fn seasonal_strength(&self) -> f64 {
        component_strength(&self.seasonal, &self.residual)
    }

    /// Fraction of non-seasonal variation explained by trend, in [0, 1].
    pub fn trend_strength(&self) -> f64 {
        component_strength(&self.trend, &self.residual)
    }
}

fn component_strength(component: &[f64], residual: &[f64]) -> f64 {
    let combined: Vec<f64> = component
        .iter()
        .zip(residual.iter())
        .map(|(c, r)| c + r)
        .collect();
    let var_combined = variance(&combined);
    if var_combined < 1e-10 {
        return 0.0;
    }
    (1.0 - variance(residual) / var_combined).clamp(0.0, 1.0)
}

/// STL decomposer configured for daily retail data.
///
/// Smoothing spans follow Cleveland et al. (1990) defaults derived from the
/// period; the robust variant downweights outlier days with bisquare weights.
#[derive(Debug, Clone)]
pub struct Stl {
    period: usize,
    seasonal_span: usize,
    trend_span: usize,
    low_pass_span: usize,
    inner_iterations: usize,
    outer_iterations: usize,
}

impl Stl {
    /// Create a decomposer for the given seasonal period.
    pub fn new(period: usize) -> Self {
        let nt = (1.5 * period as f64 / (1.0 - 1.5 / period as f64)).ceil() as usize;
        Self {
            period,
            seasonal_span: period | 1,
            trend_span: nt | 1,
            low_pass_span: period | 1,
            inner_iterations: 2,
            outer_iterations: 0,
        }
    }

    /// Weekly decomposer, the default for daily sales.
    pub fn weekly() -> Self {
        Self::new(7)
    }

    /// Enable robustness iterations so one-off spikes do not distort the
    /// seasonal pattern.
    pub fn robust(mut self) -> Self {
        self.outer_iterations = 6;
        self
    }

    pub fn with_seasonal_span(mut self, span: usize) -> Self {
        self.seasonal_span = span | 1;
        self
    }

    pub fn with_trend_span(mut self, span: usize) -> Self {
        self.trend_span = span | 1;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Decompose the series. Requires at least two full periods.
    pub fn decompose(&self, series: &[f64]) -> Result<Decomposition> {
        let n = series.len();
        let needed = 2 * self.period;
        if n < needed {
            return Err(DemandError::InsufficientData { needed, got: n });
        }

        let mut seasonal = vec![0.0; n];
        let mut trend = vec![0.0; n];
        let mut weights = vec![1.0; n];

        let outer = self.outer_iterations.max(1);
        for _ in 0..outer {
            for _ in 0..self.inner_iterations {
                let detrended: Vec<f64> =
                    series.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();

                let cycle = self.smooth_cycle_subseries(&detrended, &weights);
                let low_pass = self.low_pass_filter(&cycle, &weights);
                for i in 0..n {
                    seasonal[i] = cycle[i] - low_pass[i];
                }

                let deseasonalized: Vec<f64> = series
                    .iter()
                    .zip(seasonal.iter())
                    .map(|(y, s)| y - s)
                    .collect();
                trend = loess_smooth(&deseasonalized, self.trend_span, &weights);
            }

            if self.outer_iterations > 0 {
                let residual: Vec<f64> = residual_of(series, &seasonal, &trend);
                weights = bisquare_weights(&residual);
            }
        }

        let residual = residual_of(series, &seasonal, &trend);
        Ok(Decomposition {
            observed: series.to_vec(),
            trend,
            seasonal,
            residual,
        })
    }

    /// Smooth each cycle subseries (all Mondays, all Tuesdays, ...) in place.
    fn smooth_cycle_subseries(&self, detrended: &[f64], weights: &[f64]) -> Vec<f64> {
        let n = detrended.len();
        let mut result = vec![0.0; n];

        for pos in 0..self.period {
            let indices: Vec<usize> = (pos..n).step_by(self.period).collect();
            let values: Vec<f64> = indices.iter().map(|&i| detrended[i]).collect();
            let sub_weights: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

            let smoothed = loess_smooth(&values, self.seasonal_span, &sub_weights);
            for (&idx, &v) in indices.iter().zip(smoothed.iter()) {
                result[idx] = v;
            }
        }

        result
    }

    /// Low-pass filter: MA(period) twice, MA(3), then a LOESS pass carrying
    /// the robustness weights.
    fn low_pass_filter(&self, series: &[f64], weights: &[f64]) -> Vec<f64> {
        let ma1 = centered_moving_average(series, self.period);
        let ma2 = centered_moving_average(&ma1, self.period);
        let ma3 = centered_moving_average(&ma2, 3);
        loess_smooth(&ma3, self.low_pass_span, weights)
    }
}

impl Default for Stl {
    fn default() -> Self {
        Self::weekly()
    }
}

fn residual_of(series: &[f64], seasonal: &[f64], trend: &[f64]) -> Vec<f64> {
    series
        .iter()
        .zip(seasonal.iter())
        .zip(trend.iter())
        .map(|((y, s), t)| y - s - t)
        .collect()
}

fn centered_moving_average(series: &[f64], window: usize) -> Vec<f64> {
    let n = series.len();
    let half = window / 2;
    let mut result = vec![0.0; n];
    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);
        let sum: f64 = series[start..end].iter().sum();
        result[i] = sum / (end - start) as f64;
    }
    result
}

/// Tricube-weighted local mean over a window of `span` points.
fn loess_smooth(values: &[f64], span: usize, weights: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let half = span / 2;
    let mut result = vec![0.0; n];
    for i in 0..n {
        let start = i.saturating_sub(half);
        let end = (i + half + 1).min(n);
        let max_dist = half as f64 + 1.0;

        let mut sum_w = 0.0;
        let mut sum_wy = 0.0;
        for j in start..end {
            let u = (i as f64 - j as f64).abs() / max_dist;
            let tricube = if u < 1.0 { (1.0 - u.powi(3)).powi(3) } else { 0.0 };
            let w = tricube * weights[j];
            sum_w += w;
            sum_wy += w * values[j];
        }
        result[i] = if sum_w > 0.0 { sum_wy / sum_w } else { values[i] };
    }
    result
}

/// Bisquare robustness weights scaled by six times the median absolute
/// residual.
fn bisquare_weights(residual: &[f64]) -> Vec<f64> {
    let abs: Vec<f64> = residual.iter().map(|r| r.abs()).collect();
    let h = 6.0 * quantile(&abs, 0.5);
    residual
        .iter()
        .map(|r| {
            if h < 1e-10 {
                return 1.0;
            }
            let u = r.abs() / h;
            if u < 1.0 {
                (1.0 - u * u).powi(2)
            } else {
                0.0
            }
        })
        .collect()
}
