//! ARIMA(p, d, q) forecaster fit by conditional least squares.

use crate::core::{Forecast, SalesSeries};
use crate::error::{DemandError, Result};
use crate::models::diff::{difference, integrate};
use crate::models::Forecaster;
use crate::utils::optimization::{minimize, MinimizeConfig};
use crate::utils::stats::quantile_normal;
use chrono::{Duration, NaiveDate};

/// ARIMA forecasting model.
///
/// Combines an AR(p) autoregression, order-`d` differencing for stationarity,
/// and an MA(q) moving-average term. Parameters are estimated by minimizing
/// the conditional sum of squares with Nelder-Mead, the standard
/// least-squares shortcut to full maximum likelihood.
#[derive(Debug, Clone)]
pub struct Arima {
    p: usize,
    d: usize,
    q: usize,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    original: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    end_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

impl Arima {
    /// Create an ARIMA(p, d, q) model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            ar: vec![],
            ma: vec![],
            intercept: 0.0,
            original: None,
            differenced: None,
            end_date: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// AR coefficients after fitting.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// MA coefficients after fitting.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Conditional sum of squares for the given parameters on the
    /// differenced series.
    fn css(diff: &[f64], p: usize, q: usize, ar: &[f64], ma: &[f64], intercept: f64) -> f64 {
        let n = diff.len();
        let start = p.max(q);
        if n <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; n];
        let mut total = 0.0;
        for t in start..n {
            let mut pred = intercept;
            for i in 0..p {
                pred += ar[i] * (diff[t - 1 - i] - intercept);
            }
            for i in 0..q {
                pred += ma[i] * residuals[t - 1 - i];
            }
            let error = diff[t] - pred;
            residuals[t] = error;
            total += error * error;
        }
        total
    }

    fn estimate(&mut self, diff: &[f64]) {
        let (p, q) = (self.p, self.q);
        let mean = diff.iter().sum::<f64>() / diff.len() as f64;

        if p == 0 && q == 0 {
            self.intercept = mean;
            self.ar = vec![];
            self.ma = vec![];
            return;
        }

        let mut initial = vec![0.0; p + q + 1];
        initial[0] = mean;
        for i in 0..p {
            initial[1 + i] = 0.1 / (i + 1) as f64;
        }
        for i in 0..q {
            initial[1 + p + i] = 0.1 / (i + 1) as f64;
        }

        // AR/MA coefficients stay inside the unit box for
        // stationarity/invertibility; the intercept is free.
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

        let result = minimize(
            |params| {
                let intercept = params[0];
                let ar = &params[1..1 + p];
                let ma = &params[1 + p..];
                Self::css(diff, p, q, ar, ma, intercept)
            },
            &initial,
            Some(&bounds),
            &MinimizeConfig::default(),
        );

        self.intercept = result.point[0];
        self.ar = result.point[1..1 + p].to_vec();
        self.ma = result.point[1 + p..].to_vec();
    }

    fn compute_fitted(&mut self, diff: &[f64]) {
        let n = diff.len();
        let start = self.p.max(self.q);

        let mut fitted = vec![f64::NAN; n];
        let mut residuals = vec![0.0; n];
        for t in start..n {
            let mut pred = self.intercept;
            for i in 0..self.p {
                pred += self.ar[i] * (diff[t - 1 - i] - self.intercept);
            }
            for i in 0..self.q {
                pred += self.ma[i] * residuals[t - 1 - i];
            }
            fitted[t] = pred;
            residuals[t] = diff[t] - pred;
        }

        let valid = &residuals[start..];
        if !valid.is_empty() {
            self.residual_variance =
                Some(valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64);
        }

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
    }
}

impl Default for Arima {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl Forecaster for Arima {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        let values = series.values();
        let min_len = self.d + self.p.max(self.q) + 2;
        if values.len() < min_len {
            return Err(DemandError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }

        self.original = Some(values.to_vec());
        self.end_date = Some(series.end_date());

        let diff = difference(values, self.d);
        self.estimate(&diff);
        self.compute_fitted(&diff);
        self.differenced = Some(diff);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(DemandError::FitRequired)?;
        let diff = self.differenced.as_ref().ok_or(DemandError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(DemandError::FitRequired)?;
        let end = self.end_date.ok_or(DemandError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::empty());
        }

        // Recursive forecast on the differenced scale; future shocks are zero.
        let mut extended = diff.clone();
        let mut extended_residuals = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for i in 0..self.p {
                if t > i {
                    pred += self.ar[i] * (extended[t - 1 - i] - self.intercept);
                }
            }
            for i in 0..self.q {
                if t > i {
                    pred += self.ma[i] * extended_residuals[t - 1 - i];
                }
            }
            extended.push(pred);
            extended_residuals.push(0.0);
        }

        let forecast_diff = &extended[diff.len()..];
        let point = if self.d > 0 {
            integrate(forecast_diff, original, self.d)
        } else {
            forecast_diff.to_vec()
        };

        let dates: Vec<NaiveDate> = (1..=horizon as i64).map(|h| end + Duration::days(h)).collect();
        Forecast::from_points(dates, point)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let point = forecast.point();

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            // Forecast variance accumulates with horizon.
            let se = (variance * h as f64).sqrt();
            lower.push(point[h - 1] - z * se);
            upper.push(point[h - 1] + z * se);
        }

        Forecast::with_intervals(forecast.dates().to_vec(), point.to_vec(), lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "ARIMA"
    }
}
