//! Seasonal ARIMA forecaster.

use crate::core::{Forecast, SalesSeries};
use crate::error::{DemandError, Result};
use crate::models::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::models::Forecaster;
use crate::utils::optimization::{minimize, MinimizeConfig};
use crate::utils::stats::quantile_normal;
use chrono::{Duration, NaiveDate};

/// SARIMA(p, d, q)(P, D, Q, s) forecasting model.
///
/// Extends ARIMA with seasonal autoregressive/moving-average terms at lag `s`
/// and seasonal differencing. For daily retail data the seasonal period is 7.
/// Estimation mirrors the non-seasonal model: conditional sum of squares
/// minimized with Nelder-Mead.
#[derive(Debug, Clone)]
pub struct Sarima {
    order: (usize, usize, usize),
    seasonal: (usize, usize, usize, usize),
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    intercept: f64,
    original: Option<Vec<f64>>,
    /// Series after seasonal differencing only.
    seasonal_diff: Option<Vec<f64>>,
    /// Series after seasonal plus non-seasonal differencing.
    working: Option<Vec<f64>>,
    end_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

impl Sarima {
    /// Create a SARIMA model from `(p, d, q)` and seasonal `(P, D, Q, s)`.
    pub fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            order,
            seasonal,
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            intercept: 0.0,
            original: None,
            seasonal_diff: None,
            working: None,
            end_date: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Weekly default used throughout the pipeline: SARIMA(1,1,1)(1,1,1,7).
    pub fn weekly() -> Self {
        Self::new((1, 1, 1), (1, 1, 1, 7))
    }

    fn recursion_start(&self) -> usize {
        let (p, _, q) = self.order;
        let (sp, _, sq, s) = self.seasonal;
        p.max(q).max(s * sp).max(s * sq)
    }

    /// One-step prediction at position `t` of the working series given the
    /// history and residuals so far.
    fn one_step(
        &self,
        z: &[f64],
        residuals: &[f64],
        t: usize,
        ar: &[f64],
        ma: &[f64],
        sar: &[f64],
        sma: &[f64],
        intercept: f64,
    ) -> f64 {
        let (p, _, q) = self.order;
        let (sp, _, sq, s) = self.seasonal;

        let mut pred = intercept;
        for i in 0..p {
            if t > i {
                pred += ar[i] * (z[t - 1 - i] - intercept);
            }
        }
        for i in 0..sp {
            let lag = s * (i + 1);
            if t >= lag {
                pred += sar[i] * (z[t - lag] - intercept);
            }
        }
        for i in 0..q {
            if t > i {
                pred += ma[i] * residuals[t - 1 - i];
            }
        }
        for i in 0..sq {
            let lag = s * (i + 1);
            if t >= lag {
                pred += sma[i] * residuals[t - lag];
            }
        }
        pred
    }

    fn css(&self, z: &[f64], params: &[f64]) -> f64 {
        let (p, _, q) = self.order;
        let (sp, _, sq, _) = self.seasonal;
        let start = self.recursion_start();
        let n = z.len();
        if n <= start {
            return f64::MAX;
        }

        let intercept = params[0];
        let ar = &params[1..1 + p];
        let sar = &params[1 + p..1 + p + sp];
        let ma = &params[1 + p + sp..1 + p + sp + q];
        let sma = &params[1 + p + sp + q..1 + p + sp + q + sq];

        let mut residuals = vec![0.0; n];
        let mut total = 0.0;
        for t in start..n {
            let pred = self.one_step(z, &residuals, t, ar, ma, sar, sma, intercept);
            let error = z[t] - pred;
            residuals[t] = error;
            total += error * error;
        }
        total
    }

    fn estimate(&mut self, z: &[f64]) {
        let (p, _, q) = self.order;
        let (sp, _, sq, _) = self.seasonal;
        let n_coef = p + sp + q + sq;
        let mean = z.iter().sum::<f64>() / z.len() as f64;

        if n_coef == 0 {
            self.intercept = mean;
            return;
        }

        let mut initial = vec![0.1; 1 + n_coef];
        initial[0] = mean;

        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-0.99, 0.99)).take(n_coef));

        let config = MinimizeConfig {
            max_iter: 2000,
            ..Default::default()
        };
        let result = minimize(|params| self.css(z, params), &initial, Some(&bounds), &config);

        self.intercept = result.point[0];
        self.ar = result.point[1..1 + p].to_vec();
        self.seasonal_ar = result.point[1 + p..1 + p + sp].to_vec();
        self.ma = result.point[1 + p + sp..1 + p + sp + q].to_vec();
        self.seasonal_ma = result.point[1 + p + sp + q..].to_vec();
    }

    fn compute_fitted(&mut self, z: &[f64]) {
        let start = self.recursion_start();
        let n = z.len();

        let mut fitted = vec![f64::NAN; n];
        let mut residuals = vec![0.0; n];
        for t in start..n {
            let pred = self.one_step(
                z,
                &residuals,
                t,
                &self.ar,
                &self.ma,
                &self.seasonal_ar,
                &self.seasonal_ma,
                self.intercept,
            );
            fitted[t] = pred;
            residuals[t] = z[t] - pred;
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

impl Default for Sarima {
    fn default() -> Self {
        Self::weekly()
    }
}

impl Forecaster for Sarima {
    fn fit(&mut self, series: &SalesSeries) -> Result<()> {
        let values = series.values();
        let (_, d, _) = self.order;
        let (_, sd, _, s) = self.seasonal;
        let min_len = sd * s + d + self.recursion_start() + 2;
        if values.len() < min_len {
            return Err(DemandError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }

        self.original = Some(values.to_vec());
        self.end_date = Some(series.end_date());

        let sdiff = seasonal_difference(values, sd, s);
        let working = difference(&sdiff, d);
        self.estimate(&working);
        self.compute_fitted(&working);
        self.seasonal_diff = Some(sdiff);
        self.working = Some(working);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(DemandError::FitRequired)?;
        let sdiff = self.seasonal_diff.as_ref().ok_or(DemandError::FitRequired)?;
        let working = self.working.as_ref().ok_or(DemandError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(DemandError::FitRequired)?;
        let end = self.end_date.ok_or(DemandError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::empty());
        }

        let (_, d, _) = self.order;
        let (_, sd, _, s) = self.seasonal;

        let mut extended = working.clone();
        let mut extended_residuals = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let pred = self.one_step(
                &extended,
                &extended_residuals,
                t,
                &self.ar,
                &self.ma,
                &self.seasonal_ar,
                &self.seasonal_ma,
                self.intercept,
            );
            extended.push(pred);
            extended_residuals.push(0.0);
        }

        // Undo the differencing layers in reverse order of application.
        let forecast_working = &extended[working.len()..];
        let on_seasonal_scale = if d > 0 {
            integrate(forecast_working, sdiff, d)
        } else {
            forecast_working.to_vec()
        };
        let point = if sd > 0 {
            seasonal_integrate(&on_seasonal_scale, original, sd, s)
        } else {
            on_seasonal_scale
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
        "SARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(values: Vec<f64>) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries::new(start, values).unwrap()
    }

    fn weekly_values(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let weekday = (i % 7) as f64;
                100.0 + 0.3 * i as f64 + 25.0 * (weekday - 3.0)
            })
            .collect()
    }

    #[test]
    fn fits_and_predicts_weekly_data() {
        let mut model = Sarima::weekly();
        model.fit(&make_series(weekly_values(70))).unwrap();

        let forecast = model.predict(14).unwrap();
        assert_eq!(forecast.horizon(), 14);
        assert!(forecast.point().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn forecast_tracks_weekly_shape() {
        // With a clean weekly sawtooth, seasonal differencing should make
        // day-of-week peaks line up 7 days apart in the forecast.
        let values = weekly_values(84);
        let mut model = Sarima::weekly();
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(14).unwrap();
        let point = forecast.point();
        for i in 0..7 {
            let week_over_week = point[i + 7] - point[i];
            // Trend adds 0.3/day -> about 2.1/week; allow generous slack for
            // estimation error.
            assert!(
                week_over_week.abs() < 15.0,
                "weekly shape drifted: {week_over_week}"
            );
        }
    }

    #[test]
    fn intervals_contain_point_forecast() {
        let mut model = Sarima::weekly();
        model.fit(&make_series(weekly_values(70))).unwrap();

        let forecast = model.predict_with_intervals(14, 0.8).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for (i, &p) in forecast.point().iter().enumerate() {
            assert!(lower[i] <= p && p <= upper[i]);
        }
    }

    #[test]
    fn insufficient_data_is_rejected() {
        let mut model = Sarima::weekly();
        assert!(matches!(
            model.fit(&make_series(weekly_values(10))),
            Err(DemandError::InsufficientData { .. })
        ));
    }

    #[test]
    fn predict_requires_fit() {
        let model = Sarima::weekly();
        assert!(matches!(model.predict(5), Err(DemandError::FitRequired)));
    }

    #[test]
    fn non_seasonal_orders_reduce_to_arima_shape() {
        // D=0, P=Q=0 leaves only the non-seasonal recursion.
        let values: Vec<f64> = (0..40).map(|i| 10.0 + 0.5 * i as f64).collect();
        let mut model = Sarima::new((1, 1, 0), (0, 0, 0, 7));
        model.fit(&make_series(values)).unwrap();

        let forecast = model.predict(5).unwrap();
        assert!(forecast.point()[4] > forecast.point()[0]);
    }
}
