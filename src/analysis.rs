//! Full per-store analysis pipeline.
//!
//! Ties ingestion output, decomposition, validation, forecasting, inventory
//! guidance, anomaly detection, and the narrative together behind one request
//! object. Sections that need more history than the series offers are
//! omitted rather than failing the whole analysis.

use crate::core::{Forecast, SalesSeries};
use crate::decompose::{Decomposition, Stl};
use crate::detect::{detect_anomalies, iqr_outlier_count, Anomaly, AnomalyConfig};
use crate::error::Result;
use crate::ingest::SalesData;
use crate::insight::{generate_insight, Insight};
use crate::inventory::{DailyRange, InventoryPolicy, StockRecommendation};
use crate::models::Backend;
use crate::utils::stats::mean;
use crate::validation::{compare_backends, BackendScore, WalkForwardConfig};

/// What to analyze and how.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub store: String,
    pub horizon: usize,
    pub backend: Backend,
    /// What-if demand shift in percent, within [-30, 30].
    pub scenario_pct: f64,
    /// Prediction-interval level.
    pub level: f64,
}

impl AnalysisRequest {
    pub fn new(store: &str) -> Self {
        Self {
            store: store.to_string(),
            horizon: 14,
            backend: Backend::AdditiveSeasonal,
            scenario_pct: 0.0,
            level: 0.80,
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_scenario_pct(mut self, pct: f64) -> Self {
        self.scenario_pct = pct;
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }
}

/// Basic health indicators of the raw series.
#[derive(Debug, Clone)]
pub struct DataQuality {
    /// Calendar days absent from the input and filled with zero.
    pub filled_gaps: usize,
    pub zero_sales_days: usize,
    /// Days outside the 1.5x-IQR fences.
    pub outlier_days: usize,
}

/// Average level over a recent window versus the window before it.
#[derive(Debug, Clone)]
pub struct ChangeWindow {
    pub recent_avg: f64,
    pub prior_avg: f64,
    /// None when the prior average is zero.
    pub pct_change: Option<f64>,
}

/// Week-over-week and month-over-month level shifts.
#[derive(Debug, Clone)]
pub struct RecentChange {
    pub weekly: ChangeWindow,
    /// Present only with at least 60 days of history.
    pub monthly: Option<ChangeWindow>,
}

/// Everything the pipeline derives for one store.
#[derive(Debug, Clone)]
pub struct StoreAnalysis {
    pub store: String,
    pub backend: Backend,
    pub data_quality: DataQuality,
    /// None with fewer than 14 days of history.
    pub recent_change: Option<RecentChange>,
    /// None with fewer than two seasonal periods.
    pub decomposition: Option<Decomposition>,
    /// Empty when the history cannot support a single validation fold.
    pub comparison: Vec<BackendScore>,
    pub forecast: Forecast,
    pub expected_daily: DailyRange,
    pub recommended: StockRecommendation,
    /// Recommendation under the requested what-if shift.
    pub scenario: StockRecommendation,
    pub anomalies: Vec<Anomaly>,
    pub insight: Insight,
}

/// Run the full pipeline for one store out of loaded data.
pub fn analyze_store(data: &SalesData, request: &AnalysisRequest) -> Result<StoreAnalysis> {
    let series = data.series(&request.store)?;
    analyze(series, request)
}

/// Run the full pipeline over a prepared series.
pub fn analyze(series: &SalesSeries, request: &AnalysisRequest) -> Result<StoreAnalysis> {
    let values = series.values();

    let data_quality = DataQuality {
        filled_gaps: series.filled_gaps(),
        zero_sales_days: values.iter().filter(|&&v| v == 0.0).count(),
        outlier_days: iqr_outlier_count(values),
    };

    let recent_change = compute_recent_change(series);

    let decomposition = match Stl::weekly().robust().decompose(values) {
        Ok(d) => Some(d),
        Err(_) => None,
    };

    let wf_config = WalkForwardConfig::default();
    let comparison = if series.len() > wf_config.initial_window + wf_config.horizon {
        compare_backends(&wf_config, series)?
    } else {
        Vec::new()
    };

    let mut model = request.backend.create();
    model.fit(series)?;
    let forecast = model.predict_with_intervals(request.horizon, request.level)?;

    let policy = InventoryPolicy::default();
    let mu = forecast.mean();
    let sigma = forecast.std_dev();
    let expected_daily = policy.expected_daily_range(mu, sigma);
    let recommended = policy.recommended_stock(mu, sigma, request.horizon);
    let scenario_mu = policy.scenario_demand(mu, request.scenario_pct)?;
    let scenario = policy.recommended_stock(scenario_mu, sigma, request.horizon);

    // Anomalies are judged against the decomposition residual, where a
    // one-day spike stays a one-day event. Model residuals (differenced for
    // some backends) stand in only when the series is too short to decompose.
    let anomaly_config = AnomalyConfig::default();
    let anomalies = match &decomposition {
        Some(d) => detect_anomalies(series, &d.residual, &anomaly_config),
        None => match model.residuals() {
            Some(residuals) => detect_anomalies(series, residuals, &anomaly_config),
            None => Vec::new(),
        },
    };

    let insight = generate_insight(series, &forecast);

    Ok(StoreAnalysis {
        store: request.store.clone(),
        backend: request.backend,
        data_quality,
        recent_change,
        decomposition,
        comparison,
        forecast,
        expected_daily,
        recommended,
        scenario,
        anomalies,
        insight,
    })
}

fn change_window(values: &[f64], window: usize) -> ChangeWindow {
    let n = values.len();
    let recent_avg = mean(&values[n - window..]);
    let prior_avg = mean(&values[n - 2 * window..n - window]);
    let pct_change = if prior_avg.abs() > 1e-10 {
        Some((recent_avg - prior_avg) / prior_avg * 100.0)
    } else {
        None
    };
    ChangeWindow {
        recent_avg,
        prior_avg,
        pct_change,
    }
}

fn compute_recent_change(series: &SalesSeries) -> Option<RecentChange> {
    let values = series.values();
    if values.len() < 14 {
        return None;
    }
    let weekly = change_window(values, 7);
    let monthly = if values.len() >= 60 {
        Some(change_window(values, 30))
    } else {
        None
    };
    Some(RecentChange { weekly, monthly })
}
