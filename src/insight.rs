//! Plain-language summary of history and forecast.

use crate::core::{Forecast, SalesSeries};
use crate::utils::stats::{mean, std_dev};

/// Percent change below which demand is described as stable.
const CHANGE_THRESHOLD_PCT: f64 = 10.0;
/// Volatility is "high" above this fraction of the overall average.
const VOLATILITY_RATIO: f64 = 0.5;

/// Expected direction of demand over the forecast window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandTrend {
    Increasing,
    Declining,
    Stable,
}

/// Narrative insight assembled from fixed-threshold comparisons.
#[derive(Debug, Clone)]
pub struct Insight {
    pub trend: DemandTrend,
    /// Forecast-vs-recent percent change; None when the recent average is
    /// zero.
    pub change_pct: Option<f64>,
    pub high_volatility: bool,
    /// The assembled sentences, in display order.
    pub lines: Vec<String>,
}

impl Insight {
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Build the narrative from recent history and the forecast.
///
/// Compares the forecast average against the trailing 14-day average and the
/// recent volatility against half the overall average. A zero recent average
/// makes the percent change undefined and falls into the stable branch.
pub fn generate_insight(series: &SalesSeries, forecast: &Forecast) -> Insight {
    let values = series.values();
    let overall_avg = mean(values);
    let recent = series.tail(14);
    let recent_avg = mean(recent);
    let volatility = std_dev(recent);
    let forecast_avg = forecast.mean();

    let change_pct = if recent_avg.abs() > 1e-10 {
        Some((forecast_avg - recent_avg) / recent_avg * 100.0)
    } else {
        None
    };

    let trend = match change_pct {
        Some(pct) if pct > CHANGE_THRESHOLD_PCT => DemandTrend::Increasing,
        Some(pct) if pct < -CHANGE_THRESHOLD_PCT => DemandTrend::Declining,
        _ => DemandTrend::Stable,
    };

    let mut lines = Vec::with_capacity(3);
    match (trend, change_pct) {
        (DemandTrend::Increasing, Some(pct)) => lines.push(format!(
            "Demand is expected to increase by approximately {pct:.1}% over the next two weeks."
        )),
        (DemandTrend::Declining, Some(pct)) => lines.push(format!(
            "Demand is expected to decline by approximately {:.1}% over the next two weeks.",
            pct.abs()
        )),
        _ => lines.push(
            "Demand levels are expected to remain relatively stable over the next two weeks."
                .to_string(),
        ),
    }

    let high_volatility = volatility > VOLATILITY_RATIO * overall_avg;
    if high_volatility {
        lines.push(
            "Sales show high variability, suggesting potential promotions or irregular demand events."
                .to_string(),
        );
    } else {
        lines.push("Sales patterns appear stable with predictable weekly behavior.".to_string());
    }

    lines.push(
        "Recommended action: plan inventory using weekly demand patterns and monitor sudden deviations closely."
            .to_string(),
    );

    Insight {
        trend,
        change_pct,
        high_volatility,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_series(values: Vec<f64>) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        SalesSeries::new(start, values).unwrap()
    }

    fn flat_forecast(series: &SalesSeries, level: f64, horizon: usize) -> Forecast {
        Forecast::from_points(series.future_dates(horizon), vec![level; horizon]).unwrap()
    }

    #[test]
    fn rising_forecast_reports_an_increase() {
        let series = make_series(vec![100.0; 30]);
        let forecast = flat_forecast(&series, 125.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert_eq!(insight.trend, DemandTrend::Increasing);
        assert!(insight.text().contains("increase by approximately 25.0%"));
    }

    #[test]
    fn falling_forecast_reports_a_decline() {
        let series = make_series(vec![100.0; 30]);
        let forecast = flat_forecast(&series, 80.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert_eq!(insight.trend, DemandTrend::Declining);
        assert!(insight.text().contains("decline by approximately 20.0%"));
    }

    #[test]
    fn small_change_is_stable() {
        let series = make_series(vec![100.0; 30]);
        let forecast = flat_forecast(&series, 105.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert_eq!(insight.trend, DemandTrend::Stable);
    }

    #[test]
    fn zero_recent_average_falls_back_to_stable() {
        let series = make_series(vec![0.0; 30]);
        let forecast = flat_forecast(&series, 10.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert_eq!(insight.trend, DemandTrend::Stable);
        assert!(insight.change_pct.is_none());
    }

    #[test]
    fn volatile_history_is_flagged() {
        let values: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 10.0 } else { 200.0 })
            .collect();
        let series = make_series(values);
        let forecast = flat_forecast(&series, 100.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert!(insight.high_volatility);
        assert!(insight.text().contains("high variability"));
    }

    #[test]
    fn narrative_always_closes_with_the_recommendation() {
        let series = make_series(vec![50.0; 30]);
        let forecast = flat_forecast(&series, 50.0, 14);

        let insight = generate_insight(&series, &forecast);
        assert_eq!(insight.lines.len(), 3);
        assert!(insight.lines[2].starts_with("Recommended action"));
    }
}
