//! Differencing and integration helpers shared by the ARIMA-family models.

/// Apply `d` rounds of first differencing.
pub(crate) fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` seasonal differencing.
pub(crate) fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 || series.len() <= period {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Undo `d` rounds of first differencing on a forecast continuation.
///
/// `original` is the pre-differencing series the forecast continues from.
pub(crate) fn integrate(forecast_diff: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || forecast_diff.is_empty() {
        return forecast_diff.to_vec();
    }

    let mut result = forecast_diff.to_vec();
    for level in (0..d).rev() {
        let base = difference(original, level);
        let mut cumsum = *base.last().unwrap_or(&0.0);
        for value in &mut result {
            cumsum += *value;
            *value = cumsum;
        }
    }
    result
}

/// Undo `d` rounds of lag-`period` seasonal differencing on a forecast
/// continuation of `original`.
pub(crate) fn seasonal_integrate(
    forecast_diff: &[f64],
    original: &[f64],
    d: usize,
    period: usize,
) -> Vec<f64> {
    if d == 0 || period == 0 || forecast_diff.is_empty() {
        return forecast_diff.to_vec();
    }

    let mut result = forecast_diff.to_vec();
    for level in (0..d).rev() {
        let base = seasonal_difference(original, level, period);
        let mut extended = base;
        let mut integrated = Vec::with_capacity(result.len());
        for &value in &result {
            let prev = if extended.len() >= period {
                extended[extended.len() - period]
            } else {
                0.0
            };
            let x = value + prev;
            extended.push(x);
            integrated.push(x);
        }
        result = integrated;
    }
    result
}
