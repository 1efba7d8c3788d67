//! Naive moving-average estimator used when no seasonal forecast is available.

use super::{Cadence, Series, FALLBACK_WINDOW};
use crate::events::ForecastPoint;

/// Name reported in `model_meta.model` for fallback forecasts.
pub const FALLBACK_MODEL_NAME: &str = "moving_average";

const BAND: f64 = 0.05;

/// Forecast `horizon` periods as the mean of the last [`FALLBACK_WINDOW`]
/// observations (all of them when fewer exist), held constant, with a ±5%
/// envelope.
///
/// The envelope is ordered so `yhat_lower <= yhat <= yhat_upper` also holds
/// for a negative mean.
pub fn moving_average_forecast(
    series: &Series,
    horizon: usize,
    cadence: Cadence,
) -> Vec<ForecastPoint> {
    let window = series.tail(FALLBACK_WINDOW);
    let mean = window.iter().map(|o| o.y).sum::<f64>() / window.len() as f64;
    let a = mean * (1.0 - BAND);
    let b = mean * (1.0 + BAND);
    let (lower, upper) = if a <= b { (a, b) } else { (b, a) };

    cadence
        .future_dates(series.last().ds, horizon)
        .into_iter()
        .map(|ds| ForecastPoint::new(ds, mean, lower, upper))
        .collect()
}
