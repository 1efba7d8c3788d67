//! Forecasting support for the forecast producer and the severity scan.
//!
//! The seasonality-aware model sits behind the [`SeasonalModel`] trait and is
//! treated as a black box with a contract: given a history and a horizon it
//! returns one [`ForecastPoint`] per future period, each with bounds that
//! bracket the point estimate. When no model is available, or it fails, the
//! [`fallback`] estimator takes over.

pub mod cadence;
pub mod fallback;
pub mod seasonal;
pub mod series;

use crate::error::CrewResult;
use crate::events::ForecastPoint;

pub use cadence::Cadence;
pub use fallback::{moving_average_forecast, FALLBACK_MODEL_NAME};
pub use seasonal::SeasonalProfileModel;
pub use series::{load_series, Observation, Series};

/// Number of future days in every hospital forecast.
pub const HORIZON: usize = 5;

/// Shortest history handed to the seasonal model; shorter series use the fallback.
pub const MIN_MODEL_ROWS: usize = 10;

/// Number of trailing observations averaged by the fallback estimator.
pub const FALLBACK_WINDOW: usize = 7;

/// A seasonality-aware forecasting model.
pub trait SeasonalModel: Send + Sync {
    /// Name reported in `model_meta.model`.
    fn name(&self) -> &str;

    /// Forecast `horizon` periods following the last observation of `history`.
    ///
    /// # Errors
    /// `Model` when the history cannot be fitted.
    fn forecast(
        &self,
        history: &Series,
        horizon: usize,
        cadence: Cadence,
    ) -> CrewResult<Vec<ForecastPoint>>;
}

/// Whether `points` honours the model contract for `horizon`.
pub fn is_valid_forecast(points: &[ForecastPoint], horizon: usize) -> bool {
    points.len() == horizon
        && points.iter().all(|p| {
            p.yhat.is_finite() && p.yhat_lower.is_finite() && p.yhat_upper.is_finite() && p.is_bracketed()
        })
}
