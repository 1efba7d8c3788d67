//! Additive seasonal-profile model.
//!
//! The forecast for a future period is the recent level (mean of the last
//! seasonal cycle) plus the average deviation observed for that period's
//! slot (weekday or calendar month). Bounds are symmetric and widen with the
//! square root of the horizon, scaled by the in-sample residual spread.

use super::{Cadence, SeasonalModel, Series};
use crate::error::{CrewError, CrewResult, ErrorContext};
use crate::events::ForecastPoint;

/// z-score of an 80% two-sided interval.
const DEFAULT_INTERVAL_Z: f64 = 1.2816;

/// Seasonal-profile forecaster.
#[derive(Debug, Clone)]
pub struct SeasonalProfileModel {
    interval_z: f64,
    min_observations: usize,
}

impl SeasonalProfileModel {
    pub fn new() -> Self {
        Self {
            interval_z: DEFAULT_INTERVAL_Z,
            min_observations: 2,
        }
    }

    /// Use a different interval width, expressed as a z-score.
    pub fn with_interval_z(mut self, z: f64) -> Self {
        self.interval_z = z.abs();
        self
    }

    /// Refuse to fit histories shorter than `n` observations.
    pub fn with_min_observations(mut self, n: usize) -> Self {
        self.min_observations = n.max(2);
        self
    }

    fn fail(&self, message: impl Into<String>) -> CrewError {
        CrewError::model(message).with_context(ErrorContext::new("fit").with_entity("seasonal_profile"))
    }
}

impl Default for SeasonalProfileModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonalModel for SeasonalProfileModel {
    fn name(&self) -> &str {
        "seasonal_profile"
    }

    fn forecast(
        &self,
        history: &Series,
        horizon: usize,
        cadence: Cadence,
    ) -> CrewResult<Vec<ForecastPoint>> {
        let observations = history.observations();
        if observations.len() < self.min_observations {
            return Err(self.fail(format!(
                "need at least {} observations, got {}",
                self.min_observations,
                observations.len()
            )));
        }
        if observations.iter().any(|o| !o.y.is_finite()) {
            return Err(self.fail("history contains non-finite values"));
        }

        let n = observations.len() as f64;
        let overall = observations.iter().map(|o| o.y).sum::<f64>() / n;

        let season = cadence.season_length();
        let mut sums = vec![0.0; season];
        let mut counts = vec![0usize; season];
        for o in observations {
            let slot = cadence.slot(o.ds);
            sums[slot] += o.y - overall;
            counts[slot] += 1;
        }
        let profile: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect();

        let recent = history.tail(season);
        let level = recent
            .iter()
            .map(|o| o.y - profile[cadence.slot(o.ds)])
            .sum::<f64>()
            / recent.len() as f64;

        let sse: f64 = observations
            .iter()
            .map(|o| {
                let fitted = overall + profile[cadence.slot(o.ds)];
                (o.y - fitted).powi(2)
            })
            .sum();
        let sigma = (sse / (n - 1.0)).sqrt();
        if !sigma.is_finite() || !level.is_finite() {
            return Err(self.fail("residual spread is not finite"));
        }

        let dates = cadence.future_dates(history.last().ds, horizon);
        if dates.len() != horizon {
            return Err(self.fail("forecast dates out of range"));
        }

        Ok(dates
            .into_iter()
            .enumerate()
            .map(|(i, ds)| {
                let yhat = level + profile[cadence.slot(ds)];
                let half_width = self.interval_z * sigma * ((i + 1) as f64).sqrt();
                ForecastPoint::new(ds, yhat, yhat - half_width, yhat + half_width)
            })
            .collect())
    }
}
