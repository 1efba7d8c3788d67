//! Forecast producer: turns an uploaded series into a short-horizon forecast.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::emit;
use crate::bus::EventBus;
use crate::context::ModelContext;
use crate::error::{CrewError, CrewResult};
use crate::events::{DataUploaded, EventEnvelope, EventPayload, ModelMeta, PredictionReady};
use crate::forecast::{
    is_valid_forecast, load_series, moving_average_forecast, Cadence, Series,
    FALLBACK_MODEL_NAME, HORIZON, MIN_MODEL_ROWS,
};

/// Publishes `prediction_ready` for each readable upload.
#[derive(Clone)]
pub struct ForecastProducer {
    context: Arc<ModelContext>,
    bus: Arc<dyn EventBus>,
}

impl ForecastProducer {
    pub fn new(context: Arc<ModelContext>, bus: Arc<dyn EventBus>) -> Self {
        Self { context, bus }
    }

    /// Forecast the [`HORIZON`] days following the last observation.
    ///
    /// Uses the seasonal model when one is configured and the series has at
    /// least [`MIN_MODEL_ROWS`] observations; otherwise, or when the model
    /// fails or breaks its contract, the moving-average fallback.
    pub fn predict(&self, series: &Series) -> PredictionReady {
        if let Some(model) = self.context.hospital_model() {
            if series.len() >= MIN_MODEL_ROWS {
                match model.forecast(series, HORIZON, Cadence::Daily) {
                    Ok(points) if is_valid_forecast(&points, HORIZON) => {
                        return PredictionReady {
                            predictions: points,
                            model_meta: ModelMeta {
                                model: model.name().to_string(),
                                trained_rows: series.len(),
                            },
                        };
                    }
                    Ok(points) => warn!(
                        model = model.name(),
                        points = points.len(),
                        "Model output violates the forecast contract; falling back"
                    ),
                    Err(e) => warn!(model = model.name(), error = %e, "Model failed; falling back"),
                }
            }
        }

        PredictionReady {
            predictions: moving_average_forecast(series, HORIZON, Cadence::Daily),
            model_meta: ModelMeta {
                model: FALLBACK_MODEL_NAME.to_string(),
                trained_rows: series.len(),
            },
        }
    }

    /// Validate the upload and load its series.
    fn load(&self, hospital_id: &str, upload: &DataUploaded) -> CrewResult<Series> {
        if hospital_id.trim().is_empty() {
            return Err(CrewError::input("missing hospital_id").with_operation("forecast"));
        }
        let path = upload
            .file_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                CrewError::input("missing file_path")
                    .with_operation("forecast")
                    .with_entity_id(hospital_id)
            })?;
        load_series(path)
    }

    /// Forecast an upload and publish the result.
    ///
    /// Unreadable or incomplete uploads are logged and dropped.
    pub async fn handle(&self, hospital_id: &str, upload: &DataUploaded) -> Option<EventEnvelope> {
        // File reading and model fitting stay off the runtime workers.
        let ready = tokio::task::spawn_blocking({
            let producer = self.clone();
            let hospital_id = hospital_id.to_string();
            let upload = upload.clone();
            move || {
                producer
                    .load(&hospital_id, &upload)
                    .map(|series| producer.predict(&series))
            }
        })
        .await;
        let ready = match ready {
            Ok(Ok(ready)) => ready,
            Ok(Err(e)) => {
                warn!(hospital_id, error = %e, "Cannot forecast upload; dropping");
                return None;
            }
            Err(e) => {
                error!(hospital_id, error = %e, "Forecast task failed");
                return None;
            }
        };

        info!(
            hospital_id,
            model = %ready.model_meta.model,
            rows = ready.model_meta.trained_rows,
            "Forecast produced"
        );
        let envelope = EventEnvelope::new(hospital_id, EventPayload::PredictionReady(ready));
        emit(self.bus.as_ref(), envelope).await
    }
}
