//! Type-specific payloads carried by [`super::EventEnvelope`].
//!
//! Field names match the JSON already flowing on the channel, so these types
//! interoperate with any other producer or consumer attached to it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `data_uploaded`: a new historical series is available for a hospital.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataUploaded {
    /// Location of the historical series (CSV with `ds` and `y` columns).
    #[serde(default, alias = "series_source", skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// One projected day of a forecast.
///
/// `yhat_lower <= yhat <= yhat_upper` holds for every point this crate produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(with = "crate::dates::ymd")]
    pub ds: NaiveDate,
    #[serde(default)]
    pub yhat: f64,
    #[serde(default)]
    pub yhat_lower: f64,
    #[serde(default)]
    pub yhat_upper: f64,
}

impl ForecastPoint {
    pub fn new(ds: NaiveDate, yhat: f64, yhat_lower: f64, yhat_upper: f64) -> Self {
        Self {
            ds,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }

    /// Whether the bounds bracket the point estimate.
    pub fn is_bracketed(&self) -> bool {
        self.yhat_lower <= self.yhat && self.yhat <= self.yhat_upper
    }
}

/// Which estimator produced a forecast and how much history it saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub trained_rows: usize,
}

/// `prediction_ready`: a short-horizon forecast for a hospital.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionReady {
    #[serde(default)]
    pub predictions: Vec<ForecastPoint>,
    #[serde(default)]
    pub model_meta: ModelMeta,
}

fn default_quantity() -> u32 {
    1
}

/// One recommended action in an optimization plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanEntry {
    /// Ask logistics for `quantity` oxygen tankers (always >= 1).
    RequestTanker {
        #[serde(default = "default_quantity")]
        quantity: u32,
        #[serde(default)]
        reason: String,
    },
    /// Predicted demand needs no intervention.
    NoAction {
        #[serde(default)]
        reason: String,
    },
    /// An action name this crate does not know; kept so plans from other
    /// producers still decode.
    #[serde(other)]
    Unrecognized,
}

impl PlanEntry {
    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            PlanEntry::RequestTanker { .. } => "request_tanker",
            PlanEntry::NoAction { .. } => "no_action",
            PlanEntry::Unrecognized => "unrecognized",
        }
    }

    pub fn is_no_action(&self) -> bool {
        matches!(self, PlanEntry::NoAction { .. })
    }
}

/// `optimized_plan`: the plan derived from a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedPlan {
    #[serde(default)]
    pub plan: Vec<PlanEntry>,
}

/// `alert_sent`: a human-facing alert was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSent {
    pub message: String,
    pub severity: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Body of the external job-creation call, also echoed in `job_created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub hospital_id: String,
    pub quantity: u32,
    pub priority: String,
    #[serde(default)]
    pub notes: String,
}

/// `job_created`: a job-creation attempt and the status the server answered
/// (or a synthetic 500 when the call itself failed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_payload: JobRequest,
    pub server_status: u16,
}
