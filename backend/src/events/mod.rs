//! Event envelope and payload contracts for the shared channel.
//!
//! Every message on the channel is a UTF-8 JSON object with an `event_type`,
//! a `ts` and a `hospital_id`, plus the fields of its payload at the top
//! level:
//!
//! ```text
//! {"event_type": "optimized_plan", "ts": "2024-01-01T00:00:00Z",
//!  "hospital_id": "H-1", "plan": [{"action": "no_action", "reason": "..."}]}
//! ```
//!
//! Consumers must tolerate unknown fields and unknown event types, so decoding
//! goes through [`decode`], which reports unrecognized types instead of
//! failing.

pub mod payload;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CrewError, CrewResult, ErrorContext};

pub use payload::{
    AlertSent, DataUploaded, ForecastPoint, JobCreated, JobRequest, ModelMeta, OptimizedPlan,
    PlanEntry, PredictionReady,
};

/// The closed set of event types this crate produces and consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DataUploaded,
    PredictionReady,
    OptimizedPlan,
    AlertSent,
    JobCreated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::DataUploaded => "data_uploaded",
            EventType::PredictionReady => "prediction_ready",
            EventType::OptimizedPlan => "optimized_plan",
            EventType::AlertSent => "alert_sent",
            EventType::JobCreated => "job_created",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data_uploaded" => Ok(EventType::DataUploaded),
            "prediction_ready" => Ok(EventType::PredictionReady),
            "optimized_plan" => Ok(EventType::OptimizedPlan),
            "alert_sent" => Ok(EventType::AlertSent),
            "job_created" => Ok(EventType::JobCreated),
            other => Err(format!("unknown event type '{}'", other)),
        }
    }
}

/// Payload of an event, tagged on the wire by `event_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventPayload {
    DataUploaded(DataUploaded),
    PredictionReady(PredictionReady),
    OptimizedPlan(OptimizedPlan),
    AlertSent(AlertSent),
    JobCreated(JobCreated),
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::DataUploaded(_) => EventType::DataUploaded,
            EventPayload::PredictionReady(_) => EventType::PredictionReady,
            EventPayload::OptimizedPlan(_) => EventType::OptimizedPlan,
            EventPayload::AlertSent(_) => EventType::AlertSent,
            EventPayload::JobCreated(_) => EventType::JobCreated,
        }
    }
}

/// The unit of communication on the bus. Never mutated after publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Creation time assigned by the publisher. Inbound events without one
    /// are stamped with their receipt time.
    #[serde(default = "crate::dates::now_utc")]
    pub ts: DateTime<Utc>,
    pub hospital_id: String,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl EventEnvelope {
    /// Build an envelope stamped with the current time.
    pub fn new(hospital_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            ts: crate::dates::now_utc(),
            hospital_id: hospital_id.into(),
            payload,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    /// Serialize to the JSON text published on the channel.
    pub fn to_json(&self) -> CrewResult<String> {
        serde_json::to_string(self).map_err(|e| {
            CrewError::serialization(e.to_string()).with_context(
                ErrorContext::new("encode_event")
                    .with_entity("event")
                    .with_entity_id(self.event_type()),
            )
        })
    }
}

/// Result of decoding one raw channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A recognized event with a valid payload.
    Event(EventEnvelope),
    /// Valid JSON whose `event_type` is missing or unknown. Not an error.
    Unrecognized(String),
}

/// Decode one raw channel message.
///
/// # Errors
/// - `Serialization` when the text is not JSON.
/// - `Input` when the event type is known but the envelope or payload is
///   malformed (for instance a missing `hospital_id`).
pub fn decode(raw: &str) -> CrewResult<Inbound> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        CrewError::serialization(format!("invalid JSON payload: {}", e))
            .with_operation("decode_event")
    })?;

    let event_type = value
        .get("event_type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    let known = match EventType::from_str(&event_type) {
        Ok(known) => known,
        Err(_) => return Ok(Inbound::Unrecognized(event_type)),
    };

    serde_json::from_value::<EventEnvelope>(value)
        .map(Inbound::Event)
        .map_err(|e| {
            CrewError::input(e.to_string()).with_context(
                ErrorContext::new("decode_event")
                    .with_entity("event")
                    .with_entity_id(known),
            )
        })
}
