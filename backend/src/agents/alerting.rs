//! Alert decider: raises at most one alert per triggering event.

use std::sync::Arc;

use tracing::warn;

use super::{emit, format_value};
use crate::bus::EventBus;
use crate::events::{AlertSent, EventEnvelope, EventPayload, ForecastPoint, PlanEntry};

/// Recipient of forecast-breach alerts.
pub const ADMIN_RECIPIENT: &str = "admin@example.com";

/// Recipient of plan-action alerts.
pub const LOGISTICS_RECIPIENT: &str = "logistics@example.com";

const ALERT_SEVERITY: &str = "high";

/// Alert for the first forecast point at or above `threshold`.
pub fn decide_on_forecast(predictions: &[ForecastPoint], threshold: f64) -> Option<AlertSent> {
    let breach = predictions.iter().find(|p| p.yhat >= threshold)?;
    Some(AlertSent {
        message: format!(
            "Predicted occupancy {} >= {} on {}",
            format_value(breach.yhat),
            format_value(threshold),
            breach.ds.format("%Y-%m-%d")
        ),
        severity: ALERT_SEVERITY.to_string(),
        recipients: vec![ADMIN_RECIPIENT.to_string()],
    })
}

/// Alert for the first plan entry that asks for something.
pub fn decide_on_plan(plan: &[PlanEntry]) -> Option<AlertSent> {
    let action = plan.iter().find(|entry| !entry.is_no_action())?;
    let rendered = serde_json::to_string(action).unwrap_or_else(|_| action.action().to_string());
    Some(AlertSent {
        message: format!("Optimization recommends: {}", rendered),
        severity: ALERT_SEVERITY.to_string(),
        recipients: vec![LOGISTICS_RECIPIENT.to_string()],
    })
}

/// Publishes `alert_sent` for breaching forecasts and actionable plans.
#[derive(Clone)]
pub struct AlertDecider {
    threshold: f64,
    bus: Arc<dyn EventBus>,
}

impl AlertDecider {
    pub fn new(threshold: f64, bus: Arc<dyn EventBus>) -> Self {
        Self { threshold, bus }
    }

    /// Decide on the alert for `event`, if any.
    pub fn decide(&self, event: &EventEnvelope) -> Option<AlertSent> {
        match &event.payload {
            EventPayload::PredictionReady(ready) => {
                decide_on_forecast(&ready.predictions, self.threshold)
            }
            EventPayload::OptimizedPlan(plan) => decide_on_plan(&plan.plan),
            _ => None,
        }
    }

    pub async fn handle(&self, event: &EventEnvelope) -> Option<EventEnvelope> {
        let alert = self.decide(event)?;
        warn!(
            hospital_id = %event.hospital_id,
            recipients = ?alert.recipients,
            "ALERT: {}",
            alert.message
        );
        let envelope = EventEnvelope::new(event.hospital_id.clone(), EventPayload::AlertSent(alert));
        emit(self.bus.as_ref(), envelope).await
    }
}
