//! Event router: the coordination spine of the crew.
//!
//! Consumes raw channel messages one at a time and invokes the agents in a
//! fixed order:
//!
//! | Incoming `event_type` | Agents |
//! |---|---|
//! | `data_uploaded` | forecast producer |
//! | `prediction_ready` | optimization deriver, then alert decider |
//! | `optimized_plan` | logistics dispatcher, then alert decider |
//! | anything else | logged and dropped |
//!
//! A message is handled to completion before the next is pulled. No single
//! message can stop the router.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::agents::{AlertDecider, ForecastProducer, LogisticsDispatcher, OptimizationDeriver};
use crate::bus::EventBus;
use crate::context::ModelContext;
use crate::events::{decode, EventEnvelope, EventPayload, EventType, Inbound};
use crate::jobs::JobClient;

/// What the router did with one message.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Routed to the agents; carries what they published, in order.
    Dispatched {
        event_type: EventType,
        published: Vec<EventEnvelope>,
    },
    /// Valid message with no route (unknown type, or an event only other
    /// consumers care about).
    Unhandled(String),
    /// Not JSON, or a known event type with an invalid payload.
    Malformed(String),
}

impl RouteOutcome {
    pub fn published(&self) -> &[EventEnvelope] {
        match self {
            RouteOutcome::Dispatched { published, .. } => published,
            _ => &[],
        }
    }
}

/// Routes channel messages to the agents.
#[derive(Clone)]
pub struct EventRouter {
    forecaster: ForecastProducer,
    optimizer: OptimizationDeriver,
    alerter: AlertDecider,
    logistics: LogisticsDispatcher,
}

impl EventRouter {
    /// Build every agent from shared dependencies.
    pub fn new(
        context: Arc<ModelContext>,
        threshold: f64,
        bus: Arc<dyn EventBus>,
        jobs: Arc<dyn JobClient>,
    ) -> Self {
        Self {
            forecaster: ForecastProducer::new(context, Arc::clone(&bus)),
            optimizer: OptimizationDeriver::new(threshold, Arc::clone(&bus)),
            alerter: AlertDecider::new(threshold, Arc::clone(&bus)),
            logistics: LogisticsDispatcher::new(jobs, bus),
        }
    }

    /// Decode and route one raw message. Never fails.
    pub async fn handle_message(&self, raw: &str) -> RouteOutcome {
        let envelope = match decode(raw) {
            Ok(Inbound::Event(envelope)) => envelope,
            Ok(Inbound::Unrecognized(event_type)) => {
                info!(event_type = %event_type, "Unhandled event type");
                return RouteOutcome::Unhandled(event_type);
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed message");
                return RouteOutcome::Malformed(e.to_string());
            }
        };
        self.route(envelope).await
    }

    /// Route an already decoded event.
    pub async fn route(&self, envelope: EventEnvelope) -> RouteOutcome {
        let event_type = envelope.event_type();
        let hospital_id = envelope.hospital_id.as_str();
        debug!(event_type = %event_type, hospital_id, "Routing event");

        let published = match &envelope.payload {
            EventPayload::DataUploaded(upload) => {
                self.forecaster.handle(hospital_id, upload).await.into_iter().collect()
            }
            EventPayload::PredictionReady(ready) => {
                let plan = self.optimizer.handle(hospital_id, ready).await;
                let alert = self.alerter.handle(&envelope).await;
                plan.into_iter().chain(alert).collect()
            }
            EventPayload::OptimizedPlan(plan) => {
                let job = self.logistics.handle(hospital_id, plan).await;
                let alert = self.alerter.handle(&envelope).await;
                job.into_iter().chain(alert).collect()
            }
            EventPayload::AlertSent(_) | EventPayload::JobCreated(_) => {
                debug!(event_type = %event_type, "No route for event type");
                return RouteOutcome::Unhandled(event_type.to_string());
            }
        };
        RouteOutcome::Dispatched {
            event_type,
            published,
        }
    }

    /// Handle every message of `stream` in order until it ends.
    ///
    /// Returns the number of messages handled.
    pub async fn run<S>(&self, stream: S) -> usize
    where
        S: Stream<Item = String>,
    {
        futures::pin_mut!(stream);
        let mut handled = 0;
        while let Some(message) = stream.next().await {
            self.handle_message(&message).await;
            handled += 1;
        }
        info!(handled, "Event stream ended");
        handled
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod router_tests;
