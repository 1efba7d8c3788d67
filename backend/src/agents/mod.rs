//! The agents of the crew.
//!
//! Each agent is constructed once with its dependencies and reacts to one
//! kind of event. Decisions live in plain functions that can be tested
//! without a bus; `handle` wraps them with publishing and logging and returns
//! the envelope it published, if any.
//!
//! | Agent | Consumes | Publishes |
//! |---|---|---|
//! | [`ForecastProducer`] | `data_uploaded` | `prediction_ready` |
//! | [`OptimizationDeriver`] | `prediction_ready` | `optimized_plan` |
//! | [`AlertDecider`] | `prediction_ready`, `optimized_plan` | `alert_sent` |
//! | [`LogisticsDispatcher`] | `optimized_plan` | `job_created` |

pub mod alerting;
pub mod forecasting;
pub mod logistics;
pub mod optimization;

use crate::bus::{publish_event, EventBus};
use crate::events::EventEnvelope;

pub use alerting::{AlertDecider, ADMIN_RECIPIENT, LOGISTICS_RECIPIENT};
pub use forecasting::ForecastProducer;
pub use logistics::LogisticsDispatcher;
pub use optimization::{derive_plan, OptimizationDeriver};

/// Publish `envelope` and hand it back when the bus accepted it.
pub(crate) async fn emit(bus: &dyn EventBus, envelope: EventEnvelope) -> Option<EventEnvelope> {
    publish_event(bus, &envelope).await.then_some(envelope)
}

/// Render a float the way the channel's other producers do: always with a
/// fractional part (`100.0`, `90.5`).
pub(crate) fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::format_value;

    #[test]
    fn test_format_value_keeps_fraction() {
        assert_eq!(format_value(100.0), "100.0");
        assert_eq!(format_value(90.5), "90.5");
        assert_eq!(format_value(-3.0), "-3.0");
    }
}
