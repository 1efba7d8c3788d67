//! Optimization deriver: turns a forecast into a resource plan.

use std::sync::Arc;

use tracing::debug;

use super::{emit, format_value};
use crate::bus::EventBus;
use crate::events::{EventEnvelope, EventPayload, ForecastPoint, OptimizedPlan, PlanEntry, PredictionReady};

/// Guards the growth ratio against a zero reference.
const EPSILON: f64 = 1e-6;

/// Growth over the reference forecast, in percent, above which a tanker is
/// requested even below the threshold.
const GROWTH_TRIGGER_PCT: f64 = 20.0;

/// One tanker per this much predicted demand above the threshold.
const DEMAND_PER_TANKER: f64 = 10.0;

/// Derive the single-entry plan for a forecast.
///
/// The reference point is the first forecast value, not the last observed
/// actual. Returns `None` for an empty forecast.
pub fn derive_plan(predictions: &[ForecastPoint], threshold: f64) -> Option<Vec<PlanEntry>> {
    let first = predictions.first()?.yhat;
    let max_pred = predictions
        .iter()
        .map(|p| p.yhat)
        .fold(f64::NEG_INFINITY, f64::max);
    let increase_pct = (max_pred - first) / (first + EPSILON) * 100.0;

    let entry = if increase_pct > GROWTH_TRIGGER_PCT || max_pred >= threshold {
        let shortfall = (max_pred - threshold).max(0.0);
        let quantity = ((shortfall / DEMAND_PER_TANKER).floor() as u32).max(1);
        PlanEntry::RequestTanker {
            quantity,
            reason: format!(
                "predicted increase {:.1}% or max {}",
                increase_pct,
                format_value(max_pred)
            ),
        }
    } else {
        PlanEntry::NoAction {
            reason: "predicted demand within threshold".to_string(),
        }
    };
    Some(vec![entry])
}

/// Publishes `optimized_plan` for every non-empty forecast.
#[derive(Clone)]
pub struct OptimizationDeriver {
    threshold: f64,
    bus: Arc<dyn EventBus>,
}

impl OptimizationDeriver {
    pub fn new(threshold: f64, bus: Arc<dyn EventBus>) -> Self {
        Self { threshold, bus }
    }

    pub async fn handle(&self, hospital_id: &str, ready: &PredictionReady) -> Option<EventEnvelope> {
        let Some(plan) = derive_plan(&ready.predictions, self.threshold) else {
            debug!(hospital_id, "Empty forecast; no plan derived");
            return None;
        };
        let envelope = EventEnvelope::new(
            hospital_id,
            EventPayload::OptimizedPlan(OptimizedPlan { plan }),
        );
        emit(self.bus.as_ref(), envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn forecast(values: &[f64]) -> Vec<ForecastPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let ds = NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap();
                ForecastPoint::new(ds, y, y * 0.95, y * 1.05)
            })
            .collect()
    }

    #[test]
    fn test_breach_requests_two_tankers() {
        let plan = derive_plan(&forecast(&[100.0; 5]), 80.0).unwrap();
        assert_eq!(
            plan,
            vec![PlanEntry::RequestTanker {
                quantity: 2,
                reason: "predicted increase 0.0% or max 100.0".into()
            }]
        );
    }

    #[test]
    fn test_flat_demand_below_threshold() {
        let plan = derive_plan(&forecast(&[50.0; 5]), 80.0).unwrap();
        assert_eq!(
            plan,
            vec![PlanEntry::NoAction {
                reason: "predicted demand within threshold".into()
            }]
        );
    }

    #[test]
    fn test_growth_triggers_minimum_request() {
        // 40 -> 50 is +25% but still under the threshold: one tanker.
        let plan = derive_plan(&forecast(&[40.0, 45.0, 50.0, 48.0, 42.0]), 80.0).unwrap();
        match &plan[0] {
            PlanEntry::RequestTanker { quantity, reason } => {
                assert_eq!(*quantity, 1);
                assert_eq!(reason, "predicted increase 25.0% or max 50.0");
            }
            other => panic!("unexpected plan entry {:?}", other),
        }
    }

    #[test]
    fn test_reference_is_first_forecast_not_minimum() {
        // Growth is measured against index 0 (60), not the minimum (30).
        let plan = derive_plan(&forecast(&[60.0, 30.0, 65.0, 40.0, 50.0]), 80.0).unwrap();
        assert!(plan[0].is_no_action());
    }

    #[test]
    fn test_large_shortfall() {
        let plan = derive_plan(&forecast(&[80.0, 90.0, 125.5]), 80.0).unwrap();
        assert!(matches!(plan[0], PlanEntry::RequestTanker { quantity: 4, .. }));
    }

    #[test]
    fn test_empty_forecast_yields_nothing() {
        assert_eq!(derive_plan(&[], 80.0), None);
    }
}
