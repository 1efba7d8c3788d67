//! Logistics dispatcher: files one delivery job per actionable plan.

use std::sync::Arc;

use tracing::{error, info};

use super::emit;
use crate::bus::EventBus;
use crate::events::{EventEnvelope, EventPayload, JobCreated, JobRequest, OptimizedPlan, PlanEntry};
use crate::jobs::{JobClient, JobResponse};

/// Status recorded when the job call itself failed.
pub const FAILED_CALL_STATUS: u16 = 500;

/// Job request for the first `request_tanker` entry of `plan`.
pub fn select_job(hospital_id: &str, plan: &[PlanEntry]) -> Option<JobRequest> {
    plan.iter().find_map(|entry| match entry {
        PlanEntry::RequestTanker { quantity, reason } => Some(JobRequest {
            kind: "oxygen_delivery".to_string(),
            hospital_id: hospital_id.to_string(),
            quantity: *quantity,
            priority: "high".to_string(),
            notes: reason.clone(),
        }),
        _ => None,
    })
}

/// Submits tanker requests to the job server and records each attempt.
#[derive(Clone)]
pub struct LogisticsDispatcher {
    jobs: Arc<dyn JobClient>,
    bus: Arc<dyn EventBus>,
}

impl LogisticsDispatcher {
    pub fn new(jobs: Arc<dyn JobClient>, bus: Arc<dyn EventBus>) -> Self {
        Self { jobs, bus }
    }

    /// Dispatch the first tanker request of `plan`, if any, and publish
    /// `job_created` whether or not the job server accepted it.
    pub async fn handle(&self, hospital_id: &str, plan: &OptimizedPlan) -> Option<EventEnvelope> {
        let request = select_job(hospital_id, &plan.plan)?;

        let response = match self.jobs.create_job(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(hospital_id, error = %e, "Job creation call failed");
                JobResponse {
                    status: FAILED_CALL_STATUS,
                    body: e.to_string(),
                }
            }
        };
        info!(
            hospital_id,
            quantity = request.quantity,
            status = response.status,
            body = %response.body,
            "Job created"
        );

        let envelope = EventEnvelope::new(
            hospital_id,
            EventPayload::JobCreated(JobCreated {
                job_payload: request,
                server_status: response.status,
            }),
        );
        emit(self.bus.as_ref(), envelope).await
    }
}
