//! In-memory job client for tests and local development.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{JobClient, JobResponse};
use crate::error::{CrewError, CrewResult};
use crate::events::JobRequest;

/// Records every request and answers with a fixed status and a fresh job id,
/// or fails every call when built with [`InMemoryJobClient::failing`].
#[derive(Clone)]
pub struct InMemoryJobClient {
    requests: Arc<RwLock<Vec<JobRequest>>>,
    status: u16,
    failure: Option<String>,
}

impl InMemoryJobClient {
    /// Answer every request with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            status,
            failure: None,
        }
    }

    /// Fail every request with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(0)
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<JobRequest> {
        self.requests.read().clone()
    }
}

impl Default for InMemoryJobClient {
    fn default() -> Self {
        Self::new(201)
    }
}

#[async_trait]
impl JobClient for InMemoryJobClient {
    async fn create_job(&self, request: &JobRequest) -> CrewResult<JobResponse> {
        self.requests.write().push(request.clone());
        match &self.failure {
            Some(message) => Err(CrewError::transport(message.clone()).with_operation("create_job")),
            None => Ok(JobResponse {
                status: self.status,
                body: serde_json::json!({
                    "id": Uuid::new_v4(),
                    "status": "queued",
                    "hospitalId": request.hospital_id,
                })
                .to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> JobRequest {
        JobRequest {
            kind: "oxygen_delivery".to_string(),
            hospital_id: "H1".to_string(),
            quantity: 1,
            priority: "high".to_string(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_records_requests_and_assigns_ids() {
        let client = InMemoryJobClient::default();
        let first = client.create_job(&request()).await.unwrap();
        let second = client.create_job(&request()).await.unwrap();

        assert_eq!(first.status, 201);
        let a: serde_json::Value = serde_json::from_str(&first.body).unwrap();
        let b: serde_json::Value = serde_json::from_str(&second.body).unwrap();
        assert_eq!(a["hospitalId"], "H1");
        assert_ne!(a["id"], b["id"]);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_client_still_records() {
        let client = InMemoryJobClient::failing("refused");
        let err = client.create_job(&request()).await.unwrap_err();
        assert!(matches!(err, CrewError::Transport { .. }));
        assert_eq!(client.requests().len(), 1);
    }
}
