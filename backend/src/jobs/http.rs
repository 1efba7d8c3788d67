//! reqwest-backed job client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{JobClient, JobResponse};
use crate::config::JobSettings;
use crate::error::{CrewError, CrewResult, ErrorContext};
use crate::events::JobRequest;

/// Posts job requests as JSON to `{server_url}/api/jobs`.
#[derive(Debug, Clone)]
pub struct HttpJobClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpJobClient {
    /// Build a client with a per-call timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> CrewResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CrewError::configuration(format!("failed to build HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings(settings: &JobSettings) -> CrewResult<Self> {
        Self::new(settings.endpoint(), settings.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl JobClient for HttpJobClient {
    async fn create_job(&self, request: &JobRequest) -> CrewResult<JobResponse> {
        let context = || {
            ErrorContext::new("create_job")
                .with_entity("hospital")
                .with_entity_id(&request.hospital_id)
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CrewError::from(e).with_context(context()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CrewError::from(e).with_context(context()))?;
        debug!(status, endpoint = %self.endpoint, "Job server answered");
        Ok(JobResponse { status, body })
    }
}
