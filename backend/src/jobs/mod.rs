//! Client for the external job-creation endpoint.
//!
//! The logistics agent files one job per tanker request. The endpoint is
//! opaque to this crate: any HTTP status is a valid answer and the body is
//! kept as text.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CrewResult;
use crate::events::JobRequest;

pub use self::http::HttpJobClient;
pub use memory::InMemoryJobClient;

/// Status and body returned by the job server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResponse {
    pub status: u16,
    pub body: String,
}

impl JobResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Files job requests with an external service.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Submit one job request.
    ///
    /// # Errors
    /// `Transport` when the request could not be sent or timed out. A
    /// non-2xx answer is not an error.
    async fn create_job(&self, request: &JobRequest) -> CrewResult<JobResponse>;
}
