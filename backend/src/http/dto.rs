//! Data Transfer Objects for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::SeverityRecord;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Event transport in use
    pub bus: String,
}

/// Request body announcing a new historical series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub hospital_id: String,
    #[serde(default, alias = "series_source")]
    pub file_path: String,
}

/// Response for an accepted upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAccepted {
    pub event_type: String,
    pub hospital_id: String,
    /// Timestamp of the published `data_uploaded` event
    pub ts: DateTime<Utc>,
}

/// Query parameters for the severity listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityQuery {
    /// Maximum number of records (default 20, capped at 500)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Severity record listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityListResponse {
    pub records: Vec<SeverityRecord>,
    pub total: usize,
}
