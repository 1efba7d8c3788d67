//! HTTP handlers for the REST API.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::{
    HealthResponse, SeverityListResponse, SeverityQuery, UploadAccepted, UploadRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::events::{DataUploaded, EventEnvelope, EventPayload};
use crate::severity::ScanReport;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 500;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        bus: state.bus.describe(),
    }))
}

/// POST /v1/uploads
///
/// Publish a `data_uploaded` event for the given series. The forecast runs
/// asynchronously once the router picks the event up.
pub async fn create_upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadAccepted>), AppError> {
    let hospital_id = request.hospital_id.trim();
    let file_path = request.file_path.trim();
    if hospital_id.is_empty() {
        return Err(AppError::BadRequest("hospital_id is required".to_string()));
    }
    if file_path.is_empty() {
        return Err(AppError::BadRequest("file_path is required".to_string()));
    }

    let envelope = EventEnvelope::new(
        hospital_id,
        EventPayload::DataUploaded(DataUploaded {
            file_path: Some(file_path.to_string()),
        }),
    );
    state.bus.publish(&envelope).await?;
    info!(hospital_id, file_path, "Upload announced");

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAccepted {
            event_type: envelope.event_type().to_string(),
            hospital_id: envelope.hospital_id.clone(),
            ts: envelope.ts,
        }),
    ))
}

/// GET /v1/severity?limit=N
///
/// Most recent severity records, newest first.
pub async fn list_severity(
    State(state): State<AppState>,
    Query(query): Query<SeverityQuery>,
) -> HandlerResult<SeverityListResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let records = state.sink.recent(limit).await?;
    let total = records.len();
    Ok(Json(SeverityListResponse { records, total }))
}

/// POST /v1/severity/scan
///
/// Run a severity scan now and return its report.
pub async fn run_severity_scan(State(state): State<AppState>) -> HandlerResult<ScanReport> {
    let scanner = state
        .scanner
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("severity scan is not configured".to_string()))?;
    let report = scanner.run_scan().await?;
    Ok(Json(report))
}
