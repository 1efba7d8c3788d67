//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::CrewError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Pipeline error
    Crew(CrewError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Crew(e) => {
                let (status, code) = match &e {
                    CrewError::Input { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "INPUT_ERROR"),
                    CrewError::Transport { .. } => (StatusCode::SERVICE_UNAVAILABLE, "TRANSPORT_ERROR"),
                    CrewError::Model { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR"),
                    CrewError::Configuration { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                    }
                    CrewError::Serialization { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR")
                    }
                };
                let mut body = ApiError::new(code, e.to_string());
                if let Some(op) = &e.context().operation {
                    body = body.with_details(format!("operation={}", op));
                }
                (status, body)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<CrewError> for AppError {
    fn from(err: CrewError) -> Self {
        AppError::Crew(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
