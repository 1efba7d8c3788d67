//! Error types for the crew pipeline.
//!
//! Every failure an agent can hit while handling one message maps onto one of
//! the variants below. None of them is fatal to the process: the router logs
//! the error and moves on to the next message.

use std::fmt;

/// Result type for crew operations.
pub type CrewResult<T> = Result<T, CrewError>;

/// Structured context attached to a [`CrewError`].
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g. "read_series", "publish")
    pub operation: Option<String>,
    /// The entity type involved (e.g. "series", "event", "job")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.entity.is_none()
            && self.entity_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for the crew pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    /// Missing or malformed payload fields, unreadable input files.
    #[error("Input error: {message} {context}")]
    Input {
        message: String,
        context: ErrorContext,
    },

    /// Forecasting or classification model failed or is unavailable.
    #[error("Model error: {message} {context}")]
    Model {
        message: String,
        context: ErrorContext,
    },

    /// Bus publish/subscribe or job-call failure.
    #[error("Transport error: {message} {context}")]
    Transport {
        message: String,
        context: ErrorContext,
    },

    /// Invalid configuration file or environment value.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// JSON encode/decode failure.
    #[error("Serialization error: {message} {context}")]
    Serialization {
        message: String,
        context: ErrorContext,
    },
}

impl CrewError {
    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Input { context, .. }
            | Self::Model { context, .. }
            | Self::Transport { context, .. }
            | Self::Configuration { context, .. }
            | Self::Serialization { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Input { context, .. }
            | Self::Model { context, .. }
            | Self::Transport { context, .. }
            | Self::Configuration { context, .. }
            | Self::Serialization { context, .. } => context,
        }
    }

    /// Replace the whole context.
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        *self.context_mut() = context;
        self
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the entity id in the error context.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.context_mut().entity_id = Some(id.to_string());
        self
    }

    /// Whether this is an input-class error (bad payload or unreadable file).
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. })
    }
}

impl From<serde_json::Error> for CrewError {
    fn from(err: serde_json::Error) -> Self {
        CrewError::serialization(err.to_string())
    }
}

impl From<csv::Error> for CrewError {
    fn from(err: csv::Error) -> Self {
        CrewError::input(err.to_string()).with_operation("read_csv")
    }
}

impl From<std::io::Error> for CrewError {
    fn from(err: std::io::Error) -> Self {
        CrewError::input(err.to_string())
    }
}

impl From<reqwest::Error> for CrewError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        CrewError::transport(message).with_operation("http_request")
    }
}

#[cfg(feature = "redis-bus")]
impl From<redis::RedisError> for CrewError {
    fn from(err: redis::RedisError) -> Self {
        CrewError::transport(err.to_string()).with_operation("redis")
    }
}
