//! # MedLyf Crew
//!
//! Event-driven automation pipeline for hospital-resource forecasting.
//!
//! A set of small agents share one publish/subscribe channel carrying JSON
//! event envelopes. An upload triggers a short-horizon occupancy forecast,
//! the forecast triggers a resource plan and possibly an alert, and a plan
//! that asks for oxygen tankers files a delivery job with the logistics
//! server. A separate periodic scan turns a disease case table into
//! forecast-with-severity records.
//!
//! ## Event flow
//!
//! ```text
//! data_uploaded ──► ForecastProducer ──► prediction_ready
//! prediction_ready ──► OptimizationDeriver ──► optimized_plan
//!                  └─► AlertDecider ──────────► alert_sent
//! optimized_plan ──► LogisticsDispatcher ──► job_created
//!                └─► AlertDecider ──────────► alert_sent
//! ```
//!
//! ## Architecture
//!
//! - [`events`]: envelope and payload contracts, tolerant decoding
//! - [`bus`]: transport trait with Redis and in-process implementations
//! - [`agents`]: the four decision-making agents
//! - [`router`]: sequential dispatch of channel messages to the agents
//! - [`forecast`]: series loading, seasonal model and fallback estimator
//! - [`severity`]: disease table, model registry, classifier, scanner and sinks
//! - [`jobs`]: client for the external job-creation endpoint
//! - [`context`]: immutable model context shared by the agents
//! - [`config`]: defaults, `crew.toml` and environment overrides
//! - [`http`]: axum ingress API (feature `http-server`)

// CrewError carries a structured context on every variant.
#![allow(clippy::result_large_err)]

pub mod agents;
pub mod bus;
pub mod config;
pub mod context;
pub mod dates;
pub mod error;
pub mod events;
pub mod forecast;
pub mod jobs;
pub mod router;
pub mod severity;

#[cfg(feature = "http-server")]
pub mod http;

pub use config::CrewConfig;
pub use context::ModelContext;
pub use error::{CrewError, CrewResult, ErrorContext};
pub use events::{EventEnvelope, EventPayload, EventType};
pub use router::{EventRouter, RouteOutcome};
