//! HTTP ingress for the crew.
//!
//! A small axum API next to the bus subscriber. It lets an uploader announce
//! a new series without talking to the bus directly, and exposes the
//! severity scan results.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                   │
//! │  - request validation, JSON, CORS, tracing    │
//! └───────────────────┬──────────────────────────┘
//!                     │ publish data_uploaded
//! ┌───────────────────▼──────────────────────────┐
//! │  Event bus  ──►  EventRouter  ──►  agents     │
//! └──────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
