//! HTTP API layer for chatrelay.
//!
//! Axum-based API at `/api/v1/` with API key authentication, envelope
//! responses, SSE chat streaming, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
