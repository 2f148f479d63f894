//! HTTP request handlers for the REST API.

pub mod chat;
pub mod conversation;
pub mod title;

use uuid::Uuid;

use chatrelay_types::llm::ProviderKind;

use crate::http::error::AppError;

/// Parse a UUID from a path or body field, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.trim()
        .parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Parse an optional provider selector; blank means "use the default".
fn parse_provider(raw: Option<&str>) -> Result<Option<ProviderKind>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(AppError::Validation),
        None => Ok(None),
    }
}
