//! Observability setup for chatrelay: the tracing subscriber and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
