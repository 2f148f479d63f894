//! Shared domain types for chatrelay.
//!
//! Conversations, messages, LLM request/stream shapes, research citations,
//! configuration, and the error enums every layer shares.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod research;
