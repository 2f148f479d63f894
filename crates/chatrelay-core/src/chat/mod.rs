//! Conversations and chat turns.
//!
//! - `repository`: the persistence port implemented by chatrelay-infra
//! - `service`: owner-scoped conversation and message operations
//! - `window`: history windowing by character budget
//! - `prompt`: prompt templates
//! - `title`: LLM title generation
//! - `orchestrator`: the streaming chat turn

pub mod orchestrator;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod title;
pub mod window;
