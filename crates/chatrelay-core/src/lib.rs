//! Business logic and port (trait) definitions for chatrelay.
//!
//! This crate defines the traits the infrastructure layer implements
//! (`ChatRepository`, `LlmProvider`, `SearchProvider`) and the logic built
//! on them. It depends only on `chatrelay-types` -- never on
//! `chatrelay-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod research;
pub mod search;

#[cfg(test)]
mod testing;
