//! Infrastructure layer for chatrelay.
//!
//! Contains implementations of the ports defined in `chatrelay-core`:
//! SQLite storage, the OpenAI-compatible LLM provider, the SerpAPI search
//! client, and configuration loading.

pub mod config;
pub mod llm;
pub mod search;
pub mod sqlite;

#[cfg(test)]
mod testing;
