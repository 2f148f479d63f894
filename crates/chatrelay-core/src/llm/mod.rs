//! LLM provider abstractions for chatrelay.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: selector-indexed lookup of constructed providers

pub mod box_provider;
pub mod provider;
pub mod registry;
