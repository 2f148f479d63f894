use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in chatrelay-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat pipeline before the response stream opens.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found")]
    ConversationNotFound,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream provider failed: {0}")]
    Upstream(#[from] LlmError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("missing credential: set {env_var} to use the {provider} provider")]
    MissingCredential { provider: String, env_var: String },

    #[error("cannot set up the {provider} provider: {message}")]
    Provider { provider: String, message: String },
}
