//! Error types for Coursemate
//!
//! Centralized error handling using thiserror. Tool failures have their own
//! type (`tools::ToolError`) because they never leave the orchestrator.

use thiserror::Error;

/// All error types that can surface to a caller of Coursemate
#[derive(Debug, Error)]
pub enum CoursemateError {
    /// Language-model endpoint unreachable or rejected the request
    #[error("LLM error: {0}")]
    Llm(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Session store failure
    #[error("Session error: {0}")]
    Session(String),

    /// Course catalog could not be loaded
    #[error("Search error: {0}")]
    Search(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Coursemate operations
pub type Result<T> = std::result::Result<T, CoursemateError>;
