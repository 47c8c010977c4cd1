//! Error types for the Topic Tree
//!
//! Provides structured error types for topic parsing, the strict tree
//! operations, and configuration loading.

use thiserror::Error;

/// Unified error type for the topic tree
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Topic Errors
    // =========================================================================
    #[error("Invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    #[error("Topic already exists: {topic}")]
    TopicExists { topic: String },

    #[error("Topic not found: {topic}")]
    TopicNotFound { topic: String },

    #[error("Node has been removed from the tree")]
    StaleNode,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error means a path could not be resolved
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TopicNotFound { .. } | Error::StaleNode)
    }

    /// Check if this error is a duplicate-create conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::TopicExists { .. })
    }

    /// Check if this error was caused by caller input rather than tree state
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidTopic { .. }
                | Error::Configuration(_)
                | Error::YamlParse(_)
                | Error::JsonParse(_)
        )
    }
}

/// Result type alias for the topic tree
pub type Result<T> = std::result::Result<T, Error>;
