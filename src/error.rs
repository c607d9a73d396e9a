//! Error types for Tanbih.

use uuid::Uuid;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence-layer errors. Callers may retry; the engine never does.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Task-field validation errors. Recovered at the request boundary,
/// never persisted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown task category: {0}")]
    UnknownCategory(String),

    #[error("Unknown task frequency: {0}")]
    UnknownFrequency(String),

    #[error("Missing required field: {0}")]
    EmptyField(&'static str),
}

/// Errors from task lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid task: {0}")]
    Validation(#[from] ValidationError),

    #[error("Task not found: {id}")]
    NotFound { id: Uuid },

    /// The onboarding batch could not be persisted as a unit. Task ids
    /// are deterministic per owner, so retrying the whole batch is safe.
    #[error("Onboarding batch of {expected} tasks failed: {source}")]
    Batch {
        expected: usize,
        #[source]
        source: StoreError,
    },

    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
