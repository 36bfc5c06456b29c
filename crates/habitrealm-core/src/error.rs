//! Core error types for habitrealm-core.
//!
//! The pure calculators (streaks, points, trophies) are total and never fail.
//! Errors only arise at the edges: validating caller input, spending currency,
//! importing foreign documents and talking to the on-disk store.

use std::path::PathBuf;
use thiserror::Error;

use crate::habit::HabitId;

/// Core error type for habitrealm-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Collectible purchase/apply errors
    #[error("Collectible error: {0}")]
    Collectible(#[from] CollectibleError),

    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored snapshot could not be decoded
    #[error("Stored state under '{key}' is corrupt: {message}")]
    CorruptState { key: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Habit names must contain something other than whitespace
    #[error("Habit name must not be empty")]
    EmptyName,

    /// No habit with the given id exists
    #[error("Habit not found: {0}")]
    HabitNotFound(HabitId),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while buying or equipping cosmetics.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CollectibleError {
    #[error("Collectible '{0}' is already owned")]
    AlreadyOwned(String),

    #[error("Not enough points: '{id}' costs {cost}, {available} available")]
    InsufficientPoints { id: String, cost: u64, available: u64 },

    #[error("Collectible '{0}' is not owned")]
    NotOwned(String),
}

/// Errors raised when an import document is rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Malformed JSON, missing discriminator or missing required sections
    #[error("Malformed import document: {0}")]
    Format(String),

    /// Well-formed document produced by some other application
    #[error("Import document not recognized (app = '{found}')")]
    NotRecognized { found: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
