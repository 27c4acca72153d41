//! Error Handling
//!
//! Unified error types for the persistence core.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A data operation was invoked before store setup completed
    #[error("Database not set up")]
    DatabaseNotSetUp,

    /// No schema is registered for the requested store name
    #[error("Could not find schema for store {0}")]
    SchemaNotFound(String),

    /// The store schema failed to apply or validate
    #[error("Invalid store schema: {0}")]
    SchemaInvalid(String),

    /// The shared container directory could not be resolved
    #[error("Store location unavailable: {0}")]
    StoreLocation(String),

    /// The seed store to copy on first run is missing
    #[error("Seed store not found: {0}")]
    SeedNotFound(String),

    /// A lookup that must succeed came back empty
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// An entity field required for persistence was absent
    #[error("Required parameter missing to save entity: {0}")]
    MissingDetail(String),

    /// Underlying store write failure during the save chain
    #[error("Error occurred while saving: {0}")]
    Save(String),

    /// A fetch returned rows of an unexpected shape
    #[error("Query returned an unexpected row shape: {0}")]
    ShapeMismatch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite errors (auto-converted from rusqlite::Error)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a save error
    pub fn save(msg: impl Into<String>) -> Self {
        Self::Save(msg.into())
    }

    /// Create a schema-invalid error
    pub fn schema_invalid(msg: impl Into<String>) -> Self {
        Self::SchemaInvalid(msg.into())
    }

    /// Create a store-location error
    pub fn store_location(msg: impl Into<String>) -> Self {
        Self::StoreLocation(msg.into())
    }

    /// Create a shape-mismatch error
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create a missing-detail error
    pub fn missing_detail(field: impl Into<String>) -> Self {
        Self::MissingDetail(field.into())
    }
}
