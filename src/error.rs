//! Error taxonomy for the menu pipeline.
//!
//! Every variant except [`DataUnavailable`] is recovered inside the pipeline by
//! falling through to the next source; only `DataUnavailable` reaches the
//! presentation layer.
use thiserror::Error;

/// Payload shape is wrong; the whole payload is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed payload")]
    MalformedPayload,
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),
}

/// Remote source failed at some step of the single fetch attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("menu endpoint is not configured")]
    MissingEndpoint,
    #[error("invalid menu endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("menu endpoint returned status {0}")]
    Status(u16),
    #[error("menu endpoint returned a non-JSON body")]
    NotJson,
}

/// Persistence read or write failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("stored value could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// All sources (remote, cache, bundled default) were exhausted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("menu data is unavailable")]
pub struct DataUnavailable;
