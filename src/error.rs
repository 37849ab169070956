//! Error types shared across the library.

use thiserror::Error;

use crate::models::SchedulingState;

/// Failure talking to a metadata, favorites or review-log store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored value for card {card_id} is invalid: {reason}")]
    Corrupt { card_id: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate card id in catalog: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("quality must be between 0 and 5, got {0}")]
pub struct InvalidQuality(pub i64);

/// Text that could not be read as a quality rating.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseQualityError {
    #[error("'{0}' is not a number, expected a quality from 0 to 5")]
    NotANumber(String),

    #[error(transparent)]
    OutOfRange(#[from] InvalidQuality),
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("could not load progress for card {card_id}: {source}")]
    LoadFailed {
        card_id: String,
        #[source]
        source: StoreError,
    },

    /// The new schedule was computed but every write attempt failed.
    #[error("progress for card {card_id} was not saved after {attempts} attempts: {source}")]
    NotSaved {
        card_id: String,
        attempts: u32,
        computed: Box<SchedulingState>,
        #[source]
        source: StoreError,
    },

    #[error("no card to grade")]
    NoCurrentCard,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}
