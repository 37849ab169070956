//! Append-only record of one review.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{CardId, Quality};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub quality: u8,
    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(card_id: impl Into<CardId>, quality: Quality, timestamp: DateTime<Utc>) -> Self {
        Self {
            card_id: card_id.into(),
            quality: quality.value(),
            timestamp,
        }
    }

    /// ISO-8601 timestamp with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
