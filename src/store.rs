//! Read/write contract between the scheduler's caller and persistence.
//!
//! The stores are injected wherever they are needed; the SQLite
//! implementation lives in [`crate::database::db`].

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::StoreError;
use crate::models::{Card, CardId, FavoriteSet, ReviewEvent, StatePatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-card scheduling state of one user.
pub trait MetadataStore {
    /// Stored record for a card, `None` if it was never written.
    fn get(&self, card_id: &str) -> StoreResult<Option<StatePatch>>;

    fn load_all(&self) -> StoreResult<HashMap<CardId, StatePatch>>;

    /// Merge-write: only the `Some` fields of `patch` are overwritten.
    fn put(&self, card_id: &str, patch: &StatePatch) -> StoreResult<()>;

    /// Overwrites the stored record of every catalog card in `unit` with the
    /// card's defaults. Returns how many records were reset.
    fn reset_unit(&self, catalog: &[Card], unit: &str) -> StoreResult<usize>;

    /// [`MetadataStore::reset_unit`] for every unit.
    fn reset_all(&self, catalog: &[Card]) -> StoreResult<usize>;
}

pub trait FavoritesStore {
    fn favorites(&self) -> StoreResult<FavoriteSet>;

    /// Adds the card if absent, removes it if present; returns the new set.
    fn toggle_favorite(&self, card_id: &str) -> StoreResult<FavoriteSet>;
}

pub trait ReviewLog {
    fn append(&self, event: &ReviewEvent) -> StoreResult<()>;

    /// All events, newest first.
    fn history(&self) -> StoreResult<Vec<ReviewEvent>>;
}

/// How often a failed metadata write is attempted before giving up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn no_backoff(attempts: u32) -> Self {
        Self {
            attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Writes `patch`, retrying per `policy`. Returns the last error once every
/// attempt has failed.
pub fn put_with_retry<S: MetadataStore + ?Sized>(
    store: &S,
    card_id: &str,
    patch: &StatePatch,
    policy: &RetryPolicy,
) -> StoreResult<()> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.put(card_id, patch) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                warn!(
                    "Saving card {} failed (attempt {}/{}): {}",
                    card_id, attempt, attempts, e
                );
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Stored metadata for building a deck.
#[derive(Debug, Default)]
pub struct MetadataSnapshot {
    pub states: HashMap<CardId, StatePatch>,
    /// The read failed and `states` is empty, so every card is on its catalog
    /// defaults. Nothing computed from this snapshot reflects saved progress.
    pub degraded: bool,
}

/// Loads all metadata; on failure falls back to catalog defaults and flags
/// the snapshot as degraded instead of blocking study.
pub fn load_metadata<S: MetadataStore + ?Sized>(store: &S) -> MetadataSnapshot {
    match store.load_all() {
        Ok(states) => {
            debug!("Loaded stored progress for {} cards", states.len());
            MetadataSnapshot {
                states,
                degraded: false,
            }
        }
        Err(e) => {
            warn!("Could not load stored progress, using catalog defaults: {}", e);
            MetadataSnapshot {
                states: HashMap::new(),
                degraded: true,
            }
        }
    }
}
