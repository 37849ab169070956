//! The review workflow around the pure scheduler: load the card's state,
//! schedule it, persist it and log the event.

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{info, warn};

use crate::error::{ReviewError, StoreError};
use crate::models::{Card, Quality, ReviewEvent, SchedulingState, StatePatch, sm2};
use crate::store::{MetadataStore, ReviewLog, RetryPolicy, put_with_retry};

/// The moment a review is processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewClock {
    /// Local calendar date the next review is counted from.
    pub today: NaiveDate,
    /// Timestamp written to the review log.
    pub now: DateTime<Utc>,
}

impl ReviewClock {
    pub fn system() -> Self {
        Self {
            today: Local::now().date_naive(),
            now: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewOutcome {
    pub previous: SchedulingState,
    pub next: SchedulingState,
    /// The review log append failed; the schedule itself was saved.
    pub log_failed: bool,
}

/// Grades one card and persists the result.
///
/// The stored state must be readable: scheduling from catalog defaults here
/// would overwrite saved progress. The write is retried per `retry`; when it
/// still fails the computed state is returned inside the error.
pub fn record_review<S>(
    store: &S,
    card: &Card,
    quality: Quality,
    clock: ReviewClock,
    retry: &RetryPolicy,
) -> Result<ReviewOutcome, ReviewError>
where
    S: MetadataStore + ReviewLog + ?Sized,
{
    let stored = store.get(&card.id).map_err(|source| ReviewError::LoadFailed {
        card_id: card.id.clone(),
        source,
    })?;
    let previous = match stored {
        Some(patch) => patch.resolve(&card.defaults),
        None => card.default_state(),
    };

    let next = sm2::apply(&previous, quality, clock.today);

    put_with_retry(store, &card.id, &StatePatch::from(&next), retry).map_err(|source| {
        ReviewError::NotSaved {
            card_id: card.id.clone(),
            attempts: retry.attempts.max(1),
            computed: Box::new(next.clone()),
            source,
        }
    })?;

    info!(
        "Card {} graded {}: interval {} day(s), next review {}",
        card.id, quality, next.interval, next.next_review
    );

    let log_failed = match store.append(&ReviewEvent::new(card.id.clone(), quality, clock.now)) {
        Ok(()) => false,
        Err(e) => {
            warn!("Could not log review of card {}: {}", card.id, e);
            true
        }
    };

    Ok(ReviewOutcome {
        previous,
        next,
        log_failed,
    })
}

/// Saves a card's notes without touching its schedule.
pub fn save_notes<S: MetadataStore + ?Sized>(
    store: &S,
    card_id: &str,
    notes: &str,
    retry: &RetryPolicy,
) -> Result<(), StoreError> {
    put_with_retry(store, card_id, &StatePatch::notes_only(notes), retry)
}
