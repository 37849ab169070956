//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an easiness factor (EF) that adjusts after every review
//! - Quality grades 0-2: repetitions reset to 0 and the card comes back tomorrow
//! - Quality grades 3-5: interval grows progressively (1 day → 6 days → interval × EF)
//! - EF is recomputed for every grade, pass or fail, and never falls below 1.3
//! - The interval multiplier is the EF from *before* this review
//! - Intervals are capped at [`MAX_INTERVAL`] days so dates stay four-digit years

use super::{MIN_EASINESS, Quality, SchedulingState};
use chrono::{Days, NaiveDate};

/// Longest interval handed out, roughly a century.
pub const MAX_INTERVAL: u32 = 36_500;

/// Latest date the scheduler ever returns.
fn latest_review() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Calculates the next scheduling state for a review graded `quality` on `today`.
///
/// Pure: the same inputs always give the same output. `notes` is carried over
/// unchanged.
pub fn apply(state: &SchedulingState, quality: Quality, today: NaiveDate) -> SchedulingState {
    let (repetitions, interval) = if !quality.is_pass() {
        (0, 1)
    } else {
        let reps = state.repetitions.saturating_add(1);
        let interval = match reps {
            1 => 1,
            2 => 6,
            _ => (state.interval as f64 * state.easiness).round() as u32,
        };
        (reps, interval.clamp(1, MAX_INTERVAL))
    };

    let easiness = next_easiness(state.easiness, quality);

    SchedulingState {
        repetitions,
        interval,
        easiness,
        next_review: today
            .checked_add_days(Days::new(interval as u64))
            .filter(|date| *date <= latest_review())
            .unwrap_or_else(latest_review),
        notes: state.notes.clone(),
    }
}

/// EF' = max(1.3, EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)))
pub fn next_easiness(easiness: f64, quality: Quality) -> f64 {
    let miss = (Quality::MAX - quality.value()) as f64;
    (easiness + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASINESS)
}
