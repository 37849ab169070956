//! Per-card scheduling state tracked across reviews.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASINESS: f64 = 2.5;
pub const MIN_EASINESS: f64 = 1.3;

/// Scheduling fields for one card of one user.
///
/// Invariants kept by [`crate::models::sm2::apply`]: `easiness >= 1.3`,
/// `interval >= 1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_easiness")]
    pub easiness: f64,
    /// Serialized as `YYYY-MM-DD`.
    #[serde(default = "default_next_review")]
    pub next_review: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

fn default_interval() -> u32 {
    1
}

fn default_easiness() -> f64 {
    DEFAULT_EASINESS
}

/// Cards without a date are due immediately.
fn default_next_review() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            repetitions: 0,
            interval: default_interval(),
            easiness: DEFAULT_EASINESS,
            next_review: default_next_review(),
            notes: String::new(),
        }
    }
}

/// A partial [`SchedulingState`].
///
/// Stored records are patches: a card may have only notes saved, or a record
/// written before a field existed. Writing a patch overwrites only the `Some`
/// fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatePatch {
    pub repetitions: Option<u32>,
    pub interval: Option<u32>,
    pub easiness: Option<f64>,
    pub next_review: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl StatePatch {
    pub fn notes_only(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// Effective state: each stored field wins, missing ones come from `defaults`.
    pub fn resolve(&self, defaults: &SchedulingState) -> SchedulingState {
        SchedulingState {
            repetitions: self.repetitions.unwrap_or(defaults.repetitions),
            interval: self.interval.unwrap_or(defaults.interval),
            easiness: self.easiness.unwrap_or(defaults.easiness),
            next_review: self.next_review.unwrap_or(defaults.next_review),
            notes: self.notes.clone().unwrap_or_else(|| defaults.notes.clone()),
        }
    }

    /// Merge `other` on top of `self`, field by field.
    pub fn merge(&mut self, other: &StatePatch) {
        if other.repetitions.is_some() {
            self.repetitions = other.repetitions;
        }
        if other.interval.is_some() {
            self.interval = other.interval;
        }
        if other.easiness.is_some() {
            self.easiness = other.easiness;
        }
        if other.next_review.is_some() {
            self.next_review = other.next_review;
        }
        if other.notes.is_some() {
            self.notes = other.notes.clone();
        }
    }
}

impl From<&SchedulingState> for StatePatch {
    fn from(state: &SchedulingState) -> Self {
        Self {
            repetitions: Some(state.repetitions),
            interval: Some(state.interval),
            easiness: Some(state.easiness),
            next_review: Some(state.next_review),
            notes: Some(state.notes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_falls_back_per_field() {
        let defaults = SchedulingState {
            repetitions: 0,
            interval: 1,
            easiness: 2.5,
            next_review: date("2024-01-01"),
            notes: "default note".to_string(),
        };
        let patch = StatePatch {
            interval: Some(6),
            next_review: Some(date("2024-02-10")),
            ..StatePatch::default()
        };

        let state = patch.resolve(&defaults);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval, 6);
        assert_eq!(state.easiness, 2.5);
        assert_eq!(state.next_review, date("2024-02-10"));
        assert_eq!(state.notes, "default note");
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let full = SchedulingState {
            repetitions: 3,
            interval: 15,
            easiness: 2.36,
            next_review: date("2024-03-01"),
            notes: String::new(),
        };
        let mut stored = StatePatch::from(&full);
        stored.merge(&StatePatch::notes_only("use a deque"));

        assert_eq!(stored.repetitions, Some(3));
        assert_eq!(stored.interval, Some(15));
        assert_eq!(stored.notes.as_deref(), Some("use a deque"));
    }

    #[test]
    fn test_state_serializes_date_as_plain_day() {
        let state = SchedulingState {
            next_review: date("2024-07-04"),
            ..SchedulingState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["nextReview"], "2024-07-04");
    }
}
