//! Selection of the cards due for review on a given day.
//!
//! Dates are compared as `NaiveDate`, which orders chronologically. The same
//! dates are persisted as zero-padded `YYYY-MM-DD` text, and for that format
//! byte-wise string order equals chronological order, so a text comparison in
//! storage agrees with the comparison made here.
use std::collections::HashMap;

use chrono::NaiveDate;

use super::{Card, CardId, StatePatch};

/// The date a card next becomes due: its stored `next_review` if one exists,
/// otherwise the catalog default.
pub fn effective_next_review(card: &Card, stored: Option<&StatePatch>) -> NaiveDate {
    stored
        .and_then(|patch| patch.next_review)
        .unwrap_or(card.defaults.next_review)
}

/// Cards whose effective next review is on or before `today`, in catalog order.
pub fn select_due<'a>(
    catalog: &'a [Card],
    metadata: &HashMap<CardId, StatePatch>,
    today: NaiveDate,
) -> Vec<&'a Card> {
    catalog
        .iter()
        .filter(|card| effective_next_review(card, metadata.get(&card.id)) <= today)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, SchedulingState};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn card(id: &str, next_review: &str) -> Card {
        Card {
            id: id.to_string(),
            unit: "Unit 1".to_string(),
            difficulty: Difficulty::Standard,
            question_content: format!("question {}", id),
            solution_content: String::new(),
            initial_code: None,
            defaults: SchedulingState {
                next_review: date(next_review),
                ..SchedulingState::default()
            },
        }
    }

    fn stored_date(next_review: &str) -> StatePatch {
        StatePatch {
            next_review: Some(date(next_review)),
            ..StatePatch::default()
        }
    }

    #[test]
    fn test_unreviewed_past_default_is_due() {
        let catalog = vec![card("1", "2024-01-01")];
        let due = select_due(&catalog, &HashMap::new(), date("2024-05-01"));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_due_on_the_day_itself() {
        let catalog = vec![card("1", "2024-05-01")];
        let due = select_due(&catalog, &HashMap::new(), date("2024-05-01"));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_stored_future_date_excludes() {
        let catalog = vec![card("1", "2024-01-01"), card("2", "2024-01-01")];
        let mut metadata = HashMap::new();
        metadata.insert("2".to_string(), stored_date("2024-06-01"));

        let due = select_due(&catalog, &metadata, date("2024-05-01"));
        let ids: Vec<_> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_stored_past_date_overrides_future_default() {
        let catalog = vec![card("1", "2030-01-01")];
        let mut metadata = HashMap::new();
        metadata.insert("1".to_string(), stored_date("2024-04-30"));
        assert_eq!(select_due(&catalog, &metadata, date("2024-05-01")).len(), 1);
    }

    #[test]
    fn test_notes_only_record_uses_default_date() {
        let catalog = vec![card("1", "2030-01-01")];
        let mut metadata = HashMap::new();
        metadata.insert("1".to_string(), StatePatch::notes_only("todo"));
        assert!(select_due(&catalog, &metadata, date("2024-05-01")).is_empty());
    }

    #[test]
    fn test_keeps_catalog_order() {
        let catalog = vec![
            card("c", "2024-03-01"),
            card("a", "2024-01-01"),
            card("b", "2024-02-01"),
        ];
        let due = select_due(&catalog, &HashMap::new(), date("2024-05-01"));
        let ids: Vec<_> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_text_order_matches_date_order() {
        let days = ["2023-12-31", "2024-01-09", "2024-01-10", "2024-10-01"];
        for pair in days.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(date(pair[0]) < date(pair[1]));
        }
    }
}
