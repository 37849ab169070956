//! Practice session over a built deck.
//! Walks the deck card by card and grades each one through the review workflow.

use super::{Card, Quality};
use crate::error::ReviewError;
use crate::review::{ReviewClock, ReviewOutcome, record_review};
use crate::store::{MetadataStore, RetryPolicy, ReviewLog};

/// Cursor over a deck. Each card is graded at most once per session.
pub struct StudySession {
    pub deck: Vec<Card>,
    pub current_index: usize,
    pub show_solution: bool,
    pub graded: usize,
    finished: bool,
}

impl StudySession {
    /// Returns `None` for an empty deck; there is nothing to study.
    pub fn new(deck: Vec<Card>) -> Option<Self> {
        if deck.is_empty() {
            return None;
        }
        Some(Self {
            deck,
            current_index: 0,
            show_solution: false,
            graded: 0,
            finished: false,
        })
    }

    pub fn current_card(&self) -> Option<&Card> {
        if self.finished {
            return None;
        }
        self.deck.get(self.current_index)
    }

    pub fn toggle_solution(&mut self) {
        self.show_solution = !self.show_solution;
    }

    /// Moves forward; stays on the last card.
    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.deck.len() {
            self.current_index += 1;
            self.show_solution = false;
        }
    }

    /// Moves back; stays on the first card.
    pub fn previous_card(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.show_solution = false;
        }
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.deck.len()
    }

    /// Grades the current card, persists it, then advances. Grading the last
    /// card finishes the session.
    pub fn grade_current_card<S>(
        &mut self,
        store: &S,
        quality: Quality,
        clock: ReviewClock,
        retry: &RetryPolicy,
    ) -> Result<ReviewOutcome, ReviewError>
    where
        S: MetadataStore + ReviewLog + ?Sized,
    {
        let card = self.current_card().ok_or(ReviewError::NoCurrentCard)?;
        let outcome = record_review(store, card, quality, clock, retry)?;

        self.graded += 1;
        if self.is_last() {
            self.finished = true;
        } else {
            self.next_card();
        }
        Ok(outcome)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn total_count(&self) -> usize {
        self.deck.len()
    }

    pub fn progress_message(&self) -> String {
        format!("Card {} of {}", self.current_index + 1, self.total_count())
    }
}
