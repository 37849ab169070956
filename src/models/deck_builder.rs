//! Builds a practice deck from the due pool and the user's filter choices.
use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{Card, Difficulty, FavoriteSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeckFilters {
    pub selected_units: HashSet<String>,
    pub selected_difficulties: HashSet<Difficulty>,
    /// When set and the favorites set is non-empty, unit and difficulty
    /// selections are ignored.
    pub only_favorites: bool,
}

impl DeckFilters {
    /// Every unit present in `pool` and every difficulty.
    pub fn everything(pool: &[&Card]) -> Self {
        Self {
            selected_units: selectable_units(pool).into_iter().collect(),
            selected_difficulties: Difficulty::ALL.into_iter().collect(),
            only_favorites: false,
        }
    }

    fn matches(&self, card: &Card) -> bool {
        self.selected_units.contains(&card.unit)
            && self.selected_difficulties.contains(&card.difficulty)
    }
}

/// Distinct units of the due pool, first-seen order. Units with nothing due
/// are not offered.
pub fn selectable_units(pool: &[&Card]) -> Vec<String> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|card| seen.insert(card.unit.as_str()))
        .map(|card| card.unit.clone())
        .collect()
}

/// Cards eligible for the deck before sampling.
pub fn candidates<'a>(
    pool: &[&'a Card],
    all_cards: &'a [Card],
    filters: &DeckFilters,
    favorites: &FavoriteSet,
) -> Vec<&'a Card> {
    if filters.only_favorites && !favorites.is_empty() {
        all_cards
            .iter()
            .filter(|card| favorites.contains(&card.id))
            .collect()
    } else {
        pool.iter()
            .copied()
            .filter(|card| filters.matches(card))
            .collect()
    }
}

/// Shuffles the candidates uniformly (Fisher-Yates) and keeps the first
/// `count`, with `count` clamped to `1..=candidates`. No candidates gives an
/// empty deck; the caller should not start a session then.
pub fn build<R: Rng + ?Sized>(
    pool: &[&Card],
    all_cards: &[Card],
    filters: &DeckFilters,
    favorites: &FavoriteSet,
    count: usize,
    rng: &mut R,
) -> Vec<Card> {
    let mut deck = candidates(pool, all_cards, filters, favorites);
    if deck.is_empty() {
        return Vec::new();
    }

    let take = count.clamp(1, deck.len());
    deck.shuffle(rng);
    deck.truncate(take);
    deck.into_iter().cloned().collect()
}

/// [`build`] with the thread-local RNG.
pub fn build_deck(
    pool: &[&Card],
    all_cards: &[Card],
    filters: &DeckFilters,
    favorites: &FavoriteSet,
    count: usize,
) -> Vec<Card> {
    build(pool, all_cards, filters, favorites, count, &mut rand::thread_rng())
}
