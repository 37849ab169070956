//! Terminal front end.
//! Lists due cards, runs practice sessions and manages favorites, notes and resets.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use codecards::config::AppConfig;
use codecards::error::ReviewError;
use codecards::models::deck_builder::{self, selectable_units};
use codecards::models::due::{effective_next_review, select_due};
use codecards::review::{ReviewClock, ReviewOutcome, record_review, save_notes};
use codecards::store::{MetadataSnapshot, load_metadata};
use codecards::{
    Card, DeckFilters, Difficulty, FavoritesStore, MetadataStore, Quality, ReviewLog, StudySession,
};
use log::debug;

pub const NO_CARDS_MESSAGE: &str = "No cards available in this deck. Try adjusting your filters.";

/// Deck choices from the command line. Empty lists mean "everything".
#[derive(Debug, Default)]
pub struct PracticeOptions {
    pub units: Vec<String>,
    pub difficulties: Vec<Difficulty>,
    pub only_favorites: bool,
    pub count: Option<usize>,
}

/// Application state shared by every command
pub struct App<S> {
    pub config: AppConfig,
    pub catalog: Vec<Card>,
    pub store: S,
}

impl<S> App<S>
where
    S: MetadataStore + FavoritesStore + ReviewLog,
{
    pub fn new(config: AppConfig, catalog: Vec<Card>, store: S) -> Self {
        Self {
            config,
            catalog,
            store,
        }
    }

    fn find_card(&self, card_id: &str) -> Result<&Card> {
        self.catalog
            .iter()
            .find(|card| card.id == card_id)
            .with_context(|| format!("no card with id '{}' in the catalog", card_id))
    }

    fn snapshot(&self, out: &mut impl Write) -> Result<MetadataSnapshot> {
        let snapshot = load_metadata(&self.store);
        if snapshot.degraded {
            writeln!(
                out,
                "Warning: saved progress could not be loaded; showing catalog defaults."
            )?;
        }
        Ok(snapshot)
    }

    /// Lists the cards due today
    pub fn show_due(&self, clock: ReviewClock, out: &mut impl Write) -> Result<()> {
        let snapshot = self.snapshot(out)?;
        let due = select_due(&self.catalog, &snapshot.states, clock.today);

        writeln!(out, "{} of {} cards due on {}", due.len(), self.catalog.len(), clock.today)?;
        for card in due {
            let next = effective_next_review(card, snapshot.states.get(&card.id));
            writeln!(
                out,
                "  {:>6}  {:<10} {:<24} due {}",
                card.id, card.difficulty, card.unit, next
            )?;
        }
        Ok(())
    }

    /// Lists the units that have something due
    pub fn show_units(&self, clock: ReviewClock, out: &mut impl Write) -> Result<()> {
        let snapshot = self.snapshot(out)?;
        let due = select_due(&self.catalog, &snapshot.states, clock.today);

        for unit in selectable_units(&due) {
            let count = due.iter().filter(|card| card.unit == unit).count();
            writeln!(out, "{} ({} due)", unit, count)?;
        }
        Ok(())
    }

    /// Builds the deck for a practice session. An empty deck is reported to
    /// the user, not treated as an error.
    pub fn build_deck(
        &self,
        options: &PracticeOptions,
        clock: ReviewClock,
        out: &mut impl Write,
    ) -> Result<Vec<Card>> {
        let snapshot = self.snapshot(out)?;
        let pool = select_due(&self.catalog, &snapshot.states, clock.today);

        let mut filters = DeckFilters::everything(&pool);
        if !options.units.is_empty() {
            filters.selected_units = options.units.iter().cloned().collect();
        }
        if !options.difficulties.is_empty() {
            filters.selected_difficulties = options.difficulties.iter().copied().collect();
        }
        filters.only_favorites = options.only_favorites;

        let favorites = match self.store.favorites() {
            Ok(favorites) => favorites,
            Err(e) => {
                writeln!(out, "Warning: favorites could not be loaded ({})", e)?;
                Default::default()
            }
        };

        let count = options.count.unwrap_or(self.config.default_count);
        let deck = deck_builder::build_deck(&pool, &self.catalog, &filters, &favorites, count);
        debug!(
            "Built deck of {} from {} due cards (requested {})",
            deck.len(),
            pool.len(),
            count
        );
        Ok(deck)
    }

    /// Runs an interactive practice session reading commands from `input`.
    /// `clock` is read when the deck is built and again for every rating.
    pub fn practice(
        &self,
        options: &PracticeOptions,
        clock: impl Fn() -> ReviewClock,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        let deck = self.build_deck(options, clock(), out)?;
        let Some(mut session) = StudySession::new(deck) else {
            writeln!(out, "{}", NO_CARDS_MESSAGE)?;
            return Ok(());
        };

        writeln!(out, "Starting practice with {} cards.", session.total_count())?;
        writeln!(
            out,
            "Commands: [Enter] show/hide solution, 0-5 rate, f favorite, n <text> note, p previous, s skip, q quit"
        )?;
        print_card(&session, out)?;

        let retry = self.config.retry_policy();
        let mut line = String::new();
        while !session.is_finished() {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let command = line.trim();

            match command {
                "" => {
                    session.toggle_solution();
                    if session.show_solution {
                        print_solution(&session, out)?;
                    }
                }
                "q" => break,
                "p" => {
                    session.previous_card();
                    print_card(&session, out)?;
                }
                "s" => {
                    if session.is_last() {
                        writeln!(out, "This is the last card.")?;
                    } else {
                        session.next_card();
                        print_card(&session, out)?;
                    }
                }
                "f" => {
                    let Some(card) = session.current_card() else { break };
                    let favorites = self.store.toggle_favorite(&card.id)?;
                    let state = if favorites.contains(&card.id) { "added to" } else { "removed from" };
                    writeln!(out, "Card {} {} favorites.", card.id, state)?;
                }
                _ if command.starts_with("n ") => {
                    let Some(card) = session.current_card() else { break };
                    save_notes(&self.store, &card.id, command[2..].trim(), &retry)?;
                    writeln!(out, "Notes saved.")?;
                }
                _ => {
                    let quality = match command.parse::<Quality>() {
                        Ok(quality) => quality,
                        Err(e) => {
                            writeln!(out, "Unknown command '{}' ({})", command, e)?;
                            continue;
                        }
                    };
                    match session.grade_current_card(&self.store, quality, clock(), &retry) {
                        Ok(outcome) => {
                            print_outcome(quality, &outcome, out)?;
                            if !session.is_finished() {
                                print_card(&session, out)?;
                            }
                        }
                        Err(ReviewError::NotSaved { computed, source, attempts, .. }) => {
                            writeln!(
                                out,
                                "Progress was NOT saved after {} attempts ({}). Would have been due {}. Rate again to retry.",
                                attempts, source, computed.next_review
                            )?;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        writeln!(out, "Session over: {} of {} cards rated.", session.graded, session.total_count())?;
        Ok(())
    }

    /// Grades one card outside a session
    pub fn rate(&self, card_id: &str, quality: Quality, clock: ReviewClock, out: &mut impl Write) -> Result<()> {
        let card = self.find_card(card_id)?;
        let outcome = record_review(&self.store, card, quality, clock, &self.config.retry_policy())?;
        print_outcome(quality, &outcome, out)
    }

    pub fn toggle_favorite(&self, card_id: &str, out: &mut impl Write) -> Result<()> {
        let card = self.find_card(card_id)?;
        let favorites = self.store.toggle_favorite(&card.id)?;
        if favorites.contains(&card.id) {
            writeln!(out, "Card {} added to favorites ({} total).", card.id, favorites.len())?;
        } else {
            writeln!(out, "Card {} removed from favorites ({} total).", card.id, favorites.len())?;
        }
        Ok(())
    }

    pub fn show_favorites(&self, out: &mut impl Write) -> Result<()> {
        let favorites = self.store.favorites()?;
        if favorites.is_empty() {
            writeln!(out, "No favorites yet.")?;
        }
        for card in self.catalog.iter().filter(|card| favorites.contains(&card.id)) {
            writeln!(out, "  {:>6}  {}", card.id, card.unit)?;
        }
        Ok(())
    }

    pub fn set_notes(&self, card_id: &str, notes: &str, out: &mut impl Write) -> Result<()> {
        let card = self.find_card(card_id)?;
        save_notes(&self.store, &card.id, notes, &self.config.retry_policy())?;
        writeln!(out, "Notes saved for card {}.", card.id)?;
        Ok(())
    }

    pub fn reset(&self, unit: Option<&str>, out: &mut impl Write) -> Result<()> {
        let reset = match unit {
            Some(unit) => {
                if !self.catalog.iter().any(|card| card.unit == unit) {
                    bail!("no unit named '{}' in the catalog", unit);
                }
                self.store.reset_unit(&self.catalog, unit)?
            }
            None => self.store.reset_all(&self.catalog)?,
        };
        writeln!(out, "Reset {} cards to their defaults.", reset)?;
        Ok(())
    }

    pub fn show_history(&self, limit: usize, out: &mut impl Write) -> Result<()> {
        let history = self.store.history()?;
        writeln!(out, "{} reviews logged", history.len())?;
        for event in history.iter().take(limit) {
            let local: DateTime<Local> = event.timestamp.into();
            let label = Quality::new(event.quality).map(Quality::label).unwrap_or("?");
            writeln!(
                out,
                "  {}  card {:>6}  {} ({})",
                local.format("%Y-%m-%d %H:%M"),
                event.card_id,
                event.quality,
                label
            )?;
        }
        Ok(())
    }
}

fn print_card(session: &StudySession, out: &mut impl Write) -> Result<()> {
    let Some(card) = session.current_card() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(
        out,
        "{} [{} · {}]",
        session.progress_message(),
        card.unit,
        card.difficulty
    )?;
    writeln!(out, "{}", card.question_content)?;
    if let Some(code) = &card.initial_code {
        writeln!(out, "--- starter code ---\n{}", code)?;
    }
    Ok(())
}

fn print_solution(session: &StudySession, out: &mut impl Write) -> Result<()> {
    if let Some(card) = session.current_card() {
        // solutions are often stored as fenced markdown
        writeln!(out, "--- solution ---\n{}", card.solution_content.replace("```", ""))?;
    }
    Ok(())
}

fn print_outcome(quality: Quality, outcome: &ReviewOutcome, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "Rated {} ({}). Next review in {} day(s), on {}.",
        quality,
        quality.label(),
        outcome.next.interval,
        outcome.next.next_review
    )?;
    if outcome.log_failed {
        writeln!(out, "Warning: the review was saved but not added to history.")?;
    }
    Ok(())
}

/// Units given on the command line that are not in the catalog at all.
pub fn unknown_units<'a>(catalog: &[Card], units: &'a [String]) -> Vec<&'a str> {
    let known: HashSet<&str> = catalog.iter().map(|card| card.unit.as_str()).collect();
    units
        .iter()
        .map(String::as_str)
        .filter(|unit| !known.contains(unit))
        .collect()
}
