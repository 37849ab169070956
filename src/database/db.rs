//! SQLite persistence for study progress
//!
//! Stores per-card scheduling state, the favorites set and the review log.
//! The catalog itself is never written here; cards are referenced by id only.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use crate::error::StoreError;
use crate::models::{Card, CardId, FavoriteSet, ReviewEvent, StatePatch};
use crate::store::{FavoritesStore, MetadataStore, ReviewLog, StoreResult};

/// Opens (or creates) the progress database at `path` and ensures the schema.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    info!("Opened progress database at {}", path.display());
    Ok(conn)
}

/// Creates the tables if they do not exist yet.
///
/// Every `card_state` column except the key is nullable: a row holds only the
/// fields that were ever written for that card.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS card_state (
            card_id TEXT PRIMARY KEY,
            repetitions INTEGER,
            interval_days INTEGER,
            easiness REAL,
            next_review TEXT,
            notes TEXT
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS favorites (
            card_id TEXT PRIMARY KEY
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id TEXT NOT NULL,
            quality INTEGER NOT NULL CHECK (quality BETWEEN 0 AND 5),
            reviewed_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn patch_from_row(row: &Row<'_>) -> Result<(CardId, StatePatch)> {
    Ok((
        row.get(0)?,
        StatePatch {
            repetitions: row.get(1)?,
            interval: row.get(2)?,
            easiness: row.get(3)?,
            next_review: row.get::<_, Option<NaiveDate>>(4)?,
            notes: row.get(5)?,
        },
    ))
}

/// Retrieves the stored record for one card
pub fn get_card_state(card_id: &str, conn: &Connection) -> Result<Option<StatePatch>> {
    conn.query_row(
        "SELECT card_id, repetitions, interval_days, easiness, next_review, notes
         FROM card_state WHERE card_id = ?1",
        params![card_id],
        patch_from_row,
    )
    .optional()
    .map(|found| found.map(|(_, patch)| patch))
}

/// Retrieves every stored record, keyed by card id
pub fn get_all_card_states(conn: &Connection) -> Result<HashMap<CardId, StatePatch>> {
    let mut stmt = conn.prepare(
        "SELECT card_id, repetitions, interval_days, easiness, next_review, notes FROM card_state",
    )?;

    let states = stmt
        .query_map([], patch_from_row)?
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(states)
}

/// Merges a patch into a card's record, creating the record if needed.
/// `NULL` parameters leave the existing column value alone.
pub fn upsert_card_state(card_id: &str, patch: &StatePatch, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO card_state (card_id, repetitions, interval_days, easiness, next_review, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(card_id) DO UPDATE SET
            repetitions = COALESCE(excluded.repetitions, card_state.repetitions),
            interval_days = COALESCE(excluded.interval_days, card_state.interval_days),
            easiness = COALESCE(excluded.easiness, card_state.easiness),
            next_review = COALESCE(excluded.next_review, card_state.next_review),
            notes = COALESCE(excluded.notes, card_state.notes)",
        params![
            card_id,
            patch.repetitions,
            patch.interval,
            patch.easiness,
            patch.next_review,
            patch.notes
        ],
    )?;

    debug!("Saved state for card {}", card_id);
    Ok(())
}

/// Overwrites stored records of the given cards with their catalog defaults.
///
/// Cards without a stored record are skipped; they already use the defaults.
pub fn reset_card_states<'a>(
    cards: impl IntoIterator<Item = &'a Card>,
    conn: &Connection,
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut reset = 0;
    {
        let mut stmt = tx.prepare(
            "UPDATE card_state
             SET repetitions = ?1, interval_days = ?2, easiness = ?3, next_review = ?4, notes = ?5
             WHERE card_id = ?6",
        )?;
        for card in cards {
            let d = &card.defaults;
            reset += stmt.execute(params![
                d.repetitions,
                d.interval,
                d.easiness,
                d.next_review,
                d.notes,
                card.id
            ])?;
        }
    }
    tx.commit()?;

    info!("Reset {} card records to catalog defaults", reset);
    Ok(reset)
}

/// Retrieves the favorites set
pub fn get_favorites(conn: &Connection) -> Result<FavoriteSet> {
    let mut stmt = conn.prepare("SELECT card_id FROM favorites")?;
    let favorites = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<FavoriteSet>>()?;
    Ok(favorites)
}

/// Adds or removes a favorite and returns the updated set
pub fn toggle_favorite(card_id: &str, conn: &Connection) -> Result<FavoriteSet> {
    let removed = conn.execute("DELETE FROM favorites WHERE card_id = ?1", params![card_id])?;
    if removed == 0 {
        conn.execute("INSERT INTO favorites (card_id) VALUES (?1)", params![card_id])?;
    }
    get_favorites(conn)
}

/// Appends one review to the log
pub fn insert_review_event(event: &ReviewEvent, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_log (card_id, quality, reviewed_at) VALUES (?1, ?2, ?3)",
        params![event.card_id, event.quality, event.timestamp_iso()],
    )?;
    Ok(())
}

/// Retrieves the review log, newest first.
///
/// Timestamps are stored as fixed-width UTC RFC 3339 text, so ordering the
/// text orders the instants.
pub fn get_review_events(conn: &Connection) -> StoreResult<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        "SELECT card_id, quality, reviewed_at FROM review_log ORDER BY reviewed_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(card_id, quality, reviewed_at)| -> StoreResult<ReviewEvent> {
            let timestamp = DateTime::parse_from_rfc3339(&reviewed_at)
                .map_err(|e| StoreError::Corrupt {
                    card_id: card_id.clone(),
                    reason: format!("bad review timestamp '{}': {}", reviewed_at, e),
                })?
                .with_timezone(&Utc);
            Ok(ReviewEvent {
                card_id,
                quality,
                timestamp,
            })
        })
        .collect()
}

/// All three stores backed by one SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self {
            conn: init_database(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl MetadataStore for SqliteStore {
    fn get(&self, card_id: &str) -> StoreResult<Option<StatePatch>> {
        Ok(get_card_state(card_id, &self.conn)?)
    }

    fn load_all(&self) -> StoreResult<HashMap<CardId, StatePatch>> {
        Ok(get_all_card_states(&self.conn)?)
    }

    fn put(&self, card_id: &str, patch: &StatePatch) -> StoreResult<()> {
        Ok(upsert_card_state(card_id, patch, &self.conn)?)
    }

    fn reset_unit(&self, catalog: &[Card], unit: &str) -> StoreResult<usize> {
        Ok(reset_card_states(
            catalog.iter().filter(|card| card.unit == unit),
            &self.conn,
        )?)
    }

    fn reset_all(&self, catalog: &[Card]) -> StoreResult<usize> {
        Ok(reset_card_states(catalog, &self.conn)?)
    }
}

impl FavoritesStore for SqliteStore {
    fn favorites(&self) -> StoreResult<FavoriteSet> {
        Ok(get_favorites(&self.conn)?)
    }

    fn toggle_favorite(&self, card_id: &str) -> StoreResult<FavoriteSet> {
        Ok(toggle_favorite(card_id, &self.conn)?)
    }
}

impl ReviewLog for SqliteStore {
    fn append(&self, event: &ReviewEvent) -> StoreResult<()> {
        Ok(insert_review_event(event, &self.conn)?)
    }

    fn history(&self) -> StoreResult<Vec<ReviewEvent>> {
        get_review_events(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Quality, SchedulingState};
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn card(id: &str, unit: &str) -> Card {
        Card {
            id: id.to_string(),
            unit: unit.to_string(),
            difficulty: Difficulty::Standard,
            question_content: String::new(),
            solution_content: String::new(),
            initial_code: None,
            defaults: SchedulingState {
                repetitions: 0,
                interval: 1,
                easiness: 2.5,
                next_review: date("2024-01-01"),
                notes: "starter note".to_string(),
            },
        }
    }

    fn reviewed() -> SchedulingState {
        SchedulingState {
            repetitions: 3,
            interval: 15,
            easiness: 2.36,
            next_review: date("2024-04-01"),
            notes: "mine".to_string(),
        }
    }

    #[test]
    fn test_get_missing_card_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_put_then_get() {
        let store = SqliteStore::open_in_memory().unwrap();
        let patch = StatePatch::from(&reviewed());
        store.put("1", &patch).unwrap();
        assert_eq!(store.get("1").unwrap(), Some(patch));
    }

    #[test]
    fn test_put_merges_fields() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("1", &StatePatch::from(&reviewed())).unwrap();
        store.put("1", &StatePatch::notes_only("edited")).unwrap();

        let stored = store.get("1").unwrap().unwrap();
        assert_eq!(stored.interval, Some(15));
        assert_eq!(stored.next_review, Some(date("2024-04-01")));
        assert_eq!(stored.notes.as_deref(), Some("edited"));
    }

    #[test]
    fn test_notes_only_record_leaves_schedule_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("1", &StatePatch::notes_only("hint")).unwrap();

        let stored = store.get("1").unwrap().unwrap();
        assert_eq!(stored.repetitions, None);
        assert_eq!(stored.next_review, None);
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_reset_unit_only_touches_that_unit() {
        let store = SqliteStore::open_in_memory().unwrap();
        let catalog = vec![card("1", "Unit 1"), card("2", "Unit 2"), card("3", "Unit 1")];
        store.put("1", &StatePatch::from(&reviewed())).unwrap();
        store.put("2", &StatePatch::from(&reviewed())).unwrap();

        let reset = store.reset_unit(&catalog, "Unit 1").unwrap();
        assert_eq!(reset, 1);

        let one = store.get("1").unwrap().unwrap().resolve(&catalog[0].defaults);
        assert_eq!(one, catalog[0].defaults);
        assert_eq!(store.get("2").unwrap().unwrap().interval, Some(15));
        // never stored, still absent
        assert_eq!(store.get("3").unwrap(), None);
    }

    #[test]
    fn test_reset_all_restores_notes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let catalog = vec![card("1", "Unit 1"), card("2", "Unit 2")];
        for c in &catalog {
            store.put(&c.id, &StatePatch::from(&reviewed())).unwrap();
        }

        assert_eq!(store.reset_all(&catalog).unwrap(), 2);
        for c in &catalog {
            let stored = store.get(&c.id).unwrap().unwrap();
            assert_eq!(stored.notes.as_deref(), Some("starter note"));
            assert_eq!(stored.repetitions, Some(0));
        }
    }

    #[test]
    fn test_toggle_favorite_twice() {
        let store = SqliteStore::open_in_memory().unwrap();
        let after_add = store.toggle_favorite("7").unwrap();
        assert!(after_add.contains("7"));

        let after_remove = store.toggle_favorite("7").unwrap();
        assert!(after_remove.is_empty());
        assert!(store.favorites().unwrap().is_empty());
    }

    #[test]
    fn test_history_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        store
            .append(&ReviewEvent::new("1", Quality::new(4).unwrap(), early))
            .unwrap();
        store
            .append(&ReviewEvent::new("2", Quality::new(1).unwrap(), late))
            .unwrap();

        let history = store.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].card_id, "2");
        assert_eq!(history[0].timestamp, late);
        assert_eq!(history[1].quality, 4);
    }

    #[test]
    fn test_database_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.sqlite3");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put("1", &StatePatch::notes_only("kept")).unwrap();
            store.toggle_favorite("1").unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("1").unwrap().unwrap().notes.as_deref(),
            Some("kept")
        );
        assert!(reopened.favorites().unwrap().contains("1"));
    }
}
