//! JSON catalog module.
//! Loads the card catalog, writes it back, and merges per-unit catalog files
//! (`unit1.json`, `unit2.json`, ...) into a single `flashcards.json`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;

use crate::error::CatalogError;
use crate::models::Card;

pub const MERGED_CATALOG_FILE: &str = "flashcards.json";

/// Parses a catalog from JSON text, rejecting duplicate card ids.
pub fn parse_catalog(json: &str) -> Result<Vec<Card>, CatalogError> {
    let cards: Vec<Card> = serde_json::from_str(json)?;
    check_unique_ids(&cards)?;
    Ok(cards)
}

/// Loads a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<Card>, CatalogError> {
    let contents = fs::read_to_string(path)?;
    let cards = parse_catalog(&contents)?;
    info!("Loaded {} cards from '{}'", cards.len(), path.display());
    Ok(cards)
}

/// Writes a catalog as pretty-printed JSON.
pub fn export_json_to_path(cards: &[Card], path: &Path) -> Result<(), CatalogError> {
    let json_string = serde_json::to_string_pretty(cards)?;
    fs::write(path, json_string)?;
    Ok(())
}

fn check_unique_ids(cards: &[Card]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for card in cards {
        if !seen.insert(card.id.as_str()) {
            return Err(CatalogError::DuplicateId(card.id.clone()));
        }
    }
    Ok(())
}

/// Unit number of a file named `unit<digits>.json`.
fn unit_number(file_name: &str) -> Option<u32> {
    let digits = file_name.strip_prefix("unit")?.strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Summary of a [`merge_unit_files`] run.
#[derive(Debug)]
pub struct MergeReport {
    pub output: PathBuf,
    pub merged_files: usize,
    pub card_count: usize,
    pub skipped: Vec<String>,
}

/// Merges every `unit<N>.json` in `dir`, in unit order, into
/// `dir/flashcards.json`. `excludes` are file stems such as `unit2`.
/// A file whose top level is not an array is skipped with a warning.
pub fn merge_unit_files(dir: &Path, excludes: &[String]) -> Result<MergeReport, CatalogError> {
    let mut unit_files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(number) = unit_number(&name) else {
            continue;
        };
        let stem = name.trim_end_matches(".json");
        if excludes.iter().any(|e| e == stem) {
            continue;
        }
        unit_files.push((number, name, entry.path()));
    }
    unit_files.sort();

    let mut cards: Vec<Value> = Vec::new();
    let mut skipped = Vec::new();
    let mut merged_files = 0;
    for (_, name, path) in &unit_files {
        let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        match value {
            Value::Array(items) => {
                cards.extend(items);
                merged_files += 1;
            }
            _ => {
                warn!("Skipping {}: not an array", name);
                skipped.push(name.clone());
            }
        }
    }

    // validate before writing so a broken unit file cannot produce a bad catalog
    let parsed: Vec<Card> = serde_json::from_value(Value::Array(cards))?;
    check_unique_ids(&parsed)?;

    let output = dir.join(MERGED_CATALOG_FILE);
    export_json_to_path(&parsed, &output)?;

    info!(
        "Merged {} files (excluded: {}) into {} ({} cards)",
        merged_files,
        if excludes.is_empty() {
            "none".to_string()
        } else {
            excludes.join(",")
        },
        output.display(),
        parsed.len()
    );

    Ok(MergeReport {
        output,
        merged_files,
        card_count: parsed.len(),
        skipped,
    })
}
