//! Catalog card: one coding exercise with its default schedule.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::SchedulingState;

pub type CardId = String;

/// Card ids the user has starred.
pub type FavoriteSet = BTreeSet<CardId>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Standard,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Standard, Difficulty::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Standard => "standard",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Difficulty::Standard),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty '{}', expected standard or advanced",
                other
            )),
        }
    }
}

/// Immutable catalog entry. `defaults` is the schedule used until the card
/// has a stored state of its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: CardId,
    pub unit: String,
    pub difficulty: Difficulty,
    #[serde(alias = "questionHTML")]
    pub question_content: String,
    #[serde(alias = "solutionCode", default)]
    pub solution_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_code: Option<String>,
    #[serde(flatten)]
    pub defaults: SchedulingState,
}

impl Card {
    pub fn default_state(&self) -> SchedulingState {
        self.defaults.clone()
    }
}

/// Catalog files written by hand use numeric ids; everything downstream keys
/// on strings.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<CardId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_card_from_catalog_json() {
        let json = r#"{
            "id": 12,
            "unit": "Unit 2: Lists",
            "difficulty": "advanced",
            "questionHTML": "<p>Reverse a list in place.</p>",
            "solutionCode": "xs.reverse()",
            "repetitions": 0,
            "interval": 1,
            "easiness": 2.5,
            "nextReview": "2024-01-01"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, "12");
        assert_eq!(card.difficulty, Difficulty::Advanced);
        assert_eq!(card.question_content, "<p>Reverse a list in place.</p>");
        assert_eq!(card.solution_content, "xs.reverse()");
        assert_eq!(
            card.defaults.next_review,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(card.defaults.notes, "");
    }

    #[test]
    fn test_missing_schedule_fields_use_defaults() {
        let json = r#"{
            "id": "strings-1",
            "unit": "Unit 1: Strings",
            "difficulty": "standard",
            "questionContent": "Count vowels."
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, "strings-1");
        assert_eq!(card.defaults, SchedulingState::default());
        assert!(card.initial_code.is_none());
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("Advanced".parse::<Difficulty>(), Ok(Difficulty::Advanced));
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
