//! Recall-quality rating given after a review.
use std::fmt;
use std::str::FromStr;

use crate::error::{InvalidQuality, ParseQualityError};

/// A recall rating in `0..=5`. Values outside that range cannot be built,
/// so the scheduler never sees them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    /// Labels shown next to each rating, indexed by quality.
    pub const LABELS: [&'static str; 6] =
        ["Again", "Hard", "Struggling", "Easy", "Very Easy", "Mastered"];

    pub fn new(value: u8) -> Result<Self, InvalidQuality> {
        if value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(InvalidQuality(value as i64))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality 3 and above counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self.0 as usize]
    }

    pub fn all() -> impl Iterator<Item = Quality> {
        (0..=Self::MAX).map(Quality)
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| InvalidQuality(value))
            .and_then(Self::new)
    }
}

impl FromStr for Quality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value: i64 = text
            .parse()
            .map_err(|_| ParseQualityError::NotANumber(text.to_string()))?;
        Ok(Self::try_from(value)?)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
