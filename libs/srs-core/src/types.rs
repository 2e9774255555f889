//! Core types for the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SrsError;

/// Card lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    New,
    Learning,
    Review,
    Relearning,
}

impl Default for State {
    fn default() -> Self {
        Self::New
    }
}

impl State {
    /// Numeric value as stored by older clients (0-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Learning => 1,
            Self::Review => 2,
            Self::Relearning => 3,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::New),
            1 => Some(Self::Learning),
            2 => Some(Self::Review),
            3 => Some(Self::Relearning),
            _ => None,
        }
    }

    /// Whether the card is in a short-term (minutes-scale) phase.
    pub fn is_short_term(self) -> bool {
        matches!(self, Self::Learning | Self::Relearning)
    }
}

/// Learner's rating of a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// All grades, worst to best.
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Convert to 4-point numeric value (1-4).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from 4-point numeric value.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map 2-point rating to 4-point.
    /// Wrong -> Again, Correct -> Good
    pub fn from_2point(correct: bool) -> Self {
        if correct {
            Self::Good
        } else {
            Self::Again
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        f64::from(self.to_value())
    }
}

impl TryFrom<u8> for Grade {
    type Error = SrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(SrsError::UnknownGrade(value))
    }
}

/// Memory state for one learner/item pairing.
///
/// Owned by the caller; the scheduler never mutates it in place and returns
/// fresh values instead. Absent timestamps are read as "now".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    /// Days until `due`; 0 when the next showing is within the same day.
    #[serde(default)]
    pub scheduled_days: i64,
}

impl Card {
    /// A never-reviewed card, due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            due: Some(now),
            last_review: Some(now),
            ..Default::default()
        }
    }

    /// Fractional days since the last review, never negative.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
        let last_review = self.last_review.unwrap_or(now);
        let elapsed_ms = now.signed_duration_since(last_review).num_milliseconds();
        (elapsed_ms as f64 / MILLIS_PER_DAY).max(0.0)
    }
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn grade_values_round_trip() {
        for grade in Grade::ALL {
            assert_eq!(Grade::from_value(grade.to_value()), Some(grade));
        }
        assert_eq!(Grade::from_value(0), None);
        assert_eq!(Grade::from_value(5), None);
    }

    #[test]
    fn grade_try_from_rejects_out_of_range() {
        assert_eq!(Grade::try_from(3), Ok(Grade::Good));
        assert_eq!(Grade::try_from(9), Err(SrsError::UnknownGrade(9)));
    }

    #[test]
    fn grades_are_ordered_by_recall_quality() {
        assert!(Grade::Again < Grade::Hard);
        assert!(Grade::Hard < Grade::Good);
        assert!(Grade::Good < Grade::Easy);
    }

    #[test]
    fn two_point_mapping() {
        assert_eq!(Grade::from_2point(false), Grade::Again);
        assert_eq!(Grade::from_2point(true), Grade::Good);
    }

    #[test]
    fn state_values() {
        assert_eq!(State::from_value(2), Some(State::Review));
        assert_eq!(State::Relearning.to_value(), 3);
        assert_eq!(State::from_value(4), None);
        assert!(State::Learning.is_short_term());
        assert!(!State::Review.is_short_term());
    }

    #[test]
    fn new_card_starts_due_now() {
        let card = Card::new(now());
        assert_eq!(card.state, State::New);
        assert_eq!(card.due, Some(now()));
        assert_eq!(card.last_review, Some(now()));
        assert_eq!(card.reps, 0);
        assert_eq!(card.lapses, 0);
    }

    #[test]
    fn elapsed_days_is_fractional_and_clamped() {
        let card = Card::new(now());
        assert_eq!(card.elapsed_days(now() + Duration::hours(36)), 1.5);
        assert_eq!(card.elapsed_days(now() - Duration::days(2)), 0.0);
        assert_eq!(Card::default().elapsed_days(now()), 0.0);
    }

    #[test]
    fn card_deserializes_with_missing_fields() {
        let card: Card = serde_json::from_str(r#"{"state":"review","stability":4.5}"#).unwrap();
        assert_eq!(card.state, State::Review);
        assert_eq!(card.stability, 4.5);
        assert_eq!(card.due, None);
        assert_eq!(card.reps, 0);
    }
}
