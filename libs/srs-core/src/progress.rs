//! Stored learning progress and its conversion to and from scheduler cards.
//!
//! Words and sentences keep their progress in the same shape. The record
//! uses the app's own status vocabulary, which includes `mastered`; the
//! scheduler has no such state, so `mastered` is scheduled as `review`
//! and never produced on the way back out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::fsrs::Fsrs;
use crate::algorithm::RecordLog;
use crate::error::{Result, SrsError};
use crate::types::{Card, Grade, State};

/// Progress status as stored alongside a word or sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    New,
    Learning,
    Review,
    Mastered,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self::New
    }
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Mastered => "mastered",
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(Self::New),
            "learning" => Ok(Self::Learning),
            "review" => Ok(Self::Review),
            "mastered" => Ok(Self::Mastered),
            other => Err(SrsError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProgressStatus> for State {
    fn from(status: ProgressStatus) -> Self {
        match status {
            ProgressStatus::New => State::New,
            ProgressStatus::Learning => State::Learning,
            ProgressStatus::Review | ProgressStatus::Mastered => State::Review,
        }
    }
}

impl From<State> for ProgressStatus {
    fn from(state: State) -> Self {
        match state {
            State::New => ProgressStatus::New,
            State::Learning | State::Relearning => ProgressStatus::Learning,
            State::Review => ProgressStatus::Review,
        }
    }
}

/// Persisted progress for one user/item pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub status: ProgressStatus,
    /// Caller-owned memory strength in [0, 1]; passed through untouched
    /// unless a review supplies a new value.
    pub strength: f64,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: u32,
    pub lapses: u32,
    pub next_review_date: Option<DateTime<Utc>>,
    pub last_reviewed: Option<DateTime<Utc>>,
}

/// A learner's answer to one item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Defaults to `Good` when absent.
    #[serde(default)]
    pub grade: Option<Grade>,
    /// Right/wrong answer from two-button practice; used when `grade` is absent.
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub strength: Option<f64>,
}

impl ReviewRequest {
    /// Grade to schedule with: explicit grade, then the right/wrong flag, then `Good`.
    pub fn effective_grade(&self) -> Grade {
        self.grade
            .or_else(|| self.correct.map(Grade::from_2point))
            .unwrap_or(Grade::Good)
    }
}

impl ProgressRecord {
    /// Build the scheduler card for this record.
    ///
    /// Rejects negative or non-finite memory state and counters that cannot
    /// be incremented by another review. A record that carries a
    /// non-new status but no stability (progress saved before scheduling
    /// fields existed) is scheduled as a new card.
    pub fn to_card(&self) -> Result<Card> {
        check_field("stability", self.stability, |s| s >= 0.0)?;
        check_field("difficulty", self.difficulty, |d| (0.0..=10.0).contains(&d))?;
        check_counter("reps", self.reps)?;
        check_counter("lapses", self.lapses)?;

        let mut state = State::from(self.status);
        if state != State::New && self.stability == 0.0 {
            tracing::debug!(status = %self.status, "no stored stability, scheduling as new");
            state = State::New;
        }

        Ok(Card {
            due: self.next_review_date,
            stability: self.stability,
            difficulty: self.difficulty,
            reps: self.reps,
            lapses: self.lapses,
            state,
            last_review: self.last_reviewed,
            scheduled_days: 0,
        })
    }

    /// Candidate outcomes for every grade, for button previews.
    pub fn preview(&self, fsrs: &Fsrs, now: DateTime<Utc>) -> Result<RecordLog> {
        let card = self.to_card()?;
        Ok(fsrs.repeat(&card, now))
    }

    /// Apply one review and return the record to persist.
    pub fn apply_review(
        &self,
        fsrs: &Fsrs,
        request: &ReviewRequest,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let grade = request.effective_grade();
        if let Some(strength) = request.strength {
            check_field("strength", strength, |s| (0.0..=1.0).contains(&s))?;
        }

        let card = self.to_card()?;
        let next = fsrs.next(&card, grade, now);
        check_result(&next, grade)?;

        tracing::debug!(
            grade = grade.to_value(),
            from = ?card.state,
            to = ?next.state,
            stability = next.stability,
            scheduled_days = next.scheduled_days,
            "applied review"
        );

        Ok(ProgressRecord {
            status: next.state.into(),
            strength: request.strength.unwrap_or(self.strength),
            stability: next.stability,
            difficulty: next.difficulty,
            reps: next.reps,
            lapses: next.lapses,
            next_review_date: next.due,
            last_reviewed: Some(now),
        })
    }
}

fn check_field(field: &'static str, value: f64, valid: impl Fn(f64) -> bool) -> Result<()> {
    if value.is_finite() && valid(value) {
        Ok(())
    } else {
        tracing::warn!(field, value, "rejecting progress record");
        Err(SrsError::InvalidCard { field, value })
    }
}

fn check_counter(field: &'static str, value: u32) -> Result<()> {
    if value < u32::MAX {
        Ok(())
    } else {
        tracing::warn!(field, value, "rejecting progress record");
        Err(SrsError::InvalidCard {
            field,
            value: f64::from(value),
        })
    }
}

fn check_result(card: &Card, grade: Grade) -> Result<()> {
    let non_finite = [("stability", card.stability), ("difficulty", card.difficulty)]
        .into_iter()
        .find(|(_, value)| !value.is_finite());

    match non_finite {
        Some((field, value)) => {
            tracing::warn!(field, value, grade = grade.to_value(), "scheduler result rejected");
            Err(SrsError::NonFiniteResult {
                field,
                grade: grade.to_value(),
            })
        }
        None => Ok(()),
    }
}
