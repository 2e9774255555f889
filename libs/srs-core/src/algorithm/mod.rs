//! Spaced repetition scheduling.

pub mod fsrs;

use std::ops::Index;

use serde::Serialize;

use crate::types::{Card, Grade};

/// One candidate next card per grade, as returned by
/// [`Fsrs::repeat`](fsrs::Fsrs::repeat).
///
/// Lets a caller preview every button before the learner picks one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordLog {
    pub again: Card,
    pub hard: Card,
    pub good: Card,
    pub easy: Card,
}

impl RecordLog {
    pub(crate) fn from_fn(mut build: impl FnMut(Grade) -> Card) -> Self {
        Self {
            again: build(Grade::Again),
            hard: build(Grade::Hard),
            good: build(Grade::Good),
            easy: build(Grade::Easy),
        }
    }

    /// Card that results from rating with `grade`.
    pub fn get(&self, grade: Grade) -> &Card {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }

    /// Consume the log, keeping only the chosen branch.
    pub fn into_card(self, grade: Grade) -> Card {
        match grade {
            Grade::Again => self.again,
            Grade::Hard => self.hard,
            Grade::Good => self.good,
            Grade::Easy => self.easy,
        }
    }

    /// Iterate over all branches, worst grade first.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, &Card)> {
        Grade::ALL.into_iter().map(move |grade| (grade, self.get(grade)))
    }
}

impl Index<Grade> for RecordLog {
    type Output = Card;

    fn index(&self, grade: Grade) -> &Card {
        self.get(grade)
    }
}
