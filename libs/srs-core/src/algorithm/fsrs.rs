//! FSRS (Free Spaced Repetition Scheduler) algorithm.
//!
//! Memory is modelled with three quantities:
//! - Difficulty (D): intrinsic item difficulty, 1-10
//! - Stability (S): days until recall probability falls to 90%
//! - Retrievability (R): current probability of recall
//!
//! Short-term scheduling is simplified: a card that is not graduating is
//! shown again after a fixed delay (1 minute for new cards, 5 minutes for
//! learning and relearning cards) instead of walking the configured steps.

use chrono::{DateTime, Duration, Utc};

use super::RecordLog;
use crate::error::Result;
use crate::params::Parameters;
use crate::types::{Card, Grade, State};

/// Retry delay after the first rating of a new card.
const NEW_CARD_RETRY_MINUTES: i64 = 1;

/// Retry delay for learning and relearning cards that do not graduate.
const SHORT_TERM_RETRY_MINUTES: i64 = 5;

/// Recall probability the stability definition is anchored to.
const STABILITY_RETENTION: f64 = 0.9;

/// FSRS scheduler with immutable parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fsrs {
    params: Parameters,
}

impl Fsrs {
    /// Create a scheduler after validating `params`.
    pub fn new(params: Parameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters this scheduler was built with.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Compute the next card for every possible grade.
    ///
    /// Pure: the same `card` and `now` always give the same log. Input is
    /// not validated; a card with negative or non-finite memory state may
    /// yield NaN fields.
    pub fn repeat(&self, card: &Card, now: DateTime<Utc>) -> RecordLog {
        let mut card = card.clone();
        card.due = card.due.or(Some(now));
        card.last_review = card.last_review.or(Some(now));

        let elapsed_days = card.elapsed_days(now);

        RecordLog::from_fn(|grade| {
            let mut next = card.clone();
            next.last_review = Some(now);
            next.reps += 1;

            match card.state {
                State::New => self.schedule_new(&mut next, grade, now),
                State::Learning | State::Relearning => {
                    self.schedule_short_term(&card, &mut next, grade, now)
                }
                State::Review => self.schedule_review(&card, &mut next, grade, elapsed_days, now),
            }

            next
        })
    }

    /// Next card for a single grade.
    pub fn next(&self, card: &Card, grade: Grade, now: DateTime<Utc>) -> Card {
        self.repeat(card, now).into_card(grade)
    }

    /// Current recall probability of a reviewed card.
    ///
    /// `None` for cards that have no stability yet.
    pub fn retrievability(&self, card: &Card, now: DateTime<Utc>) -> Option<f64> {
        if card.state == State::New || card.stability <= 0.0 {
            return None;
        }
        Some(self.forgetting_curve(card.elapsed_days(now), card.stability))
    }

    fn schedule_new(&self, next: &mut Card, grade: Grade, now: DateTime<Utc>) {
        next.difficulty = self.init_difficulty(grade);
        next.stability = self.init_stability(grade);

        if !self.params.enable_short_term || grade == Grade::Easy {
            next.state = State::Review;
            self.schedule_days(next, now);
        } else {
            next.state = State::Learning;
            Self::schedule_retry(next, now, NEW_CARD_RETRY_MINUTES);
        }
    }

    fn schedule_short_term(&self, card: &Card, next: &mut Card, grade: Grade, now: DateTime<Utc>) {
        next.stability = self.next_short_term_stability(card.stability, grade);
        next.difficulty = self.next_difficulty(card.difficulty, grade);

        match grade {
            Grade::Good | Grade::Easy => {
                next.state = State::Review;
                self.schedule_days(next, now);
            }
            Grade::Again | Grade::Hard => {
                Self::schedule_retry(next, now, SHORT_TERM_RETRY_MINUTES);
            }
        }
    }

    fn schedule_review(
        &self,
        card: &Card,
        next: &mut Card,
        grade: Grade,
        elapsed_days: f64,
        now: DateTime<Utc>,
    ) {
        let retrievability = self.forgetting_curve(elapsed_days, card.stability);
        let difficulty = self.next_difficulty(card.difficulty, grade);
        next.difficulty = difficulty;

        if grade == Grade::Again {
            next.stability = self.next_forget_stability(difficulty, card.stability, retrievability);
            next.state = State::Relearning;
            next.lapses += 1;
            Self::schedule_retry(next, now, SHORT_TERM_RETRY_MINUTES);
        } else {
            next.stability =
                self.next_recall_stability(difficulty, card.stability, retrievability, grade);
            self.schedule_days(next, now);
        }
    }

    fn schedule_days(&self, next: &mut Card, now: DateTime<Utc>) {
        next.scheduled_days = self.next_interval(next.stability);
        next.due = Some(now + Duration::days(next.scheduled_days));
    }

    fn schedule_retry(next: &mut Card, now: DateTime<Utc>, minutes: i64) {
        next.scheduled_days = 0;
        next.due = Some(now + Duration::minutes(minutes));
    }

    /// S0(G) = w[G-1]
    pub fn init_stability(&self, grade: Grade) -> f64 {
        self.params.w[usize::from(grade.to_value()) - 1]
    }

    /// D0(G) = w[4] - (G - 3) * w[5], clamped to [1, 10]
    pub fn init_difficulty(&self, grade: Grade) -> f64 {
        let w = &self.params.w;
        (w[4] - (grade.as_f64() - 3.0) * w[5]).clamp(1.0, 10.0)
    }

    /// D' = w[7] * D0(Easy) + (1 - w[7]) * (D - w[6] * (G - 3)), clamped to [1, 10]
    pub fn next_difficulty(&self, difficulty: f64, grade: Grade) -> f64 {
        let w = &self.params.w;
        let next_d = difficulty - w[6] * (grade.as_f64() - 3.0);
        let mean_reverted = w[7] * self.init_difficulty(Grade::Easy) + (1.0 - w[7]) * next_d;
        mean_reverted.clamp(1.0, 10.0)
    }

    /// Stability after a successful review.
    ///
    /// S' = S * (1 + e^w[8] * (11 - D) * S^-w[9] * (e^(w[10] * (1 - R)) - 1) * penalty * bonus)
    pub fn next_recall_stability(
        &self,
        difficulty: f64,
        stability: f64,
        retrievability: f64,
        grade: Grade,
    ) -> f64 {
        let w = &self.params.w;
        let hard_penalty = if grade == Grade::Hard { w[15] } else { 1.0 };
        let easy_bonus = if grade == Grade::Easy { w[16] } else { 1.0 };

        stability
            * (1.0
                + w[8].exp()
                    * (11.0 - difficulty)
                    * stability.powf(-w[9])
                    * ((w[10] * (1.0 - retrievability)).exp() - 1.0)
                    * hard_penalty
                    * easy_bonus)
    }

    /// Stability after a lapse.
    ///
    /// S' = w[11] * D^-w[12] * ((S + 1)^w[13] - 1) * e^(w[14] * (1 - R))
    pub fn next_forget_stability(&self, difficulty: f64, stability: f64, retrievability: f64) -> f64 {
        let w = &self.params.w;
        w[11]
            * difficulty.powf(-w[12])
            * ((stability + 1.0).powf(w[13]) - 1.0)
            * (w[14] * (1.0 - retrievability)).exp()
    }

    /// Stability after a same-day review.
    ///
    /// S' = S * e^(w[17] * (G - 3 + w[18]) * S^-w[19])
    pub fn next_short_term_stability(&self, stability: f64, grade: Grade) -> f64 {
        let w = &self.params.w;
        stability * (w[17] * (grade.as_f64() - 3.0 + w[18]) * stability.powf(-w[19])).exp()
    }

    /// R(t, S) = (1 + factor * t / S)^-w[20]
    pub fn forgetting_curve(&self, elapsed_days: f64, stability: f64) -> f64 {
        let decay = self.params.w[20];
        (1.0 + self.factor() * elapsed_days / stability).powf(-decay)
    }

    /// Interval in whole days at which recall probability reaches
    /// `request_retention`, clamped to [1, maximum_interval].
    pub fn next_interval(&self, stability: f64) -> i64 {
        let decay = self.params.w[20];
        let interval = stability / self.factor()
            * (self.params.request_retention.powf(-1.0 / decay) - 1.0);
        interval
            .round()
            .clamp(1.0, self.params.maximum_interval as f64) as i64
    }

    fn factor(&self) -> f64 {
        STABILITY_RETENTION.powf(-1.0 / self.params.w[20]) - 1.0
    }
}
