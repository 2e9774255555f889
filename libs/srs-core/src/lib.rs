//! Spaced repetition scheduling for vocabulary and sentence practice.
//!
//! Provides:
//! - FSRS scheduler computing the next card for every possible grade
//! - Scheduler parameters with defaults and validation
//! - Conversion between stored progress records and scheduler cards
//! - Shared types (Card, State, Grade)

pub mod algorithm;
pub mod error;
pub mod params;
pub mod progress;
pub mod types;

pub use algorithm::fsrs::Fsrs;
pub use algorithm::RecordLog;
pub use error::{Result, SrsError};
pub use params::{Parameters, Step, StepUnit};
pub use progress::{ProgressRecord, ProgressStatus, ReviewRequest};
pub use types::{Card, Grade, State};
