//! Error types for srs-core.
//!
//! The scheduler itself is total; these errors are raised at the boundary
//! (configuration and stored progress) before a card ever reaches it.

use thiserror::Error;

/// Result type alias using SrsError.
pub type Result<T> = std::result::Result<T, SrsError>;

/// Errors raised while configuring the scheduler or validating stored progress.
#[derive(Debug, Error, PartialEq)]
pub enum SrsError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid step {value:?}: expected <number><m|h|d>")]
    InvalidStep { value: String },

    #[error("invalid card {field}: {value}")]
    InvalidCard { field: &'static str, value: f64 },

    #[error("unknown grade {0}")]
    UnknownGrade(u8),

    #[error("unknown status {0:?}")]
    UnknownStatus(String),

    #[error("scheduler produced non-finite {field} for grade {grade}")]
    NonFiniteResult { field: &'static str, grade: u8 },
}
