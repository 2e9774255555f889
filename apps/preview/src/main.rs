//! srs-preview
//!
//! Shows what each grade would do to a stored progress record, or applies
//! one review and prints the record to persist.

mod config;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use serde::Serialize;
use srs_core::{Fsrs, Grade, ProgressRecord, ProgressStatus, RecordLog, ReviewRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Preview or apply spaced repetition reviews
#[derive(Parser, Debug)]
#[command(name = "srs-preview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Preview or apply a review against a stored progress record")]
#[command(group(ArgGroup::new("answer").args(["grade", "correct"])))]
struct Cli {
    /// Progress record as JSON (reads stdin when omitted; empty input is a new item)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Review time in RFC 3339 (defaults to the current time)
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    /// Grade to apply: again, hard, good, easy or 1-4. Omit to preview all four
    #[arg(long, value_parser = parse_grade)]
    grade: Option<Grade>,

    /// Apply a right/wrong answer instead of a grade (wrong = again, right = good)
    #[arg(long)]
    correct: Option<bool>,

    /// New memory strength (0-1) to store with the review
    #[arg(long, requires = "answer")]
    strength: Option<f64>,
}

/// One button preview.
#[derive(Debug, Serialize)]
struct GradePreview {
    grade: Grade,
    status: ProgressStatus,
    due: Option<DateTime<Utc>>,
    scheduled_days: i64,
    stability: f64,
    difficulty: f64,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let fsrs = Fsrs::new(config::load_parameters()?)?;
    let record = read_record(cli.input.as_ref())?;
    let now = cli.now.unwrap_or_else(Utc::now);

    let output = match review_request(&cli) {
        Some(request) => {
            let grade = request.effective_grade();
            let updated = record.apply_review(&fsrs, &request, now)?;
            tracing::info!(
                "Applied {:?}: {} -> {}, next review {:?}",
                grade,
                record.status,
                updated.status,
                updated.next_review_date
            );
            serde_json::to_string_pretty(&updated)?
        }
        None => serde_json::to_string_pretty(&previews(&record.preview(&fsrs, now)?))?,
    };

    println!("{output}");
    Ok(())
}

/// Review to apply, or `None` to preview every grade.
fn review_request(cli: &Cli) -> Option<ReviewRequest> {
    if cli.grade.is_none() && cli.correct.is_none() {
        return None;
    }
    Some(ReviewRequest {
        grade: cli.grade,
        correct: cli.correct,
        strength: cli.strength,
    })
}

fn read_record(input: Option<&PathBuf>) -> Result<ProgressRecord> {
    let contents = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    parse_record(&contents)
}

fn parse_record(contents: &str) -> Result<ProgressRecord> {
    if contents.trim().is_empty() {
        return Ok(ProgressRecord::default());
    }
    serde_json::from_str(contents).context("invalid progress record")
}

fn previews(log: &RecordLog) -> Vec<GradePreview> {
    log.iter()
        .map(|(grade, card)| GradePreview {
            grade,
            status: card.state.into(),
            due: card.due,
            scheduled_days: card.scheduled_days,
            stability: card.stability,
            difficulty: card.difficulty,
        })
        .collect()
}

fn parse_grade(value: &str) -> std::result::Result<Grade, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "again" => Ok(Grade::Again),
        "hard" => Ok(Grade::Hard),
        "good" => Ok(Grade::Good),
        "easy" => Ok(Grade::Easy),
        other => other
            .parse::<u8>()
            .ok()
            .and_then(Grade::from_value)
            .ok_or_else(|| format!("unknown grade {value:?}")),
    }
}

fn parse_now(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {value:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn grades_by_name_or_number() {
        assert_eq!(parse_grade("Easy"), Ok(Grade::Easy));
        assert_eq!(parse_grade("2"), Ok(Grade::Hard));
        assert!(parse_grade("5").is_err());
        assert!(parse_grade("perfect").is_err());
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        assert_eq!(
            parse_now("2024-02-01T10:00:00+02:00"),
            Ok(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap())
        );
        assert!(parse_now("yesterday").is_err());
    }

    #[test]
    fn empty_input_is_a_new_item() {
        assert_eq!(parse_record("  \n").unwrap(), ProgressRecord::default());
        assert!(parse_record("{not json").is_err());
    }

    #[test]
    fn previews_list_every_grade_in_order() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let log = ProgressRecord::default()
            .preview(&Fsrs::default(), now)
            .unwrap();
        let rows = previews(&log);

        let grades: Vec<Grade> = rows.iter().map(|row| row.grade).collect();
        assert_eq!(grades, Grade::ALL.to_vec());
        assert_eq!(rows[0].status, ProgressStatus::Learning);
        assert_eq!(rows[3].status, ProgressStatus::Review);
        assert_eq!(rows[3].scheduled_days, 8);
    }

    #[test]
    fn cli_requires_grade_or_answer_for_strength() {
        assert!(Cli::try_parse_from(["srs-preview", "--strength", "0.5"]).is_err());
        let cli = Cli::try_parse_from(["srs-preview", "--grade", "good", "--strength", "0.5"]).unwrap();
        assert_eq!(cli.grade, Some(Grade::Good));
        assert_eq!(cli.strength, Some(0.5));
        assert!(Cli::try_parse_from(["srs-preview", "--correct", "true", "--strength", "0.5"]).is_ok());
    }

    #[test]
    fn right_or_wrong_answer_becomes_a_review() {
        let cli = Cli::try_parse_from(["srs-preview", "--correct", "false"]).unwrap();
        let request = review_request(&cli).unwrap();
        assert_eq!(request.effective_grade(), Grade::Again);

        let preview_only = Cli::try_parse_from(["srs-preview"]).unwrap();
        assert!(review_request(&preview_only).is_none());

        assert!(Cli::try_parse_from(["srs-preview", "--grade", "easy", "--correct", "true"]).is_err());
    }
}
