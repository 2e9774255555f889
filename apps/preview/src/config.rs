//! Scheduler parameters from the environment.

use std::path::Path;

use anyhow::{Context, Result};
use srs_core::Parameters;

/// Path to a JSON parameters file; fields it omits keep their defaults.
pub const PARAMETERS_FILE_VAR: &str = "SRS_PARAMETERS";
pub const REQUEST_RETENTION_VAR: &str = "SRS_REQUEST_RETENTION";
pub const MAXIMUM_INTERVAL_VAR: &str = "SRS_MAXIMUM_INTERVAL";
pub const ENABLE_SHORT_TERM_VAR: &str = "SRS_ENABLE_SHORT_TERM";

/// Load parameters from the process environment.
pub fn load_parameters() -> Result<Parameters> {
    parameters_from(|key| std::env::var(key).ok())
}

/// Load parameters using `lookup` to read variables.
///
/// The parameters file is applied first, then individual overrides.
pub fn parameters_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Parameters> {
    let mut params = match lookup(PARAMETERS_FILE_VAR) {
        Some(path) => read_parameters_file(Path::new(&path))?,
        None => Parameters::default(),
    };

    if let Some(value) = lookup(REQUEST_RETENTION_VAR) {
        params.request_retention = value
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{REQUEST_RETENTION_VAR} must be a number, got {value:?}"))?;
    }
    if let Some(value) = lookup(MAXIMUM_INTERVAL_VAR) {
        params.maximum_interval = value
            .trim()
            .parse::<i64>()
            .with_context(|| format!("{MAXIMUM_INTERVAL_VAR} must be an integer, got {value:?}"))?;
    }
    if let Some(value) = lookup(ENABLE_SHORT_TERM_VAR) {
        params.enable_short_term = parse_bool(&value)
            .with_context(|| format!("{ENABLE_SHORT_TERM_VAR} must be true or false, got {value:?}"))?;
    }

    params.validate()?;
    Ok(params)
}

fn read_parameters_file(path: &Path) -> Result<Parameters> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parameters file {}", path.display()))?;
    let params = serde_json::from_str(&contents)
        .with_context(|| format!("invalid parameters file {}", path.display()))?;
    tracing::info!("Loaded scheduler parameters from {}", path.display());
    Ok(params)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
