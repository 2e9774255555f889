//! Scheduler configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};

/// Largest accepted `maximum_interval`, in days.
pub const MAXIMUM_INTERVAL_LIMIT: i64 = 36500;

/// Number of weights in the parameter vector.
pub const WEIGHT_COUNT: usize = 21;

/// Default weights.
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_COUNT] = [
    0.212, 1.2931, 2.3065, 8.2956, // w[0-3]: initial stability for Again, Hard, Good, Easy
    6.4133, // w[4]: initial difficulty base
    0.8334, // w[5]: initial difficulty per grade
    3.0194, // w[6]: difficulty change per grade
    0.001,  // w[7]: mean reversion weight
    1.8722, // w[8]: recall stability scale (exp)
    0.1666, // w[9]: recall stability decay
    0.796,  // w[10]: retrievability effect on recall
    1.4835, // w[11]: forget stability base
    0.0614, // w[12]: difficulty effect on forget
    0.2629, // w[13]: stability effect on forget
    1.6483, // w[14]: retrievability effect on forget
    0.6014, // w[15]: hard penalty
    1.8729, // w[16]: easy bonus
    0.5425, // w[17]: short-term stability scale
    0.0912, // w[18]: short-term grade offset
    0.0658, // w[19]: short-term stability decay
    0.1542, // w[20]: forgetting curve decay
];

/// Scheduler parameters.
///
/// Fixed once handed to [`Fsrs::new`](crate::algorithm::fsrs::Fsrs::new).
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Target recall probability used to size intervals.
    pub request_retention: f64,
    /// Hard cap on any interval, in days.
    pub maximum_interval: i64,
    pub w: [f64; WEIGHT_COUNT],
    /// Accepted for compatibility; intervals are never fuzzed.
    pub enable_fuzz: bool,
    /// When false, new cards go straight to review on their first rating.
    pub enable_short_term: bool,
    pub learning_steps: Vec<Step>,
    pub relearning_steps: Vec<Step>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval: MAXIMUM_INTERVAL_LIMIT,
            w: DEFAULT_WEIGHTS,
            enable_fuzz: true,
            enable_short_term: true,
            learning_steps: vec![
                Step::minutes(1),
                Step::minutes(10),
                Step::minutes(20),
                Step::minutes(60),
            ],
            relearning_steps: vec![
                Step::minutes(1),
                Step::minutes(10),
                Step::minutes(15),
                Step::minutes(30),
            ],
        }
    }
}

impl Parameters {
    /// Check that the parameters produce finite, positive intervals.
    pub fn validate(&self) -> Result<()> {
        if !(self.request_retention > 0.0 && self.request_retention <= 1.0) {
            return Err(SrsError::InvalidParameters(format!(
                "request_retention must be in (0, 1], got {}",
                self.request_retention
            )));
        }
        if !(1..=MAXIMUM_INTERVAL_LIMIT).contains(&self.maximum_interval) {
            return Err(SrsError::InvalidParameters(format!(
                "maximum_interval must be in [1, {MAXIMUM_INTERVAL_LIMIT}], got {}",
                self.maximum_interval
            )));
        }
        if let Some((index, weight)) = self.w.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(SrsError::InvalidParameters(format!(
                "w[{index}] must be finite, got {weight}"
            )));
        }
        if self.w[20] <= 0.0 {
            return Err(SrsError::InvalidParameters(format!(
                "w[20] must be positive, got {}",
                self.w[20]
            )));
        }
        Ok(())
    }
}

/// Unit of a learning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUnit {
    Minutes,
    Hours,
    Days,
}

impl StepUnit {
    fn suffix(self) -> char {
        match self {
            Self::Minutes => 'm',
            Self::Hours => 'h',
            Self::Days => 'd',
        }
    }
}

/// A learning or relearning step such as `"10m"`, `"1h"` or `"2d"`.
///
/// A bare number is read as days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Step {
    pub value: u32,
    pub unit: StepUnit,
}

impl Step {
    pub fn minutes(value: u32) -> Self {
        Self {
            value,
            unit: StepUnit::Minutes,
        }
    }

    pub fn hours(value: u32) -> Self {
        Self {
            value,
            unit: StepUnit::Hours,
        }
    }

    pub fn days(value: u32) -> Self {
        Self {
            value,
            unit: StepUnit::Days,
        }
    }

    /// Step length in fractional days.
    pub fn as_days(&self) -> f64 {
        let value = f64::from(self.value);
        match self.unit {
            StepUnit::Minutes => value / 1440.0,
            StepUnit::Hours => value / 24.0,
            StepUnit::Days => value,
        }
    }
}

impl FromStr for Step {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SrsError::InvalidStep {
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let (digits, unit) = match trimmed.chars().last() {
            Some('m') => (&trimmed[..trimmed.len() - 1], StepUnit::Minutes),
            Some('h') => (&trimmed[..trimmed.len() - 1], StepUnit::Hours),
            Some('d') => (&trimmed[..trimmed.len() - 1], StepUnit::Days),
            Some(_) => (trimmed, StepUnit::Days),
            None => return Err(invalid()),
        };
        let value = digits.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { value, unit })
    }
}

impl TryFrom<String> for Step {
    type Error = SrsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        step.to_string()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let params = Parameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.w[3], 8.2956);
        assert_eq!(params.maximum_interval, 36500);
    }

    #[test]
    fn rejects_out_of_range_retention() {
        for retention in [0.0, -0.5, 1.5, f64::NAN] {
            let params = Parameters {
                request_retention: retention,
                ..Default::default()
            };
            assert!(matches!(
                params.validate(),
                Err(SrsError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn rejects_maximum_interval_beyond_limit() {
        let params = Parameters {
            maximum_interval: 100_000_000,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(SrsError::InvalidParameters(
                "maximum_interval must be in [1, 36500], got 100000000".to_string()
            ))
        );

        let at_limit = Parameters {
            maximum_interval: MAXIMUM_INTERVAL_LIMIT,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn rejects_zero_maximum_interval() {
        let params = Parameters {
            maximum_interval: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_weight() {
        let mut params = Parameters::default();
        params.w[9] = f64::INFINITY;
        assert_eq!(
            params.validate(),
            Err(SrsError::InvalidParameters(
                "w[9] must be finite, got inf".to_string()
            ))
        );
    }

    #[test]
    fn rejects_non_positive_decay() {
        let mut params = Parameters::default();
        params.w[20] = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn parses_steps() {
        assert_eq!("1m".parse::<Step>().unwrap(), Step::minutes(1));
        assert_eq!("6h".parse::<Step>().unwrap(), Step::hours(6));
        assert_eq!("2d".parse::<Step>().unwrap(), Step::days(2));
        assert_eq!("3".parse::<Step>().unwrap(), Step::days(3));
    }

    #[test]
    fn rejects_malformed_steps() {
        for value in ["", "m", "10x", "-5m", "1.5h"] {
            assert!(value.parse::<Step>().is_err(), "{value:?} should not parse");
        }
    }

    #[test]
    fn step_lengths() {
        assert_eq!(Step::minutes(1440).as_days(), 1.0);
        assert_eq!(Step::hours(12).as_days(), 0.5);
        assert_eq!(Step::days(2).as_days(), 2.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: Parameters = serde_json::from_str(
            r#"{"request_retention":0.85,"learning_steps":["5m","1h"]}"#,
        )
        .unwrap();
        assert_eq!(params.request_retention, 0.85);
        assert_eq!(params.learning_steps, vec![Step::minutes(5), Step::hours(1)]);
        assert_eq!(params.maximum_interval, 36500);
        assert_eq!(params.w, DEFAULT_WEIGHTS);
    }

    #[test]
    fn steps_serialize_as_strings() {
        let json = serde_json::to_string(&Parameters::default().relearning_steps).unwrap();
        assert_eq!(json, r#"["1m","10m","15m","30m"]"#);
    }
}
