//! Activity recording events
//!
//! An [`ActivityEvent`] is what callers hand to the ledger at the boundary:
//! one recording for one day, with quantities as received from the outside
//! world (signed, unvalidated). Events are validated before they touch a
//! ledger so that a bad recording can never corrupt accumulated totals.

use crate::error::LedgerError;
use crate::types::DayKey;
use serde::{Deserialize, Serialize};

/// A single activity recording as received from a request or input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Calendar day (YYYY-MM-DD)
    pub day: String,
    /// Steps walked in this recording
    pub steps: i64,
    /// Calories burned in this recording
    #[serde(default)]
    pub calories: i64,
}

/// An event that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub day: DayKey,
    pub steps: u64,
    pub calories: u64,
}

impl ActivityEvent {
    pub fn new(day: impl Into<String>, steps: i64, calories: i64) -> Self {
        Self {
            day: day.into(),
            steps,
            calories,
        }
    }

    /// Check the day key and quantities
    pub fn validate(&self) -> Result<ValidatedEvent, LedgerError> {
        let day: DayKey = self.day.parse()?;
        let steps = non_negative("steps", self.steps)?;
        let calories = non_negative("calories", self.calories)?;

        Ok(ValidatedEvent {
            day,
            steps,
            calories,
        })
    }
}

fn non_negative(field: &str, value: i64) -> Result<u64, LedgerError> {
    u64::try_from(value)
        .map_err(|_| LedgerError::InvalidInput(format!("{field} must be >= 0, got {value}")))
}

/// Parse NDJSON (newline-delimited JSON) containing activity events.
///
/// Blank lines are skipped. The first malformed line aborts parsing.
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ActivityEvent>, LedgerError> {
    let mut events = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<ActivityEvent>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => {
                return Err(LedgerError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(events)
}

/// Parse a JSON array of activity events
pub fn parse_array(json: &str) -> Result<Vec<ActivityEvent>, LedgerError> {
    let events: Vec<ActivityEvent> = serde_json::from_str(json)?;
    Ok(events)
}
