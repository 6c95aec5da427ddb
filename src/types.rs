//! Core value types for the activity ledger
//!
//! A ledger maps a [`DayKey`] to the [`DayStats`] accumulated for that day.
//! Both serialize to the plain JSON shapes stored by the hosting application:
//!
//! ```json
//! { "2022-11-13": { "steps": 8000, "calories": 2200 } }
//! ```

use crate::error::LedgerError;
use crate::ledger::ActivityLedger;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical day key format
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Identifier for one calendar day (`YYYY-MM-DD`).
///
/// Only the canonical rendering of a valid date parses, so two keys are equal
/// exactly when their string forms are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Key for the current local date
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for DayKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, DAY_KEY_FORMAT)
            .map_err(|e| LedgerError::InvalidDayKey(format!("{s:?}: {e}")))?;

        // chrono accepts unpadded fields; reject anything non-canonical
        if date.format(DAY_KEY_FORMAT).to_string() != s {
            return Err(LedgerError::InvalidDayKey(format!(
                "{s:?}: expected YYYY-MM-DD"
            )));
        }

        Ok(Self(date))
    }
}

impl TryFrom<String> for DayKey {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

/// Steps and calories accumulated for a single day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    /// Number of steps
    pub steps: u64,
    /// Calories burned (kcal)
    pub calories: u64,
}

impl DayStats {
    pub fn new(steps: u64, calories: u64) -> Self {
        Self { steps, calories }
    }

    /// Add another recording to this day. Totals saturate rather than wrap.
    pub fn accumulate(&mut self, steps: u64, calories: u64) {
        self.steps = self.steps.saturating_add(steps);
        self.calories = self.calories.saturating_add(calories);
    }
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Identity and body attributes with their derived values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSection {
    pub id: String,
    pub email: String,
    pub name: String,
    pub dob: Option<NaiveDate>,
    /// Whole years; null when the birth date is unknown
    pub age: Option<u32>,
    /// Height (in)
    pub height: u32,
    /// Weight (lb)
    pub weight: u32,
    /// Null when height/weight cannot produce a BMI
    pub bmi: Option<f64>,
}

/// Aggregate activity statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySection {
    pub active_days: usize,
    /// Null for an empty ledger
    pub average_steps: Option<u64>,
    pub total_steps: u64,
    pub total_calories: u64,
}

/// Complete profile document for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub profile: ProfileSection,
    pub activity: ActivitySection,
    pub stats: ActivityLedger,
}
