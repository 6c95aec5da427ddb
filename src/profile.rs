//! Person profile
//!
//! A plain record of identity and body attributes that owns one
//! [`ActivityLedger`]. Field validation, credential handling and persistence
//! belong to the hosting application; this type only stores values and
//! derives statistics from them.

use crate::error::LedgerError;
use crate::event::ActivityEvent;
use crate::ledger::ActivityLedger;
use crate::metrics::{self, BmiReport};
use crate::types::DayKey;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Person profile with an embedded activity ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonProfile {
    /// Unique identifier
    pub id: Uuid,
    pub email: String,
    /// Credential as handed over by the auth layer. Never serialized.
    #[serde(skip_serializing, default)]
    password: String,
    pub name: String,
    /// Date of birth (YYYY-MM-DD)
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    /// Height in inches
    pub height: u32,
    /// Weight in pounds
    pub weight: u32,
    /// Daily activity, keyed by day
    #[serde(default)]
    pub stats: ActivityLedger,
}

impl PersonProfile {
    /// Create a profile with a fresh id and an empty ledger
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        dob: Option<NaiveDate>,
        height: u32,
        weight: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password: password.into(),
            name: name.into(),
            dob,
            height,
            weight,
            stats: ActivityLedger::new(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Age in whole years as of today (local time)
    pub fn age(&self) -> Option<u32> {
        self.age_on(Local::now().date_naive())
    }

    /// Age in whole years as of `today`
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        metrics::age(self.dob, today)
    }

    pub fn bmi(&self) -> Result<f64, LedgerError> {
        metrics::bmi(f64::from(self.height), f64::from(self.weight))
    }

    /// BMI rendered as `{"bmi": <value>}`
    pub fn bmi_to_json(&self) -> Result<String, LedgerError> {
        BmiReport::from_measurements(f64::from(self.height), f64::from(self.weight))?.to_json()
    }

    pub fn record_activity(&mut self, day: DayKey, steps: u64, calories: u64) {
        self.stats.record(day, steps, calories);
    }

    pub fn record_event(&mut self, event: &ActivityEvent) -> Result<(), LedgerError> {
        self.stats.record_event(event)
    }

    pub fn active_days(&self) -> usize {
        self.stats.active_day_count()
    }

    pub fn average_steps(&self) -> Result<u64, LedgerError> {
        self.stats.average_steps()
    }
}
