//! Profile report encoding
//!
//! This module turns a [`PersonProfile`] into a [`ProfileReport`]: the stored
//! attributes plus every derived value (age, BMI, active days, average
//! steps). Values that cannot be derived are reported as `null`, never as a
//! placeholder number.

use crate::error::LedgerError;
use crate::ledger::ActivityLedger;
use crate::profile::PersonProfile;
use crate::types::{ActivitySection, ProfileReport, ProfileSection, ReportProducer};
use crate::{LEDGER_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for profile reports
pub struct ProfileEncoder {
    instance_id: String,
}

impl Default for ProfileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a profile as of now
    pub fn encode(&self, profile: &PersonProfile) -> ProfileReport {
        self.encode_at(profile, Local::now().date_naive(), Utc::now())
    }

    /// Encode a profile with an explicit reference date and timestamp
    pub fn encode_at(
        &self,
        profile: &PersonProfile,
        today: NaiveDate,
        computed_at: DateTime<Utc>,
    ) -> ProfileReport {
        let bmi = match profile.bmi() {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("no BMI for profile {}: {e}", profile.id);
                None
            }
        };

        ProfileReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: LEDGER_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: computed_at.to_rfc3339(),
            profile: ProfileSection {
                id: profile.id.to_string(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                dob: profile.dob,
                age: profile.age_on(today),
                height: profile.height,
                weight: profile.weight,
                bmi,
            },
            activity: summarize(&profile.stats),
            stats: profile.stats.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, profile: &PersonProfile) -> Result<String, LedgerError> {
        let report = self.encode(profile);
        serde_json::to_string_pretty(&report).map_err(LedgerError::JsonError)
    }
}

/// Aggregate statistics for a ledger
pub fn summarize(ledger: &ActivityLedger) -> ActivitySection {
    ActivitySection {
        active_days: ledger.active_day_count(),
        average_steps: ledger.average_steps().ok(),
        total_steps: ledger.total_steps(),
        total_calories: ledger.total_calories(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_profile() -> PersonProfile {
        let mut profile = PersonProfile::new(
            "toby@example.com",
            "hunter22",
            "Toby",
            NaiveDate::from_ymd_opt(1990, 12, 31),
            70,
            154,
        );
        profile.record_activity("2022-11-13".parse().unwrap(), 8000, 2200);
        profile.record_activity("2022-11-14".parse().unwrap(), 5000, 1800);
        profile
    }

    fn encode(profile: &PersonProfile) -> serde_json::Value {
        let encoder = ProfileEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode_at(
            profile,
            NaiveDate::from_ymd_opt(2022, 11, 15).unwrap(),
            Utc.with_ymd_and_hms(2022, 11, 15, 12, 0, 0).unwrap(),
        );
        serde_json::to_value(report).unwrap()
    }

    #[test]
    fn test_encode_profile() {
        let value = encode(&sample_profile());

        assert_eq!(value["report_version"], "1.0.0");
        assert_eq!(value["producer"]["name"], "activity-ledger");
        assert_eq!(value["producer"]["instance_id"], "test-instance");
        assert_eq!(value["computed_at_utc"], "2022-11-15T12:00:00+00:00");

        assert_eq!(value["profile"]["name"], "Toby");
        assert_eq!(value["profile"]["dob"], "1990-12-31");
        assert_eq!(value["profile"]["age"], 31);
        assert!((value["profile"]["bmi"].as_f64().unwrap() - 22.094).abs() < 0.001);

        assert_eq!(value["activity"]["active_days"], 2);
        assert_eq!(value["activity"]["average_steps"], 6500);
        assert_eq!(value["activity"]["total_steps"], 13000);
        assert_eq!(value["activity"]["total_calories"], 4000);

        assert_eq!(value["stats"]["2022-11-13"]["calories"], 2200);
    }

    #[test]
    fn test_underivable_values_are_null() {
        let profile = PersonProfile::new("a@b.cd", "pw", "Al", None, 0, 150);
        let value = encode(&profile);

        assert!(value["profile"]["age"].is_null());
        assert!(value["profile"]["bmi"].is_null());
        assert!(value["activity"]["average_steps"].is_null());
        assert_eq!(value["activity"]["active_days"], 0);
    }

    #[test]
    fn test_password_not_in_report() {
        let encoder = ProfileEncoder::new();
        let json = encoder.encode_to_json(&sample_profile()).unwrap();
        assert!(!json.contains("hunter22"));
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample_profile().stats);
        assert_eq!(
            summary,
            ActivitySection {
                active_days: 2,
                average_steps: Some(6500),
                total_steps: 13000,
                total_calories: 4000,
            }
        );
    }
}
