//! Body metrics derived from profile attributes
//!
//! - Age in whole calendar years
//! - Body Mass Index using the imperial approximation `703 * lb / in²`

use crate::error::LedgerError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Conversion constant for BMI from pounds and inches
pub const IMPERIAL_BMI_FACTOR: f64 = 703.0;

/// Legacy value reported for an unknown age on the C boundary
pub const UNKNOWN_AGE: i32 = -1;

/// Whole years elapsed between `birth` and `today`.
///
/// A year is only counted once its anniversary has been reached, so someone
/// born on 29 February ages on 1 March in non-leap years. Returns `None` when
/// the birth date is unknown or lies after `today`.
pub fn age(birth: Option<NaiveDate>, today: NaiveDate) -> Option<u32> {
    let birth = birth?;
    if birth > today {
        return None;
    }

    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Map an optional age onto the legacy `-1` convention
pub fn legacy_age_sentinel(age: Option<u32>) -> i32 {
    age.and_then(|a| i32::try_from(a).ok())
        .unwrap_or(UNKNOWN_AGE)
}

/// Body Mass Index from height in inches and weight in pounds.
///
/// Height must be positive and finite; weight must be non-negative and finite.
pub fn bmi(height_in: f64, weight_lb: f64) -> Result<f64, LedgerError> {
    if !height_in.is_finite() || height_in <= 0.0 {
        return Err(LedgerError::DegenerateMeasurement(format!(
            "height must be positive, got {height_in}"
        )));
    }
    if !weight_lb.is_finite() || weight_lb < 0.0 {
        return Err(LedgerError::DegenerateMeasurement(format!(
            "weight must be non-negative, got {weight_lb}"
        )));
    }

    Ok(IMPERIAL_BMI_FACTOR * weight_lb / height_in.powi(2))
}

/// Single-field BMI payload, rendered as `{"bmi": <value>}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReport {
    pub bmi: f64,
}

impl BmiReport {
    /// Compute the report from height (in) and weight (lb)
    pub fn from_measurements(height_in: f64, weight_lb: f64) -> Result<Self, LedgerError> {
        Ok(Self {
            bmi: bmi(height_in, weight_lb)?,
        })
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string(self).map_err(LedgerError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_on_anniversary() {
        let birth = date(2000, 6, 15);
        assert_eq!(age(Some(birth), date(2001, 6, 14)), Some(0));
        assert_eq!(age(Some(birth), date(2001, 6, 15)), Some(1));
        assert_eq!(age(Some(birth), date(2001, 6, 16)), Some(1));
    }

    #[test]
    fn test_age_across_many_years() {
        assert_eq!(age(Some(date(1990, 12, 31)), date(2022, 11, 13)), Some(31));
        assert_eq!(age(Some(date(1990, 1, 1)), date(2022, 11, 13)), Some(32));
    }

    #[test]
    fn test_age_leap_day_birth() {
        let birth = date(2000, 2, 29);
        assert_eq!(age(Some(birth), date(2001, 2, 28)), Some(0));
        assert_eq!(age(Some(birth), date(2001, 3, 1)), Some(1));
        assert_eq!(age(Some(birth), date(2004, 2, 29)), Some(4));
    }

    #[test]
    fn test_age_same_day_birth() {
        assert_eq!(age(Some(date(2022, 11, 13)), date(2022, 11, 13)), Some(0));
    }

    #[test]
    fn test_age_unknown() {
        assert_eq!(age(None, date(2022, 11, 13)), None);
        assert_eq!(age(Some(date(2030, 1, 1)), date(2022, 11, 13)), None);
    }

    #[test]
    fn test_legacy_age_sentinel() {
        assert_eq!(legacy_age_sentinel(Some(31)), 31);
        assert_eq!(legacy_age_sentinel(None), -1);
    }

    #[test]
    fn test_bmi_formula() {
        let value = bmi(70.0, 154.0).unwrap();
        // 703 * 154 / 4900 = 22.094...
        assert!((value - 22.094).abs() < 0.001, "got {value}");
    }

    #[test]
    fn test_bmi_zero_weight() {
        assert_eq!(bmi(70.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_bmi_rejects_degenerate_height() {
        for height in [0.0, -70.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(bmi(height, 154.0), Err(LedgerError::DegenerateMeasurement(_))),
                "height {height} should be rejected"
            );
        }
    }

    #[test]
    fn test_bmi_rejects_negative_weight() {
        assert!(matches!(
            bmi(70.0, -1.0),
            Err(LedgerError::DegenerateMeasurement(_))
        ));
    }

    #[test]
    fn test_bmi_report_json() {
        let report = BmiReport::from_measurements(70.0, 154.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!((obj["bmi"].as_f64().unwrap() - 22.094).abs() < 0.001);
    }
}
