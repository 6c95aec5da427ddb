//! Daily activity ledger
//!
//! The ledger maps each recorded day to the steps and calories accumulated on
//! it. Recording is additive only: a day's totals never decrease and a day,
//! once present, is never removed.

use crate::error::LedgerError;
use crate::event::ActivityEvent;
use crate::types::{DayKey, DayStats};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::{self, BTreeMap, Entry};
use std::fmt;

/// Per-person mapping from day to accumulated activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivityLedger {
    days: BTreeMap<DayKey, DayStats>,
}

impl ActivityLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record activity for a day.
    ///
    /// A new day is inserted as given; an existing day has the quantities
    /// added to its totals.
    pub fn record(&mut self, day: DayKey, steps: u64, calories: u64) {
        let stats = self.days.entry(day).or_default();
        stats.accumulate(steps, calories);
        log::trace!(
            "recorded {steps} steps / {calories} kcal on {day} (now {} / {})",
            stats.steps,
            stats.calories
        );
    }

    /// Validate and record a boundary event. The ledger is untouched on error.
    pub fn record_event(&mut self, event: &ActivityEvent) -> Result<(), LedgerError> {
        let valid = event.validate()?;
        self.record(valid.day, valid.steps, valid.calories);
        Ok(())
    }

    /// Validate a batch of events and record them all, or none.
    ///
    /// Returns the number of events applied.
    pub fn record_all(&mut self, events: &[ActivityEvent]) -> Result<usize, LedgerError> {
        let validated = events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                event.validate().map_err(|e| {
                    log::warn!("rejecting batch: event {i} is invalid: {e}");
                    e
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for valid in &validated {
            self.record(valid.day, valid.steps, valid.calories);
        }
        Ok(validated.len())
    }

    /// Accumulate every day of another ledger into this one
    pub fn merge(&mut self, other: &ActivityLedger) {
        for (day, stats) in other.iter() {
            self.record(*day, stats.steps, stats.calories);
        }
    }

    pub fn get(&self, day: &DayKey) -> Option<&DayStats> {
        self.days.get(day)
    }

    /// Number of distinct days with recorded activity
    pub fn active_day_count(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterate days in calendar order
    pub fn iter(&self) -> btree_map::Iter<'_, DayKey, DayStats> {
        self.days.iter()
    }

    /// Total steps across all days (saturating)
    pub fn total_steps(&self) -> u64 {
        self.days
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.steps))
    }

    /// Total calories across all days (saturating)
    pub fn total_calories(&self) -> u64 {
        self.days
            .values()
            .fold(0u64, |acc, s| acc.saturating_add(s.calories))
    }

    /// Average steps per active day, truncated toward zero.
    ///
    /// Fails with [`LedgerError::EmptyLedger`] when no day has been recorded.
    pub fn average_steps(&self) -> Result<u64, LedgerError> {
        if self.days.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }
        // Sum in u128 so the mean stays exact even near u64::MAX
        let total: u128 = self.days.values().map(|s| u128::from(s.steps)).sum();
        let average = total / self.days.len() as u128;
        // The mean never exceeds the largest single value, so this is lossless
        Ok(average as u64)
    }

    /// Load a ledger from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the ledger to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// A stored ledger holds each day once; a repeated key is rejected rather than
// letting the later entry overwrite the earlier totals.
impl<'de> Deserialize<'de> for ActivityLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LedgerVisitor;

        impl<'de> Visitor<'de> for LedgerVisitor {
            type Value = ActivityLedger;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of YYYY-MM-DD days to step/calorie totals")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut days = BTreeMap::new();
                while let Some((day, stats)) = map.next_entry::<DayKey, DayStats>()? {
                    match days.entry(day) {
                        Entry::Vacant(slot) => {
                            slot.insert(stats);
                        }
                        Entry::Occupied(_) => {
                            return Err(de::Error::custom(format!("duplicate day {day}")));
                        }
                    }
                }
                Ok(ActivityLedger { days })
            }
        }

        deserializer.deserialize_map(LedgerVisitor)
    }
}

impl<'a> IntoIterator for &'a ActivityLedger {
    type Item = (&'a DayKey, &'a DayStats);
    type IntoIter = btree_map::Iter<'a, DayKey, DayStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(DayKey, DayStats)> for ActivityLedger {
    fn from_iter<I: IntoIterator<Item = (DayKey, DayStats)>>(iter: I) -> Self {
        let mut ledger = ActivityLedger::new();
        for (day, stats) in iter {
            ledger.record(day, stats.steps, stats.calories);
        }
        ledger
    }
}
