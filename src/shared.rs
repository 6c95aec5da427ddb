//! Concurrent activity ledger
//!
//! [`SharedLedger`] can be cloned and handed to many request handlers at
//! once. Each recording performs its read-modify-write while holding the
//! map entry for that day, so concurrent increments to the same day are
//! never lost.

use crate::error::LedgerError;
use crate::event::ActivityEvent;
use crate::ledger::ActivityLedger;
use crate::types::{DayKey, DayStats};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe ledger with atomic per-day accumulation
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    days: Arc<DashMap<DayKey, DayStats>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a shared ledger from a plain one (e.g. freshly loaded from storage)
    pub fn from_ledger(ledger: &ActivityLedger) -> Self {
        let days = DashMap::with_capacity(ledger.active_day_count());
        for (day, stats) in ledger {
            days.insert(*day, *stats);
        }
        Self {
            days: Arc::new(days),
        }
    }

    /// Record activity for a day atomically
    pub fn record(&self, day: DayKey, steps: u64, calories: u64) {
        // The entry guard holds the shard lock for the whole update
        let mut stats = self.days.entry(day).or_default();
        stats.accumulate(steps, calories);
    }

    /// Validate and record a boundary event
    pub fn record_event(&self, event: &ActivityEvent) -> Result<(), LedgerError> {
        let valid = event.validate()?;
        self.record(valid.day, valid.steps, valid.calories);
        Ok(())
    }

    pub fn get(&self, day: &DayKey) -> Option<DayStats> {
        self.days.get(day).map(|entry| *entry.value())
    }

    pub fn active_day_count(&self) -> usize {
        self.days.len()
    }

    /// Copy the current state into a plain ledger
    pub fn snapshot(&self) -> ActivityLedger {
        self.days
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    /// Average steps over a snapshot. Shards are locked one at a time, so
    /// recordings made while it runs may or may not be included.
    pub fn average_steps(&self) -> Result<u64, LedgerError> {
        self.snapshot().average_steps()
    }
}
