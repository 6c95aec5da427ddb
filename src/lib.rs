//! Activity Ledger - per-person daily activity accounting
//!
//! A person profile owns a ledger that maps each calendar day to the steps
//! and calories accumulated on it. From the ledger and the profile's body
//! attributes the crate derives:
//!
//! - active-day count and average daily steps
//! - age in whole calendar years
//! - Body Mass Index (imperial formula)
//!
//! Persistence, authentication and field validation are left to the hosting
//! application. Ledgers and profiles serialize to plain JSON for that purpose.

pub mod encoder;
pub mod error;
pub mod event;
pub mod ledger;
pub mod metrics;
pub mod profile;
pub mod shared;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use encoder::ProfileEncoder;
pub use error::LedgerError;
pub use event::ActivityEvent;
pub use ledger::ActivityLedger;
pub use metrics::{age, bmi, BmiReport};
pub use profile::PersonProfile;
pub use shared::SharedLedger;
pub use types::{DayKey, DayStats, ProfileReport};

/// Library version embedded in all reports
pub const LEDGER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "activity-ledger";
