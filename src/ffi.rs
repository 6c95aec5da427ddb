//! FFI bindings for the activity ledger
//!
//! This module provides C-compatible functions for driving a ledger from other
//! languages. All strings are null-terminated; strings returned by this module
//! are allocated here and must be freed with `ledger_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{Local, NaiveDate};

use crate::event::ActivityEvent;
use crate::ledger::ActivityLedger;
use crate::metrics::{self, BmiReport, UNKNOWN_AGE};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn parse_date(ptr: *const c_char, what: &str) -> Result<NaiveDate, String> {
    let s = cstr_to_string(ptr).ok_or_else(|| format!("Invalid {what} string pointer"))?;
    s.parse::<crate::types::DayKey>()
        .map(|key| key.date())
        .map_err(|e| e.to_string())
}

// ============================================================================
// Ledger handle
// ============================================================================

/// Opaque handle to an ActivityLedger
pub struct LedgerHandle {
    ledger: ActivityLedger,
}

/// Create a new, empty ledger.
///
/// # Safety
/// - Returns a pointer that must be freed with `ledger_free`.
#[no_mangle]
pub unsafe extern "C" fn ledger_new() -> *mut LedgerHandle {
    clear_last_error();
    Box::into_raw(Box::new(LedgerHandle {
        ledger: ActivityLedger::new(),
    }))
}

/// Load a ledger from its JSON form.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns NULL on error; call `ledger_last_error` for the message.
/// - A non-NULL result must be freed with `ledger_free`.
#[no_mangle]
pub unsafe extern "C" fn ledger_from_json(json: *const c_char) -> *mut LedgerHandle {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match ActivityLedger::from_json(&json_str) {
        Ok(ledger) => Box::into_raw(Box::new(LedgerHandle { ledger })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a ledger.
///
/// # Safety
/// - `handle` must be a pointer returned by `ledger_new` or `ledger_from_json`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ledger_free(handle: *mut LedgerHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Serialize a ledger to JSON.
///
/// # Safety
/// - `handle` must be a valid ledger pointer.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_to_json(handle: *const LedgerHandle) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null ledger pointer");
        return ptr::null_mut();
    }

    match (*handle).ledger.to_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Record activity for a day.
///
/// Returns 0 on success and -1 on error (null pointer, malformed day or
/// negative quantities). The ledger is unchanged on error.
///
/// # Safety
/// - `handle` must be a valid ledger pointer.
/// - `day` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn ledger_record(
    handle: *mut LedgerHandle,
    day: *const c_char,
    steps: i64,
    calories: i64,
) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null ledger pointer");
        return -1;
    }

    let day_str = match cstr_to_string(day) {
        Some(s) => s,
        None => {
            set_last_error("Invalid day string pointer");
            return -1;
        }
    };

    let handle = &mut *handle;
    match handle
        .ledger
        .record_event(&ActivityEvent::new(day_str, steps, calories))
    {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Number of distinct recorded days, or -1 for a null handle.
///
/// # Safety
/// - `handle` must be a valid ledger pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn ledger_active_days(handle: *const LedgerHandle) -> i64 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null ledger pointer");
        return -1;
    }

    i64::try_from((*handle).ledger.active_day_count()).unwrap_or(i64::MAX)
}

/// Average steps per recorded day, or -1 when the ledger is empty.
///
/// # Safety
/// - `handle` must be a valid ledger pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn ledger_average_steps(handle: *const LedgerHandle) -> i64 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null ledger pointer");
        return -1;
    }

    match (*handle).ledger.average_steps() {
        Ok(avg) => i64::try_from(avg).unwrap_or(i64::MAX),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Body metrics
// ============================================================================

/// BMI for height (in) and weight (lb) as `{"bmi": <value>}`.
///
/// The returned string must be freed with `ledger_free_string`. Returns NULL
/// for degenerate measurements; call `ledger_last_error`.
#[no_mangle]
pub extern "C" fn ledger_bmi_json(height_in: f64, weight_lb: f64) -> *mut c_char {
    clear_last_error();

    match BmiReport::from_measurements(height_in, weight_lb).and_then(|r| r.to_json()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Age in whole years, or -1 when it cannot be determined.
///
/// `dob` may be NULL (unknown birth date). `today` may be NULL to use the
/// current local date.
///
/// # Safety
/// - Non-NULL arguments must be valid null-terminated C strings (YYYY-MM-DD).
#[no_mangle]
pub unsafe extern "C" fn ledger_age(dob: *const c_char, today: *const c_char) -> i32 {
    clear_last_error();

    let birth = if dob.is_null() {
        None
    } else {
        match parse_date(dob, "dob") {
            Ok(date) => Some(date),
            Err(e) => {
                set_last_error(&e);
                return UNKNOWN_AGE;
            }
        }
    };

    let today = if today.is_null() {
        Local::now().date_naive()
    } else {
        match parse_date(today, "today") {
            Ok(date) => date,
            Err(e) => {
                set_last_error(&e);
                return UNKNOWN_AGE;
            }
        }
    };

    metrics::legacy_age_sentinel(metrics::age(birth, today))
}

// ============================================================================
// Memory management
// ============================================================================

/// Free a string returned by this library.
///
/// # Safety
/// - `ptr` must be a pointer returned by a `ledger_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn ledger_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message for the current thread.
///
/// # Safety
/// - Returns a pointer owned by the library. Do NOT free.
/// - The pointer is valid until the next `ledger_*` call on this thread.
#[no_mangle]
pub unsafe extern "C" fn ledger_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ledger_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    unsafe fn last_error() -> String {
        let err = ledger_last_error();
        assert!(!err.is_null());
        CStr::from_ptr(err).to_str().unwrap().to_string()
    }

    #[test]
    fn test_ffi_ledger_lifecycle() {
        let day = CString::new("2022-11-13").unwrap();
        let other_day = CString::new("2022-11-14").unwrap();

        unsafe {
            let handle = ledger_new();
            assert!(!handle.is_null());

            assert_eq!(ledger_average_steps(handle), -1);
            assert!(last_error().contains("empty"));

            assert_eq!(ledger_record(handle, day.as_ptr(), 8000, 2200), 0);
            assert_eq!(ledger_record(handle, day.as_ptr(), 500, 100), 0);
            assert_eq!(ledger_record(handle, other_day.as_ptr(), 4500, 900), 0);

            assert_eq!(ledger_active_days(handle), 2);
            assert_eq!(ledger_average_steps(handle), 6500);

            let json = ledger_to_json(handle);
            assert!(!json.is_null());
            let json_str = CStr::from_ptr(json).to_str().unwrap().to_string();
            ledger_free_string(json);
            assert!(json_str.contains("\"2022-11-13\":{\"steps\":8500,\"calories\":2300}"));

            // Reload into a second handle
            let json_c = CString::new(json_str).unwrap();
            let reloaded = ledger_from_json(json_c.as_ptr());
            assert!(!reloaded.is_null());
            assert_eq!(ledger_active_days(reloaded), 2);

            ledger_free(reloaded);
            ledger_free(handle);
        }
    }

    #[test]
    fn test_ffi_record_rejects_bad_input() {
        let bad_day = CString::new("2022-1-13").unwrap();
        let day = CString::new("2022-11-13").unwrap();

        unsafe {
            let handle = ledger_new();

            assert_eq!(ledger_record(handle, bad_day.as_ptr(), 10, 10), -1);
            assert!(last_error().contains("day key"));

            assert_eq!(ledger_record(handle, day.as_ptr(), -10, 10), -1);
            assert!(last_error().contains("steps"));

            assert_eq!(ledger_record(handle, ptr::null(), 10, 10), -1);
            assert_eq!(ledger_active_days(handle), 0);

            ledger_free(handle);
        }
    }

    #[test]
    fn test_ffi_null_handle() {
        unsafe {
            assert_eq!(ledger_active_days(ptr::null()), -1);
            assert!(ledger_to_json(ptr::null()).is_null());
            assert_eq!(last_error(), "Null ledger pointer");
        }
    }

    #[test]
    fn test_ffi_from_invalid_json() {
        let json = CString::new("not json").unwrap();
        unsafe {
            assert!(ledger_from_json(json.as_ptr()).is_null());
            assert!(!ledger_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_bmi_json() {
        unsafe {
            let json = ledger_bmi_json(70.0, 154.0);
            assert!(!json.is_null());
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(json).to_str().unwrap()).unwrap();
            ledger_free_string(json);
            assert!((value["bmi"].as_f64().unwrap() - 22.094).abs() < 0.001);

            assert!(ledger_bmi_json(0.0, 154.0).is_null());
            assert!(last_error().contains("height"));
        }
    }

    #[test]
    fn test_ffi_age() {
        let dob = CString::new("2000-06-15").unwrap();
        let before = CString::new("2001-06-14").unwrap();
        let on = CString::new("2001-06-15").unwrap();

        unsafe {
            assert_eq!(ledger_age(dob.as_ptr(), before.as_ptr()), 0);
            assert_eq!(ledger_age(dob.as_ptr(), on.as_ptr()), 1);
            assert_eq!(ledger_age(ptr::null(), on.as_ptr()), -1);
            assert!(ledger_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(ledger_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }
}
