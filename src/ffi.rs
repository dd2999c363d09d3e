//! FFI bindings for FocusPro Insights
//!
//! This module provides C-compatible functions for calling the engine from the
//! mobile shells. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `insights_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::config::{EngineConfig, DEFAULT_TIMEZONE};
use crate::encoder::MetricsEncoder;
use crate::error::ComputeError;
use crate::period::Period;
use crate::pipeline::snapshot_to_report;
use crate::refresh::MetricsEngine;
use crate::schema::RecordAdapter;
use crate::source::MemoryStore;

/// User id of a freshly created engine handle
pub const DEFAULT_USER_ID: &str = "local";

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Required string argument; records an error naming it when missing
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string pointer"));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Optional RFC 3339 instant; NULL means the current time
unsafe fn parse_now(ptr: *const c_char) -> Result<DateTime<Utc>, ComputeError> {
    match cstr_to_string(ptr) {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ComputeError::ParseError(format!("Invalid now '{s}': {e}"))),
    }
}

fn status<T>(result: Result<T, ComputeError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute a metrics report for a snapshot.
///
/// # Safety
/// - `snapshot_json` and `period` must be valid null-terminated C strings.
/// - `now` may be NULL (current time) or an RFC 3339 timestamp.
/// - `timezone` may be NULL (America/Sao_Paulo) or an IANA zone name.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_compute(
    snapshot_json: *const c_char,
    period: *const c_char,
    now: *const c_char,
    timezone: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(snapshot_json, "snapshot JSON") else {
        return ptr::null_mut();
    };
    let Some(period_str) = required_arg(period, "period") else {
        return ptr::null_mut();
    };
    let tz_str = cstr_to_string(timezone).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

    let result = parse_now(now)
        .and_then(|now| snapshot_to_report(&json_str, &period_str, now, &tz_str));

    match result {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to a MetricsEngine backed by an in-memory store
pub struct InsightsEngineHandle {
    engine: MetricsEngine<MemoryStore>,
    encoder: MetricsEncoder,
}

/// Create an engine for the `week` period and the default user.
///
/// # Safety
/// - `timezone` may be NULL (America/Sao_Paulo) or a valid C string.
/// - Returns a pointer that must be freed with `insights_engine_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_new(timezone: *const c_char) -> *mut InsightsEngineHandle {
    clear_last_error();

    let config = match cstr_to_string(timezone) {
        Some(tz) => EngineConfig::with_timezone(tz),
        None => EngineConfig::default(),
    };

    match MetricsEngine::new(MemoryStore::new(), &config, DEFAULT_USER_ID, Period::Week) {
        Ok(engine) => Box::into_raw(Box::new(InsightsEngineHandle {
            engine,
            encoder: MetricsEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_free(engine: *mut InsightsEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Replace a user's records with a snapshot. The snapshot's `user_id` is used
/// when present, otherwise the active user. Marks the metrics stale.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_load_snapshot(
    engine: *mut InsightsEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &*engine;

    let Some(json_str) = required_arg(json, "JSON") else {
        return -1;
    };

    status(
        RecordAdapter::parse_snapshot(&json_str).and_then(|snapshot| {
            RecordAdapter::ensure_valid(&snapshot)?;
            let user_id = snapshot
                .user_id
                .clone()
                .unwrap_or_else(|| handle.engine.user_id());
            handle.engine.source().insert_snapshot(&user_id, snapshot);
            Ok(())
        }),
    )
}

/// Switch the requested period.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - `period` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error (unknown token).
#[no_mangle]
pub unsafe extern "C" fn insights_engine_set_period(
    engine: *mut InsightsEngineHandle,
    period: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &*engine;

    let Some(token) = required_arg(period, "period") else {
        return -1;
    };

    status(
        token
            .parse::<Period>()
            .map(|period| handle.engine.set_period(period)),
    )
}

/// Switch the active user.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - `user_id` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_set_user(
    engine: *mut InsightsEngineHandle,
    user_id: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let handle = &*engine;

    let Some(user) = required_arg(user_id, "user_id") else {
        return -1;
    };

    handle.engine.set_user(user);
    0
}

/// Signal that the user's data changed outside the engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_invalidate(engine: *mut InsightsEngineHandle) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    (*engine).engine.invalidate();
    0
}

/// Current metrics report, recomputed when stale.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insights_engine_new`.
/// - `now` may be NULL (current time) or an RFC 3339 timestamp.
/// - Returns a newly allocated string that must be freed with `insights_free_string`.
/// - Returns NULL on error; call `insights_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insights_engine_metrics(
    engine: *mut InsightsEngineHandle,
    now: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let result = parse_now(now)
        .and_then(|now| handle.engine.metrics(now))
        .and_then(|published| {
            handle.encoder.encode_to_json(
                Some(&published.user_id),
                &published.period,
                &published.metrics,
            )
        });

    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by insights functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an insights function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insights_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next insights call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn insights_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn insights_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
