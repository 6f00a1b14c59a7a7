//! FFI layer for host UI integration
//!
//! Provides C-compatible functions that can be called from a native front end.
//! Uses opaque pointers and C strings; structured results are JSON.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::Error;
use crate::progress::is_unlocked;
use crate::scoring::evaluate;
use crate::session::DictationSession;
use crate::storage::Storage;
use crate::types::{LevelId, LevelProgress};

/// Opaque handle to a practice session
pub struct DictationHandle {
    session: Mutex<DictationSession>,
    last_error: Mutex<Option<String>>,
}

#[derive(Serialize)]
struct LevelSummary<'a> {
    #[serde(flatten)]
    progress: &'a LevelProgress,
    unlocked: bool,
}

fn set_last_error(handle: &DictationHandle, message: impl Into<String>) {
    *handle.last_error.lock() = Some(message.into());
}

fn clear_last_error(handle: &DictationHandle) {
    *handle.last_error.lock() = None;
}

/// Record a failed operation for `dictation_get_last_error`
fn report(handle: &DictationHandle, context: &str, e: Error) {
    let message = format!("{context}: {e}");
    error!("{message}");
    set_last_error(handle, message);
}

fn handle_ref<'a>(handle: *mut DictationHandle) -> Option<&'a DictationHandle> {
    if handle.is_null() {
        None
    } else {
        Some(unsafe { &*handle })
    }
}

fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn to_json_c_string<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            error!("Failed to serialize FFI payload: {}", e);
            ptr::null_mut()
        }
    }
}

// ============ Stateless evaluation ============

/// Score a user transcription against a reference sentence
/// Returns JSON (caller must free with dictation_free_string):
/// {
///   "ref_tokens": [...], "user_tokens": [...],
///   "ops": [{"type": "ok", "ref": "a", "user": "a"}, ...],
///   "ok": 3, "wrong": 1, "missing": 0, "extra": 0,
///   "accuracy": 75, "pass_score": 90, "passed": false
/// }
#[unsafe(no_mangle)]
pub extern "C" fn dictation_evaluate(
    reference: *const c_char,
    user: *const c_char,
    pass_score: i64,
) -> *mut c_char {
    let (Some(reference), Some(user)) = (read_str(reference), read_str(user)) else {
        return ptr::null_mut();
    };

    to_json_c_string(&evaluate(reference, user, pass_score))
}

// ============ Lifecycle ============

/// Open the level database and start a session
/// A null path uses the platform data directory; returns null on failure
#[unsafe(no_mangle)]
pub extern "C" fn dictation_init(db_path: *const c_char) -> *mut DictationHandle {
    let db_path = if db_path.is_null() {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dictation")
            .join("dictation.db")
    } else {
        match read_str(db_path) {
            Some(s) => PathBuf::from(s),
            None => return ptr::null_mut(),
        }
    };

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        error!("Failed to create data directory: {}", e);
        return ptr::null_mut();
    }

    let storage = match Storage::open(&db_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to open storage: {}", e);
            return ptr::null_mut();
        }
    };

    let session = match DictationSession::new(storage) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to start session: {}", e);
            return ptr::null_mut();
        }
    };

    debug!("Dictation engine initialized at {}", db_path.display());
    Box::into_raw(Box::new(DictationHandle {
        session: Mutex::new(session),
        last_error: Mutex::new(None),
    }))
}

/// Destroy a handle created by dictation_init
#[unsafe(no_mangle)]
pub extern "C" fn dictation_destroy(handle: *mut DictationHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
        debug!("Dictation engine destroyed");
    }
}

// ============ Levels ============

/// Get all levels with progress and lock state as JSON array
/// (caller must free with dictation_free_string)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_get_levels_json(handle: *mut DictationHandle) -> *mut c_char {
    let Some(handle) = handle_ref(handle) else {
        return ptr::null_mut();
    };

    let session = handle.session.lock();
    let levels = session.levels();
    let summaries: Vec<LevelSummary<'_>> = levels
        .iter()
        .map(|progress| LevelSummary {
            progress,
            unlocked: is_unlocked(levels, progress.level.id),
        })
        .collect();

    to_json_c_string(&summaries)
}

/// Select a level; fails for unknown or locked levels
#[unsafe(no_mangle)]
pub extern "C" fn dictation_select_level(handle: *mut DictationHandle, level_id: i64) -> bool {
    let Some(handle) = handle_ref(handle) else {
        return false;
    };

    match handle.session.lock().select_level(level_id) {
        Ok(()) => {
            clear_last_error(handle);
            true
        }
        Err(e) => {
            report(handle, "Failed to select level", e);
            false
        }
    }
}

/// Current level id, or -1 when there are no levels
#[unsafe(no_mangle)]
pub extern "C" fn dictation_current_level_id(handle: *mut DictationHandle) -> LevelId {
    handle_ref(handle)
        .and_then(|h| h.session.lock().current_level_id())
        .unwrap_or(-1)
}

// ============ Typing ============

/// Type one character (Unicode scalar value); returns false if rejected
#[unsafe(no_mangle)]
pub extern "C" fn dictation_type_char(handle: *mut DictationHandle, ch: u32) -> bool {
    let (Some(handle), Some(ch)) = (handle_ref(handle), char::from_u32(ch)) else {
        return false;
    };
    handle.session.lock().grid_mut().type_char(ch)
}

/// Remove the last typed character; returns false if nothing was typed
#[unsafe(no_mangle)]
pub extern "C" fn dictation_backspace(handle: *mut DictationHandle) -> bool {
    handle_ref(handle)
        .map(|h| h.session.lock().grid_mut().backspace().is_some())
        .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn dictation_clear_typed(handle: *mut DictationHandle) {
    if let Some(handle) = handle_ref(handle) {
        handle.session.lock().grid_mut().clear();
    }
}

/// The typed answer merged with the reference's spaces and punctuation
/// (caller must free with dictation_free_string)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_get_user_text(handle: *mut DictationHandle) -> *mut c_char {
    match handle_ref(handle) {
        Some(handle) => into_c_string(handle.session.lock().grid().user_text()),
        None => ptr::null_mut(),
    }
}

/// Grid cells for rendering as JSON array (caller must free with dictation_free_string)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_get_grid_json(handle: *mut DictationHandle) -> *mut c_char {
    match handle_ref(handle) {
        Some(handle) => to_json_c_string(&handle.session.lock().grid().cells()),
        None => ptr::null_mut(),
    }
}

// ============ Checking & history ============

/// Score the typed answer, persist the attempt and advance on a pass
/// Returns JSON check outcome (caller must free with dictation_free_string), null on failure
#[unsafe(no_mangle)]
pub extern "C" fn dictation_check(handle: *mut DictationHandle) -> *mut c_char {
    let Some(handle) = handle_ref(handle) else {
        return ptr::null_mut();
    };

    let outcome = handle.session.lock().check();
    match outcome {
        Ok(outcome) => {
            clear_last_error(handle);
            to_json_c_string(&outcome)
        }
        Err(e) => {
            report(handle, "Failed to check answer", e);
            ptr::null_mut()
        }
    }
}

/// Recent attempts for a level as JSON array, newest first
/// (caller must free with dictation_free_string)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_get_attempts_json(
    handle: *mut DictationHandle,
    level_id: i64,
) -> *mut c_char {
    let Some(handle) = handle_ref(handle) else {
        return ptr::null_mut();
    };

    let attempts = handle.session.lock().attempts(level_id);
    match attempts {
        Ok(attempts) => to_json_c_string(&attempts),
        Err(e) => {
            report(handle, "Failed to load attempts", e);
            ptr::null_mut()
        }
    }
}

/// Delete all attempts (levels become locked again)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_reset_progress(handle: *mut DictationHandle) -> bool {
    let Some(handle) = handle_ref(handle) else {
        return false;
    };

    let result = handle.session.lock().reset_progress();
    match result {
        Ok(_) => {
            clear_last_error(handle);
            true
        }
        Err(e) => {
            report(handle, "Failed to reset progress", e);
            false
        }
    }
}

// ============ Utilities ============

/// Get the last error message (caller must free with dictation_free_string)
#[unsafe(no_mangle)]
pub extern "C" fn dictation_get_last_error(handle: *mut DictationHandle) -> *mut c_char {
    let Some(handle) = handle_ref(handle) else {
        return ptr::null_mut();
    };

    let message = handle.last_error.lock().clone();
    match message {
        Some(text) => into_c_string(text),
        None => ptr::null_mut(),
    }
}

/// Free a string returned by dictation functions
#[unsafe(no_mangle)]
pub extern "C" fn dictation_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}
