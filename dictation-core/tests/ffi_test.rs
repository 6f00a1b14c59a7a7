//! Integration tests for the FFI layer
//!
//! These tests verify the C-compatible functions called by a host UI.
//! Tests focus on handle lifecycle, error handling, and data marshalling.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use dictation::ffi::*;

// ============ Helper Functions ============

fn c_str(s: &str) -> CString {
    CString::new(s).expect("CString creation failed")
}

fn from_c_str_and_free(ptr: *mut c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        let result = unsafe { CStr::from_ptr(ptr).to_str().ok().map(String::from) };
        dictation_free_string(ptr);
        result
    }
}

fn json_and_free(ptr: *mut c_char) -> serde_json::Value {
    let text = from_c_str_and_free(ptr).expect("FFI returned null");
    serde_json::from_str(&text).expect("FFI returned invalid JSON")
}

/// Create a temporary database path for isolated FFI tests
fn temp_db_path(name: &str) -> (CString, std::path::PathBuf) {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("dictation_ffi_{}_{}.db", name, timestamp));
    (c_str(path.to_str().unwrap()), path)
}

fn with_handle(name: &str, f: impl FnOnce(*mut DictationHandle)) {
    let (c_path, path) = temp_db_path(name);
    let handle = dictation_init(c_path.as_ptr());
    assert!(!handle.is_null(), "dictation_init should not return null");

    f(handle);

    dictation_destroy(handle);
    let _ = std::fs::remove_file(path);
}

fn type_text(handle: *mut DictationHandle, text: &str) {
    for c in text.chars() {
        dictation_type_char(handle, c as u32);
    }
}

// ============ Stateless Evaluation ============

#[test]
fn test_evaluate_json() {
    let reference = c_str("Der Hund läuft schnell");
    let user = c_str("der hund lauft schnell");

    let json = json_and_free(dictation_evaluate(reference.as_ptr(), user.as_ptr(), 90));

    assert_eq!(json["accuracy"], 75);
    assert_eq!(json["ok"], 3);
    assert_eq!(json["wrong"], 1);
    assert_eq!(json["passed"], false);
    assert_eq!(json["ops"][2]["type"], "wrong");
    assert_eq!(json["ops"][2]["ref"], "läuft");
    assert_eq!(json["ops"][2]["user"], "lauft");
}

#[test]
fn test_evaluate_null_inputs() {
    let text = c_str("hello");
    assert!(dictation_evaluate(ptr::null(), text.as_ptr(), 90).is_null());
    assert!(dictation_evaluate(text.as_ptr(), ptr::null(), 90).is_null());
}

// ============ Handle Lifecycle Tests ============

#[test]
fn test_init_and_destroy() {
    with_handle("lifecycle", |handle| {
        assert_eq!(dictation_current_level_id(handle), 1);
    });
}

#[test]
fn test_destroy_null_handle() {
    dictation_destroy(ptr::null_mut());
}

#[test]
fn test_null_handle_is_harmless() {
    let handle: *mut DictationHandle = ptr::null_mut();

    assert!(dictation_get_levels_json(handle).is_null());
    assert!(!dictation_select_level(handle, 1));
    assert_eq!(dictation_current_level_id(handle), -1);
    assert!(!dictation_type_char(handle, 'a' as u32));
    assert!(!dictation_backspace(handle));
    dictation_clear_typed(handle);
    assert!(dictation_check(handle).is_null());
    assert!(!dictation_reset_progress(handle));
    assert!(dictation_get_last_error(handle).is_null());
}

#[test]
fn test_free_null_string() {
    dictation_free_string(ptr::null_mut());
}

// ============ Levels ============

#[test]
fn test_levels_json() {
    with_handle("levels", |handle| {
        let json = json_and_free(dictation_get_levels_json(handle));
        let levels = json.as_array().unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0]["title"], "Level 1");
        assert_eq!(levels[0]["pass_score"], 90);
        assert!(levels[0]["best_accuracy"].is_null());
        assert_eq!(levels[0]["unlocked"], true);
        assert_eq!(levels[1]["unlocked"], false);
    });
}

#[test]
fn test_select_locked_level_sets_error() {
    with_handle("locked", |handle| {
        assert!(!dictation_select_level(handle, 3));

        let error = from_c_str_and_free(dictation_get_last_error(handle)).unwrap();
        assert!(error.contains("locked"), "unexpected error: {}", error);

        assert!(dictation_select_level(handle, 1));
        assert!(dictation_get_last_error(handle).is_null());
    });
}

// ============ Typing & Checking ============

#[test]
fn test_typing_builds_user_text() {
    with_handle("typing", |handle| {
        type_text(handle, "the quick");
        let text = from_c_str_and_free(dictation_get_user_text(handle)).unwrap();
        assert!(text.starts_with("the quick "));
        assert!(text.ends_with('.'));

        assert!(dictation_backspace(handle));
        dictation_clear_typed(handle);
        assert!(!dictation_backspace(handle));

        let grid = json_and_free(dictation_get_grid_json(handle));
        assert_eq!(grid[0]["type"], "input");
        assert_eq!(grid[0]["caret"], true);
        assert_eq!(grid[3]["type"], "space");
    });
}

#[test]
fn test_check_pass_advances() {
    with_handle("check", |handle| {
        type_text(handle, "The quick brown fox jumps over the lazy dog");

        let outcome = json_and_free(dictation_check(handle));
        assert_eq!(outcome["passed"], true);
        assert_eq!(outcome["level_id"], 1);
        assert_eq!(outcome["next_level_id"], 2);
        assert_eq!(outcome["evaluation"]["accuracy"], 100);
        assert_eq!(dictation_current_level_id(handle), 2);

        let attempts = json_and_free(dictation_get_attempts_json(handle, 1));
        assert_eq!(attempts.as_array().unwrap().len(), 1);
        assert_eq!(attempts[0]["accuracy"], 100);
    });
}

#[test]
fn test_reset_progress() {
    with_handle("reset", |handle| {
        type_text(handle, "The quick brown fox jumps over the lazy dog");
        json_and_free(dictation_check(handle));
        assert_eq!(dictation_current_level_id(handle), 2);

        assert!(dictation_reset_progress(handle));
        assert_eq!(dictation_current_level_id(handle), 1);

        let levels = json_and_free(dictation_get_levels_json(handle));
        assert_eq!(levels[0]["passed"], false);
        assert_eq!(levels[1]["unlocked"], false);
    });
}

#[test]
fn test_invalid_char_rejected() {
    with_handle("invalid_char", |handle| {
        // lone surrogate is not a valid char
        assert!(!dictation_type_char(handle, 0xD800));
        assert!(!dictation_type_char(handle, '!' as u32));
        assert!(dictation_type_char(handle, 'T' as u32));
    });
}
