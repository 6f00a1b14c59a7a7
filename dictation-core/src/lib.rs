//! Dictation - scoring engine for dictation practice
//!
//! A learner listens to a sentence, types it into a letter grid and gets a
//! token-level diff against the reference: normalization, LCS alignment,
//! substitution classification and an accuracy score. Level progress and
//! attempt history are kept in SQLite and exposed to a host UI over FFI.

pub mod alignment;
pub mod error;
pub mod ffi;
pub mod grid;
pub mod migrations;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod tokenizer;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

// C ABI entry points at the crate root
pub use ffi::*;

/// Re-export the main engine components for convenience
pub use alignment::{AlignmentOp, OpKind, align, edit_vector};
pub use grid::{Cell, LetterGrid, Slot};
pub use scoring::{Evaluation, ScoreSummary, classify, evaluate, summarize};
pub use session::{CheckOutcome, DictationSession};
pub use storage::Storage;
pub use tokenizer::{normalize_token, tokenize};
