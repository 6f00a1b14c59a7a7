//! Classification of raw alignment operations and accuracy scoring
//!
//! A `Missing` directly followed by an `Extra` is a word the learner replaced,
//! so the pair is merged into a single `Wrong`. An `Ok` in between breaks the
//! pairing.

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentOp, OpKind, align};
use crate::tokenizer::tokenize;

/// Classifier state: at most one unresolved missing token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Pending {
    #[default]
    NoPending,
    Missing(String),
}

impl Pending {
    /// Emit the held missing token (if any) and return to `NoPending`
    fn flush_into(&mut self, out: &mut Vec<AlignmentOp>) {
        if let Pending::Missing(reference) = std::mem::take(self) {
            out.push(AlignmentOp::Missing { reference });
        }
    }
}

/// Merge adjacent missing/extra pairs into `Wrong` substitutions
pub fn classify(ops: &[AlignmentOp]) -> Vec<AlignmentOp> {
    let mut out = Vec::with_capacity(ops.len());
    let mut pending = Pending::NoPending;

    for op in ops {
        match op {
            AlignmentOp::Missing { reference } => {
                pending.flush_into(&mut out);
                pending = Pending::Missing(reference.clone());
            }
            AlignmentOp::Extra { user } => match std::mem::take(&mut pending) {
                Pending::Missing(reference) => out.push(AlignmentOp::Wrong {
                    reference,
                    user: user.clone(),
                }),
                Pending::NoPending => out.push(op.clone()),
            },
            AlignmentOp::Ok { .. } | AlignmentOp::Wrong { .. } => {
                pending.flush_into(&mut out);
                out.push(op.clone());
            }
        }
    }
    pending.flush_into(&mut out);

    out
}

/// Counts and accuracy for one evaluated attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub ok: u32,
    pub wrong: u32,
    pub missing: u32,
    pub extra: u32,
    /// Percentage of reference tokens matched, 0..=100
    pub accuracy: u32,
    pub pass_score: i64,
    pub passed: bool,
}

/// Percentage of reference tokens matched, rounded half up; 0 for an empty reference
pub fn accuracy(ok: usize, ref_token_count: usize) -> u32 {
    if ref_token_count == 0 {
        return 0;
    }
    ((100 * ok.min(ref_token_count)) as f64 / ref_token_count as f64).round() as u32
}

/// Count classified operations and derive accuracy and pass/fail
pub fn summarize(ops: &[AlignmentOp], ref_token_count: usize, pass_score: i64) -> ScoreSummary {
    let (mut ok, mut wrong, mut missing, mut extra) = (0u32, 0u32, 0u32, 0u32);
    for op in ops {
        match op.kind() {
            OpKind::Ok => ok += 1,
            OpKind::Wrong => wrong += 1,
            OpKind::Missing => missing += 1,
            OpKind::Extra => extra += 1,
        }
    }

    let accuracy = accuracy(ok as usize, ref_token_count);

    ScoreSummary {
        ok,
        wrong,
        missing,
        extra,
        accuracy,
        pass_score,
        passed: i64::from(accuracy) >= pass_score,
    }
}

/// Full result of comparing a user transcription with a reference sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub ref_tokens: Vec<String>,
    pub user_tokens: Vec<String>,
    pub ops: Vec<AlignmentOp>,
    #[serde(flatten)]
    pub summary: ScoreSummary,
}

/// Tokenize, align, classify and score a user transcription
pub fn evaluate(reference_text: &str, user_text: &str, pass_score: i64) -> Evaluation {
    let ref_tokens = tokenize(reference_text);
    let user_tokens = tokenize(user_text);

    let ops = classify(&align(&ref_tokens, &user_tokens));
    let summary = summarize(&ops, ref_tokens.len(), pass_score);

    Evaluation {
        ref_tokens,
        user_tokens,
        ops,
        summary,
    }
}
