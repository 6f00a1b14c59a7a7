//! Token-level LCS alignment between a reference and a user transcription
//!
//! The aligner only ever produces `Ok`, `Missing` and `Extra` operations.
//! Substitutions (`Wrong`) are introduced later by [`crate::scoring::classify`].

use serde::{Deserialize, Serialize};

/// Kind of an alignment operation (used for compact edit vectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// O - tokens are equal
    Ok,
    /// W - reference token replaced by a different user token
    Wrong,
    /// M - reference token with no user counterpart
    Missing,
    /// E - user token with no reference counterpart
    Extra,
}

impl OpKind {
    /// Convert to single-character representation for edit vector
    pub fn as_char(&self) -> char {
        match self {
            Self::Ok => 'O',
            Self::Wrong => 'W',
            Self::Missing => 'M',
            Self::Extra => 'E',
        }
    }

    /// Parse from single character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(Self::Ok),
            'W' => Some(Self::Wrong),
            'M' => Some(Self::Missing),
            'E' => Some(Self::Extra),
            _ => None,
        }
    }

    /// Lowercase name, as used in the JSON `type` tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Wrong => "wrong",
            Self::Missing => "missing",
            Self::Extra => "extra",
        }
    }
}

/// A single step of a token alignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlignmentOp {
    Ok {
        #[serde(rename = "ref")]
        reference: String,
        user: String,
    },
    Missing {
        #[serde(rename = "ref")]
        reference: String,
    },
    Extra {
        user: String,
    },
    Wrong {
        #[serde(rename = "ref")]
        reference: String,
        user: String,
    },
}

impl AlignmentOp {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Ok { .. } => OpKind::Ok,
            Self::Missing { .. } => OpKind::Missing,
            Self::Extra { .. } => OpKind::Extra,
            Self::Wrong { .. } => OpKind::Wrong,
        }
    }

    /// Reference token, if this operation consumed one
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Ok { reference, .. }
            | Self::Missing { reference }
            | Self::Wrong { reference, .. } => Some(reference),
            Self::Extra { .. } => None,
        }
    }

    /// User token, if this operation consumed one
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::Ok { user, .. } | Self::Extra { user } | Self::Wrong { user, .. } => Some(user),
            Self::Missing { .. } => None,
        }
    }
}

/// Build the LCS suffix table: `table[i][j]` is the LCS length of
/// `reference[i..]` and `user[j..]`. Last row and column are zero.
pub fn lcs_table(reference: &[String], user: &[String]) -> Vec<Vec<usize>> {
    let n = reference.len();
    let m = user.len();

    let mut table = vec![vec![0usize; m + 1]; n + 1];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if reference[i] == user[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    table
}

/// Align reference and user tokens, maximizing the number of matched tokens
///
/// On a mismatch where both choices keep the same LCS length, the reference
/// token is consumed first (emitted as `Missing`).
pub fn align(reference: &[String], user: &[String]) -> Vec<AlignmentOp> {
    let n = reference.len();
    let m = user.len();
    let table = lcs_table(reference, user);

    let mut ops = Vec::with_capacity(n.max(m));
    let mut i = 0;
    let mut j = 0;

    while i < n && j < m {
        if reference[i] == user[j] {
            ops.push(AlignmentOp::Ok {
                reference: reference[i].clone(),
                user: user[j].clone(),
            });
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(AlignmentOp::Missing {
                reference: reference[i].clone(),
            });
            i += 1;
        } else {
            ops.push(AlignmentOp::Extra {
                user: user[j].clone(),
            });
            j += 1;
        }
    }

    ops.extend(reference[i..].iter().map(|t| AlignmentOp::Missing {
        reference: t.clone(),
    }));
    ops.extend(user[j..].iter().map(|t| AlignmentOp::Extra { user: t.clone() }));

    ops
}

/// Generate edit vector string from alignment operations (e.g. "OOMEO")
pub fn edit_vector(ops: &[AlignmentOp]) -> String {
    ops.iter().map(|op| op.kind().as_char()).collect()
}
