//! Text normalization into comparable word tokens
//!
//! A token is a separator-delimited word, lowercased, with every character
//! that is not a Unicode letter (`\p{L}`) or number (`\p{N}`) removed.
//! Diacritics are preserved: "läuft" and "lauft" are different tokens.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of characters that are neither letters nor numbers
static NON_WORD_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static pattern is valid"));

/// Word separators: Unicode whitespace plus the byte order mark, minus U+0085
static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{FEFF}--\x{85}]+").expect("static pattern is valid"));

/// A single letter or number
static WORD_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}]$").expect("static pattern is valid"));

/// Check whether a character is a Unicode letter or number
pub fn is_letter_or_number(c: char) -> bool {
    let mut buf = [0u8; 4];
    WORD_CHAR.is_match(c.encode_utf8(&mut buf))
}

/// Normalize a single word: lowercase, then strip non letter/number characters
pub fn normalize_token(word: &str) -> String {
    NON_WORD_CHARS
        .replace_all(&word.to_lowercase(), "")
        .into_owned()
}

/// Split a sentence into normalized tokens, dropping words that normalize to nothing
pub fn tokenize(sentence: &str) -> Vec<String> {
    WORD_SEPARATORS
        .split(sentence)
        .map(normalize_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Join tokens back into a space-separated sentence
pub fn tokens_to_string(tokens: &[String]) -> String {
    tokens.join(" ")
}
