//! Letter-grid input model
//!
//! The learner never types spaces or punctuation: the grid is built from the
//! reference sentence, and only letter/number positions accept input. The
//! user text handed to the scorer keeps the reference's spaces and
//! punctuation verbatim.

use serde::{Deserialize, Serialize};

use crate::tokenizer::is_letter_or_number;

/// One position of the reference sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ch", rename_all = "snake_case")]
pub enum Slot {
    Space,
    Punct(char),
    Input,
}

/// Render-friendly view of a single grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    Space,
    Punct { ch: char },
    Input { value: Option<char>, caret: bool },
}

/// Punctuation here means anything that is neither a letter, a number nor whitespace
fn is_punctuation(c: char) -> bool {
    !is_letter_or_number(c) && !c.is_whitespace()
}

/// Build the input template for a reference sentence, one slot per char
pub fn build_template(reference: &str) -> Vec<Slot> {
    reference
        .chars()
        .map(|c| {
            if c == ' ' {
                Slot::Space
            } else if is_punctuation(c) {
                Slot::Punct(c)
            } else {
                Slot::Input
            }
        })
        .collect()
}

/// Number of positions the learner has to fill
pub fn count_input_slots(template: &[Slot]) -> usize {
    template.iter().filter(|s| matches!(s, Slot::Input)).count()
}

/// Typed characters must be Unicode letters or numbers
pub fn is_allowed_input_char(c: char) -> bool {
    is_letter_or_number(c)
}

/// Merge typed characters back into a full sentence following the template
///
/// Input slots past the end of `typed` contribute nothing.
pub fn reconstruct_user_text(template: &[Slot], typed: &[char]) -> String {
    let mut typed = typed.iter();
    let mut out = String::with_capacity(template.len());

    for slot in template {
        match slot {
            Slot::Space => out.push(' '),
            Slot::Punct(c) => out.push(*c),
            Slot::Input => {
                if let Some(c) = typed.next() {
                    out.push(*c);
                }
            }
        }
    }

    out
}

/// Typing state for one reference sentence
#[derive(Debug, Clone, Default)]
pub struct LetterGrid {
    reference: String,
    template: Vec<Slot>,
    typed: Vec<char>,
}

impl LetterGrid {
    /// Create a grid for a reference sentence (surrounding whitespace is ignored)
    pub fn new(reference: &str) -> Self {
        let reference = reference.trim().to_string();
        let template = build_template(&reference);
        Self {
            reference,
            template,
            typed: Vec::new(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn template(&self) -> &[Slot] {
        &self.template
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn input_slots(&self) -> usize {
        count_input_slots(&self.template)
    }

    pub fn is_full(&self) -> bool {
        self.typed.len() >= self.input_slots()
    }

    /// Type one character; returns false if it was rejected
    pub fn type_char(&mut self, c: char) -> bool {
        if c == ' ' || !is_allowed_input_char(c) || self.is_full() {
            return false;
        }
        self.typed.push(c);
        true
    }

    /// Type every accepted character of `text`, returning how many were kept
    pub fn type_str(&mut self, text: &str) -> usize {
        text.chars().filter(|c| self.type_char(*c)).count()
    }

    /// Remove the last typed character
    pub fn backspace(&mut self) -> Option<char> {
        self.typed.pop()
    }

    pub fn clear(&mut self) {
        self.typed.clear();
    }

    /// Index of the input slot that receives the next character
    pub fn caret(&self) -> usize {
        self.typed.len().min(self.input_slots())
    }

    /// The sentence to hand to the scorer
    pub fn user_text(&self) -> String {
        reconstruct_user_text(&self.template, &self.typed)
    }

    pub fn cells(&self) -> Vec<Cell> {
        let caret = self.caret();
        let mut input_index = 0;

        self.template
            .iter()
            .map(|slot| match slot {
                Slot::Space => Cell::Space,
                Slot::Punct(ch) => Cell::Punct { ch: *ch },
                Slot::Input => {
                    let cell = Cell::Input {
                        value: self.typed.get(input_index).copied(),
                        caret: input_index == caret,
                    };
                    input_index += 1;
                    cell
                }
            })
            .collect()
    }
}
