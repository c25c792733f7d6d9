//! Program representation and the load phase.
//!
//! Source text becomes a [`Program`] in a single pass: each line splits into
//! words on single spaces, and a line survives only if every word on it (the
//! opcode word included) is in the dictionary. Validity is per-line,
//! all-or-nothing: one unknown word drops the whole line, silently. A program
//! is immutable once loaded.

use crate::lex::WordDictionary;
use serde::{Deserialize, Serialize};

/// One instruction: a non-empty sequence of words.
///
/// The first word selects the opcode; every word contributes to the operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    tokens: Vec<String>,
}

impl Line {
    /// Create a line from its words. Returns `None` for an empty word list —
    /// a line with zero tokens is never stored.
    pub fn new(tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// The word whose leading letter selects the opcode.
    pub fn opcode_token(&self) -> &str {
        &self.tokens[0]
    }

    /// All words on the line, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of words on the line. Always at least 1.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// An ordered sequence of accepted lines, indexed from 0.
///
/// Built once by the [`Loader`] and handed to the engine for a run; there is
/// no self-modifying code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    lines: Vec<Line>,
}

impl Program {
    /// Number of lines in the program.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the program has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at `index`, if any.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// All lines in source order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn push(&mut self, line: Line) {
        self.lines.push(line);
    }
}

/// A source line rejected during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// The raw source line.
    pub text: String,
    /// The first word that failed the dictionary check.
    pub unknown_word: String,
}

/// Builds a [`Program`] from source text against a fixed dictionary.
pub struct Loader<'a> {
    dictionary: &'a WordDictionary,
}

impl<'a> Loader<'a> {
    pub fn new(dictionary: &'a WordDictionary) -> Self {
        Self { dictionary }
    }

    /// Load a program, silently dropping every line that contains a word not
    /// in the dictionary. Deterministic: the same text always yields the
    /// same program.
    pub fn load(&self, source: &str) -> Program {
        self.load_traced(source).0
    }

    /// Load a program and additionally report each dropped line with the
    /// word that caused the rejection. The accepted program is identical to
    /// what [`Loader::load`] produces.
    pub fn load_traced(&self, source: &str) -> (Program, Vec<DroppedLine>) {
        let mut program = Program::default();
        let mut dropped = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let mut tokens: Vec<String> = raw.split(' ').map(str::to_string).collect();
            // Trailing separators produce empty words that are not part of
            // the instruction; empty words anywhere else still face the
            // dictionary check below.
            while tokens.last().is_some_and(|t| t.is_empty()) {
                tokens.pop();
            }
            if tokens.is_empty() {
                continue;
            }

            match tokens.iter().find(|t| !self.dictionary.contains(t.as_str())) {
                Some(unknown) => dropped.push(DroppedLine {
                    line_number: index + 1,
                    text: raw.to_string(),
                    unknown_word: unknown.clone(),
                }),
                None => {
                    // The loop above guarantees a non-empty token list.
                    if let Some(line) = Line::new(tokens) {
                        program.push(line);
                    }
                }
            }
        }

        (program, dropped)
    }
}
