//! Instruction decoding.
//!
//! The leading letter of a line's first word selects the opcode; the lexical
//! values of all the words on the line, combined through the parity rule,
//! form the operand. Letters a-h are reserved for memory operations, i-n for
//! control flow and o-z for output, so programs encode their meaning through
//! word choice rather than arbitrary codes.

use crate::lex::lex_value;
use crate::program::Line;
use serde::{Deserialize, Serialize};

/// The decoded instruction kind for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    // ==================== Memory operations (a-h) ====================
    /// Add the operand to the current cell (mod 256).
    Add,
    /// Subtract the operand from the current cell (mod 256).
    Subtract,
    /// Set the current cell to the operand (mod 256).
    Set,
    /// Move the pointer to the operand, modulo the tape size.
    MovePointerTo,
    /// Move the pointer forward one cell, wrapping.
    MovePointerForward,
    /// Move the pointer back one cell, wrapping.
    MovePointerBack,

    // ==================== Control flow (i-n) ====================
    /// Jump to the operand, modulo the program length.
    JumpTo,
    /// Jump to the operand if the current cell is zero.
    JumpIfZero,
    /// Jump to the operand if the current cell is not zero.
    JumpIfNotZero,
    /// Jump back by the operand lines, wrapping.
    JumpBack,
    /// Jump forward by the operand lines, wrapping.
    JumpForward,

    // ==================== Output (o-z) ====================
    /// Print the cell at the operand address as a character.
    PrintAsciiAt,
    /// Print the cell at the operand address as a numeric value.
    PrintValueAt,
    /// Print the current cell as a character.
    PrintAscii,
    /// Print the current cell as a numeric value.
    PrintValue,
    /// Print the whole tape as characters.
    PrintAsciiTable,
    /// Print the whole tape as numeric values.
    PrintValueTable,

    /// Any other leading letter, or an empty first word. Does nothing.
    Unspecified,
}

impl Opcode {
    /// Map a leading letter to its opcode, case-insensitively.
    pub fn from_letter(letter: char) -> Self {
        match letter.to_ascii_lowercase() {
            'a' => Opcode::Add,
            'b' => Opcode::Subtract,
            'c' => Opcode::Set,
            'e' => Opcode::MovePointerTo,
            'f' => Opcode::MovePointerForward,
            'g' => Opcode::MovePointerBack,
            'j' => Opcode::JumpTo,
            'k' => Opcode::JumpIfZero,
            'l' => Opcode::JumpIfNotZero,
            'm' => Opcode::JumpBack,
            'n' => Opcode::JumpForward,
            'p' => Opcode::PrintAsciiAt,
            'q' => Opcode::PrintValueAt,
            'r' => Opcode::PrintAscii,
            's' => Opcode::PrintValue,
            'v' => Opcode::PrintAsciiTable,
            'w' => Opcode::PrintValueTable,
            _ => Opcode::Unspecified,
        }
    }
}

/// A line decoded to its opcode and operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedLine {
    pub opcode: Opcode,
    pub operand: i32,
}

/// Decode a line into its opcode and operand.
///
/// The first word's lexical value is always added. Every later word is added
/// when its raw character length is even and subtracted when it is odd
/// (non-letters count toward the length even though they carry no value).
/// The operand is recomputed at every dispatch and never carried between
/// lines.
pub fn decode_line(line: &Line) -> DecodedLine {
    let tokens = line.tokens();

    let opcode = match tokens[0].chars().next() {
        Some(letter) => Opcode::from_letter(letter),
        None => Opcode::Unspecified,
    };

    let mut operand = lex_value(&tokens[0]);
    for token in &tokens[1..] {
        operand += signed_contribution(token);
    }

    DecodedLine { opcode, operand }
}

/// Per-word record from [`decode_line_traced`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTrace {
    pub token: String,
    /// The word's lexical value.
    pub value: i32,
    /// The signed contribution to the operand after the parity rule.
    pub contribution: i32,
}

/// Decode a line and keep the per-word contributions for the diagnostic
/// channel. Agrees with [`decode_line`] on opcode and operand.
pub fn decode_line_traced(line: &Line) -> (DecodedLine, Vec<TokenTrace>) {
    let tokens = line.tokens();
    let mut trace = Vec::with_capacity(tokens.len());

    let first = lex_value(&tokens[0]);
    trace.push(TokenTrace {
        token: tokens[0].clone(),
        value: first,
        contribution: first,
    });

    for token in &tokens[1..] {
        let contribution = signed_contribution(token);
        trace.push(TokenTrace {
            token: token.clone(),
            value: lex_value(token),
            contribution,
        });
    }

    let decoded = decode_line(line);
    debug_assert_eq!(
        decoded.operand,
        trace.iter().map(|t| t.contribution).sum::<i32>()
    );
    (decoded, trace)
}

/// A non-first word's contribution: its value, added on even raw length and
/// subtracted on odd.
#[inline]
fn signed_contribution(token: &str) -> i32 {
    let value = lex_value(token);
    if token.chars().count() % 2 == 0 {
        value
    } else {
        -value
    }
}
