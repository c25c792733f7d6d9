//! # Ordlang
//!
//! An interpreter for a word-based esoteric programming language.
//!
//! Programs are plain text. Every line is a sequence of words separated by
//! single spaces; the leading letter of the first word selects the operation,
//! and the lexical values of all the words on the line, combined through an
//! even/odd length parity rule, form the operand. Execution runs over a
//! fixed-size byte tape with a movable pointer.
//!
//! A line is only part of the program if every one of its words is in the
//! word dictionary. Anything else is silently dropped, which doubles as the
//! language's comment mechanism.

pub mod lex;
pub mod program;
pub mod engine;

// Re-export commonly used types
pub use lex::{lex_value, lex_value_traced, WordDictionary, DictionaryError};
pub use program::{Line, Program, Loader, DroppedLine};
pub use engine::{
    Memory, MemoryError, DEFAULT_MEMORY_SIZE, Opcode, DecodedLine, decode_line,
    decode_line_traced, TokenTrace, OutputHandler, Engine, EngineError, Snapshot,
};
