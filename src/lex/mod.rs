//! Lexical primitives of the language: word values and the word dictionary.

pub mod value;
pub mod dictionary;

pub use value::{lex_value, lex_value_traced};
pub use dictionary::{WordDictionary, DictionaryError};
