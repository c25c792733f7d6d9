//! The word dictionary.
//!
//! A program line is only accepted if every one of its words is in the
//! dictionary, so the word list defines the whole vocabulary available to a
//! program. The set is built once, before any program loads, and never
//! changes afterwards; the loader borrows it read-only.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// The set of accepted words, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
    words: HashSet<String>,
}

impl WordDictionary {
    /// Build a dictionary from newline-delimited text.
    ///
    /// Words are trimmed and stored lowercased; blank lines are ignored.
    pub fn from_text(text: &str) -> Self {
        let words = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Build a dictionary from a sequence of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Load a dictionary file: one word per line.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| DictionaryError::Io(e.to_string()))?;
        let reader = BufReader::new(file);

        let mut words = HashSet::new();
        for line in reader.lines() {
            let line = line.map_err(|e| DictionaryError::Io(e.to_string()))?;
            let word = line.trim().to_lowercase();
            if !word.is_empty() {
                words.insert(word);
            }
        }

        Ok(Self { words })
    }

    /// Check whether a word is in the dictionary, ignoring case and
    /// surrounding whitespace.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    /// Number of words in the dictionary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Errors that can occur while loading a dictionary.
#[derive(Debug, Clone, Error)]
pub enum DictionaryError {
    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let dict = WordDictionary::from_text("cat\ndog\n\n  bird  \n");
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("cat"));
        assert!(dict.contains("bird"));
        assert!(!dict.contains("fish"));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let dict = WordDictionary::from_text("Cat\nDOG");
        assert!(dict.contains("cat"));
        assert!(dict.contains("CAT"));
        assert!(dict.contains("dog"));
    }

    #[test]
    fn test_contains_trims() {
        let dict = WordDictionary::from_words(["cat"]);
        assert!(dict.contains(" cat "));
        assert!(dict.contains("cat\r"));
    }

    #[test]
    fn test_empty_word_is_never_valid() {
        let dict = WordDictionary::from_text("cat\n\n");
        assert!(!dict.contains(""));
        assert!(!dict.contains("   "));
    }
}
