//! Lexical value calculation.
//!
//! Every word has a value: the sum of the 1-based alphabet positions of its
//! letters after case folding (a→1 … z→26). Non-alphabetic characters
//! contribute nothing to the value, but they still count toward a token's
//! length when the decoder applies the parity rule.

/// Calculate the lexical value of a token.
#[inline]
pub fn lex_value(token: &str) -> i32 {
    token.chars().filter_map(letter_value).sum()
}

/// Calculate the lexical value of a token together with the per-character
/// contributions, for the diagnostic trace.
///
/// Returns exactly the same value as [`lex_value`]; non-letters appear in the
/// trace with a contribution of 0.
pub fn lex_value_traced(token: &str) -> (i32, Vec<(char, i32)>) {
    let mut value = 0;
    let mut steps = Vec::with_capacity(token.len());
    for c in token.chars() {
        let contribution = letter_value(c).unwrap_or(0);
        value += contribution;
        steps.push((c.to_ascii_lowercase(), contribution));
    }
    (value, steps)
}

/// The 1-based alphabet position of a character, or `None` for non-letters.
#[inline]
fn letter_value(c: char) -> Option<i32> {
    let folded = c.to_ascii_lowercase();
    if folded.is_ascii_lowercase() {
        Some(folded as i32 - 'a' as i32 + 1)
    } else {
        None
    }
}
