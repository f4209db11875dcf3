// src/tokenizer.rs

use once_cell::sync::Lazy;
use regex::Regex;

/// A word is a maximal run of word characters; anything else that is not
/// whitespace becomes a single-character token.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+|[^\w\s]").expect("token pattern is a valid regex"));

/// Splits free text into word and punctuation tokens, in order of appearance.
///
/// Tokens borrow from `text`. Whitespace separates tokens and is never
/// emitted, so the result never contains an empty string.
///
/// ```
/// use neuron_lens::tokenizer::tokenize;
///
/// assert_eq!(tokenize("hello, world!"), vec!["hello", ",", "world", "!"]);
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Number of tokens `tokenize` would produce, without collecting them.
pub fn token_count(text: &str) -> usize {
    TOKEN_PATTERN.find_iter(text).count()
}
