// tests/tokenizer_tests.rs

use neuron_lens::tokenizer::{token_count, tokenize};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("hello, world!", &["hello", ",", "world", "!"])]
#[case("Hi!", &["Hi", "!"])]
#[case("", &[])]
#[case("  leading and trailing  ", &["leading", "and", "trailing"])]
#[case("tabs\tand\nnewlines", &["tabs", "and", "newlines"])]
#[case("x=(a+b)*2", &["x", "=", "(", "a", "+", "b", ")", "*", "2"])]
#[case("snake_case_name", &["snake_case_name"])]
#[case("$100.50", &["$", "100", ".", "50"])]
fn splits_text_into_word_and_punctuation_tokens(#[case] text: &str, #[case] expected: &[&str]) {
    assert_eq!(tokenize(text), expected);
    assert_eq!(token_count(text), expected.len());
}

#[test]
fn tokens_borrow_from_the_input() {
    let text = String::from("borrowed tokens");
    let tokens = tokenize(&text);
    let range = text.as_bytes().as_ptr_range();
    for token in tokens {
        assert!(range.contains(&token.as_ptr()));
    }
}

proptest! {
    #[test]
    fn tokens_are_never_empty_or_whitespace(text in "[a-zA-Z0-9_ ,.!?'()\\t\\n-]{0,64}") {
        for token in tokenize(&text) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
        }
    }

    #[test]
    fn tokens_cover_every_non_whitespace_character(text in "[a-zA-Zéü0-9_ ,.!?'\\t-]{0,64}") {
        let joined: String = tokenize(&text).concat();
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(joined, stripped);
    }

    #[test]
    fn each_token_tokenizes_to_itself(text in "[a-zA-Z0-9_ ,.!?'-]{0,64}") {
        for token in tokenize(&text) {
            prop_assert_eq!(tokenize(token), vec![token]);
        }
    }

    #[test]
    fn punctuation_tokens_are_single_characters(text in "[a-z ,.!?;:]{0,64}") {
        for token in tokenize(&text) {
            if !token.chars().all(|c| c.is_alphanumeric() || c == '_') {
                prop_assert_eq!(token.chars().count(), 1);
            }
        }
    }
}
