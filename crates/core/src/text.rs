const APOSTROPHES: [char; 2] = ['\'', '\u{2019}'];

/// Lower-cases, turns punctuation and symbols (emoji included) into word breaks, and collapses
/// whitespace.
///
/// Apostrophes are dropped without a break, so `"what's"` becomes `"whats"` while
/// `"hello,what"` becomes `"hello what"`.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut spaced = String::with_capacity(lowered.len());
    for character in lowered.chars() {
        if character.is_alphanumeric() || character == '_' {
            spaced.push(character);
        } else if !APOSTROPHES.contains(&character) {
            spaced.push(' ');
        }
    }
    tokenize(&spaced).join(" ")
}

pub fn tokenize(normalized_text: &str) -> Vec<&str> {
    normalized_text.split_whitespace().collect()
}

/// True when `word` appears as a whole whitespace-delimited token.
pub fn contains_word(normalized_text: &str, word: &str) -> bool {
    normalized_text.split_whitespace().any(|token| token == word)
}

/// True when the tokens of `term` appear consecutively in `normalized_text`.
///
/// Single words behave like [`contains_word`]; phrases never match inside longer words.
pub fn contains_term(normalized_text: &str, term: &str) -> bool {
    let needle = tokenize(term);
    if needle.is_empty() {
        return false;
    }
    let haystack = tokenize(normalized_text);
    haystack.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::{contains_term, contains_word, normalize_text, tokenize};

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(normalize_text("  Hello, what about FEES?! "), "hello what about fees");
        assert_eq!(normalize_text("AI 🤖"), "ai");
        assert_eq!(normalize_text("3."), "3");
    }

    #[test]
    fn punctuation_between_words_becomes_a_break() {
        assert_eq!(normalize_text("hello,what about fees?"), "hello what about fees");
        assert_eq!(normalize_text("Hi,fees?"), "hi fees");
        assert_eq!(normalize_text("hey!fees"), "hey fees");
        assert_eq!(normalize_text("AI/ML track"), "ai ml track");
        assert_eq!(normalize_text("what's the fee\u{2019}s  total"), "whats the fees total");
    }

    #[test]
    fn empty_and_symbol_only_inputs_normalize_to_empty() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("?!... 👋"), "");
    }

    #[test]
    fn word_matching_ignores_substrings() {
        assert!(contains_word("tell me about ai", "ai"));
        assert!(!contains_word("send me an email", "ai"));
        assert!(!contains_word("which one", "hi"));
        assert_eq!(tokenize("a  b c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn phrases_match_consecutive_tokens() {
        assert!(contains_term("oh good morning team", "good morning"));
        assert!(contains_term("hey are you a bot", "are you a bot"));
        assert!(!contains_term("good night", "good morning"));
        assert!(!contains_term("did you bother", "you bot"));
        assert!(!contains_term("anything", ""));
    }
}
