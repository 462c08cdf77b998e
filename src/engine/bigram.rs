use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered pair of adjacent expected characters.
///
/// Serialized as a two-character string so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BigramKey(pub [char; 2]);

impl BigramKey {
    pub fn new(first: char, second: char) -> Self {
        Self([first, second])
    }

    pub fn contains_space(&self) -> bool {
        self.0[0] == ' ' || self.0[1] == ' '
    }

    pub fn to_lowercase(self) -> Self {
        Self([lower(self.0[0]), lower(self.0[1])])
    }
}

// Multi-char lowercase expansions (e.g. 'İ') keep the original char so a
// key always stays exactly two chars long.
fn lower(c: char) -> char {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

impl fmt::Display for BigramKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0], self.0[1])
    }
}

impl From<BigramKey> for String {
    fn from(key: BigramKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for BigramKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl TryFrom<&str> for BigramKey {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => Ok(Self([a, b])),
            _ => Err(format!("bigram must be exactly two characters, got {value:?}")),
        }
    }
}

/// Adjacent character pairs of `text`, in order.
///
/// Yields `n - 1` keys for an `n`-character string and nothing for strings
/// shorter than two characters.
pub fn bigrams(text: &str) -> impl Iterator<Item = BigramKey> + '_ {
    text.chars()
        .zip(text.chars().skip(1))
        .map(|(a, b)| BigramKey([a, b]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str) -> Vec<String> {
        bigrams(text).map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_bigrams_of_word() {
        assert_eq!(keys("test"), vec!["te", "es", "st"]);
    }

    #[test]
    fn test_bigrams_short_strings_are_empty() {
        assert!(keys("").is_empty());
        assert!(keys("a").is_empty());
        assert_eq!(keys("ab"), vec!["ab"]);
    }

    #[test]
    fn test_bigram_count_matches_char_count() {
        for word in ["", "x", "hello", "naïve", "日本語です", "a b c"] {
            let n = word.chars().count();
            assert_eq!(bigrams(word).count(), n.saturating_sub(1), "word {word:?}");
        }
    }

    #[test]
    fn test_bigrams_preserve_case_and_spaces() {
        assert_eq!(keys("Hi x"), vec!["Hi", "i ", " x"]);
        assert!(BigramKey::new('i', ' ').contains_space());
        assert!(!BigramKey::new('H', 'i').contains_space());
    }

    #[test]
    fn test_key_string_conversion() {
        let key = BigramKey::try_from("th").unwrap();
        assert_eq!(key, BigramKey::new('t', 'h'));
        assert_eq!(String::from(key), "th");
        assert!(BigramKey::try_from("t").is_err());
        assert!(BigramKey::try_from("the").is_err());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let json = serde_json::to_string(&BigramKey::new('a', 't')).unwrap();
        assert_eq!(json, "\"at\"");
        let back: BigramKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BigramKey::new('a', 't'));
    }

    #[test]
    fn test_to_lowercase() {
        assert_eq!(BigramKey::new('T', 'H').to_lowercase(), BigramKey::new('t', 'h'));
    }
}
