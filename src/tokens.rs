use unicode_segmentation::UnicodeSegmentation;

use crate::Symbol;

/// One token of a sentence with its character offsets in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: Symbol,
    pub start_char: usize,
    pub end_char: usize,
}

/// The tokens of one sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    /// Split on unicode word boundaries, dropping whitespace.
    pub fn from_text(text: &str) -> Self {
        let tokens = text
            .split_word_bound_indices()
            .filter(|(_, word)| !word.trim().is_empty())
            .map(|(offset, word)| Token {
                text: Symbol::new(word),
                start_char: offset,
                end_char: offset + word.len(),
            })
            .collect();
        TokenSequence { tokens }
    }

    /// Build from already tokenized words; offsets assume single spaces.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut offset = 0;
        let mut tokens = Vec::new();
        for word in words {
            let word = word.as_ref();
            tokens.push(Token {
                text: Symbol::new(word),
                start_char: offset,
                end_char: offset + word.len(),
            });
            offset += word.len() + 1;
        }
        TokenSequence { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn word(&self, index: usize) -> Option<&Symbol> {
        self.tokens.get(index).map(|t| &t.text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Space-joined text of the inclusive token range.
    pub fn text(&self, start: usize, end: usize) -> String {
        if start > end || start >= self.tokens.len() {
            return String::new();
        }
        let end = end.min(self.tokens.len() - 1);
        self.tokens[start..=end]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_and_punctuation() {
        let tokens = TokenSequence::from_text("John Smith, 45, visited Paris.");
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            words,
            vec!["John", "Smith", ",", "45", ",", "visited", "Paris", "."]
        );
        assert_eq!(tokens.get(1).map(|t| t.start_char), Some(5));
    }

    #[test]
    fn text_clamps_range() {
        let tokens = TokenSequence::from_words(["He", "lives", "there"]);
        assert_eq!(tokens.text(1, 10), "lives there");
        assert_eq!(tokens.text(2, 1), "");
    }
}
