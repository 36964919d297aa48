//! Regex matching over the space-joined tokens of a sentence.

use layered_resolution::{Parse, SynNodeId, TokenSequence};
use regex::Regex;

/// Sentence text with one space between tokens and the character range of
/// every token, so regex matches map back onto token spans.
pub(crate) struct JoinedTokens {
    text: String,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl JoinedTokens {
    pub(crate) fn new(tokens: &TokenSequence, lowercase: bool) -> Self {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(tokens.len());
        let mut ends = Vec::with_capacity(tokens.len());
        for token in tokens.iter() {
            if !text.is_empty() {
                text.push(' ');
            }
            starts.push(text.len());
            if lowercase {
                text.push_str(&token.text.as_str().to_lowercase());
            } else {
                text.push_str(token.text.as_str());
            }
            ends.push(text.len());
        }
        JoinedTokens { text, starts, ends }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Inclusive token span covering exactly the bytes `start..end`.
    pub(crate) fn token_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let first = self.starts.iter().position(|&s| s == start)?;
        let last = self.ends.iter().position(|&e| e == end)?;
        (first <= last).then_some((first, last))
    }

    /// Token spans of every match; matches that cut through a token are dropped.
    pub(crate) fn find_spans(&self, regex: &Regex) -> Vec<(usize, usize)> {
        regex
            .find_iter(&self.text)
            .filter_map(|m| self.token_span(m.start(), m.end()))
            .collect()
    }
}

/// Climb while the node is its parent's head child.
pub(crate) fn maximal_projection(parse: &Parse, node: SynNodeId) -> SynNodeId {
    let mut current = node;
    while let Some(parent) = parse.parent(current) {
        if parse.head(parent) != Some(current) {
            break;
        }
        current = parent;
    }
    current
}

/// Token span of the maximal projection over `start..=end`, or the span itself
/// when no constituent covers it.
pub(crate) fn projected_span(parse: &Parse, start: usize, end: usize) -> (usize, usize) {
    match parse.node_for_span(start, end) {
        Some(node) => {
            let top = parse.node(maximal_projection(parse, node));
            (top.start_token, top.end_token)
        }
        None => (start, end),
    }
}

/// Part-of-speech tag of the token at `index`.
pub(crate) fn pos_tag(parse: &Parse, index: usize) -> Option<&layered_resolution::Symbol> {
    parse
        .nodes()
        .find(|n| n.start_token == index && n.end_token == index && parse.is_preterminal(n.id))
        .map(|n| &n.tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_map_to_token_spans() {
        let tokens = TokenSequence::from_words(["He", "got", "ten", "years", "in", "prison"]);
        let joined = JoinedTokens::new(&tokens, true);
        assert_eq!(joined.text(), "he got ten years in prison");
        let regex = Regex::new(r"ten years in prison").expect("regex");
        assert_eq!(joined.find_spans(&regex), vec![(2, 5)]);
    }

    #[test]
    fn partial_token_matches_are_dropped() {
        let tokens = TokenSequence::from_words(["imprisonment"]);
        let joined = JoinedTokens::new(&tokens, false);
        let regex = Regex::new(r"prison").expect("regex");
        assert!(joined.find_spans(&regex).is_empty());
    }

    #[test]
    fn head_chain_is_climbed() {
        let parse = Parse::from_bracketed("(S (NP (JJ armed) (NN robbery)) (VP (VBD happened)))")
            .expect("parse");
        assert_eq!(projected_span(&parse, 1, 1), (0, 1));
        assert_eq!(projected_span(&parse, 0, 0), (0, 0));
    }
}
