//! Specific family relation types.
//!
//! `PER-SOC.Family` relations are retyped by the first kinship word found in
//! the left argument's head, the right argument's head, then the tokens
//! between the arguments:
//!
//! ```text
//! father, mother, ...   -> PER-SOC.Family.Parent
//! son, daughter, ...    -> PER-SOC.Family.Child
//! brother, sister, ...  -> PER-SOC.Family.Sibling
//! wife, husband, ...    -> PER-SOC.Family.Spouse
//! uncle, cousin, ...    -> PER-SOC.Family.Other
//! ```
//!
//! Relations without a kinship word keep their type.

use std::collections::HashMap;

use layered_resolution::{DocTheory, RelMention, RelMentionSet, Symbol};
use once_cell::sync::Lazy;

pub const FAMILY_RELATION: &str = "PER-SOC.Family";

static KINSHIP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: [(&str, &[&str]); 5] = [
        (
            "Parent",
            &["father", "mother", "parent", "dad", "mom", "stepfather", "stepmother", "mum"],
        ),
        (
            "Child",
            &["son", "daughter", "child", "children", "kid", "stepson", "stepdaughter"],
        ),
        ("Sibling", &["brother", "sister", "sibling", "twin", "stepbrother", "stepsister"]),
        (
            "Spouse",
            &["wife", "husband", "spouse", "widow", "widower", "fiance", "fiancee"],
        ),
        (
            "Other",
            &[
                "uncle",
                "aunt",
                "cousin",
                "nephew",
                "niece",
                "grandfather",
                "grandmother",
                "grandparent",
                "grandson",
                "granddaughter",
                "grandchild",
                "in-law",
                "relative",
            ],
        ),
    ];
    groups
        .iter()
        .flat_map(|(kind, words)| words.iter().map(move |w| (*w, *kind)))
        .collect()
});

/// Specific family kind of a word (`Parent`, `Child`, ...), plurals included.
pub fn kinship_kind(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    KINSHIP
        .get(lower.as_str())
        .or_else(|| lower.strip_suffix('s').and_then(|w| KINSHIP.get(w)))
        .copied()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyRelationFixer;

impl FamilyRelationFixer {
    pub fn new() -> Self {
        FamilyRelationFixer
    }

    /// The specific type for a `PER-SOC.Family` relation, if a kinship word
    /// decides it.
    pub fn specific_type(&self, doc: &DocTheory, relation: &RelMention) -> Option<Symbol> {
        if relation.rel_type != FAMILY_RELATION {
            return None;
        }
        let left = doc.mention(relation.left)?;
        let right = doc.mention(relation.right)?;
        let mut words = Vec::new();
        if let Some(parse) = doc.parse_of(relation.left) {
            words.push(left.head_word(parse));
        }
        if let Some(parse) = doc.parse_of(relation.right) {
            words.push(right.head_word(parse));
        }
        if left.sentence == right.sentence {
            if let Some(st) = doc.sentence(left.sentence) {
                let (l, r) = (st.parse.node(left.node), st.parse.node(right.node));
                let (from, to) = if l.end_token < r.start_token {
                    (l.end_token + 1, r.start_token)
                } else {
                    (r.end_token + 1, l.start_token)
                };
                words.extend((from..to).filter_map(|i| st.tokens().word(i).cloned()));
            }
        }
        words
            .iter()
            .find_map(|w| kinship_kind(w.as_str()))
            .map(|kind| Symbol::from(format!("{}.{}", FAMILY_RELATION, kind)))
    }

    /// Retype the family relations of `set`; returns how many changed.
    pub fn fix(&self, doc: &DocTheory, set: &mut RelMentionSet) -> usize {
        let mut fixed = 0;
        for relation in set.iter_mut() {
            if let Some(specific) = self.specific_type(doc, relation) {
                log::debug!("{} {} -> {}", relation.uid, relation.rel_type, specific);
                relation.rel_type = specific;
                fixed += 1;
            }
        }
        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinship_words() {
        assert_eq!(kinship_kind("Mother"), Some("Parent"));
        assert_eq!(kinship_kind("sons"), Some("Child"));
        assert_eq!(kinship_kind("wife"), Some("Spouse"));
        assert_eq!(kinship_kind("cousins"), Some("Other"));
        assert_eq!(kinship_kind("colleague"), None);
    }
}
