//! Relation mentions between two mentions.

use std::fmt;

use crate::{MentionUid, ResolutionError, ResolutionResult, ScoreSource, Symbol, ValueMentionUid};

/// Relations one sentence may hold.
pub const MAX_SENTENCE_RELATIONS: usize = 100;
/// Document-level relations one document may hold.
pub const MAX_DOCUMENT_RELATIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tense {
    #[default]
    Unspecified,
    Past,
    Present,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modality {
    #[default]
    Asserted,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RelMentionUid {
    /// Sentence number; document-level relations use the sentence count.
    pub scope: usize,
    pub index: usize,
}

impl fmt::Display for RelMentionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}.{}", self.scope, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeArgument {
    pub role: Symbol,
    pub value: ValueMentionUid,
    pub score: f64,
}

/// A scored temporal attribute such as `Holds` or `Starts` on a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalAttribute {
    pub kind: Symbol,
    pub value: ValueMentionUid,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelMention {
    pub uid: RelMentionUid,
    pub left: MentionUid,
    pub right: MentionUid,
    pub rel_type: Symbol,
    pub sentence: usize,
    pub score: f64,
    pub source: ScoreSource,
    pub tense: Tense,
    pub modality: Modality,
    pub time_arg: Option<TimeArgument>,
    pub temporal_attributes: Vec<TemporalAttribute>,
}

impl RelMention {
    /// A relation not yet placed in a set; the set assigns its uid.
    pub fn new(
        left: MentionUid,
        right: MentionUid,
        rel_type: Symbol,
        sentence: usize,
        score: f64,
        source: ScoreSource,
    ) -> Self {
        RelMention {
            uid: RelMentionUid::default(),
            left,
            right,
            rel_type,
            sentence,
            score,
            source,
            tense: Tense::default(),
            modality: Modality::default(),
            time_arg: None,
            temporal_attributes: Vec::new(),
        }
    }

    /// Same two mentions, in either order.
    pub fn same_pair(&self, a: MentionUid, b: MentionUid) -> bool {
        (self.left == a && self.right == b) || (self.left == b && self.right == a)
    }

    pub fn is_pattern_derived(&self) -> bool {
        matches!(self.source, ScoreSource::Pattern { .. })
    }
}

/// Relations of one sentence, or of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct RelMentionSet {
    scope: usize,
    capacity: usize,
    document_level: bool,
    mentions: Vec<RelMention>,
}

impl RelMentionSet {
    pub fn for_sentence(sentence: usize) -> Self {
        RelMentionSet {
            scope: sentence,
            capacity: MAX_SENTENCE_RELATIONS,
            document_level: false,
            mentions: Vec::new(),
        }
    }

    pub fn document(n_sentences: usize) -> Self {
        RelMentionSet {
            scope: n_sentences,
            capacity: MAX_DOCUMENT_RELATIONS,
            document_level: true,
            mentions: Vec::new(),
        }
    }

    pub fn is_document_level(&self) -> bool {
        self.document_level
    }

    pub fn scope(&self) -> usize {
        self.scope
    }

    pub fn add(&mut self, mut relation: RelMention) -> ResolutionResult<RelMentionUid> {
        if self.mentions.len() >= self.capacity {
            let what = if self.document_level {
                "document relation count".to_string()
            } else {
                format!("relation count in sentence {}", self.scope)
            };
            log::warn!("{} reached {}", what, self.capacity);
            return Err(ResolutionError::capacity(&what, self.capacity));
        }
        let uid = RelMentionUid {
            scope: self.scope,
            index: self.mentions.len(),
        };
        relation.uid = uid;
        self.mentions.push(relation);
        Ok(uid)
    }

    pub fn has_pair(&self, a: MentionUid, b: MentionUid) -> bool {
        self.mentions.iter().any(|r| r.same_pair(a, b))
    }

    pub fn has_typed_pair(&self, a: MentionUid, b: MentionUid, rel_type: &Symbol) -> bool {
        self.mentions
            .iter()
            .any(|r| &r.rel_type == rel_type && r.same_pair(a, b))
    }

    pub fn get(&self, index: usize) -> Option<&RelMention> {
        self.mentions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RelMention> {
        self.mentions.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelMention> {
        self.mentions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RelMention> {
        self.mentions.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(left: usize, right: usize) -> RelMention {
        RelMention::new(
            MentionUid(left),
            MentionUid(right),
            Symbol::new("ORG-AFF.Employment"),
            0,
            0.9,
            ScoreSource::Derived,
        )
    }

    #[test]
    fn pairs_are_unordered() {
        let mut set = RelMentionSet::for_sentence(0);
        set.add(rel(1, 2)).expect("room");
        assert!(set.has_pair(MentionUid(2), MentionUid(1)));
        assert!(!set.has_pair(MentionUid(1), MentionUid(3)));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut set = RelMentionSet::for_sentence(4);
        for i in 0..MAX_SENTENCE_RELATIONS {
            let uid = set.add(rel(i, i + 1)).expect("room");
            assert_eq!(uid, RelMentionUid { scope: 4, index: i });
        }
        assert!(set.add(rel(0, 1)).unwrap_err().is_inconsistency());
    }
}
