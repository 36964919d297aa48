//! Classifier-driven relation finding within one sentence.

use layered_proptree::PropTreeLinks;
use layered_resolution::{
    Classifier, DocTheory, Mention, MentionType, RelMention, RelMentionSet, ResolutionError,
    ResolutionResult, ScoreSource, Symbol,
};

use crate::features::{relation_pair_features, DEFAULT_MAX_FEATURES};
use crate::{RelationObservation, ValidationTable};

pub const NONE_RELATION: &str = "NONE";
pub const DEFAULT_RELATION_THRESHOLD: f64 = 0.5;

/// Scores every pair of NAME/DESC/PRON mentions of a sentence against the
/// relation tags plus `NONE`.
pub struct SentenceRelationFinder<C> {
    classifier: C,
    tags: Vec<Symbol>,
    threshold: f64,
    observation: Option<RelationObservation>,
    max_features: usize,
}

impl<C: Classifier> SentenceRelationFinder<C> {
    pub fn new(classifier: C, relation_types: &[&str]) -> Self {
        let tags = relation_types
            .iter()
            .map(|t| Symbol::new(t))
            .chain(std::iter::once(Symbol::new(NONE_RELATION)))
            .collect();
        SentenceRelationFinder {
            classifier,
            tags,
            threshold: DEFAULT_RELATION_THRESHOLD,
            observation: None,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Only tags valid for the pair's entity types are considered.
    pub fn with_observation(mut self, observation: RelationObservation) -> Self {
        self.observation = Some(observation);
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Best valid non-`NONE` tag of the pair above the threshold.
    pub fn classify(
        &self,
        doc: &DocTheory,
        links: Option<&PropTreeLinks>,
        left: &Mention,
        right: &Mention,
    ) -> Option<(Symbol, f64)> {
        let features = relation_pair_features(doc, links, left, right, self.max_features);
        let mut observation = self.observation.clone();
        if let Some(observation) = observation.as_mut() {
            observation.populate(left, right);
        }
        self.classifier
            .score(&features, &self.tags)
            .into_iter()
            .filter(|t| t.tag != NONE_RELATION)
            .find(|t| observation.as_ref().map_or(true, |o| o.is_valid_tag(&t.tag)))
            .filter(|t| t.score > self.threshold)
            .map(|t| (t.tag, t.score))
    }

    fn ordered(&self) -> bool {
        matches!(
            self.observation.as_ref().map(RelationObservation::table),
            Some(ValidationTable::Ace2005 { ordered: true })
        )
    }

    /// Relations of `sentence`, one per mention pair at most. The earlier
    /// mention is tried as the left argument first; under an ordered
    /// validation table the reversed order is tried when that fails.
    pub fn find(
        &self,
        doc: &DocTheory,
        sentence: usize,
        links: Option<&PropTreeLinks>,
    ) -> ResolutionResult<RelMentionSet> {
        let st = doc
            .sentence(sentence)
            .ok_or_else(|| ResolutionError::unexpected_input(format!("no sentence {}", sentence)))?;
        let mut set = RelMentionSet::for_sentence(sentence);
        let candidates: Vec<&Mention> = st
            .mentions
            .iter()
            .filter(|m| matches!(m.mention_type, MentionType::Name | MentionType::Desc | MentionType::Pron))
            .collect();
        for (i, left) in candidates.iter().enumerate() {
            for right in &candidates[i + 1..] {
                if corefer(doc, left, right) {
                    continue;
                }
                let forward = self.classify(doc, links, left, right).map(|found| (*left, *right, found));
                let found = match forward {
                    Some(found) => Some(found),
                    None if self.ordered() => self
                        .classify(doc, links, right, left)
                        .map(|found| (*right, *left, found)),
                    None => None,
                };
                if let Some((left, right, (rel_type, score))) = found {
                    log::trace!("{} {} {} ({:.3})", left.uid, rel_type, right.uid, score);
                    set.add(RelMention::new(
                        left.uid,
                        right.uid,
                        rel_type,
                        sentence,
                        score,
                        ScoreSource::Classifier {
                            model: self.classifier.name().to_string(),
                        },
                    ))?;
                }
            }
        }
        log::debug!("sentence {}: {} relations", sentence, set.len());
        Ok(set)
    }
}

fn corefer(doc: &DocTheory, a: &Mention, b: &Mention) -> bool {
    match (doc.entities.entity_by_mention(a.uid), doc.entities.entity_by_mention(b.uid)) {
        (Some(x), Some(y)) => x.id == y.id,
        _ => false,
    }
}
