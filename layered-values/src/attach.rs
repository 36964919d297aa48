//! Temporal attachment of timex value mentions to sentence relations.
//!
//! Every TIMEX2 value mention of a relation's sentence is scored against the
//! attachment kinds plus `NONE`. Each kind whose probability clears the
//! threshold is a candidate. The two modes pick among candidates:
//!
//! ```text
//! automatic  every candidate becomes a temporal attribute
//! manual     per value mention, only its best-scoring candidate
//! ```
//!
//! The relation's time argument is the best surviving candidate; on equal
//! scores the earlier value mention wins.

use std::collections::BTreeMap;

use layered_resolution::{
    Classifier, DocTheory, FeatureVector, Parse, RelMention, ResolutionError, ResolutionResult,
    Symbol, TemporalAttachmentMode, TemporalAttribute, TimeArgument, ValueMention, ValueMentionUid,
    ValueOptions,
};

use crate::matching::pos_tag;
use crate::timex::is_specific_date;

pub const NONE_TAG: &str = "NONE";
pub const DEFAULT_KINDS: [&str; 4] = ["Time-Within", "Time-Holds", "Time-Starting", "Time-Ending"];

const MAX_FEATURES: usize = 100;

/// One `(value mention, kind)` pairing that cleared the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalCandidate {
    pub value: ValueMentionUid,
    pub kind: Symbol,
    pub score: f64,
}

pub struct TemporalAttacher<C> {
    classifier: C,
    threshold: f64,
    mode: TemporalAttachmentMode,
    tags: Vec<Symbol>,
}

impl<C: Classifier> TemporalAttacher<C> {
    pub fn new(classifier: C) -> Self {
        let options = ValueOptions::default();
        Self {
            classifier,
            threshold: options.temporal_threshold,
            mode: options.temporal_attachment_mode,
            tags: tags_for(&DEFAULT_KINDS),
        }
    }

    pub fn with_options(mut self, options: &ValueOptions) -> Self {
        self.threshold = options.temporal_threshold;
        self.mode = options.temporal_attachment_mode;
        self
    }

    pub fn with_kinds(mut self, kinds: &[&str]) -> Self {
        self.tags = tags_for(kinds);
        self
    }

    pub fn mode(&self) -> TemporalAttachmentMode {
        self.mode
    }

    /// Context of one `(relation, value mention)` pairing.
    pub fn features(&self, doc: &DocTheory, relation: &RelMention, value: &ValueMention) -> FeatureVector {
        let mut fv = FeatureVector::with_max_size(MAX_FEATURES);
        fv.push_atomic(format!("rel[{}]", relation.rel_type));
        let st = match doc.sentence(value.sentence) {
            Some(st) => st,
            None => return fv,
        };
        let parse = &st.parse;
        for (side, uid) in [("left", relation.left), ("right", relation.right)] {
            let node = match doc.mention(uid) {
                Some(m) if m.sentence == value.sentence => parse.node(m.node),
                _ => continue,
            };
            if value.start_token >= node.start_token && value.end_token <= node.end_token {
                fv.push_atomic(format!("{}-within", side));
            } else if value.start_token == node.end_token + 1 || value.end_token + 1 == node.start_token {
                fv.push_atomic(format!("{}-adjacent", side));
            } else if let Some(prep) = adjacent_preposition(parse, value, node.end_token) {
                fv.push_atomic(format!("{}-prep[{}]", side, prep));
            }
        }
        let verbs = parse
            .nodes()
            .filter(|n| parse.is_preterminal(n.id) && Parse::is_verb_tag(&n.tag))
            .count();
        if verbs == 1 {
            fv.push_atomic("only-verb");
        }
        if st.values.iter().filter(|vm| vm.value_type.is_timex()).count() == 1 {
            fv.push_atomic("only-date");
        }
        if let Some(normalized) = doc.value_set.by_mention(value.uid).and_then(|v| v.timex_value.as_deref()) {
            fv.push_atomic(if is_specific_date(normalized) {
                "specific-date"
            } else {
                "vague-date"
            });
        }
        fv.add_bigrams();
        fv
    }

    /// Candidates of one relation in its sentence, best first.
    pub fn candidates(&self, doc: &DocTheory, relation: &RelMention) -> Vec<TemporalCandidate> {
        let st = match doc.sentence(relation.sentence) {
            Some(st) => st,
            None => return Vec::new(),
        };
        let mut candidates = Vec::new();
        for value in st.values.iter().filter(|vm| vm.value_type.is_timex()) {
            if self.mode == TemporalAttachmentMode::Manual && !is_manual_candidate(doc, value) {
                continue;
            }
            let fv = self.features(doc, relation, value);
            for scored in self.classifier.score(&fv, &self.tags) {
                if scored.tag != NONE_TAG && scored.score > self.threshold {
                    candidates.push(TemporalCandidate {
                        value: value.uid,
                        kind: scored.tag,
                        score: scored.score,
                    });
                }
            }
        }
        // stable: equal scores keep value mention order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Candidates kept by the configured mode.
    pub fn select(&self, candidates: Vec<TemporalCandidate>) -> Vec<TemporalCandidate> {
        match self.mode {
            TemporalAttachmentMode::Automatic => candidates,
            TemporalAttachmentMode::Manual => {
                let mut best: BTreeMap<ValueMentionUid, TemporalCandidate> = BTreeMap::new();
                for candidate in candidates {
                    let keep = best
                        .get(&candidate.value)
                        .map_or(true, |current| candidate.score > current.score);
                    if keep {
                        best.insert(candidate.value, candidate);
                    }
                }
                let mut kept: Vec<_> = best.into_values().collect();
                kept.sort_by(|a, b| b.score.total_cmp(&a.score));
                kept
            }
        }
    }

    /// Attach temporal attributes and time arguments to the relations of one
    /// sentence. Earlier attachments are replaced.
    ///
    /// Returns the number of relations that received a time argument.
    pub fn attach_sentence(&self, doc: &mut DocTheory, sentence: usize) -> ResolutionResult<usize> {
        let st = doc
            .sentence(sentence)
            .ok_or_else(|| ResolutionError::unexpected_input(format!("no sentence {}", sentence)))?;
        let selections: Vec<Vec<TemporalCandidate>> = st
            .relations
            .iter()
            .map(|relation| self.select(self.candidates(doc, relation)))
            .collect();
        let mut attached = 0;
        if let Some(st) = doc.sentence_mut(sentence) {
            for (index, selected) in selections.into_iter().enumerate() {
                let relation = match st.relations.get_mut(index) {
                    Some(relation) => relation,
                    None => continue,
                };
                relation.time_arg = selected.first().map(|best| TimeArgument {
                    role: best.kind.clone(),
                    value: best.value,
                    score: best.score,
                });
                relation.temporal_attributes = selected
                    .into_iter()
                    .map(|c| TemporalAttribute {
                        kind: c.kind,
                        value: c.value,
                        score: c.score,
                    })
                    .collect();
                if relation.time_arg.is_some() {
                    attached += 1;
                }
            }
        }
        log::debug!("sentence {}: {} relations with a time argument", sentence, attached);
        Ok(attached)
    }

    pub fn attach(&self, doc: &mut DocTheory) -> ResolutionResult<usize> {
        let mut attached = 0;
        for sentence in 0..doc.n_sentences() {
            attached += self.attach_sentence(doc, sentence)?;
        }
        log::info!("{} relations with a time argument in {}", attached, doc.name);
        Ok(attached)
    }
}

fn tags_for(kinds: &[&str]) -> Vec<Symbol> {
    kinds
        .iter()
        .map(|k| Symbol::new(k))
        .chain(std::iter::once(Symbol::new(NONE_TAG)))
        .collect()
}

/// Manual mode only pairs values whose normalization, when known, is a
/// calendar day.
fn is_manual_candidate(doc: &DocTheory, value: &ValueMention) -> bool {
    match doc.value_set.by_mention(value.uid).and_then(|v| v.timex_value.as_deref()) {
        Some(normalized) => is_specific_date(normalized),
        None => true,
    }
}

/// Preposition right before the value that itself follows the argument.
fn adjacent_preposition(parse: &Parse, value: &ValueMention, arg_end: usize) -> Option<Symbol> {
    let prep = value.start_token.checked_sub(1)?;
    if prep != arg_end + 1 {
        return None;
    }
    let tag = pos_tag(parse, prep)?;
    if tag != "IN" && tag != "TO" {
        return None;
    }
    parse.tokens().word(prep).map(|w| w.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(value: usize, kind: &str, score: f64) -> TemporalCandidate {
        TemporalCandidate {
            value: ValueMentionUid::Sentence { sentence: 0, index: value },
            kind: Symbol::new(kind),
            score,
        }
    }

    #[test]
    fn manual_mode_keeps_best_per_value() {
        let attacher = TemporalAttacher::new(layered_resolution::WeightedScorer::new("t"));
        let kept = attacher.select(vec![
            candidate(0, "Time-Within", 0.9),
            candidate(1, "Time-Holds", 0.8),
            candidate(0, "Time-Starting", 0.7),
        ]);
        assert_eq!(kept, vec![candidate(0, "Time-Within", 0.9), candidate(1, "Time-Holds", 0.8)]);
    }

    #[test]
    fn automatic_mode_keeps_everything() {
        let options = ValueOptions {
            temporal_attachment_mode: TemporalAttachmentMode::Automatic,
            ..ValueOptions::default()
        };
        let attacher = TemporalAttacher::new(layered_resolution::WeightedScorer::new("t")).with_options(&options);
        let all = vec![candidate(0, "Time-Within", 0.9), candidate(0, "Time-Starting", 0.7)];
        assert_eq!(attacher.select(all.clone()), all);
    }
}
