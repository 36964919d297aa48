//! Mention-to-entity linking.
//!
//! Per mention, in sentence then index order:
//!
//! ```text
//! UNLINKED ──score against every type-compatible entity──┬─> LINK(best entity)   p(LINK) > threshold
//!                                                        └─> NEW-ENTITY          otherwise
//! ```
//!
//! Type-incompatible entities are never scored. Among equal best scores the
//! lowest entity id wins.

use layered_proptree::PropTreeLinks;
use layered_resolution::{
    Classifier, CorefOptions, DocTheory, EntityId, ForestOptions, Mention, MentionType, MentionUid,
    ResolutionResult, Scored, Symbol,
};

use crate::CandidateFeatureExtractor;

pub const LINK_TAG: &str = "LINK";
pub const NO_LINK_TAG: &str = "NO_LINK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked { mention: MentionUid, entity: EntityId },
    NewEntity { mention: MentionUid, entity: EntityId },
}

impl LinkOutcome {
    pub fn mention(&self) -> MentionUid {
        match *self {
            LinkOutcome::Linked { mention, .. } | LinkOutcome::NewEntity { mention, .. } => mention,
        }
    }

    pub fn entity(&self) -> EntityId {
        match *self {
            LinkOutcome::Linked { entity, .. } | LinkOutcome::NewEntity { entity, .. } => entity,
        }
    }
}

/// Links mentions into the document's entity set using an injected
/// classifier over [`CandidateFeatureExtractor`] contexts.
pub struct EntityConsistencyResolver<C> {
    classifier: C,
    extractor: CandidateFeatureExtractor,
    options: CorefOptions,
    tags: [Symbol; 2],
}

impl<C: Classifier> EntityConsistencyResolver<C> {
    pub fn new(classifier: C, extractor: CandidateFeatureExtractor) -> Self {
        Self {
            classifier,
            extractor,
            options: CorefOptions::default(),
            tags: [Symbol::new(LINK_TAG), Symbol::new(NO_LINK_TAG)],
        }
    }

    pub fn with_options(mut self, options: CorefOptions) -> Self {
        self.extractor = self.extractor.with_max_size(options.max_context_size);
        self.options = options;
        self
    }

    pub fn extractor(&self) -> &CandidateFeatureExtractor {
        &self.extractor
    }

    /// Best compatible entity and its LINK probability.
    pub fn best_candidate(
        &self,
        doc: &DocTheory,
        mention: &Mention,
        links: Option<&PropTreeLinks>,
    ) -> Option<(EntityId, f64)> {
        let mut best: Option<(EntityId, f64)> = None;
        for entity in doc.entities.iter() {
            if !mention.entity_type.is_compatible(&entity.entity_type) {
                continue;
            }
            let features = self.extractor.get_event_context(doc, mention, entity, links);
            let p = self.classifier.probability(&features, &self.tags, LINK_TAG);
            log::trace!("{} vs entity {}: p(LINK) = {:.3}", mention.uid, entity.id.0, p);
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((entity.id, p));
            }
        }
        best
    }

    /// Attach every unlinked NAME/DESC/PRON mention to an entity, creating
    /// entities as needed. Mentions already in an entity are left alone.
    pub fn resolve(&self, doc: &mut DocTheory) -> ResolutionResult<Vec<Scored<LinkOutcome>>> {
        let forest_options = ForestOptions {
            resolve_pronouns: false,
            include_modifiers: true,
        };
        let mut outcomes = Vec::new();
        for sentence in 0..doc.n_sentences() {
            let mentions: Vec<Mention> = doc
                .sentence(sentence)
                .map(|st| st.mentions.iter().cloned().collect())
                .unwrap_or_default();
            let has_pronoun = mentions.iter().any(|m| m.mention_type == MentionType::Pron);
            let links = if self.options.link_pronouns && has_pronoun {
                Some(PropTreeLinks::new(sentence, doc, &forest_options)?)
            } else {
                None
            };

            for mention in &mentions {
                match mention.mention_type {
                    MentionType::List | MentionType::None => continue,
                    MentionType::Pron if !self.options.link_pronouns => continue,
                    _ => {}
                }
                if doc.entities.entity_by_mention(mention.uid).is_some() {
                    continue;
                }
                let outcome = match self.best_candidate(doc, mention, links.as_ref()) {
                    Some((entity, p)) if p > self.options.link_threshold => {
                        doc.entities.add_mention(entity, mention.uid, &mention.entity_type)?;
                        Scored::classifier(
                            LinkOutcome::Linked {
                                mention: mention.uid,
                                entity,
                            },
                            p,
                            self.classifier.name(),
                        )
                    }
                    best => {
                        let entity = doc.entities.add_new(mention.uid, mention.entity_type.clone())?;
                        Scored::classifier(
                            LinkOutcome::NewEntity {
                                mention: mention.uid,
                                entity,
                            },
                            1.0 - best.map_or(0.0, |(_, p)| p),
                            self.classifier.name(),
                        )
                    }
                };
                outcomes.push(outcome);
            }
        }

        let linked = outcomes
            .iter()
            .filter(|o| matches!(o.value, LinkOutcome::Linked { .. }))
            .count();
        log::info!(
            "{}: linked {} mention(s), started {} entit(ies)",
            doc.name,
            linked,
            outcomes.len() - linked
        );
        Ok(outcomes)
    }
}
