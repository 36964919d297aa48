//! Per-language link feature functions.
//!
//! Each implementation appends atomic predicates describing how well a
//! NAME/DESC mention fits an existing entity. [`link_functions_for`] picks the
//! implementation for a document language; callers may also pass their own.

use std::collections::HashSet;

use layered_resolution::{DocTheory, Entity, FeatureVector, Language, Mention, MentionType, Parse, Symbol};

use crate::features::{
    distance_symbol, head_np_words, modifier_words, num_ents_symbol, numeric_premod, parent_head,
    premods, unique_modifier_ratio, MAX_ENTITY_PREMODS,
};

pub trait LinkFeatureFunctions {
    fn name(&self) -> &str;

    /// Append atomic predicates for linking `mention` to `entity`.
    fn add_link_features(
        &self,
        doc: &DocTheory,
        mention: &Mention,
        entity: &Entity,
        features: &mut FeatureVector,
    );
}

pub fn link_functions_for(language: Language) -> Box<dyn LinkFeatureFunctions> {
    match language {
        Language::English => Box::new(EnglishLinkFunctions),
        Language::Other => Box::new(GenericLinkFunctions),
    }
}

/// Mentions of an entity that still resolve in the document, with their parse.
pub(crate) fn entity_mentions<'d>(
    doc: &'d DocTheory,
    entity: &'d Entity,
) -> impl Iterator<Item = (&'d Mention, &'d Parse)> + 'd {
    entity
        .mentions
        .iter()
        .filter_map(move |uid| Some((doc.mention(*uid)?, doc.parse_of(*uid)?)))
}

/// Smallest sentence distance between the mention and any entity mention.
pub(crate) fn sentence_distance(mention: &Mention, entity: &Entity) -> usize {
    entity
        .mentions
        .iter()
        .map(|uid| uid.sentence().abs_diff(mention.sentence))
        .min()
        .unwrap_or(0)
}

fn head_word_match(doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity) -> bool {
    let head = parse.head_word(mention.node);
    entity_mentions(doc, entity).any(|(m, p)| p.head_word(m.node) == head)
}

fn entity_modifier_words(doc: &DocTheory, entity: &Entity) -> HashSet<Symbol> {
    entity_mentions(doc, entity)
        .flat_map(|(m, p)| modifier_words(p, m.node))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLinkFunctions;

impl EnglishLinkFunctions {
    fn add_premod_lists(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity, fv: &mut FeatureVector) {
        for word in premods(parse, mention.node) {
            fv.push_atomic(format!("ment[{}]", word));
        }
        let mut seen: Vec<Symbol> = Vec::new();
        'mentions: for (m, p) in entity_mentions(doc, entity) {
            for word in premods(p, m.node) {
                if !seen.contains(&word) {
                    seen.push(word);
                }
                if seen.len() >= MAX_ENTITY_PREMODS {
                    break 'mentions;
                }
            }
        }
        for word in seen {
            fv.push_atomic(format!("ent[{}]", word));
        }
    }

    fn add_parent_heads(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity, fv: &mut FeatureVector) {
        if let Some(verb) = parent_head(parse, mention.node) {
            fv.push_atomic(format!("ment-parent[{}]", verb));
        }
        let mut seen = HashSet::new();
        for (m, p) in entity_mentions(doc, entity) {
            if let Some(verb) = parent_head(p, m.node) {
                if seen.insert(verb.clone()) {
                    fv.push_atomic(format!("ent-parent[{}]", verb));
                }
            }
        }
    }

    fn head_word_node_match(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity) -> bool {
        let words = head_np_words(parse, mention.node);
        entity_mentions(doc, entity).any(|(m, p)| head_np_words(p, m.node) == words)
    }

    fn exact_string_match(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity) -> bool {
        let text = parse.text(mention.node);
        entity_mentions(doc, entity).any(|(m, p)| p.text(m.node) == text)
    }

    fn add_numeric_premods(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity, fv: &mut FeatureVector) {
        let previous: Vec<Symbol> = entity_mentions(doc, entity)
            .filter_map(|(m, p)| numeric_premod(p, m.node))
            .collect();
        if !previous.is_empty() {
            fv.push_atomic("prevNumeric");
        }
        let Some(number) = numeric_premod(parse, mention.node) else {
            return;
        };
        fv.push_atomic("numericPremod");
        let (mut clash, mut matched) = (false, false);
        for prev in &previous {
            if *prev != number {
                if !clash {
                    fv.push_atomic("numericClash");
                    clash = true;
                }
            } else if !matched {
                fv.push_atomic("numericMatch");
                matched = true;
            }
        }
    }

    /// Same-head DESC mentions of the entity whose premodifiers are non-empty.
    fn same_head_desc_premods(&self, doc: &DocTheory, parse: &Parse, mention: &Mention, entity: &Entity) -> Vec<Vec<Symbol>> {
        let head = parse.head_word(mention.node);
        entity_mentions(doc, entity)
            .filter(|(m, p)| m.mention_type == MentionType::Desc && p.head_word(m.node) == head)
            .map(|(m, p)| premods(p, m.node))
            .filter(|words| !words.is_empty())
            .collect()
    }

    /// Some entity premodifier is missing from the mention and some mention
    /// premodifier is missing from that same entity mention.
    fn premod_clash(&self, own: &[Symbol], others: &[Vec<Symbol>]) -> bool {
        !own.is_empty()
            && others.iter().any(|other| {
                other.iter().any(|w| !own.contains(w)) && own.iter().any(|w| !other.contains(w))
            })
    }

    fn premod_match(&self, own: &[Symbol], others: &[Vec<Symbol>]) -> bool {
        others.iter().any(|other| own.iter().any(|w| other.contains(w)))
    }
}

impl LinkFeatureFunctions for EnglishLinkFunctions {
    fn name(&self) -> &str {
        "english"
    }

    fn add_link_features(&self, doc: &DocTheory, mention: &Mention, entity: &Entity, fv: &mut FeatureVector) {
        let Some(parse) = doc.parse_of(mention.uid) else {
            return;
        };
        fv.push_atomic(mention.entity_type.name().clone());
        self.add_premod_lists(doc, parse, mention, entity, fv);
        self.add_parent_heads(doc, parse, mention, entity, fv);
        fv.push_atomic(num_ents_symbol(doc.entities.entities_of_type(&entity.entity_type).count()));
        if head_word_match(doc, parse, mention, entity) {
            fv.push_atomic("HeadWordMatch");
            if self.head_word_node_match(doc, parse, mention, entity) {
                fv.push_atomic("HeadWordNodeMatch");
                if self.exact_string_match(doc, parse, mention, entity) {
                    fv.push_atomic("ExactStringMatch");
                }
            }
        }
        fv.push_atomic(unique_modifier_ratio(parse, mention.node, &entity_modifier_words(doc, entity)));
        fv.push_atomic(distance_symbol(sentence_distance(mention, entity)));
        self.add_numeric_premods(doc, parse, mention, entity, fv);
        if parse.head_index(mention.node) >= 1 {
            let own = premods(parse, mention.node);
            let others = self.same_head_desc_premods(doc, parse, mention, entity);
            if self.premod_clash(&own, &others) {
                fv.push_atomic("premodClash");
            }
            if self.premod_match(&own, &others) {
                fv.push_atomic("premodMatch");
            }
        }
    }
}

/// Language-neutral subset: type, head match, modifier ratio, distance and
/// entity count.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericLinkFunctions;

impl LinkFeatureFunctions for GenericLinkFunctions {
    fn name(&self) -> &str {
        "generic"
    }

    fn add_link_features(&self, doc: &DocTheory, mention: &Mention, entity: &Entity, fv: &mut FeatureVector) {
        let Some(parse) = doc.parse_of(mention.uid) else {
            return;
        };
        fv.push_atomic(mention.entity_type.name().clone());
        if head_word_match(doc, parse, mention, entity) {
            fv.push_atomic("HeadWordMatch");
        }
        fv.push_atomic(unique_modifier_ratio(parse, mention.node, &entity_modifier_words(doc, entity)));
        fv.push_atomic(distance_symbol(sentence_distance(mention, entity)));
        fv.push_atomic(num_ents_symbol(doc.entities.entities_of_type(&entity.entity_type).count()));
    }
}
