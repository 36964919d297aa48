//! Pronoun-to-entity link features.

use layered_proptree::PropTreeLinks;
use layered_resolution::{
    DocTheory, Entity, FeatureVector, Gender, Mention, Number, Parse, Symbol, WordFeatureProvider,
};

use crate::features::{distance_symbol, parent_head};
use crate::link_functions::{entity_mentions, sentence_distance};

/// Closest entity mention before `mention`, else the entity's first mention.
fn antecedent<'d>(doc: &'d DocTheory, mention: &Mention, entity: &'d Entity) -> Option<(&'d Mention, &'d Parse)> {
    let before = entity_mentions(doc, entity)
        .filter(|(m, _)| m.uid < mention.uid)
        .max_by_key(|(m, _)| m.uid);
    before.or_else(|| entity_mentions(doc, entity).next())
}

/// Gender of a NAME comes from its first word (`John Smith`), of anything
/// else from its head word.
fn mention_gender(words: &dyn WordFeatureProvider, mention: &Mention, parse: &Parse) -> Gender {
    let head = parse.head_word(mention.node);
    match words.gender(&head) {
        Gender::Unknown => parse
            .terminal_symbols(mention.node)
            .first()
            .map_or(Gender::Unknown, |w| words.gender(w)),
        known => known,
    }
}

pub(crate) fn add_pronoun_link_features(
    doc: &DocTheory,
    words: Option<&dyn WordFeatureProvider>,
    links: Option<&PropTreeLinks>,
    mention: &Mention,
    entity: &Entity,
    fv: &mut FeatureVector,
) {
    let Some(parse) = doc.parse_of(mention.uid) else {
        return;
    };
    let pronoun = parse.head_word(mention.node);
    fv.push_atomic(mention.entity_type.name().clone());
    fv.push_atomic(format!("pron[{}]", pronoun.to_lowercase()));
    fv.push_atomic(distance_symbol(sentence_distance(mention, entity)));

    if let Some((ant, ant_parse)) = antecedent(doc, mention, entity) {
        fv.push_atomic(format!("ant-{}", ant.mention_type.as_str()));
        if let Some(words) = words {
            let (g1, g2) = (words.gender(&pronoun), mention_gender(words, ant, ant_parse));
            if g1 != Gender::Unknown && g2 != Gender::Unknown {
                fv.push_atomic(if g1 == g2 { "gender-agree" } else { "gender-clash" });
            }
            let (n1, n2) = (words.number(&pronoun), words.number(&ant_parse.head_word(ant.node)));
            if n1 != Number::Unknown && n2 != Number::Unknown {
                fv.push_atomic(if n1 == n2 { "number-agree" } else { "number-clash" });
            }
        }
    }

    if let Some(verb) = parent_head(parse, mention.node) {
        fv.push_atomic(format!("ment-parent[{}]", verb));
    }

    // same-sentence antecedents may connect through the proposition forest
    let Some(links) = links.filter(|l| l.sentence() == mention.sentence) else {
        return;
    };
    let path = entity
        .mentions
        .iter()
        .filter(|uid| uid.sentence() == mention.sentence && **uid != mention.uid)
        .find_map(|uid| links.mention_link(uid.index(), mention.index));
    match path {
        Some(chain) => fv.push_atomic(Symbol::from(format!("prop-path[{}]", links.role_path(chain)))),
        None => fv.push_atomic("no-prop-link"),
    };
}
