//! Document-layout relations.
//!
//! Some documents introduce an organization and then enumerate its parts or
//! people over the following sentences:
//!
//! ```text
//! The alliance consists of the following groups:
//! - Globex
//! - Initech
//! ```
//!
//! The introducing sentence supplies the second argument; each enumerated
//! item supplies a first argument. Items are dash-led sentences, or sentences
//! following an `A .` / `1 .` marker sentence.

use layered_resolution::{
    DocTheory, Mention, MentionType, PredType, RelMention, RelMentionSet, ResolutionResult,
    ScoreSource, SentenceTheory, Symbol, MAX_DOCUMENT_RELATIONS, OBJ_ROLE, REF_ROLE, SUB_ROLE,
    UNKNOWN_ROLE,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentences without an item before a dash list is abandoned.
const MAX_DASH_GAP: usize = 8;

static FOLLOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^follow(?:s|ed|ing|er|ers)?$").expect("Invalid follow regex"));

static CONSIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:consist|contain|appear)(?:s|ed|ing)?$").expect("Invalid consist regex")
});

static MADE_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:make|makes|made|making|comprise|comprises|comprised|comprising|organi[sz](?:e|es|ed|ing))$")
        .expect("Invalid made-of regex")
});

/// Relation finder working across sentence boundaries on document layout.
pub trait StructuralRelationFinder {
    /// An active finder replaces the zoned and pattern finders.
    fn is_active(&self) -> bool;

    fn find_relations(&self, doc: &DocTheory) -> ResolutionResult<RelMentionSet>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishStructuralRelationFinder {
    active: bool,
}

impl EnglishStructuralRelationFinder {
    pub fn new(active: bool) -> Self {
        EnglishStructuralRelationFinder { active }
    }
}

impl StructuralRelationFinder for EnglishStructuralRelationFinder {
    fn is_active(&self) -> bool {
        self.active
    }

    fn find_relations(&self, doc: &DocTheory) -> ResolutionResult<RelMentionSet> {
        let mut set = RelMentionSet::document(doc.n_sentences());
        if !self.active {
            return Ok(set);
        }
        let mut found = Vec::new();
        for (i, st) in doc.sentences().iter().enumerate() {
            if let Some(arg2) = find_candidate_arg2(st) {
                log::debug!("sentence {} introduces a list for {}", i, arg2.uid);
                create_structure_based_relations(doc, arg2, i + 1, &mut found);
            }
        }
        for relation in found {
            if set.len() >= MAX_DOCUMENT_RELATIONS {
                log::warn!("structural relations capped at {} in {}", MAX_DOCUMENT_RELATIONS, doc.name);
                break;
            }
            set.add(relation)?;
        }
        Ok(set)
    }
}

fn is_org_or_fac(mention: &Mention) -> bool {
    let name = mention.entity_type.name();
    name == "ORG" || name == "FAC"
}

fn is_per(mention: &Mention) -> bool {
    mention.entity_type.name() == "PER"
}

fn is_punctuation(word: &str) -> bool {
    word.chars().all(|c| !c.is_alphanumeric())
}

/// A "follow" word somewhere after the mention.
fn followed_by_follow(st: &SentenceTheory, mention: &Mention) -> bool {
    let end = st.parse.node(mention.node).end_token;
    st.tokens().iter().skip(end + 1).any(|t| FOLLOW.is_match(t.text.as_str()))
}

fn find_candidate_arg2(st: &SentenceTheory) -> Option<&Mention> {
    find_org_by_verb(st, &CONSIST, &SUB_ROLE)
        .or_else(|| find_org_by_verb(st, &MADE_OF, &OBJ_ROLE))
        .or_else(|| find_for_org_follows(st))
        .or_else(|| find_following_org_person(st))
}

/// "ORG consists of the following", "... is made up of the following".
fn find_org_by_verb<'a>(st: &'a SentenceTheory, verb: &Regex, role: &Symbol) -> Option<&'a Mention> {
    let candidate = st.propositions.iter().find_map(|p| {
        if p.pred_type != PredType::Verb {
            return None;
        }
        let pred = p.pred_symbol(&st.parse)?;
        if !verb.is_match(pred.as_str()) {
            return None;
        }
        st.mentions.get(p.mention_for_role(role)?).filter(|m| is_org_or_fac(m))
    })?;
    followed_by_follow(st, candidate).then_some(candidate)
}

/// "For ORG, the following ...": the last-ending ORG or FAC filling a `for`
/// role.
fn find_for_org_follows(st: &SentenceTheory) -> Option<&Mention> {
    let for_role = Symbol::new("for");
    let mut result: Option<&Mention> = None;
    let mut last_token = 0;
    for prop in st.propositions.iter() {
        let Some(candidate) = prop.mention_for_role(&for_role).and_then(|m| st.mentions.get(m)) else {
            continue;
        };
        if !is_org_or_fac(candidate) {
            continue;
        }
        let end = st.parse.node(candidate.node).end_token;
        if end >= last_token {
            result = Some(candidate);
            last_token = end;
        }
    }
    result.filter(|m| followed_by_follow(st, m))
}

/// "ORG's following officers": a noun proposition with an ORG name and a PER
/// descriptor modified by "following".
fn find_following_org_person(st: &SentenceTheory) -> Option<&Mention> {
    for prop in st.propositions.iter().filter(|p| p.pred_type == PredType::Noun) {
        let Some(candidate) = prop.mention_for_role(&UNKNOWN_ROLE).and_then(|m| st.mentions.get(m)) else {
            continue;
        };
        let Some(person) = prop.mention_for_role(&REF_ROLE).and_then(|m| st.mentions.get(m)) else {
            continue;
        };
        if candidate.mention_type != MentionType::Name || candidate.entity_type.name() != "ORG" {
            continue;
        }
        if person.mention_type != MentionType::Desc || !is_per(person) {
            continue;
        }
        let modified = st.propositions.iter().any(|m| {
            m.pred_type == PredType::Modifier
                && m.pred_symbol(&st.parse).map_or(false, |s| s.to_lowercase() == "following")
                && m.ref_mention() == Some(person.index)
        });
        if modified {
            return Some(candidate);
        }
    }
    None
}

fn is_trivial(st: &SentenceTheory) -> bool {
    st.tokens().iter().all(|t| is_punctuation(t.text.as_str()))
}

fn starts_with_dash(st: &SentenceTheory) -> bool {
    st.tokens()
        .word(0)
        .map_or(false, |w| w.as_str().starts_with(['-', '\u{2013}', '\u{2014}']))
}

fn two_tokens(st: &SentenceTheory) -> Option<(&str, &str)> {
    let tokens = st.tokens();
    if tokens.len() != 2 {
        return None;
    }
    Some((tokens.word(0)?.as_str(), tokens.word(1)?.as_str()))
}

/// `A .`, `a .` or `1 .`: the first marker of an enumeration.
fn starts_alphanumeric_list(st: &SentenceTheory) -> bool {
    matches!(two_tokens(st), Some(("a" | "A" | "1", ".")))
}

/// Any `<number> .` or `<letter> .` marker.
fn is_list_item_marker(st: &SentenceTheory) -> bool {
    match two_tokens(st) {
        Some((first, ".")) => {
            first.chars().all(|c| c.is_ascii_digit())
                || (first.chars().count() == 1 && first.chars().all(char::is_alphabetic))
        }
        _ => false,
    }
}

fn contains_list_stopper(st: &SentenceTheory) -> bool {
    st.tokens().iter().any(|t| FOLLOW.is_match(t.text.as_str()))
}

/// Mention covering the first non-punctuation token, descending into the
/// first member of LIST mentions.
fn grab_mention(st: &SentenceTheory) -> Option<&Mention> {
    let first = st.tokens().iter().position(|t| !is_punctuation(t.text.as_str()))?;
    let mut mention = st.mentions.iter().find(|m| {
        let node = st.parse.node(m.node);
        node.start_token <= first && first <= node.end_token
    })?;
    while mention.mention_type == MentionType::List {
        mention = st.mentions.get(*mention.children.first()?)?;
    }
    Some(mention)
}

fn relation_type(arg1: &Mention, arg2: &Mention) -> Option<&'static str> {
    if is_org_or_fac(arg1) && is_org_or_fac(arg2) {
        Some("PART-WHOLE.Subsidiary")
    } else if is_per(arg1) && is_per(arg2) {
        Some("PER-SOC.Business")
    } else if is_per(arg1) && is_org_or_fac(arg2) {
        Some("ORG-AFF.Employment")
    } else {
        None
    }
}

fn push_relation(found: &mut Vec<RelMention>, item: &Mention, arg2: &Mention, sentence: usize, rule: &str) {
    if let Some(rel_type) = relation_type(item, arg2) {
        found.push(RelMention::new(
            item.uid,
            arg2.uid,
            Symbol::new(rel_type),
            sentence,
            1.0,
            ScoreSource::Structural { rule: rule.to_string() },
        ));
    }
}

fn create_structure_based_relations(doc: &DocTheory, arg2: &Mention, start: usize, found: &mut Vec<RelMention>) {
    let sentences = doc.sentences();
    let mut start = start;
    while start < sentences.len() && is_trivial(&sentences[start]) {
        start += 1;
    }
    if start + 1 >= sentences.len() {
        return;
    }
    if starts_alphanumeric_list(&sentences[start]) {
        alphanumeric_list_relations(doc, arg2, start, found);
    } else if starts_with_dash(&sentences[start]) {
        dash_list_relations(doc, arg2, start, found);
    } else if starts_alphanumeric_list(&sentences[start + 1]) {
        alphanumeric_list_relations(doc, arg2, start + 1, found);
    } else if starts_with_dash(&sentences[start + 1]) {
        dash_list_relations(doc, arg2, start + 1, found);
    }
}

fn dash_list_relations(doc: &DocTheory, arg2: &Mention, start: usize, found: &mut Vec<RelMention>) {
    let mut since_last = 0;
    for (i, st) in doc.sentences().iter().enumerate().skip(start) {
        if is_trivial(st) {
            continue;
        }
        let item = if starts_with_dash(st) {
            since_last = 0;
            grab_mention(st)
        } else {
            since_last += 1;
            None
        };
        if since_last > MAX_DASH_GAP || is_list_item_marker(st) || contains_list_stopper(st) {
            return;
        }
        if let Some(item) = item {
            push_relation(found, item, arg2, i, "dash-list");
        }
    }
}

fn alphanumeric_list_relations(doc: &DocTheory, arg2: &Mention, start: usize, found: &mut Vec<RelMention>) {
    let mut item_next = false;
    let mut first_item = true;
    for (i, st) in doc.sentences().iter().enumerate().skip(start) {
        if !first_item && starts_alphanumeric_list(st) {
            return;
        }
        if item_next {
            first_item = false;
            item_next = false;
            if let Some(item) = grab_mention(st) {
                push_relation(found, item, arg2, i, "alphanumeric-list");
            }
        }
        if is_list_item_marker(st) {
            item_next = true;
        }
    }
}
