//! Event-relation patterns.
//!
//! A pattern file holds one s-expression: a list of four-atom lists
//!
//! ```text
//! ((Conflict.Attack Attacker Target AttackOn)
//!  (Personnel.Start-Position Person Entity ORG-AFF.Employment))
//! ```
//!
//! read as `(event type, first role, second role, relation type)`. An event
//! mention of that type with both roles filled yields a relation from the
//! first role's mention to the second's.

use std::path::Path;

use layered_resolution::{DocTheory, RelMention, ResolutionError, ResolutionResult, ScoreSource, Symbol};

use crate::sexp::{parse_sexp, Sexp};
use crate::RelationObservation;

pub const EVENT_RELATION_PATTERNS_PARAM: &str = "event_relation_patterns";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRelationPattern {
    pub event_type: Symbol,
    pub first_role: Symbol,
    pub second_role: Symbol,
    pub relation_type: Symbol,
}

impl EventRelationPattern {
    /// `eventType/firstRole/secondRole`, the provenance of derived relations.
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.event_type, self.first_role, self.second_role)
    }

    fn from_sexp(sexp: &Sexp) -> Option<Self> {
        match sexp.children() {
            [event_type, first_role, second_role, relation_type] if sexp.is_list() => Some(EventRelationPattern {
                event_type: Symbol::new(event_type.atom()?),
                first_role: Symbol::new(first_role.atom()?),
                second_role: Symbol::new(second_role.atom()?),
                relation_type: Symbol::new(relation_type.atom()?),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRelationPatterns {
    patterns: Vec<EventRelationPattern>,
}

impl EventRelationPatterns {
    pub fn new(patterns: Vec<EventRelationPattern>) -> Self {
        EventRelationPatterns { patterns }
    }

    /// Parse a pattern file's contents. Anything other than a list of
    /// four-atom lists is rejected.
    pub fn from_sexp_str(text: &str) -> ResolutionResult<Self> {
        let ill_formed = |detail: String| {
            ResolutionError::unexpected_input(format!(
                "ill-formed event relation pattern file ({}), specified by parameter '{}'",
                detail, EVENT_RELATION_PATTERNS_PARAM
            ))
        };
        let sexp = parse_sexp(text).map_err(|e| ill_formed(e.to_string()))?;
        if !sexp.is_list() {
            return Err(ill_formed("top level is not a list".to_string()));
        }
        let patterns = sexp
            .children()
            .iter()
            .map(|child| {
                EventRelationPattern::from_sexp(child)
                    .ok_or_else(|| ill_formed(format!("`{}` is not a list of four atoms", child)))
            })
            .collect::<ResolutionResult<Vec<_>>>()?;
        Ok(EventRelationPatterns { patterns })
    }

    pub fn from_path(path: impl AsRef<Path>) -> ResolutionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ResolutionError::load(path, e))?;
        let patterns = Self::from_sexp_str(&text)?;
        log::info!("loaded {} event relation patterns from {}", patterns.len(), path.display());
        Ok(patterns)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRelationPattern> {
        self.patterns.iter()
    }

    /// Relations implied by the event mentions of `doc`.
    ///
    /// A relation is skipped when its type is invalid for the two mentions,
    /// or when the same unordered mention pair is already related in the
    /// sentence or by an earlier pattern match.
    pub fn find_relations(&self, doc: &DocTheory, observation: &mut RelationObservation) -> Vec<RelMention> {
        let mut found: Vec<RelMention> = Vec::new();
        for st in doc.sentences() {
            for event in st.events.iter() {
                for pattern in self.patterns.iter().filter(|p| p.event_type == event.event_type) {
                    let Some(left) = event.first_mention_for_role(&pattern.first_role) else {
                        continue;
                    };
                    let Some(right) = event.first_mention_for_role(&pattern.second_role) else {
                        continue;
                    };
                    let (Some(left_mention), Some(right_mention)) = (doc.mention(left), doc.mention(right)) else {
                        log::warn!(
                            "{} in sentence {} points at a missing mention, skipped",
                            event.event_type,
                            st.index
                        );
                        continue;
                    };
                    observation.populate(left_mention, right_mention);
                    if !observation.is_valid_tag(&pattern.relation_type) {
                        continue;
                    }
                    if st.relations.has_pair(left, right) || found.iter().any(|r| r.same_pair(left, right)) {
                        continue;
                    }
                    found.push(RelMention::new(
                        left,
                        right,
                        pattern.relation_type.clone(),
                        doc.n_sentences(),
                        1.0,
                        ScoreSource::Pattern { pattern: pattern.key() },
                    ));
                }
            }
        }
        log::debug!("{} relations from event patterns in {}", found.len(), doc.name);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_atom_lists() {
        let patterns = EventRelationPatterns::from_sexp_str(
            "((Conflict.Attack Attacker Target AttackOn)\n (Justice.Arrest-Jail Agent Person Arrested))",
        )
        .expect("patterns");
        assert_eq!(patterns.len(), 2);
        let first = patterns.iter().next().expect("first");
        assert_eq!(first.key(), "Conflict.Attack/Attacker/Target");
        assert_eq!(first.relation_type, "AttackOn");
    }

    #[test]
    fn wrong_arity_is_fatal() {
        let err = EventRelationPatterns::from_sexp_str("((Conflict.Attack Attacker Target))").unwrap_err();
        assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));
        assert!(err.to_string().contains(EVENT_RELATION_PATTERNS_PARAM));
    }

    #[test]
    fn nested_lists_are_not_atoms() {
        assert!(EventRelationPatterns::from_sexp_str("((Attack (Attacker) Target AttackOn))").is_err());
        assert!(EventRelationPatterns::from_sexp_str("Attack").is_err());
    }

    #[test]
    fn empty_list_has_no_patterns() {
        assert!(EventRelationPatterns::from_sexp_str("()").expect("empty").is_empty());
    }
}
