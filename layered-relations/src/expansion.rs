//! Copy relations across the members of coordinated LIST mentions.
//!
//! For `R(Smith, [Acme and Globex])` found on `Acme`, the other member of the
//! same type yields `R(Smith, Globex)`. Relations whose arguments have the
//! same entity type are never expanded, since the side a member would take is
//! ambiguous.
//!
//! A synthesized relation is dropped when an existing relation already has
//! the substituted mention, or a mention of its entity, on the same side, or
//! when the exact pair exists. Running the expansion again adds nothing.

use layered_resolution::{DocTheory, Mention, MentionUid, RelMention, RelMentionSet, ResolutionResult, ScoreSource};

/// Expand the relations present when called; returns how many were added.
pub fn expand_relations_in_list_mentions(doc: &DocTheory, set: &mut RelMentionSet) -> ResolutionResult<usize> {
    let original = set.len();
    let mut added = 0;
    for index in 0..original {
        let Some(relation) = set.get(index).cloned() else {
            continue;
        };
        let (Some(left), Some(right)) = (doc.mention(relation.left), doc.mention(relation.right)) else {
            continue;
        };
        if left.entity_type == right.entity_type {
            continue;
        }
        added += expand_relation(doc, set, &relation, left, right)?;
        added += expand_relation(doc, set, &relation, right, left)?;
    }
    if added > 0 {
        log::debug!("{} relations added by list expansion", added);
    }
    Ok(added)
}

fn expand_relation(
    doc: &DocTheory,
    set: &mut RelMentionSet,
    relation: &RelMention,
    list_member: &Mention,
    other: &Mention,
) -> ResolutionResult<usize> {
    let Some(st) = doc.sentence(list_member.sentence) else {
        return Ok(0);
    };
    let Some(list) = list_member
        .parent
        .and_then(|p| st.mentions.get(p))
        .filter(|p| p.is_list())
    else {
        return Ok(0);
    };
    let other_is_left = other.uid == relation.left;
    let mut added = 0;
    for child in list.children.iter().filter_map(|&c| st.mentions.get(c)) {
        if child.uid == list_member.uid {
            continue;
        }
        // (left, right, whether the substituted mention is on the left)
        let (left, right, expanded_left) = if child.entity_type == list_member.entity_type {
            if other_is_left {
                (other.uid, child.uid, false)
            } else {
                (child.uid, other.uid, true)
            }
        } else if child.entity_type == other.entity_type {
            if other_is_left {
                (child.uid, list_member.uid, true)
            } else {
                (list_member.uid, child.uid, false)
            }
        } else {
            continue;
        };

        if is_covered(doc, set, left, right, expanded_left) {
            log::trace!("list expansion {} -> {} dropped", left, right);
            continue;
        }
        let mut expanded = RelMention::new(
            left,
            right,
            relation.rel_type.clone(),
            relation.sentence,
            relation.score,
            ScoreSource::ListExpansion,
        );
        expanded.tense = relation.tense;
        expanded.modality = relation.modality;
        expanded.time_arg = relation.time_arg.clone();
        expanded.temporal_attributes = relation.temporal_attributes.clone();
        set.add(expanded)?;
        added += 1;
    }
    Ok(added)
}

fn is_covered(doc: &DocTheory, set: &RelMentionSet, left: MentionUid, right: MentionUid, expanded_left: bool) -> bool {
    let same_entity = |a: MentionUid, b: MentionUid| {
        match (doc.entities.entity_by_mention(a), doc.entities.entity_by_mention(b)) {
            (Some(x), Some(y)) => x.id == y.id,
            _ => false,
        }
    };
    set.iter().any(|extant| {
        let same_side = if expanded_left {
            extant.left == left || same_entity(extant.left, left)
        } else {
            extant.right == right || same_entity(extant.right, right)
        };
        same_side || (extant.left == left && extant.right == right)
    })
}
