//! One logical relation set over the sentence and document relations.

use layered_resolution::{DocTheory, RelMention, RelMentionSet, ResolutionResult};

/// Whether `candidate` repeats a relation in `seen`: same type and the same
/// two mentions in either order.
fn repeats<'a>(mut seen: impl Iterator<Item = &'a RelMention>, candidate: &RelMention) -> bool {
    seen.any(|r| r.rel_type == candidate.rel_type && r.same_pair(candidate.left, candidate.right))
}

/// Sentence relations in sentence order, then the document relations that do
/// not repeat one of them.
#[derive(Debug)]
pub struct RelationView<'a> {
    relations: Vec<&'a RelMention>,
    dropped: usize,
}

impl<'a> RelationView<'a> {
    pub fn new(doc: &'a DocTheory) -> Self {
        let mut relations: Vec<&'a RelMention> = doc.sentences().iter().flat_map(|st| st.relations.iter()).collect();
        let mut dropped = 0;
        for relation in doc.relations.iter() {
            if repeats(relations.iter().copied(), relation) {
                dropped += 1;
            } else {
                relations.push(relation);
            }
        }
        RelationView { relations, dropped }
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Document relations left out as repeats.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RelMention> + '_ {
        self.relations.iter().copied()
    }

    pub fn of_type<'b>(&'b self, rel_type: &'b str) -> impl Iterator<Item = &'a RelMention> + 'b {
        self.iter().filter(move |r| r.rel_type == rel_type)
    }
}

/// Drop document relations that repeat a sentence relation or an earlier
/// document relation. Returns how many were dropped.
pub fn deduplicate_document_relations(doc: &mut DocTheory) -> ResolutionResult<usize> {
    let mut kept = RelMentionSet::document(doc.n_sentences());
    let mut dropped = 0;
    for relation in doc.relations.iter() {
        let in_sentences = doc.sentences().iter().any(|st| repeats(st.relations.iter(), relation));
        if in_sentences || repeats(kept.iter(), relation) {
            log::debug!("document relation {} {} repeats an earlier one", relation.uid, relation.rel_type);
            dropped += 1;
            continue;
        }
        kept.add(relation.clone())?;
    }
    doc.relations = kept;
    Ok(dropped)
}
