use layered_resolution::{DocTheory, RelMentionSet, ResolutionResult};

/// Relation finder over document zones (headers, bylines, tables).
pub trait ZonedRelationFinder {
    fn find_relations(&self, doc: &DocTheory) -> ResolutionResult<RelMentionSet>;
}

/// Finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledZonedRelationFinder;

impl ZonedRelationFinder for DisabledZonedRelationFinder {
    fn find_relations(&self, doc: &DocTheory) -> ResolutionResult<RelMentionSet> {
        Ok(RelMentionSet::document(doc.n_sentences()))
    }
}
