#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Relation finding and consolidation for layered-resolution documents.
//!
//! - [`SentenceRelationFinder`] - classifies mention pairs within a sentence
//! - [`FamilyRelationFixer`] - specific `PER-SOC.Family` subtypes
//! - [`expand_relations_in_list_mentions`] - copies relations across LIST members
//! - [`EventRelationPatterns`] - relations implied by event mention roles
//! - [`StructuralRelationFinder`] / [`ZonedRelationFinder`] - document-level finders
//! - [`DocumentRelationFinder`] - runs the passes in order
//! - [`RelationView`] - sentence and document relations as one deduplicated set
//!
//! ```ignore
//! let options = ResolutionConfig::from_path("resolution.toml")?;
//! let sentence = SentenceRelationFinder::new(WeightedScorer::from_path("models/relations.ron")?, &RELATION_TYPES);
//! let mut finder = DocumentRelationFinder::from_options(sentence, &options.relations)?;
//! let report = finder.process(&mut doc)?;
//! ```

mod expansion;
mod family;
pub mod features;
mod finder;
mod observation;
mod patterns;
mod sentence;
pub mod sexp;
mod structural;
mod view;
mod zoned;

pub use expansion::expand_relations_in_list_mentions;
pub use family::{kinship_kind, FamilyRelationFixer, FAMILY_RELATION};
pub use finder::{DocumentRelationFinder, RelationPhase, RelationReport, RELATION_VALIDATION_PARAM};
pub use observation::{
    RelationObservation, ValidationTable, VALIDATION_2005, VALIDATION_2005_ORDERED, VALIDATION_NONE,
};
pub use patterns::{EventRelationPattern, EventRelationPatterns, EVENT_RELATION_PATTERNS_PARAM};
pub use sentence::{SentenceRelationFinder, DEFAULT_RELATION_THRESHOLD, NONE_RELATION};
pub use structural::{EnglishStructuralRelationFinder, StructuralRelationFinder};
pub use view::{deduplicate_document_relations, RelationView};
pub use zoned::{DisabledZonedRelationFinder, ZonedRelationFinder};

#[cfg(test)]
mod tests {
    mod consolidation;
}
