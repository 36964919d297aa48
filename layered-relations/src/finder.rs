//! The relation pass of a document.
//!
//! ```text
//! Init ──> SentencePass ──> DocPass ──> Promotion ──> Done
//!           per sentence:    structural finder if active,
//!           classify         else zoned finder + event patterns
//!           time arguments   (+ list expansion)
//!           family types
//!           list expansion
//! ```
//!
//! The phases run in this order only; calling one out of turn is an error.

use layered_proptree::PropTreeLinks;
use layered_resolution::{
    Classifier, DocTheory, ForestOptions, RelMentionSet, RelationOptions, ResolutionError,
    ResolutionResult,
};
use layered_values::TemporalAttacher;

use crate::{
    deduplicate_document_relations, expand_relations_in_list_mentions, DisabledZonedRelationFinder,
    EnglishStructuralRelationFinder, EventRelationPatterns, FamilyRelationFixer, RelationObservation,
    SentenceRelationFinder, StructuralRelationFinder, ZonedRelationFinder,
};

pub const RELATION_VALIDATION_PARAM: &str = "relation_validation_str";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationPhase {
    Init,
    SentencePass,
    DocPass,
    Promotion,
    Done,
}

/// Counts from one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationReport {
    pub sentence_relations: usize,
    pub time_attached: usize,
    pub family_fixed: usize,
    pub expanded: usize,
    pub structural_relations: usize,
    pub pattern_relations: usize,
    pub document_relations: usize,
    pub dropped: usize,
}

pub struct DocumentRelationFinder<C> {
    sentence_finder: SentenceRelationFinder<C>,
    forest: ForestOptions,
    time_attacher: Option<TemporalAttacher<Box<dyn Classifier>>>,
    attach_times: bool,
    family: Option<FamilyRelationFixer>,
    expand_lists: bool,
    patterns: Option<(EventRelationPatterns, String)>,
    structural: Box<dyn StructuralRelationFinder>,
    zoned: Option<Box<dyn ZonedRelationFinder>>,
    phase: RelationPhase,
    report: RelationReport,
}

impl<C: Classifier> DocumentRelationFinder<C> {
    /// Sentence classification only.
    pub fn new(sentence_finder: SentenceRelationFinder<C>) -> Self {
        DocumentRelationFinder {
            sentence_finder,
            forest: ForestOptions {
                resolve_pronouns: true,
                include_modifiers: true,
            },
            time_attacher: None,
            attach_times: false,
            family: None,
            expand_lists: false,
            patterns: None,
            structural: Box::new(EnglishStructuralRelationFinder::new(false)),
            zoned: None,
            phase: RelationPhase::Init,
            report: RelationReport::default(),
        }
    }

    /// Configure the passes from `[relations]`. The event pattern file is read
    /// here; a malformed file or a missing `relation_validation_str` fails.
    pub fn from_options(sentence_finder: SentenceRelationFinder<C>, options: &RelationOptions) -> ResolutionResult<Self> {
        let mut finder = Self::new(sentence_finder);
        finder.attach_times = options.do_relation_time_attachment;
        finder.expand_lists = options.expand_relations_in_list_mentions;
        if options.do_specific_family_relations {
            finder.family = Some(FamilyRelationFixer::new());
        }
        finder.structural = Box::new(EnglishStructuralRelationFinder::new(options.find_structural_relations));
        if options.use_zoned_relation_finder {
            finder.zoned = Some(Box::new(DisabledZonedRelationFinder));
        }
        if let Some(path) = &options.event_relation_patterns {
            let validation = options
                .relation_validation_str
                .as_deref()
                .ok_or_else(|| ResolutionError::missing_parameter(RELATION_VALIDATION_PARAM))?;
            finder = finder.with_patterns(EventRelationPatterns::from_path(path)?, validation)?;
        }
        Ok(finder)
    }

    pub fn with_patterns(mut self, patterns: EventRelationPatterns, validation: &str) -> ResolutionResult<Self> {
        // reject a bad table now rather than at the first document
        RelationObservation::new(validation)?;
        self.patterns = Some((patterns, validation.to_string()));
        Ok(self)
    }

    /// Turns relation time attachment on with this attacher.
    pub fn with_time_attacher(mut self, attacher: TemporalAttacher<Box<dyn Classifier>>) -> Self {
        self.time_attacher = Some(attacher);
        self.attach_times = true;
        self
    }

    pub fn with_family_relations(mut self) -> Self {
        self.family = Some(FamilyRelationFixer::new());
        self
    }

    pub fn with_list_expansion(mut self) -> Self {
        self.expand_lists = true;
        self
    }

    pub fn with_structural_finder(mut self, finder: Box<dyn StructuralRelationFinder>) -> Self {
        self.structural = finder;
        self
    }

    pub fn with_zoned_finder(mut self, finder: Box<dyn ZonedRelationFinder>) -> Self {
        self.zoned = Some(finder);
        self
    }

    pub fn with_forest_options(mut self, forest: ForestOptions) -> Self {
        self.forest = forest;
        self
    }

    pub fn phase(&self) -> RelationPhase {
        self.phase
    }

    fn expect_phase(&self, expected: RelationPhase, step: &str) -> ResolutionResult<()> {
        if self.phase != expected {
            return Err(ResolutionError::inconsistency(format!(
                "{} called in phase {:?}, expected {:?}",
                step, self.phase, expected
            )));
        }
        Ok(())
    }

    /// Run every phase on `doc`.
    pub fn process(&mut self, doc: &mut DocTheory) -> ResolutionResult<RelationReport> {
        self.phase = RelationPhase::Init;
        self.find_sentence_level_relations(doc)?;
        self.find_doc_level_relations(doc)?;
        self.promote(doc)?;
        log::info!(
            "{}: {} sentence relations, {} document relations, {} dropped",
            doc.name,
            self.report.sentence_relations,
            self.report.document_relations,
            self.report.dropped
        );
        Ok(self.report)
    }

    /// Replace every sentence's relation set.
    pub fn find_sentence_level_relations(&mut self, doc: &mut DocTheory) -> ResolutionResult<()> {
        self.expect_phase(RelationPhase::Init, "sentence pass")?;
        if self.attach_times && self.time_attacher.is_none() {
            return Err(ResolutionError::missing_parameter("relation time attachment classifier"));
        }
        self.phase = RelationPhase::SentencePass;
        self.report = RelationReport::default();
        for sentence in 0..doc.n_sentences() {
            let set = {
                let links = PropTreeLinks::new(sentence, doc, &self.forest)?;
                self.sentence_finder.find(doc, sentence, Some(&links))?
            };
            self.report.sentence_relations += set.len();
            if let Some(st) = doc.sentence_mut(sentence) {
                st.relations = set;
            }
            if let Some(attacher) = self.time_attacher.as_ref().filter(|_| self.attach_times) {
                self.report.time_attached += attacher.attach_sentence(doc, sentence)?;
            }
            let mut set = match doc.sentence_mut(sentence) {
                Some(st) => std::mem::replace(&mut st.relations, RelMentionSet::for_sentence(sentence)),
                None => continue,
            };
            if let Some(family) = &self.family {
                self.report.family_fixed += family.fix(doc, &mut set);
            }
            if self.expand_lists {
                self.report.expanded += expand_relations_in_list_mentions(doc, &mut set)?;
            }
            if let Some(st) = doc.sentence_mut(sentence) {
                st.relations = set;
            }
        }
        Ok(())
    }

    /// Replace the document relation set. An active structural finder is the
    /// only source when present; otherwise the zoned finder and the event
    /// patterns contribute.
    pub fn find_doc_level_relations(&mut self, doc: &mut DocTheory) -> ResolutionResult<()> {
        self.expect_phase(RelationPhase::SentencePass, "document pass")?;
        self.phase = RelationPhase::DocPass;
        if doc.n_sentences() == 0 {
            doc.relations = RelMentionSet::document(0);
            return Ok(());
        }
        if self.structural.is_active() {
            let set = self.structural.find_relations(doc)?;
            self.report.structural_relations = set.len();
            doc.relations = set;
            return Ok(());
        }
        let mut set = match &self.zoned {
            Some(zoned) => zoned.find_relations(doc)?,
            None => RelMentionSet::document(doc.n_sentences()),
        };
        let Some((patterns, validation)) = &self.patterns else {
            doc.relations = set;
            return Ok(());
        };
        let mut observation = RelationObservation::new(validation)?;
        for relation in patterns.find_relations(doc, &mut observation) {
            set.add(relation)?;
            self.report.pattern_relations += 1;
        }
        if self.expand_lists {
            self.report.expanded += expand_relations_in_list_mentions(doc, &mut set)?;
        }
        doc.relations = set;
        Ok(())
    }

    /// Drop document relations that repeat sentence relations.
    pub fn promote(&mut self, doc: &mut DocTheory) -> ResolutionResult<()> {
        self.expect_phase(RelationPhase::DocPass, "promotion")?;
        self.phase = RelationPhase::Promotion;
        self.report.dropped = deduplicate_document_relations(doc)?;
        self.report.document_relations = doc.relations.len();
        self.phase = RelationPhase::Done;
        Ok(())
    }
}
