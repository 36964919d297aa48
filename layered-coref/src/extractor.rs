use layered_proptree::PropTreeLinks;
use layered_resolution::{
    DocTheory, EnglishWordFeatures, Entity, FeatureVector, Language, Mention, MentionType,
    WordFeatureProvider,
};

use crate::link_functions::{entity_mentions, link_functions_for, LinkFeatureFunctions};
use crate::pronoun::add_pronoun_link_features;

/// Builds the context a [`Classifier`](layered_resolution::Classifier) scores
/// for one `(mention, entity)` pairing.
///
/// Extraction reads the document and never mutates it, so repeated calls
/// with the same inputs give the same vector.
pub struct CandidateFeatureExtractor {
    functions: Box<dyn LinkFeatureFunctions>,
    words: Option<Box<dyn WordFeatureProvider>>,
    max_size: usize,
}

impl CandidateFeatureExtractor {
    pub fn for_language(language: Language) -> Self {
        let words: Option<Box<dyn WordFeatureProvider>> = match language {
            Language::English => Some(Box::new(EnglishWordFeatures)),
            Language::Other => None,
        };
        CandidateFeatureExtractor {
            functions: link_functions_for(language),
            words,
            max_size: 500,
        }
    }

    pub fn with_functions(mut self, functions: Box<dyn LinkFeatureFunctions>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_words(mut self, words: Box<dyn WordFeatureProvider>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn functions(&self) -> &dyn LinkFeatureFunctions {
        self.functions.as_ref()
    }

    /// Atomic predicates followed by their pairs. `links`, when it covers the
    /// mention's sentence, adds the proposition path to same-sentence
    /// antecedents of a pronoun.
    pub fn get_event_context(
        &self,
        doc: &DocTheory,
        mention: &Mention,
        entity: &Entity,
        links: Option<&PropTreeLinks>,
    ) -> FeatureVector {
        let mut fv = FeatureVector::with_max_size(self.max_size);
        match mention.mention_type {
            MentionType::Pron => {
                add_pronoun_link_features(doc, self.words.as_deref(), links, mention, entity, &mut fv)
            }
            _ => {
                self.functions.add_link_features(doc, mention, entity, &mut fv);
                if mention.mention_type == MentionType::Name && name_match(doc, mention, entity) {
                    fv.push_atomic("name-match");
                }
            }
        }
        fv.add_bigrams();
        fv
    }
}

/// Case-insensitive full-text match against a NAME mention of the entity.
fn name_match(doc: &DocTheory, mention: &Mention, entity: &Entity) -> bool {
    let Some(text) = doc.mention_text(mention.uid) else {
        return false;
    };
    let text = text.to_lowercase();
    entity_mentions(doc, entity)
        .filter(|(m, _)| m.mention_type == MentionType::Name)
        .any(|(m, p)| m.text(p).to_lowercase() == text)
}
