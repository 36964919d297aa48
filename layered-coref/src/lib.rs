#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Entity linking for layered-resolution documents.
//!
//! - [`CandidateFeatureExtractor`] - context predicates for a `(mention, entity)` pairing
//! - [`LinkFeatureFunctions`] - per-language NAME/DESC features ([`EnglishLinkFunctions`],
//!   [`GenericLinkFunctions`])
//! - [`EntityConsistencyResolver`] - attaches mentions to entities with an injected
//!   [`Classifier`](layered_resolution::Classifier)
//!
//! ```ignore
//! let scorer = WeightedScorer::from_path("models/desc-link.ron")?;
//! let resolver = EntityConsistencyResolver::new(scorer, CandidateFeatureExtractor::for_language(doc.language));
//! let decisions = resolver.resolve(&mut doc)?;
//! ```

mod extractor;
pub mod features;
mod link_functions;
mod pronoun;
mod resolver;

pub use extractor::CandidateFeatureExtractor;
pub use link_functions::{link_functions_for, EnglishLinkFunctions, GenericLinkFunctions, LinkFeatureFunctions};
pub use resolver::{EntityConsistencyResolver, LinkOutcome, LINK_TAG, NO_LINK_TAG};

#[cfg(test)]
mod tests {
    mod linking;
}
