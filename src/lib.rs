#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Document theory for entity, relation and value resolution.
//!
//! Upstream stages produce one [`SentenceTheory`] per sentence (tokens, parse,
//! mentions, propositions, values, events). The resolution crates built on
//! this one read those theories and fill in the document-level sets:
//!
//! ```text
//! SentenceTheory ─┬─> layered-proptree  (proposition forests, node links)
//!                 ├─> layered-coref     (EntitySet)
//!                 ├─> layered-relations (sentence + document RelMentionSet)
//!                 └─> layered-values    (document ValueMentionSet, timex values)
//! ```
//!
//! Statistical models stay outside: passes receive a [`Classifier`] and score
//! the [`FeatureVector`]s they build with it.

mod builder;
mod capability;
mod config;
mod display;
mod entity;
mod error;
mod event;
mod mention;
mod parse;
mod proposition;
mod relation;
mod scored;
mod symbol;
mod theory;
mod tokens;
mod value;

pub use builder::{DocBuilder, SentenceBuilder};
pub use capability::{
    Classifier, ContextPredicate, EnglishWordFeatures, FeatureVector, Gender, Number, ScoredTag,
    WeightedScorer, WordFeatureProvider,
};
pub use config::{
    CorefOptions, EventValueEngine, ForestOptions, RelationOptions, ResolutionConfig,
    TemporalAttachmentMode, ValueOptions,
};
pub use display::SentenceDisplay;
pub use entity::{Entity, EntityId, EntitySet};
pub use error::{ResolutionError, ResolutionResult};
pub use event::{EventMention, EventMentionSet};
pub use mention::{EntityType, Mention, MentionSet, MentionType, MentionUid, MAX_SENTENCE_MENTIONS};
pub use parse::{Ancestors, Parse, SynNode, SynNodeId};
pub use proposition::{
    ArgValue, Argument, PredType, Proposition, PropositionId, PropositionSet, IOBJ_ROLE, LOC_ROLE,
    MEMBER_ROLE, OBJ_ROLE, POSS_ROLE, REF_ROLE, SUB_ROLE, TEMP_ROLE, UNKNOWN_ROLE,
};
pub use relation::{
    Modality, RelMention, RelMentionSet, RelMentionUid, Tense, TemporalAttribute, TimeArgument,
    MAX_DOCUMENT_RELATIONS, MAX_SENTENCE_RELATIONS,
};
pub use scored::{ScoreSource, Scored};
pub use symbol::Symbol;
pub use theory::{DocTheory, Language, SentenceTheory};
pub use tokens::{Token, TokenSequence};
pub use value::{
    Value, ValueId, ValueMention, ValueMentionSet, ValueMentionUid, ValueSet, ValueType,
    MAX_DOCUMENT_VALUES, MAX_SENTENCE_VALUES,
};
