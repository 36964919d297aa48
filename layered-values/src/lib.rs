#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Values for layered-resolution documents.
//!
//! - [`EventValueRecognizer`] - proposes `Crime`, `Sentence` and `Job-Title` values for
//!   Justice and Personnel events ([`DeprecatedEventValueRecognizer`],
//!   [`PatternEventValueRecognizer`])
//! - [`promote_values`] - document [`Value`](layered_resolution::Value)s for every value mention
//! - [`TemporalNormalizer`] - TIMEX2 values relative to the document date
//! - [`TemporalAttacher`] - time arguments and temporal attributes on relations, scored by an
//!   injected [`Classifier`](layered_resolution::Classifier)
//!
//! ```ignore
//! let resolver = ValueResolver::from_options(&config.values)?;
//! let report = resolver.resolve(&mut doc)?;
//! ```

mod attach;
mod matching;
mod promote;
mod recognizer;
mod resolver;
mod timex;

pub use attach::{TemporalAttacher, TemporalCandidate, DEFAULT_KINDS, NONE_TAG};
pub use promote::promote_values;
pub use recognizer::{
    create_event_values, is_crime_word, is_job_title, recognizer_for, DeprecatedEventValueRecognizer,
    EventValueRecognizer, PatternEventValueRecognizer, ValueProposal, CRIME, JOB_TITLE, PERSON_ROLE,
    POSITION_ROLE, SENTENCE, TRIGGER_ROLE,
};
pub use resolver::{ValueReport, ValueResolver};
pub use timex::{
    is_specific_date, normalize_timex_values, TemporalNormalizer, Timex, FUTURE_REF, PAST_REF, PRESENT_REF,
};

#[cfg(test)]
mod tests {
    mod values;
}
