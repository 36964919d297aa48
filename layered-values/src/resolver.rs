//! The value pass of a document.
//!
//! ```text
//! create_event_values ──> promote_values ──> normalize_timex_values
//!  (deprecated | pattern)   (doc Values)       (TIMEX2 against doc date)
//! ```

use layered_resolution::{DocTheory, Language, ResolutionResult, ValueOptions};

use crate::{create_event_values, normalize_timex_values, promote_values, recognizer_for, EventValueRecognizer};

/// Counts from one [`ValueResolver::resolve`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueReport {
    pub created: usize,
    pub promoted: usize,
    pub normalized: usize,
}

#[derive(Default)]
pub struct ValueResolver {
    recognizer: Option<Box<dyn EventValueRecognizer>>,
}

impl ValueResolver {
    /// No event value engine; promotion and normalization only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &ValueOptions) -> ResolutionResult<Self> {
        Ok(ValueResolver {
            recognizer: recognizer_for(options)?,
        })
    }

    pub fn with_recognizer(mut self, recognizer: Box<dyn EventValueRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn resolve(&self, doc: &mut DocTheory) -> ResolutionResult<ValueReport> {
        let mut report = ValueReport::default();
        match &self.recognizer {
            // the event value lexicons and patterns are English
            Some(recognizer) if doc.language == Language::English => {
                report.created = create_event_values(doc, recognizer.as_ref())?;
            }
            Some(recognizer) => {
                log::debug!("{} recognizer skipped for non-English {}", recognizer.name(), doc.name);
            }
            None => {}
        }
        report.promoted = promote_values(doc);
        report.normalized = normalize_timex_values(doc);
        log::info!(
            "{}: {} event values, {} promoted, {} timex normalized",
            doc.name,
            report.created,
            report.promoted,
            report.normalized
        );
        Ok(report)
    }
}
