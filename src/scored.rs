//! `Scored<T>` for resolution outcomes that carry a probability and provenance.
//!
//! Every linked mention, relation and temporal attachment remembers where it
//! came from via [`ScoreSource`]:
//! - a classifier decision
//! - an event-relation pattern
//! - a structural (document layout) rule
//! - expansion across a list mention
//! - a hand-written rule or a combination of other scores

use std::fmt;

/// A value with an associated score in `0.0..=1.0`.
///
/// # Example
/// ```
/// use layered_resolution::{Scored, ScoreSource};
///
/// let link = Scored::classifier("LINK", 0.82, "desc-link");
/// assert!(!link.is_certain());
///
/// let rel = Scored::pattern("AttackOn", "Attack/Attacker/Target");
/// assert!(rel.is_certain());
/// assert!(matches!(rel.source, ScoreSource::Pattern { .. }));
/// ```
#[derive(Clone)]
pub struct Scored<T> {
    pub value: T,
    pub confidence: f64,
    pub source: ScoreSource,
}

/// Where a score came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreSource {
    /// Probability assigned by an injected classifier
    Classifier {
        /// Name of the model that scored the features
        model: String,
    },
    /// Synthesized from an event-relation pattern
    Pattern {
        /// `eventType/firstRole/secondRole`
        pattern: String,
    },
    /// Found by a structural document-layout rule
    Structural {
        rule: String,
    },
    /// Copied across a coordinated list mention
    ListExpansion,
    /// Hand-written rule
    RuleBased {
        rule_name: String,
    },
    /// Derived from combining other scores
    Derived,
}

impl<T> Scored<T> {
    pub fn new(value: T, confidence: f64, source: ScoreSource) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    pub fn classifier(value: T, confidence: f64, model: &str) -> Self {
        Self::new(
            value,
            confidence,
            ScoreSource::Classifier {
                model: model.to_string(),
            },
        )
    }

    /// Pattern-derived values are certain.
    pub fn pattern(value: T, pattern: &str) -> Self {
        Self::new(
            value,
            1.0,
            ScoreSource::Pattern {
                pattern: pattern.to_string(),
            },
        )
    }

    pub fn structural(value: T, confidence: f64, rule: &str) -> Self {
        Self::new(
            value,
            confidence,
            ScoreSource::Structural {
                rule: rule.to_string(),
            },
        )
    }

    pub fn rule_based(value: T, confidence: f64, rule_name: &str) -> Self {
        Self::new(
            value,
            confidence,
            ScoreSource::RuleBased {
                rule_name: rule_name.to_string(),
            },
        )
    }

    pub fn derived(value: T, confidence: f64) -> Self {
        Self::new(value, confidence, ScoreSource::Derived)
    }

    pub fn is_certain(&self) -> bool {
        (self.confidence - 1.0).abs() < f64::EPSILON
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Scored<U> {
        Scored {
            value: f(self.value),
            confidence: self.confidence,
            source: self.source,
        }
    }

    pub fn as_ref(&self) -> Scored<&T> {
        Scored {
            value: &self.value,
            confidence: self.confidence,
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Scored<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Compact format for snapshot tests: Scored(value, conf: 0.85)
        write!(f, "Scored({:?}, conf: {:.2})", self.value, self.confidence)
    }
}

impl<T: PartialEq> PartialEq for Scored<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && (self.confidence - other.confidence).abs() < f64::EPSILON
            && self.source == other.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Scored::classifier("x", 1.5, "m").confidence, 1.0);
        assert_eq!(Scored::classifier("x", -0.5, "m").confidence, 0.0);
    }

    #[test]
    fn map_keeps_provenance() {
        let mapped = Scored::structural(7, 0.9, "dash-list").map(|x| x * 2);
        assert_eq!(mapped.value, 14);
        assert_eq!(
            mapped.source,
            ScoreSource::Structural {
                rule: "dash-list".into()
            }
        );
    }

    #[test]
    fn debug_format() {
        let scored = Scored::classifier("LINK", 0.85, "desc-link");
        assert_eq!(format!("{:?}", scored), r#"Scored("LINK", conf: 0.85)"#);
    }
}
