//! Injected capabilities: classifiers that score feature vectors and
//! per-language word feature heuristics.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::{ResolutionError, ResolutionResult, Symbol};

/// One context predicate: an atomic feature or a pair of atomic features.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextPredicate {
    Atomic(Symbol),
    Pair(Symbol, Symbol),
}

impl ContextPredicate {
    /// Key used for weight lookup: `feature` or `first&second`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContextPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextPredicate::Atomic(s) => write!(f, "{}", s),
            ContextPredicate::Pair(a, b) => write!(f, "{}&{}", a, b),
        }
    }
}

/// Ordered context predicates, truncated at a maximum size.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    predicates: Vec<ContextPredicate>,
    max_size: usize,
}

impl FeatureVector {
    pub fn with_max_size(max_size: usize) -> Self {
        FeatureVector {
            predicates: Vec::new(),
            max_size,
        }
    }

    /// Returns false once the vector is full.
    pub fn push_atomic(&mut self, predicate: impl Into<Symbol>) -> bool {
        self.push(ContextPredicate::Atomic(predicate.into()))
    }

    pub fn push_pair(&mut self, first: Symbol, second: Symbol) -> bool {
        self.push(ContextPredicate::Pair(first, second))
    }

    fn push(&mut self, predicate: ContextPredicate) -> bool {
        if self.predicates.len() >= self.max_size {
            return false;
        }
        self.predicates.push(predicate);
        true
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn atomic(&self) -> impl Iterator<Item = &Symbol> {
        self.predicates.iter().filter_map(|p| match p {
            ContextPredicate::Atomic(s) => Some(s),
            ContextPredicate::Pair(..) => None,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.predicates.iter().any(|p| match p {
            ContextPredicate::Atomic(s) => s == key,
            ContextPredicate::Pair(..) => p.key() == key,
        })
    }

    /// Emit every pair `(p_i, p_j)` with `1 <= i < j` over the atomic
    /// predicates present so far; index 0 is left out of pairing.
    pub fn add_bigrams(&mut self) {
        let atomic: Vec<Symbol> = self.atomic().cloned().collect();
        for i in 1..atomic.len().saturating_sub(1) {
            for j in (i + 1)..atomic.len() {
                if !self.push_pair(atomic[i].clone(), atomic[j].clone()) {
                    return;
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextPredicate> {
        self.predicates.iter()
    }

    pub fn keys(&self) -> Vec<String> {
        self.predicates.iter().map(|p| p.key()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTag {
    pub tag: Symbol,
    pub score: f64,
}

/// Scores a feature vector against a tag set.
///
/// Implementations return probabilities, best first. Ties keep the order of
/// `tags`.
pub trait Classifier {
    fn name(&self) -> &str;

    fn score(&self, features: &FeatureVector, tags: &[Symbol]) -> Vec<ScoredTag>;

    /// Probability of one tag.
    fn probability(&self, features: &FeatureVector, tags: &[Symbol], tag: &str) -> f64 {
        self.score(features, tags)
            .into_iter()
            .find(|t| t.tag == tag)
            .map_or(0.0, |t| t.score)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, features: &FeatureVector, tags: &[Symbol]) -> Vec<ScoredTag> {
        (**self).score(features, tags)
    }
}

/// Log-linear model: per-tag feature weights plus a bias, normalized with
/// softmax over the requested tags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightedScorer {
    #[serde(default = "default_model_name")]
    name: String,
    #[serde(default)]
    bias: HashMap<String, f64>,
    #[serde(default)]
    weights: HashMap<String, HashMap<String, f64>>,
}

fn default_model_name() -> String {
    "weighted".to_string()
}

impl WeightedScorer {
    pub fn new(name: &str) -> Self {
        WeightedScorer {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, tag: &str, feature: &str, weight: f64) -> Self {
        self.weights
            .entry(tag.to_string())
            .or_default()
            .insert(feature.to_string(), weight);
        self
    }

    pub fn with_bias(mut self, tag: &str, bias: f64) -> Self {
        self.bias.insert(tag.to_string(), bias);
        self
    }

    pub fn from_ron_str(text: &str) -> ResolutionResult<Self> {
        ron::from_str(text).map_err(|e| ResolutionError::unexpected_input(format!("model: {}", e)))
    }

    pub fn from_json_str(text: &str) -> ResolutionResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ResolutionError::unexpected_input(format!("model: {}", e)))
    }

    /// Load a `.json` or `.ron` model file.
    pub fn from_path(path: impl AsRef<Path>) -> ResolutionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ResolutionError::load(path, e))?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text).map_err(|e| ResolutionError::load(path, e)),
            _ => ron::from_str(&text).map_err(|e| ResolutionError::load(path, e)),
        }?;
        log::info!("loaded scorer model from {}", path.display());
        Ok(parsed)
    }

    fn raw_score(&self, features: &FeatureVector, tag: &str) -> f64 {
        let bias = self.bias.get(tag).copied().unwrap_or(0.0);
        match self.weights.get(tag) {
            Some(weights) => {
                bias + features
                    .iter()
                    .filter_map(|p| weights.get(&p.key()))
                    .sum::<f64>()
            }
            None => bias,
        }
    }
}

impl Classifier for WeightedScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, features: &FeatureVector, tags: &[Symbol]) -> Vec<ScoredTag> {
        if tags.is_empty() {
            return Vec::new();
        }
        let raw: Vec<f64> = tags.iter().map(|t| self.raw_score(features, t.as_str())).collect();
        let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = raw.iter().map(|r| (r - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        let mut scored: Vec<ScoredTag> = tags
            .iter()
            .zip(exp)
            .map(|(tag, e)| ScoredTag {
                tag: tag.clone(),
                score: e / total,
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Singular,
    Plural,
    Unknown,
}

/// Per-language word heuristics.
pub trait WordFeatureProvider {
    fn gender(&self, word: &Symbol) -> Gender;
    fn number(&self, word: &Symbol) -> Number;
    fn is_numeric(&self, word: &Symbol) -> bool;
    fn is_relative_pronoun(&self, word: &Symbol) -> bool;

    /// Coarse orthographic shape: `Xx`, `X`, `x`, `d`, `p` or `mixed`.
    fn word_shape(&self, word: &Symbol) -> Symbol {
        let text = word.as_str();
        let shape = match text.chars().next() {
            None => "empty",
            Some(c) if text.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') && c.is_ascii_digit() => "d",
            Some(_) if text.chars().all(|c| !c.is_alphanumeric()) => "p",
            Some(c) if c.is_uppercase() && text.chars().skip(1).all(|c| c.is_lowercase()) => "Xx",
            Some(_) if text.chars().all(|c| !c.is_alphabetic() || c.is_uppercase()) => "X",
            Some(_) if text.chars().all(|c| !c.is_alphabetic() || c.is_lowercase()) => "x",
            Some(_) => "mixed",
        };
        Symbol::new(shape)
    }
}

static ENGLISH_PRONOUNS: Lazy<HashMap<&'static str, (Gender, Number)>> = Lazy::new(|| {
    use Gender::{Feminine, Masculine, Neuter};
    use Number::{Plural, Singular};
    [
        ("he", (Masculine, Singular)),
        ("him", (Masculine, Singular)),
        ("his", (Masculine, Singular)),
        ("himself", (Masculine, Singular)),
        ("she", (Feminine, Singular)),
        ("her", (Feminine, Singular)),
        ("hers", (Feminine, Singular)),
        ("herself", (Feminine, Singular)),
        ("it", (Neuter, Singular)),
        ("its", (Neuter, Singular)),
        ("itself", (Neuter, Singular)),
        ("there", (Neuter, Number::Unknown)),
        ("here", (Neuter, Number::Unknown)),
        ("they", (Gender::Unknown, Plural)),
        ("them", (Gender::Unknown, Plural)),
        ("their", (Gender::Unknown, Plural)),
        ("themselves", (Gender::Unknown, Plural)),
        ("we", (Gender::Unknown, Plural)),
        ("us", (Gender::Unknown, Plural)),
        ("our", (Gender::Unknown, Plural)),
        ("i", (Gender::Unknown, Singular)),
        ("me", (Gender::Unknown, Singular)),
        ("my", (Gender::Unknown, Singular)),
        ("you", (Gender::Unknown, Number::Unknown)),
        ("your", (Gender::Unknown, Number::Unknown)),
    ]
    .into_iter()
    .collect()
});

static ENGLISH_FIRST_NAMES: Lazy<HashMap<&'static str, Gender>> = Lazy::new(|| {
    let masculine = ["john", "james", "robert", "michael", "william", "david", "richard", "thomas", "george", "peter"];
    let feminine = ["mary", "patricia", "jennifer", "linda", "elizabeth", "susan", "margaret", "sarah", "anna", "laura"];
    masculine
        .iter()
        .map(|n| (*n, Gender::Masculine))
        .chain(feminine.iter().map(|n| (*n, Gender::Feminine)))
        .collect()
});

/// English word heuristics backed by small lexicons.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishWordFeatures;

impl EnglishWordFeatures {
    pub fn is_pronoun(&self, word: &Symbol) -> bool {
        ENGLISH_PRONOUNS.contains_key(word.to_lowercase().as_str())
    }
}

impl WordFeatureProvider for EnglishWordFeatures {
    fn gender(&self, word: &Symbol) -> Gender {
        let lower = word.to_lowercase();
        if let Some((gender, _)) = ENGLISH_PRONOUNS.get(lower.as_str()) {
            return *gender;
        }
        ENGLISH_FIRST_NAMES
            .get(lower.as_str())
            .copied()
            .unwrap_or(Gender::Unknown)
    }

    fn number(&self, word: &Symbol) -> Number {
        let lower = word.to_lowercase();
        if let Some((_, number)) = ENGLISH_PRONOUNS.get(lower.as_str()) {
            return *number;
        }
        if lower.as_str().ends_with("ss") || lower.as_str().len() < 4 {
            Number::Unknown
        } else if lower.as_str().ends_with('s') {
            Number::Plural
        } else {
            Number::Singular
        }
    }

    fn is_numeric(&self, word: &Symbol) -> bool {
        let text = word.as_str();
        !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
            && text.chars().any(|c| c.is_ascii_digit())
    }

    fn is_relative_pronoun(&self, word: &Symbol) -> bool {
        matches!(word.to_lowercase().as_str(), "that" | "which" | "who" | "whom" | "whose")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigrams_skip_the_first_predicate() {
        let mut fv = FeatureVector::with_max_size(100);
        for p in ["PER", "a", "b", "c"] {
            fv.push_atomic(p);
        }
        fv.add_bigrams();
        let pairs: Vec<String> = fv.keys().into_iter().skip(4).collect();
        assert_eq!(pairs, vec!["a&b", "a&c", "b&c"]);
    }

    #[test]
    fn feature_vector_respects_max_size() {
        let mut fv = FeatureVector::with_max_size(2);
        assert!(fv.push_atomic("a"));
        assert!(fv.push_atomic("b"));
        assert!(!fv.push_atomic("c"));
        assert_eq!(fv.len(), 2);
    }

    #[test]
    fn weighted_scorer_prefers_weighted_tag() {
        let scorer = WeightedScorer::new("test")
            .with_weight("LINK", "HeadWordMatch", 2.0)
            .with_bias("NO_LINK", 0.5);
        let mut fv = FeatureVector::with_max_size(10);
        fv.push_atomic("HeadWordMatch");
        let tags = [Symbol::new("LINK"), Symbol::new("NO_LINK")];
        let scored = scorer.score(&fv, &tags);
        assert_eq!(scored[0].tag, "LINK");
        let total: f64 = scored.iter().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scorer_loads_from_ron_and_json() {
        let ron_model = r#"(name: "desc", bias: {"LINK": -1.0}, weights: {"LINK": {"D0": 3.0}})"#;
        let from_ron = WeightedScorer::from_ron_str(ron_model).expect("ron model");
        assert_eq!(from_ron.name(), "desc");

        let json_model = r#"{"weights": {"LINK": {"D0": 3.0}}}"#;
        let from_json = WeightedScorer::from_json_str(json_model).expect("json model");
        assert_eq!(from_json.name(), "weighted");

        assert!(WeightedScorer::from_ron_str("(weights: [").is_err());
    }

    #[test]
    fn english_word_features() {
        let words = EnglishWordFeatures;
        assert_eq!(words.gender(&Symbol::new("He")), Gender::Masculine);
        assert_eq!(words.gender(&Symbol::new("Mary")), Gender::Feminine);
        assert_eq!(words.number(&Symbol::new("they")), Number::Plural);
        assert!(words.is_numeric(&Symbol::new("1,200")));
        assert!(!words.is_numeric(&Symbol::new(",")));
        assert_eq!(words.word_shape(&Symbol::new("Paris")), "Xx");
        assert_eq!(words.word_shape(&Symbol::new("45")), "d");
    }
}
