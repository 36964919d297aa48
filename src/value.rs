//! Value mentions (numbers, dates, crimes, job titles, ...) and document values.

use std::fmt;

use crate::{ResolutionError, ResolutionResult, Symbol};

/// Distinct value mentions a single sentence may hold.
pub const MAX_SENTENCE_VALUES: usize = 50;
/// Distinct document-level value mentions a document may hold.
pub const MAX_DOCUMENT_VALUES: usize = 2000;

/// Value type with an optional subtype, e.g. `TIMEX2` or `Numeric.Money`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueType {
    base: Symbol,
    subtype: Option<Symbol>,
}

impl ValueType {
    pub const TIMEX: &'static str = "TIMEX2";

    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((base, sub)) if !sub.is_empty() => ValueType {
                base: Symbol::new(base),
                subtype: Some(Symbol::new(sub)),
            },
            _ => ValueType {
                base: Symbol::new(text),
                subtype: None,
            },
        }
    }

    pub fn timex() -> Self {
        ValueType::parse(Self::TIMEX)
    }

    pub fn base(&self) -> &Symbol {
        &self.base
    }

    pub fn is_timex(&self) -> bool {
        self.base == Self::TIMEX
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtype {
            Some(sub) => write!(f, "{}.{}", self.base, sub),
            None => write!(f, "{}", self.base),
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Identifier of a value mention.
///
/// Sentence-level ids are capped at [`MAX_SENTENCE_VALUES`] per sentence;
/// document-level ids live in their own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueMentionUid {
    Sentence { sentence: usize, index: usize },
    Document { index: usize },
}

impl ValueMentionUid {
    pub fn sentence_level(sentence: usize, index: usize) -> ResolutionResult<Self> {
        if index >= MAX_SENTENCE_VALUES {
            return Err(ResolutionError::capacity(
                &format!("value mention count in sentence {}", sentence),
                MAX_SENTENCE_VALUES,
            ));
        }
        Ok(ValueMentionUid::Sentence { sentence, index })
    }

    pub fn document_level(index: usize) -> ResolutionResult<Self> {
        if index >= MAX_DOCUMENT_VALUES {
            return Err(ResolutionError::capacity(
                "document-level value mention count",
                MAX_DOCUMENT_VALUES,
            ));
        }
        Ok(ValueMentionUid::Document { index })
    }

    pub fn index(&self) -> usize {
        match self {
            ValueMentionUid::Sentence { index, .. } | ValueMentionUid::Document { index } => *index,
        }
    }

    pub fn is_document_level(&self) -> bool {
        matches!(self, ValueMentionUid::Document { .. })
    }
}

impl fmt::Display for ValueMentionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueMentionUid::Sentence { sentence, index } => write!(f, "v{}.{}", sentence, index),
            ValueMentionUid::Document { index } => write!(f, "vdoc.{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueMention {
    pub uid: ValueMentionUid,
    pub value_type: ValueType,
    /// Sentence holding the tokens, also for document-level mentions.
    pub sentence: usize,
    pub start_token: usize,
    pub end_token: usize,
}

impl ValueMention {
    pub fn covers(&self, token: usize) -> bool {
        self.start_token <= token && token <= self.end_token
    }
}

/// Value mentions of one sentence, or the document-level set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMentionSet {
    scope: Option<usize>,
    mentions: Vec<ValueMention>,
}

impl ValueMentionSet {
    pub fn for_sentence(sentence: usize) -> Self {
        ValueMentionSet {
            scope: Some(sentence),
            mentions: Vec::new(),
        }
    }

    pub fn document() -> Self {
        ValueMentionSet {
            scope: None,
            mentions: Vec::new(),
        }
    }

    pub fn is_document_level(&self) -> bool {
        self.scope.is_none()
    }

    /// Add a value mention; indices are assigned from 0 in insertion order.
    ///
    /// For a sentence-level set, `sentence` must be the set's sentence.
    pub fn add(
        &mut self,
        value_type: ValueType,
        sentence: usize,
        start_token: usize,
        end_token: usize,
    ) -> ResolutionResult<ValueMentionUid> {
        let index = self.mentions.len();
        let uid = match self.scope {
            Some(scope) if scope != sentence => {
                return Err(ResolutionError::inconsistency(format!(
                    "value mention for sentence {} added to the set of sentence {}",
                    sentence, scope
                )))
            }
            Some(scope) => ValueMentionUid::sentence_level(scope, index)?,
            None => ValueMentionUid::document_level(index)?,
        };
        self.mentions.push(ValueMention {
            uid,
            value_type,
            sentence,
            start_token,
            end_token,
        });
        Ok(uid)
    }

    /// Existing mention with the same sentence, type and span.
    pub fn find_same(
        &self,
        value_type: &ValueType,
        sentence: usize,
        start_token: usize,
        end_token: usize,
    ) -> Option<&ValueMention> {
        self.mentions.iter().find(|m| {
            &m.value_type == value_type
                && m.sentence == sentence
                && m.start_token == start_token
                && m.end_token == end_token
        })
    }

    pub fn get(&self, uid: ValueMentionUid) -> Option<&ValueMention> {
        self.mentions.iter().find(|m| m.uid == uid)
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueMention> {
        self.mentions.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

/// Document-level projection of a value mention.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: ValueId,
    pub mention: ValueMentionUid,
    pub value_type: ValueType,
    pub text: String,
    /// Normalized temporal value (`2004-01-05`, `PRESENT_REF`, ...), timex only.
    pub timex_value: Option<String>,
    /// Set-valued expressions such as "every week".
    pub timex_set: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mention: &ValueMention, text: String) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(Value {
            id,
            mention: mention.uid,
            value_type: mention.value_type.clone(),
            text,
            timex_value: None,
            timex_set: false,
        });
        id
    }

    pub fn by_mention(&self, uid: ValueMentionUid) -> Option<&Value> {
        self.values.iter().find(|v| v.mention == uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.values.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
