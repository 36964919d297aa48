//! Sentence and document containers the resolution passes read and fill.

use chrono::NaiveDate;

use crate::{
    EntitySet, EventMentionSet, Mention, MentionSet, MentionUid, Parse, PropositionSet,
    RelMentionSet, Symbol, TokenSequence, ValueMention, ValueMentionSet, ValueMentionUid, ValueSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Other,
}

/// Everything known about one sentence.
#[derive(Debug, Clone)]
pub struct SentenceTheory {
    pub index: usize,
    pub parse: Parse,
    pub mentions: MentionSet,
    pub propositions: PropositionSet,
    pub values: ValueMentionSet,
    pub relations: RelMentionSet,
    pub events: EventMentionSet,
}

impl SentenceTheory {
    pub fn new(index: usize, parse: Parse) -> Self {
        SentenceTheory {
            index,
            parse,
            mentions: MentionSet::new(index),
            propositions: PropositionSet::new(),
            values: ValueMentionSet::for_sentence(index),
            relations: RelMentionSet::for_sentence(index),
            events: EventMentionSet::new(),
        }
    }

    pub fn tokens(&self) -> &TokenSequence {
        self.parse.tokens()
    }
}

/// A document: its sentences plus the document-level sets.
#[derive(Debug, Clone)]
pub struct DocTheory {
    pub name: String,
    pub language: Language,
    /// Reference date for relative temporal expressions.
    pub date: Option<NaiveDate>,
    sentences: Vec<SentenceTheory>,
    pub entities: EntitySet,
    pub relations: RelMentionSet,
    pub values: ValueMentionSet,
    pub value_set: ValueSet,
}

impl DocTheory {
    pub fn new(name: &str, language: Language) -> Self {
        DocTheory {
            name: name.to_string(),
            language,
            date: None,
            sentences: Vec::new(),
            entities: EntitySet::new(),
            relations: RelMentionSet::document(0),
            values: ValueMentionSet::document(),
            value_set: ValueSet::new(),
        }
    }

    pub fn push_sentence(&mut self, sentence: SentenceTheory) {
        self.sentences.push(sentence);
        if self.relations.is_empty() {
            self.relations = RelMentionSet::document(self.sentences.len());
        }
    }

    pub fn n_sentences(&self) -> usize {
        self.sentences.len()
    }

    pub fn sentence(&self, index: usize) -> Option<&SentenceTheory> {
        self.sentences.get(index)
    }

    pub fn sentence_mut(&mut self, index: usize) -> Option<&mut SentenceTheory> {
        self.sentences.get_mut(index)
    }

    pub fn sentences(&self) -> &[SentenceTheory] {
        &self.sentences
    }

    pub fn sentences_mut(&mut self) -> &mut [SentenceTheory] {
        &mut self.sentences
    }

    pub fn mention(&self, uid: MentionUid) -> Option<&Mention> {
        self.sentence(uid.sentence())?.mentions.by_uid(uid)
    }

    pub fn parse_of(&self, uid: MentionUid) -> Option<&Parse> {
        self.sentence(uid.sentence()).map(|s| &s.parse)
    }

    pub fn mention_head_word(&self, uid: MentionUid) -> Option<Symbol> {
        let mention = self.mention(uid)?;
        Some(mention.head_word(self.parse_of(uid)?))
    }

    pub fn mention_text(&self, uid: MentionUid) -> Option<String> {
        let mention = self.mention(uid)?;
        Some(mention.text(self.parse_of(uid)?))
    }

    /// Look a value mention up in its sentence set or the document set.
    pub fn value_mention(&self, uid: ValueMentionUid) -> Option<&ValueMention> {
        match uid {
            ValueMentionUid::Sentence { sentence, .. } => self.sentence(sentence)?.values.get(uid),
            ValueMentionUid::Document { .. } => self.values.get(uid),
        }
    }

    pub fn value_text(&self, uid: ValueMentionUid) -> Option<String> {
        let vm = self.value_mention(uid)?;
        let st = self.sentence(vm.sentence)?;
        Some(st.tokens().text(vm.start_token, vm.end_token))
    }
}
