//! Assemble a [`DocTheory`] from bracketed parses and span annotations.
//!
//! Upstream stages (tokenizer, parser, mention finder) hand their output over
//! through this builder; tests use it to write small documents by hand.

use chrono::NaiveDate;

use crate::{
    Argument, DocTheory, EventMention, Language, MentionType, EntityType, Parse, PredType,
    PropositionId, ResolutionError, ResolutionResult, SentenceTheory, SynNodeId, ValueMentionUid,
    ValueType,
};

pub struct DocBuilder {
    doc: DocTheory,
}

impl DocBuilder {
    pub fn new(name: &str, language: Language) -> Self {
        DocBuilder {
            doc: DocTheory::new(name, language),
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.doc.date = Some(date);
        self
    }

    /// Append a sentence parsed from a bracketed tree.
    pub fn sentence(&mut self, tree: &str) -> ResolutionResult<SentenceBuilder<'_>> {
        let parse = Parse::from_bracketed(tree)?;
        let index = self.doc.n_sentences();
        self.doc.push_sentence(SentenceTheory::new(index, parse));
        let sentence = self
            .doc
            .sentence_mut(index)
            .ok_or_else(|| ResolutionError::inconsistency("sentence vanished after push"))?;
        Ok(SentenceBuilder { sentence })
    }

    /// Finish: fills the proposition definitions of every sentence.
    pub fn build(mut self) -> ResolutionResult<DocTheory> {
        for sentence in self.doc.sentences_mut() {
            let n_mentions = sentence.mentions.len();
            sentence.propositions.fill_definitions(n_mentions)?;
        }
        Ok(self.doc)
    }
}

pub struct SentenceBuilder<'a> {
    sentence: &'a mut SentenceTheory,
}

impl<'a> SentenceBuilder<'a> {
    pub fn index(&self) -> usize {
        self.sentence.index
    }

    /// First token with this exact text.
    pub fn token(&self, word: &str) -> ResolutionResult<usize> {
        self.sentence
            .tokens()
            .iter()
            .position(|t| t.text == word)
            .ok_or_else(|| ResolutionError::unexpected_input(format!("no token `{}` in sentence", word)))
    }

    /// Add a mention over the inclusive token span.
    pub fn mention(
        &mut self,
        start: usize,
        end: usize,
        mention_type: MentionType,
        entity_type: &str,
    ) -> ResolutionResult<usize> {
        let node = self.sentence.parse.node_for_span(start, end).ok_or_else(|| {
            ResolutionError::unexpected_input(format!(
                "no constituent covers tokens {}..={} in sentence {}",
                start, end, self.sentence.index
            ))
        })?;
        let index = self
            .sentence
            .mentions
            .add(node, mention_type, EntityType::parse(entity_type))?;
        self.sentence.parse.set_mention(node, index);
        Ok(index)
    }

    /// Add a LIST mention and attach its members.
    pub fn list(
        &mut self,
        start: usize,
        end: usize,
        entity_type: &str,
        members: &[usize],
    ) -> ResolutionResult<usize> {
        let list = self.mention(start, end, MentionType::List, entity_type)?;
        self.sentence.mentions.set_list_members(list, members)?;
        Ok(list)
    }

    /// Add a proposition whose predicate is the word at `head_token`.
    pub fn prop(
        &mut self,
        pred_type: PredType,
        head_token: Option<usize>,
        args: Vec<Argument>,
    ) -> ResolutionResult<PropositionId> {
        let pred_head = match head_token {
            Some(token) => Some(self.preterminal(token)?),
            None => None,
        };
        Ok(self.sentence.propositions.add(pred_type, pred_head, args))
    }

    /// Syntactic node over the span, for text arguments.
    pub fn node(&self, start: usize, end: usize) -> ResolutionResult<SynNodeId> {
        if start == end {
            return self.preterminal(start);
        }
        self.sentence.parse.node_for_span(start, end).ok_or_else(|| {
            ResolutionError::unexpected_input(format!("no constituent covers tokens {}..={}", start, end))
        })
    }

    pub fn value(&mut self, start: usize, end: usize, value_type: &str) -> ResolutionResult<ValueMentionUid> {
        let sentence = self.sentence.index;
        self.sentence
            .values
            .add(ValueType::parse(value_type), sentence, start, end)
    }

    pub fn event(&mut self, event: EventMention) {
        self.sentence.events.push(event);
    }

    pub fn mention_uid(&self, index: usize) -> ResolutionResult<crate::MentionUid> {
        self.sentence
            .mentions
            .get(index)
            .map(|m| m.uid)
            .ok_or_else(|| ResolutionError::inconsistency(format!("no mention {}", index)))
    }

    fn preterminal(&self, token: usize) -> ResolutionResult<SynNodeId> {
        let parse = &self.sentence.parse;
        parse
            .nodes()
            .find(|n| n.start_token == token && n.end_token == token && parse.is_preterminal(n.id))
            .map(|n| n.id)
            .ok_or_else(|| ResolutionError::unexpected_input(format!("no preterminal at token {}", token)))
    }
}
