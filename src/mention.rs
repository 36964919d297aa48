//! Mentions and their types.

use std::fmt;

use crate::{Parse, ResolutionError, ResolutionResult, Symbol, SynNodeId};

/// Upper bound on mentions per sentence; also the stride of [`MentionUid`].
pub const MAX_SENTENCE_MENTIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionType {
    Name,
    Desc,
    Pron,
    /// Coordinated mention whose children are the members.
    List,
    None,
}

impl MentionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentionType::Name => "NAME",
            MentionType::Desc => "DESC",
            MentionType::Pron => "PRON",
            MentionType::List => "LIST",
            MentionType::None => "NONE",
        }
    }
}

/// Entity type with an optional subtype, e.g. `GPE.Nation`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType {
    base: Symbol,
    subtype: Option<Symbol>,
}

impl EntityType {
    pub const UNDETERMINED: &'static str = "UNDET";

    pub fn new(base: &str) -> Self {
        EntityType {
            base: Symbol::new(base),
            subtype: None,
        }
    }

    pub fn with_subtype(base: &str, subtype: &str) -> Self {
        EntityType {
            base: Symbol::new(base),
            subtype: Some(Symbol::new(subtype)),
        }
    }

    /// Parse `PER` or `GPE.Nation`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((base, sub)) if !sub.is_empty() => EntityType::with_subtype(base, sub),
            _ => EntityType::new(text.trim_end_matches('.')),
        }
    }

    pub fn undetermined() -> Self {
        EntityType::new(Self::UNDETERMINED)
    }

    pub fn name(&self) -> &Symbol {
        &self.base
    }

    pub fn subtype(&self) -> Option<&Symbol> {
        self.subtype.as_ref()
    }

    pub fn is_determined(&self) -> bool {
        self.base != Self::UNDETERMINED
    }

    /// Same base type and the subtypes agree or one side leaves it open.
    pub fn subsumes(&self, other: &EntityType) -> bool {
        if !self.is_determined() {
            return true;
        }
        self.base == other.base
            && match (&self.subtype, &other.subtype) {
                (None, _) => true,
                (Some(a), Some(b)) => a == b,
                (Some(_), None) => false,
            }
    }

    pub fn is_compatible(&self, other: &EntityType) -> bool {
        self.subsumes(other) || other.subsumes(self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtype {
            Some(sub) => write!(f, "{}.{}", self.base, sub),
            None => write!(f, "{}", self.base),
        }
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Document-unique mention identifier encoding `(sentence, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionUid(pub usize);

impl MentionUid {
    pub fn new(sentence: usize, index: usize) -> ResolutionResult<Self> {
        if index >= MAX_SENTENCE_MENTIONS {
            return Err(ResolutionError::capacity(
                &format!("mention count in sentence {}", sentence),
                MAX_SENTENCE_MENTIONS,
            ));
        }
        Ok(MentionUid(sentence * MAX_SENTENCE_MENTIONS + index))
    }

    pub fn sentence(&self) -> usize {
        self.0 / MAX_SENTENCE_MENTIONS
    }

    pub fn index(&self) -> usize {
        self.0 % MAX_SENTENCE_MENTIONS
    }
}

impl fmt::Display for MentionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}.{}", self.sentence(), self.index())
    }
}

#[derive(Debug, Clone)]
pub struct Mention {
    pub uid: MentionUid,
    pub sentence: usize,
    pub index: usize,
    pub node: SynNodeId,
    pub mention_type: MentionType,
    pub entity_type: EntityType,
    /// The LIST mention this one is a member of.
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl Mention {
    pub fn is_list(&self) -> bool {
        self.mention_type == MentionType::List
    }

    pub fn head_word(&self, parse: &Parse) -> Symbol {
        parse.head_word(self.node)
    }

    pub fn text(&self, parse: &Parse) -> String {
        parse.text(self.node)
    }
}

/// Mentions of one sentence, indexed by position.
#[derive(Debug, Clone, Default)]
pub struct MentionSet {
    sentence: usize,
    mentions: Vec<Mention>,
}

impl MentionSet {
    pub fn new(sentence: usize) -> Self {
        MentionSet {
            sentence,
            mentions: Vec::new(),
        }
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn add(
        &mut self,
        node: SynNodeId,
        mention_type: MentionType,
        entity_type: EntityType,
    ) -> ResolutionResult<usize> {
        let index = self.mentions.len();
        let uid = MentionUid::new(self.sentence, index)?;
        self.mentions.push(Mention {
            uid,
            sentence: self.sentence,
            index,
            node,
            mention_type,
            entity_type,
            parent: None,
            children: Vec::new(),
        });
        Ok(index)
    }

    /// Attach members to a LIST mention.
    pub fn set_list_members(&mut self, list: usize, members: &[usize]) -> ResolutionResult<()> {
        let in_range = |i: usize| i < self.mentions.len();
        if !in_range(list) || !members.iter().all(|&m| in_range(m) && m != list) {
            return Err(ResolutionError::inconsistency(format!(
                "list mention {} references a mention outside sentence {}",
                list, self.sentence
            )));
        }
        if self.mentions[list].mention_type != MentionType::List {
            return Err(ResolutionError::unexpected_input(format!(
                "mention {} in sentence {} is not a LIST mention",
                list, self.sentence
            )));
        }
        for &m in members {
            self.mentions[m].parent = Some(list);
        }
        self.mentions[list].children = members.to_vec();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Mention> {
        self.mentions.get(index)
    }

    pub fn by_uid(&self, uid: MentionUid) -> Option<&Mention> {
        if uid.sentence() != self.sentence {
            return None;
        }
        self.mentions.get(uid.index())
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mention> {
        self.mentions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_compatibility() {
        let gpe = EntityType::new("GPE");
        let nation = EntityType::parse("GPE.Nation");
        let city = EntityType::parse("GPE.Population-Center");
        assert!(gpe.is_compatible(&nation));
        assert!(!nation.is_compatible(&city));
        assert!(!gpe.is_compatible(&EntityType::new("PER")));
        assert!(EntityType::undetermined().is_compatible(&city));
        assert_eq!(nation.to_string(), "GPE.Nation");
    }

    #[test]
    fn uid_encodes_sentence_and_index() {
        let uid = MentionUid::new(3, 7).expect("in range");
        assert_eq!((uid.sentence(), uid.index()), (3, 7));
        assert!(MentionUid::new(0, MAX_SENTENCE_MENTIONS).is_err());
    }
}
