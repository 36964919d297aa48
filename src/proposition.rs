//! Predicate-argument structures of one sentence.

use std::fmt;

use once_cell::sync::Lazy;

use crate::{Parse, ResolutionError, ResolutionResult, Symbol, SynNodeId};

pub static REF_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<ref>"));
pub static SUB_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<sub>"));
pub static OBJ_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<obj>"));
pub static IOBJ_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<iobj>"));
pub static POSS_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<poss>"));
pub static TEMP_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<temp>"));
pub static LOC_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<loc>"));
pub static MEMBER_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<member>"));
pub static UNKNOWN_ROLE: Lazy<Symbol> = Lazy::new(|| Symbol::new("<unknown>"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredType {
    Verb,
    Copula,
    Modifier,
    Noun,
    Set,
    Comp,
    Name,
    Pronoun,
    Poss,
    Loc,
}

impl PredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredType::Verb => "verb",
            PredType::Copula => "copula",
            PredType::Modifier => "modifier",
            PredType::Noun => "noun",
            PredType::Set => "set",
            PredType::Comp => "comp",
            PredType::Name => "name",
            PredType::Pronoun => "pronoun",
            PredType::Poss => "poss",
            PredType::Loc => "loc",
        }
    }

    /// Types whose `<ref>` argument is the mention they define.
    pub fn is_defining(&self) -> bool {
        matches!(
            self,
            PredType::Noun | PredType::Name | PredType::Pronoun | PredType::Set
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropositionId(pub usize);

impl fmt::Display for PropositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Index into the sentence's mention set.
    Mention(usize),
    Proposition(PropositionId),
    Text(SynNodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub role: Symbol,
    pub value: ArgValue,
}

impl Argument {
    pub fn mention(role: &str, mention: usize) -> Self {
        Argument {
            role: Symbol::new(role),
            value: ArgValue::Mention(mention),
        }
    }

    pub fn proposition(role: &str, prop: PropositionId) -> Self {
        Argument {
            role: Symbol::new(role),
            value: ArgValue::Proposition(prop),
        }
    }

    pub fn text(role: &str, node: SynNodeId) -> Self {
        Argument {
            role: Symbol::new(role),
            value: ArgValue::Text(node),
        }
    }

    pub fn is_ref(&self) -> bool {
        self.role == *REF_ROLE
    }
}

#[derive(Debug, Clone)]
pub struct Proposition {
    pub id: PropositionId,
    pub pred_type: PredType,
    pub pred_head: Option<SynNodeId>,
    pub args: Vec<Argument>,
}

impl Proposition {
    /// Predicate word, taken from the head of the predicate node.
    pub fn pred_symbol(&self, parse: &Parse) -> Option<Symbol> {
        self.pred_head.map(|h| parse.head_word(h))
    }

    pub fn ref_arg(&self) -> Option<&Argument> {
        self.args.iter().find(|a| a.is_ref())
    }

    pub fn ref_mention(&self) -> Option<usize> {
        match self.ref_arg().map(|a| &a.value) {
            Some(ArgValue::Mention(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn mention_for_role(&self, role: &Symbol) -> Option<usize> {
        self.args.iter().find_map(|a| match a.value {
            ArgValue::Mention(m) if &a.role == role => Some(m),
            _ => None,
        })
    }
}

/// Propositions of one sentence plus the mention definitions array.
#[derive(Debug, Clone, Default)]
pub struct PropositionSet {
    props: Vec<Proposition>,
    definitions: Vec<Option<PropositionId>>,
}

impl PropositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        pred_type: PredType,
        pred_head: Option<SynNodeId>,
        args: Vec<Argument>,
    ) -> PropositionId {
        let id = PropositionId(self.props.len());
        self.props.push(Proposition {
            id,
            pred_type,
            pred_head,
            args,
        });
        id
    }

    /// Map each mention to the NOUN/NAME/PRONOUN/SET proposition whose `<ref>`
    /// argument it is. The first defining proposition wins.
    pub fn fill_definitions(&mut self, n_mentions: usize) -> ResolutionResult<()> {
        let mut definitions = vec![None; n_mentions];
        for prop in &self.props {
            for arg in &prop.args {
                match arg.value {
                    ArgValue::Proposition(p) if p.0 >= self.props.len() => {
                        return Err(ResolutionError::inconsistency(format!(
                            "{} references missing proposition {}",
                            prop.id, p
                        )))
                    }
                    ArgValue::Mention(m) if m >= n_mentions => {
                        return Err(ResolutionError::inconsistency(format!(
                            "{} references missing mention {}",
                            prop.id, m
                        )))
                    }
                    _ => {}
                }
            }
            if !prop.pred_type.is_defining() {
                continue;
            }
            if let Some(m) = prop.ref_mention() {
                if definitions[m].is_none() {
                    definitions[m] = Some(prop.id);
                }
            }
        }
        self.definitions = definitions;
        Ok(())
    }

    pub fn get(&self, id: PropositionId) -> Option<&Proposition> {
        self.props.get(id.0)
    }

    pub fn definition(&self, mention: usize) -> Option<&Proposition> {
        self.definitions
            .get(mention)
            .copied()
            .flatten()
            .and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposition> {
        self.props.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_point_at_defining_propositions() {
        let mut props = PropositionSet::new();
        let name = props.add(PredType::Name, None, vec![Argument::mention("<ref>", 0)]);
        let verb = props.add(
            PredType::Verb,
            None,
            vec![Argument::mention("<sub>", 0), Argument::mention("<obj>", 1)],
        );
        props.fill_definitions(2).expect("consistent");
        assert_eq!(props.definition(0).map(|p| p.id), Some(name));
        assert!(props.definition(1).is_none());
        assert_eq!(props.get(verb).and_then(|p| p.mention_for_role(&OBJ_ROLE)), Some(1));
    }

    #[test]
    fn dangling_mention_reference_is_rejected() {
        let mut props = PropositionSet::new();
        props.add(PredType::Verb, None, vec![Argument::mention("<sub>", 3)]);
        assert!(props.fill_definitions(1).is_err());
    }
}
