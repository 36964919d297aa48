use std::collections::BTreeSet;

use layered_resolution::{DocTheory, MentionUid, PropositionId, Symbol, SynNodeId};

use crate::NodeId;

/// What a tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeContent {
    Proposition { sentence: usize, prop: PropositionId },
    Mention { sentence: usize, mention: usize },
    /// A bare syntactic node: an unresolved text argument or a resolved
    /// pronoun's antecedent.
    Syn { sentence: usize, node: SynNodeId },
}

impl NodeContent {
    pub fn sentence(&self) -> usize {
        match *self {
            NodeContent::Proposition { sentence, .. }
            | NodeContent::Mention { sentence, .. }
            | NodeContent::Syn { sentence, .. } => sentence,
        }
    }

    pub fn proposition(&self) -> Option<PropositionId> {
        match *self {
            NodeContent::Proposition { prop, .. } => Some(prop),
            _ => None,
        }
    }

    /// Short text for dumps and dictionaries: the predicate word for
    /// propositions (the defined mention's head when there is no predicate
    /// node), the head word for mentions, the covered text otherwise.
    pub fn text(&self, doc: &DocTheory) -> String {
        let Some(st) = doc.sentence(self.sentence()) else {
            return String::new();
        };
        match *self {
            NodeContent::Proposition { prop, .. } => st
                .propositions
                .get(prop)
                .map(|p| {
                    let word = p.pred_symbol(&st.parse).or_else(|| {
                        let m = st.mentions.get(p.ref_mention()?)?;
                        Some(m.head_word(&st.parse))
                    });
                    match word {
                        Some(word) => word.to_string(),
                        None => format!("<{}>", p.pred_type.as_str()),
                    }
                })
                .unwrap_or_default(),
            NodeContent::Mention { mention, .. } => st
                .mentions
                .get(mention)
                .map(|m| m.head_word(&st.parse).to_string())
                .unwrap_or_default(),
            NodeContent::Syn { node, .. } => st.parse.text(node),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub content: NodeContent,
    /// Role under the parent; empty for roots.
    pub role: Symbol,
    pub parent: Option<NodeId>,
    /// Ordered by role, then by insertion.
    pub children: Vec<NodeId>,
    pub mentions: BTreeSet<MentionUid>,
    /// Nodes in this subtree, including this one.
    pub size: usize,
    /// Pronoun mention this node replaced.
    pub resolved_from: Option<MentionUid>,
}

impl TreeNode {
    pub fn new(content: NodeContent, parent: Option<NodeId>, role: impl Into<Symbol>) -> Self {
        TreeNode {
            content,
            role: role.into(),
            parent,
            children: Vec::new(),
            mentions: BTreeSet::new(),
            size: 1,
            resolved_from: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
