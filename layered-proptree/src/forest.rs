//! Sentence forests.
//!
//! A [`PropForest`] orders its trees by `(sentence, head proposition, seq)`,
//! where `seq` is the insertion counter of the forest. Iteration order is
//! therefore the same on every run.

use std::collections::BTreeMap;

use layered_resolution::{
    DocTheory, ForestOptions, MentionUid, PredType, PropositionId, ResolutionError,
    ResolutionResult,
};

use crate::{PropTree, TreeArena};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeKey {
    pub sentence: usize,
    pub head_prop: PropositionId,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct PropForest {
    trees: BTreeMap<TreeKey, PropTree>,
    next_seq: u64,
}

impl PropForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tree: PropTree) -> TreeKey {
        let key = TreeKey {
            sentence: tree.sentence,
            head_prop: tree.head_prop,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.trees.insert(key, tree);
        key
    }

    pub fn get(&self, key: &TreeKey) -> Option<&PropTree> {
        self.trees.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreeKey, &PropTree)> {
        self.trees.iter()
    }

    pub fn trees(&self) -> impl Iterator<Item = &PropTree> {
        self.trees.values()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Forget every tree. Their nodes stay in the arena until it is cleared.
    pub fn clear(&mut self) {
        self.trees.clear();
    }
}

/// Which trees [`populate_prop_forest`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForestTarget {
    /// Exactly the tree rooted at this proposition.
    Proposition(PropositionId),
    /// Trees rooted at the defining propositions of every mention of this
    /// mention's entity (or of the mention alone when it has no entity).
    Mention(MentionUid),
    /// Every non-modifier proposition of the sentence, keeping only trees no
    /// other kept tree contains.
    All,
}

/// Build trees for `target` into `forest` and apply the tree transforms
/// enabled in `options`. Returns the number of trees inserted.
pub fn populate_prop_forest(
    arena: &mut TreeArena,
    doc: &DocTheory,
    sentence: usize,
    target: ForestTarget,
    forest: &mut PropForest,
    options: &ForestOptions,
) -> ResolutionResult<usize> {
    let st = doc.sentence(sentence).ok_or_else(|| {
        ResolutionError::unexpected_input(format!(
            "sentence {} out of range ({} sentences)",
            sentence,
            doc.n_sentences()
        ))
    })?;

    let trees: Vec<PropTree> = match target {
        ForestTarget::Proposition(prop) => {
            if st.propositions.get(prop).is_none() {
                return Err(ResolutionError::unexpected_input(format!(
                    "no proposition {} in sentence {}",
                    prop, sentence
                )));
            }
            PropTree::build(arena, doc, sentence, prop).into_iter().collect()
        }
        ForestTarget::Mention(uid) => {
            let members = match doc.entities.entity_by_mention(uid) {
                Some(entity) => entity.mentions.clone(),
                None => vec![uid],
            };
            members
                .into_iter()
                .filter_map(|m| {
                    let def = doc.sentence(m.sentence())?.propositions.definition(m.index())?;
                    PropTree::build(arena, doc, m.sentence(), def.id)
                })
                .collect()
        }
        ForestTarget::All => {
            let mut candidates: Vec<PropTree> = st
                .propositions
                .iter()
                .filter(|p| p.pred_type != PredType::Modifier)
                .filter_map(|p| PropTree::build(arena, doc, sentence, p.id))
                .collect();
            // largest first; stable, so equal sizes keep proposition order
            candidates.sort_by_key(|t| std::cmp::Reverse(t.size(arena)));
            let mut kept: Vec<PropTree> = Vec::new();
            for tree in candidates {
                if !kept.iter().any(|k| k.contains(&tree, arena)) {
                    kept.push(tree);
                }
            }
            kept
        }
    };

    let count = trees.len();
    for tree in trees {
        if options.resolve_pronouns {
            tree.resolve_pronouns(arena, doc);
        }
        if options.include_modifiers {
            tree.include_modifiers(arena, doc);
        }
        forest.insert(tree);
    }
    log::debug!("built {} tree(s) for sentence {} ({:?})", count, sentence, target);
    Ok(count)
}
