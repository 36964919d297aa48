//! Shortest node chains between mention-bearing tree nodes of one sentence.
//!
//! The link graph joins tree edges with "same mention" bridges between nodes
//! of different trees, so two mentions connect when some chain of arguments
//! leads from one to the other:
//!
//! ```text
//!        p2 visited
//!       /          \
//!  <sub> p0        <obj> p1        chain m0.0 -> m0.1:
//!   Smith           Paris            [p0, p2, p1], top = 1, distance = 2
//!                                    role path: <sub>^[visited]v<obj>
//! ```
//!
//! One [`PropTreeLinks`] owns its arena and forest. Node ids are only unique
//! within it, so it must not be shared between sentences.

use std::collections::{BTreeSet, HashMap};

use pathfinding::prelude::bfs;

use layered_resolution::{
    DocTheory, EntityType, ForestOptions, MentionType, MentionUid, PredType, ResolutionResult,
    Symbol,
};

use crate::{populate_prop_forest, ForestTarget, NodeContent, NodeId, PropForest, TraversalOrder, TreeArena};

/// Chains longer than this count as unconnected.
pub const MAX_LINK_DISTANCE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TneKind {
    Proposition(PredType),
    Mention(MentionType),
    Syn,
}

/// Description of one tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct TneElement {
    pub kind: TneKind,
    pub entity_type: Option<EntityType>,
    pub role: Symbol,
    pub text: String,
    /// Number of children.
    pub arity: usize,
    pub depth: usize,
    pub tree: usize,
}

#[derive(Debug, Default)]
pub struct TneDictionary {
    elements: HashMap<NodeId, TneElement>,
}

impl TneDictionary {
    pub fn get(&self, id: NodeId) -> Option<&TneElement> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNodeChain {
    pub nodes: Vec<NodeId>,
    /// Index in `nodes` of the shallowest node; the first one on ties.
    pub top: usize,
    pub distance: usize,
}

impl TreeNodeChain {
    fn from_path(nodes: Vec<NodeId>, dictionary: &TneDictionary) -> Self {
        let depth = |id: &NodeId| dictionary.get(*id).map_or(usize::MAX, |e| e.depth);
        let mut top = 0;
        for (i, id) in nodes.iter().enumerate() {
            if depth(id) < depth(&nodes[top]) {
                top = i;
            }
        }
        TreeNodeChain {
            distance: nodes.len().saturating_sub(1),
            nodes,
            top,
        }
    }

    fn reversed(&self, dictionary: &TneDictionary) -> Self {
        let mut nodes = self.nodes.clone();
        nodes.reverse();
        TreeNodeChain::from_path(nodes, dictionary)
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

#[derive(Debug)]
pub struct PropTreeLinks {
    sentence: usize,
    arena: TreeArena,
    forest: PropForest,
    dictionary: TneDictionary,
    /// Mention-bearing nodes in forest traversal order.
    positions: Vec<NodeId>,
    position_mentions: Vec<BTreeSet<MentionUid>>,
    neighbors: HashMap<NodeId, Vec<(NodeId, Step)>>,
    links: HashMap<(usize, usize), TreeNodeChain>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
    Bridge,
}

impl PropTreeLinks {
    pub fn new(sentence: usize, doc: &DocTheory, options: &ForestOptions) -> ResolutionResult<Self> {
        let mut arena = TreeArena::new();
        let mut forest = PropForest::new();
        populate_prop_forest(&mut arena, doc, sentence, ForestTarget::All, &mut forest, options)?;

        let mut links = PropTreeLinks {
            sentence,
            arena,
            forest,
            dictionary: TneDictionary::default(),
            positions: Vec::new(),
            position_mentions: Vec::new(),
            neighbors: HashMap::new(),
            links: HashMap::new(),
        };
        links.index_nodes(doc);
        links.connect_positions();
        log::debug!(
            "sentence {}: {} tree(s), {} position(s), {} link(s)",
            sentence,
            links.forest.len(),
            links.positions.len(),
            links.links.len() / 2
        );
        Ok(links)
    }

    fn index_nodes(&mut self, doc: &DocTheory) {
        let mut by_mention: HashMap<MentionUid, Vec<(NodeId, usize)>> = HashMap::new();
        for (tree_index, tree) in self.forest.trees().enumerate() {
            for id in tree.traverse(&self.arena, TraversalOrder::HeadLeftRight) {
                let Some(node) = self.arena.get(id) else { continue };
                let depth = match node.parent.and_then(|p| self.dictionary.get(p)) {
                    Some(parent) => parent.depth + 1,
                    None => 0,
                };
                let kind = match node.content {
                    NodeContent::Proposition { sentence, prop } => TneKind::Proposition(
                        doc.sentence(sentence)
                            .and_then(|st| st.propositions.get(prop))
                            .map_or(PredType::Verb, |p| p.pred_type),
                    ),
                    NodeContent::Mention { sentence, mention } => TneKind::Mention(
                        doc.sentence(sentence)
                            .and_then(|st| st.mentions.get(mention))
                            .map_or(MentionType::None, |m| m.mention_type),
                    ),
                    NodeContent::Syn { .. } => TneKind::Syn,
                };
                let entity_type = node
                    .mentions
                    .iter()
                    .next()
                    .and_then(|uid| doc.mention(*uid))
                    .map(|m| m.entity_type.clone());
                self.dictionary.elements.insert(
                    id,
                    TneElement {
                        kind,
                        entity_type,
                        role: node.role.clone(),
                        text: node.content.text(doc),
                        arity: node.children.len(),
                        depth,
                        tree: tree_index,
                    },
                );

                let edges = self.neighbors.entry(id).or_default();
                if let Some(parent) = node.parent {
                    edges.push((parent, Step::Up));
                }
                edges.extend(node.children.iter().map(|c| (*c, Step::Down)));

                for uid in &node.mentions {
                    by_mention.entry(*uid).or_default().push((id, tree_index));
                }
                if !node.mentions.is_empty() {
                    self.positions.push(id);
                    self.position_mentions.push(node.mentions.clone());
                }
            }
        }

        for nodes in by_mention.values() {
            for (a, tree_a) in nodes {
                for (b, tree_b) in nodes {
                    if tree_a != tree_b {
                        self.neighbors.entry(*a).or_default().push((*b, Step::Bridge));
                    }
                }
            }
        }
    }

    fn connect_positions(&mut self) {
        for i in 0..self.positions.len() {
            for j in (i + 1)..self.positions.len() {
                let (from, to) = (self.positions[i], self.positions[j]);
                let path = bfs(
                    &from,
                    |n| {
                        self.neighbors
                            .get(n)
                            .map(|edges| edges.iter().map(|(m, _)| *m).collect::<Vec<_>>())
                            .unwrap_or_default()
                    },
                    |n| *n == to,
                );
                let Some(path) = path else { continue };
                if path.len() - 1 > MAX_LINK_DISTANCE {
                    continue;
                }
                let chain = TreeNodeChain::from_path(path, &self.dictionary);
                let back = chain.reversed(&self.dictionary);
                self.links.insert((i, j), chain);
                self.links.insert((j, i), back);
            }
        }
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn arena(&self) -> &TreeArena {
        &self.arena
    }

    pub fn forest(&self) -> &PropForest {
        &self.forest
    }

    pub fn dictionary(&self) -> &TneDictionary {
        &self.dictionary
    }

    pub fn n_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, i: usize) -> Option<NodeId> {
        self.positions.get(i).copied()
    }

    /// Positions whose node carries a mention with this sentence-local index.
    pub fn positions_of_mention(&self, mention: usize) -> Vec<usize> {
        self.position_mentions
            .iter()
            .enumerate()
            .filter(|(_, uids)| {
                uids.iter()
                    .any(|u| u.sentence() == self.sentence && u.index() == mention)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Cached chain between positions `i` and `j`.
    pub fn get_link(&self, i: usize, j: usize) -> Option<&TreeNodeChain> {
        self.links.get(&(i, j))
    }

    /// Shortest chain between any node of mention `a` and any node of mention
    /// `b`; the first found wins ties.
    pub fn mention_link(&self, a: usize, b: usize) -> Option<&TreeNodeChain> {
        let from = self.positions_of_mention(a);
        let to = self.positions_of_mention(b);
        let mut best: Option<&TreeNodeChain> = None;
        for i in &from {
            for j in &to {
                let Some(chain) = self.get_link(*i, *j) else { continue };
                if best.map_or(true, |b| chain.distance < b.distance) {
                    best = Some(chain);
                }
            }
        }
        best
    }

    /// Roles along the chain: `^` climbs to a parent, `v` descends into a
    /// child, `=` crosses a same-mention bridge, and the top node's text sits
    /// in brackets.
    pub fn role_path(&self, chain: &TreeNodeChain) -> String {
        let role = |id: NodeId| self.dictionary.get(id).map(|e| e.role.to_string()).unwrap_or_default();
        let text = |id: NodeId| self.dictionary.get(id).map(|e| e.text.clone()).unwrap_or_default();
        let mut out = String::new();
        if chain.top == 0 {
            if let Some(first) = chain.start() {
                out.push_str(&format!("[{}]", text(first)));
            }
        }
        for (k, pair) in chain.nodes.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let step = self
                .neighbors
                .get(&from)
                .and_then(|edges| edges.iter().find(|(n, _)| *n == to))
                .map_or(Step::Bridge, |(_, s)| *s);
            match step {
                Step::Up => {
                    out.push_str(&role(from));
                    out.push('^');
                }
                Step::Down => {
                    out.push('v');
                    out.push_str(&role(to));
                }
                Step::Bridge => out.push('='),
            }
            if k + 1 == chain.top {
                out.push_str(&format!("[{}]", text(to)));
            }
        }
        out
    }
}
