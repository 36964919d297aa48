//! Proposition trees.
//!
//! A tree hangs the arguments of one proposition below it, expanding mention
//! arguments into the propositions that define them:
//!
//! ```text
//! p2 visited (verb)
//!   <obj> p1 Paris (name) {m0.1}
//!     <ref> m0.1 "Paris"
//!   <sub> p0 Smith (name) {m0.0}
//!     <ref> m0.0 "John Smith"
//! ```
//!
//! Expansion never revisits a proposition already on the path from the root,
//! and stops at [`MAX_TREE_DEPTH`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;

use layered_resolution::{
    ArgValue, DocTheory, EnglishWordFeatures, Language, MentionType, MentionUid, PredType,
    PropositionId, SentenceTheory, Symbol, SynNodeId, WordFeatureProvider, REF_ROLE,
};

use crate::{NodeContent, NodeId, TreeArena, TreeNode};

/// Deepest proposition nesting a tree expands into.
pub const MAX_TREE_DEPTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Node first, then children left to right.
    HeadLeftRight,
    /// Children left to right, then the node.
    LeftRightHead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropTree {
    pub sentence: usize,
    pub head_prop: PropositionId,
    pub root: NodeId,
}

impl PropTree {
    /// Build the tree rooted at `prop`. Modifier propositions do not root trees.
    pub fn build(
        arena: &mut TreeArena,
        doc: &DocTheory,
        sentence: usize,
        prop: PropositionId,
    ) -> Option<PropTree> {
        let st = doc.sentence(sentence)?;
        if st.propositions.get(prop)?.pred_type == PredType::Modifier {
            return None;
        }
        let mut builder = TreeBuilder { arena, st };
        let root = builder.prop_node(None, prop, Symbol::new(""), 0);
        Some(PropTree {
            sentence,
            head_prop: prop,
            root,
        })
    }

    pub fn size(&self, arena: &TreeArena) -> usize {
        arena.get(self.root).map_or(0, |n| n.size)
    }

    pub fn traverse(&self, arena: &TreeArena, order: TraversalOrder) -> Vec<NodeId> {
        let mut out = Vec::new();
        walk(arena, self.root, order, &mut out);
        out
    }

    pub fn mentions(&self, arena: &TreeArena) -> BTreeSet<MentionUid> {
        self.traverse(arena, TraversalOrder::HeadLeftRight)
            .into_iter()
            .filter_map(|id| arena.get(id))
            .flat_map(|n| n.mentions.iter().copied())
            .collect()
    }

    /// Whether `other`'s head proposition appears somewhere in this tree.
    pub fn contains(&self, other: &PropTree, arena: &TreeArena) -> bool {
        if self.sentence != other.sentence || self.head_prop == other.head_prop {
            return false;
        }
        self.traverse(arena, TraversalOrder::HeadLeftRight)
            .into_iter()
            .filter_map(|id| arena.get(id))
            .any(|n| n.content.sentence() == other.sentence && n.content.proposition() == Some(other.head_prop))
    }

    /// Replace pronoun propositions by their antecedent's syntactic node.
    ///
    /// Relative pronouns (`that`, `which`, `who`) resolve to the nearest noun
    /// phrase above them with a different head; other pronouns resolve to the
    /// first NAME (else DESC) mention of their entity. English only.
    pub fn resolve_pronouns(&self, arena: &mut TreeArena, doc: &DocTheory) -> usize {
        if doc.language != Language::English {
            return 0;
        }
        let words = EnglishWordFeatures;
        let mut resolved = 0;
        for id in self.traverse(arena, TraversalOrder::HeadLeftRight) {
            let Some(node) = arena.get(id) else { continue };
            let (Some(parent), NodeContent::Proposition { sentence, prop }) = (node.parent, node.content) else {
                continue;
            };
            let Some(st) = doc.sentence(sentence) else { continue };
            let Some(pronoun) = st.propositions.get(prop) else { continue };
            if pronoun.pred_type != PredType::Pronoun {
                continue;
            }
            let Some(mention) = pronoun.ref_mention().and_then(|m| st.mentions.get(m)) else {
                continue;
            };
            let Some((target_sentence, target_node, target_mention)) =
                antecedent_for(doc, st, mention.index, &words)
            else {
                continue;
            };

            let removed = node.size;
            let mut replacement = TreeNode::new(
                NodeContent::Syn {
                    sentence: target_sentence,
                    node: target_node,
                },
                Some(parent),
                node.role.clone(),
            );
            // the pronoun keeps a position in its own sentence
            replacement.mentions.insert(mention.uid);
            replacement.mentions.extend(target_mention);
            replacement.resolved_from = Some(mention.uid);
            let new_id = arena.alloc(replacement);
            if let Some(slot) = arena
                .get_mut(parent)
                .and_then(|p| p.children.iter_mut().find(|c| **c == id))
            {
                *slot = new_id;
            }
            adjust_sizes(arena, Some(parent), 1, removed);
            resolved += 1;
        }
        if resolved > 0 {
            log::debug!("resolved {} pronoun node(s) in tree {}", resolved, self.head_prop);
        }
        resolved
    }

    /// Attach the non-`<ref>` arguments of modifier propositions to the node
    /// their `<ref>` chain points at. Returns the number of nodes added.
    pub fn include_modifiers(&self, arena: &mut TreeArena, doc: &DocTheory) -> usize {
        let Some(st) = doc.sentence(self.sentence) else {
            return 0;
        };
        let modifiers = modifier_targets(st);
        if modifiers.is_empty() {
            return 0;
        }
        let ids = self.traverse(arena, TraversalOrder::HeadLeftRight);
        let mut builder = TreeBuilder { arena, st };
        let mut done = HashSet::new();
        let mut added = 0;
        for id in ids {
            let Some((key, attach_to)) = builder.modifier_key(id) else { continue };
            let Some(mods) = modifiers.get(&key) else { continue };
            if !done.insert(key) {
                continue;
            }
            let depth = builder.depth_of(attach_to);
            let mut new_children = Vec::new();
            for mod_prop in mods.iter().filter_map(|p| st.propositions.get(*p)) {
                for arg in mod_prop.args.iter().filter(|a| !a.role.is_empty() && !a.is_ref()) {
                    let child = match arg.value {
                        ArgValue::Text(syn) => match builder.noun_prop_for_syn(syn) {
                            Some(np) if !builder.on_path(attach_to, np) => {
                                Some(builder.prop_node(Some(attach_to), np, arg.role.clone(), depth + 1))
                            }
                            _ => Some(builder.syn_leaf(attach_to, syn, arg.role.clone())),
                        },
                        ArgValue::Proposition(q) if !builder.on_path(attach_to, q) && depth < MAX_TREE_DEPTH => {
                            Some(builder.prop_node(Some(attach_to), q, arg.role.clone(), depth + 1))
                        }
                        ArgValue::Proposition(_) => None,
                        ArgValue::Mention(m) => match builder.name_or_noun_definition(m) {
                            Some(np) if !builder.on_path(attach_to, np) => {
                                Some(builder.prop_node(Some(attach_to), np, arg.role.clone(), depth + 1))
                            }
                            _ => Some(builder.mention_leaf(attach_to, m, arg.role.clone())),
                        },
                    };
                    new_children.extend(child);
                }
            }
            if new_children.is_empty() {
                continue;
            }
            let gained: usize = new_children
                .iter()
                .filter_map(|c| builder.arena.get(*c))
                .map(|n| n.size)
                .sum();
            if let Some(target) = builder.arena.get_mut(attach_to) {
                target.children.extend(new_children);
            }
            builder.sort_children(attach_to);
            adjust_sizes(builder.arena, Some(attach_to), gained, 0);
            added += gained;
        }
        added
    }

    /// Indented dump, one node per line.
    pub fn render(&self, arena: &TreeArena, doc: &DocTheory) -> String {
        let mut out = String::new();
        render_node(arena, doc, self.root, 0, &mut out);
        out
    }
}

fn walk(arena: &TreeArena, id: NodeId, order: TraversalOrder, out: &mut Vec<NodeId>) {
    let Some(node) = arena.get(id) else { return };
    if order == TraversalOrder::HeadLeftRight {
        out.push(id);
    }
    for child in &node.children {
        walk(arena, *child, order, out);
    }
    if order == TraversalOrder::LeftRightHead {
        out.push(id);
    }
}

fn adjust_sizes(arena: &mut TreeArena, from: Option<NodeId>, gained: usize, removed: usize) {
    let mut current = from;
    while let Some(id) = current {
        let Some(node) = arena.get_mut(id) else { break };
        node.size = (node.size + gained).saturating_sub(removed);
        current = node.parent;
    }
}

fn antecedent_for(
    doc: &DocTheory,
    st: &SentenceTheory,
    mention: usize,
    words: &EnglishWordFeatures,
) -> Option<(usize, SynNodeId, Option<MentionUid>)> {
    let pronoun = st.mentions.get(mention)?;
    let parse = &st.parse;
    let word = pronoun.head_word(parse);
    if words.is_relative_pronoun(&word) {
        let np = parse
            .ancestors(pronoun.node)
            .find(|a| parse.tag(*a).as_str().starts_with("NP") && parse.head_word(*a) != word)?;
        let covering = parse.node(np).mention.and_then(|m| st.mentions.get(m)).map(|m| m.uid);
        return Some((st.index, np, covering));
    }
    let entity = doc.entities.entity_by_mention(pronoun.uid)?;
    let candidates: Vec<_> = entity
        .mentions
        .iter()
        .filter(|uid| **uid != pronoun.uid)
        .filter_map(|uid| doc.mention(*uid))
        .collect();
    let best = candidates
        .iter()
        .find(|m| m.mention_type == MentionType::Name)
        .or_else(|| candidates.iter().find(|m| m.mention_type == MentionType::Desc))?;
    Some((best.sentence, best.node, Some(best.uid)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ModTarget {
    Prop(PropositionId),
    Mention(usize),
    Syn(SynNodeId),
}

/// Group modifier propositions by what the end of their `<ref>` chain covers.
fn modifier_targets(st: &SentenceTheory) -> HashMap<ModTarget, Vec<PropositionId>> {
    let props = &st.propositions;
    let mut targets: HashMap<ModTarget, Vec<PropositionId>> = HashMap::new();
    for prop in props.iter().filter(|p| p.pred_type == PredType::Modifier) {
        let mut current = prop;
        let mut reference = None;
        for _ in 0..MAX_TREE_DEPTH {
            let Some(arg) = current.ref_arg() else { break };
            match arg.value {
                ArgValue::Proposition(q) => match props.get(q) {
                    Some(next) if next.pred_type == PredType::Modifier => current = next,
                    _ => {
                        reference = Some(arg.value.clone());
                        break;
                    }
                },
                _ => {
                    reference = Some(arg.value.clone());
                    break;
                }
            }
        }
        let point = match reference {
            Some(ArgValue::Mention(m)) => match props.definition(m) {
                Some(def) if def.id != prop.id => ModTarget::Prop(def.id),
                _ => ModTarget::Mention(m),
            },
            Some(ArgValue::Text(syn)) => ModTarget::Syn(syn),
            Some(ArgValue::Proposition(q)) => ModTarget::Prop(q),
            None => continue,
        };
        targets.entry(point).or_default().push(prop.id);
    }
    targets
}

fn render_node(arena: &TreeArena, doc: &DocTheory, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = arena.get(id) else { return };
    for _ in 0..depth {
        out.push_str("  ");
    }
    if !node.role.is_empty() {
        let _ = write!(out, "{} ", node.role);
    }
    let text = node.content.text(doc);
    let _ = match node.content {
        NodeContent::Proposition { sentence, prop } => {
            let kind = doc
                .sentence(sentence)
                .and_then(|st| st.propositions.get(prop))
                .map_or("?", |p| p.pred_type.as_str());
            write!(out, "{} {} ({})", prop, text, kind)
        }
        NodeContent::Mention { sentence, mention } => {
            let uid = doc
                .sentence(sentence)
                .and_then(|st| st.mentions.get(mention))
                .map(|m| m.uid);
            let full = uid.and_then(|u| doc.mention_text(u)).unwrap_or(text);
            match uid {
                Some(uid) => write!(out, "{} \"{}\"", uid, full),
                None => write!(out, "m? \"{}\"", full),
            }
        }
        NodeContent::Syn { .. } => write!(out, "syn \"{}\"", text),
    };
    if !node.mentions.is_empty() && !matches!(node.content, NodeContent::Mention { .. }) {
        let list: Vec<String> = node.mentions.iter().map(|m| m.to_string()).collect();
        let _ = write!(out, " {{{}}}", list.join(", "));
    }
    if let Some(pronoun) = node.resolved_from {
        let _ = write!(out, " <- {}", pronoun);
    }
    out.push('\n');
    for child in &node.children {
        render_node(arena, doc, *child, depth + 1, out);
    }
}

/// Allocates the nodes of one sentence's trees.
pub(crate) struct TreeBuilder<'a, 'd> {
    pub(crate) arena: &'a mut TreeArena,
    pub(crate) st: &'d SentenceTheory,
}

impl<'a, 'd> TreeBuilder<'a, 'd> {
    fn mention_uid(&self, mention: usize) -> Option<MentionUid> {
        self.st.mentions.get(mention).map(|m| m.uid)
    }

    fn alloc(&mut self, content: NodeContent, parent: Option<NodeId>, role: Symbol) -> NodeId {
        self.arena.alloc(TreeNode::new(content, parent, role))
    }

    pub(crate) fn prop_node(
        &mut self,
        parent: Option<NodeId>,
        prop: PropositionId,
        role: Symbol,
        depth: usize,
    ) -> NodeId {
        let st = self.st;
        let id = self.alloc(
            NodeContent::Proposition {
                sentence: st.index,
                prop,
            },
            parent,
            role,
        );
        let defined = st
            .propositions
            .get(prop)
            .filter(|p| p.pred_type.is_defining())
            .and_then(|p| p.ref_mention())
            .and_then(|m| self.mention_uid(m));
        if let (Some(uid), Some(node)) = (defined, self.arena.get_mut(id)) {
            node.mentions.insert(uid);
        }
        self.populate(id, prop, depth);
        id
    }

    fn mention_leaf(&mut self, parent: NodeId, mention: usize, role: Symbol) -> NodeId {
        let id = self.alloc(
            NodeContent::Mention {
                sentence: self.st.index,
                mention,
            },
            Some(parent),
            role,
        );
        if let (Some(uid), Some(node)) = (self.mention_uid(mention), self.arena.get_mut(id)) {
            node.mentions.insert(uid);
        }
        id
    }

    fn syn_leaf(&mut self, parent: NodeId, syn: SynNodeId, role: Symbol) -> NodeId {
        self.alloc(
            NodeContent::Syn {
                sentence: self.st.index,
                node: syn,
            },
            Some(parent),
            role,
        )
    }

    fn populate(&mut self, node: NodeId, prop_id: PropositionId, depth: usize) {
        let st = self.st;
        let Some(prop) = st.propositions.get(prop_id) else { return };
        let is_set = prop.pred_type == PredType::Set;
        let mut children = Vec::new();
        for arg in &prop.args {
            // <ref> of a set names the whole list; members come in as their own args
            if arg.role.is_empty() || (is_set && arg.is_ref()) {
                continue;
            }
            let mut arg_mentions = BTreeSet::new();
            let child = match arg.value {
                ArgValue::Text(syn) => match self.mention_under(syn) {
                    Some(m) => self.mention_arg(node, prop_id, m, &arg.role, depth, &mut arg_mentions),
                    None => Some(self.syn_leaf(node, syn, arg.role.clone())),
                },
                ArgValue::Mention(m) => self.mention_arg(node, prop_id, m, &arg.role, depth, &mut arg_mentions),
                ArgValue::Proposition(p) => self.prop_arg(node, prop_id, p, &arg.role, depth, &mut arg_mentions),
            };
            if let Some(child) = child {
                if let Some(c) = self.arena.get_mut(child) {
                    c.mentions.extend(arg_mentions);
                }
                children.push(child);
            }
        }
        let total: usize = children
            .iter()
            .filter_map(|c| self.arena.get(*c))
            .map(|c| c.size)
            .sum();
        if let Some(n) = self.arena.get_mut(node) {
            n.children = children;
            n.size = 1 + total;
        }
        self.sort_children(node);
    }

    fn mention_arg(
        &mut self,
        node: NodeId,
        current: PropositionId,
        mention: usize,
        role: &Symbol,
        depth: usize,
        arg_mentions: &mut BTreeSet<MentionUid>,
    ) -> Option<NodeId> {
        arg_mentions.extend(self.mention_uid(mention));
        let st = self.st;
        match st.propositions.definition(mention) {
            None => Some(self.mention_leaf(node, mention, role.clone())),
            Some(def) if def.id == current || depth >= MAX_TREE_DEPTH => {
                Some(self.mention_leaf(node, mention, role.clone()))
            }
            Some(def) if self.on_path(node, def.id) => None,
            Some(def) => self.prop_arg(node, current, def.id, role, depth, arg_mentions),
        }
    }

    fn prop_arg(
        &mut self,
        node: NodeId,
        current: PropositionId,
        prop: PropositionId,
        role: &Symbol,
        depth: usize,
        arg_mentions: &mut BTreeSet<MentionUid>,
    ) -> Option<NodeId> {
        let st = self.st;
        let mut target = prop;
        // follow modifiers down their <ref> link
        for _ in 0..=MAX_TREE_DEPTH {
            let candidate = st.propositions.get(target)?;
            if candidate.pred_type != PredType::Modifier {
                break;
            }
            match candidate.ref_arg().map(|a| &a.value) {
                Some(ArgValue::Mention(m)) => {
                    arg_mentions.extend(self.mention_uid(*m));
                    return match self.name_or_noun_definition(*m) {
                        Some(res) if res != current && !self.on_path(node, res) && depth < MAX_TREE_DEPTH => {
                            Some(self.prop_node(Some(node), res, role.clone(), depth + 1))
                        }
                        _ => Some(self.mention_leaf(node, *m, role.clone())),
                    };
                }
                Some(ArgValue::Text(syn)) => return Some(self.syn_leaf(node, *syn, role.clone())),
                Some(ArgValue::Proposition(next)) => target = *next,
                None => return None,
            }
        }
        if st.propositions.get(target)?.pred_type == PredType::Modifier || self.on_path(node, target) {
            return None;
        }
        if depth >= MAX_TREE_DEPTH {
            log::debug!("tree depth bound reached at {} in sentence {}", target, st.index);
            return None;
        }
        Some(self.prop_node(Some(node), target, role.clone(), depth + 1))
    }

    /// Whether `prop` sits on `node` or one of its ancestors.
    fn on_path(&self, node: NodeId, prop: PropositionId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.arena.get(id) else { return false };
            if n.content
                == (NodeContent::Proposition {
                    sentence: self.st.index,
                    prop,
                })
            {
                return true;
            }
            current = n.parent;
        }
        false
    }

    fn depth_of(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.arena.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            depth += 1;
            current = self.arena.get(id).and_then(|n| n.parent);
        }
        depth
    }

    fn mention_under(&self, syn: SynNodeId) -> Option<usize> {
        let parse = &self.st.parse;
        parse.node(syn).mention.or_else(|| parse.mention_on_head_path(syn))
    }

    fn noun_prop_for_syn(&self, syn: SynNodeId) -> Option<PropositionId> {
        let mention = self.mention_under(syn)?;
        self.name_or_noun_definition(mention)
    }

    fn name_or_noun_definition(&self, mention: usize) -> Option<PropositionId> {
        self.st
            .propositions
            .definition(mention)
            .filter(|p| matches!(p.pred_type, PredType::Name | PredType::Noun))
            .map(|p| p.id)
    }

    fn sort_children(&mut self, node: NodeId) {
        let Some(children) = self.arena.get(node).map(|n| n.children.clone()) else {
            return;
        };
        let mut keyed: Vec<(Symbol, NodeId)> = children
            .into_iter()
            .map(|c| (self.arena.get(c).map(|n| n.role.clone()).unwrap_or_else(|| Symbol::new("")), c))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(n) = self.arena.get_mut(node) {
            n.children = keyed.into_iter().map(|(_, c)| c).collect();
        }
    }

    /// Key a tree node for modifier lookup, with the node modifiers attach to.
    fn modifier_key(&self, id: NodeId) -> Option<(ModTarget, NodeId)> {
        let node = self.arena.get(id)?;
        if node.content.sentence() != self.st.index {
            return None;
        }
        let key = match node.content {
            NodeContent::Proposition { prop, .. } => return Some((ModTarget::Prop(prop), id)),
            NodeContent::Mention { mention, .. } => ModTarget::Mention(mention),
            NodeContent::Syn { node: syn, .. } => ModTarget::Syn(syn),
        };
        // leaves take modifiers through a NAME/NOUN parent that they are the <ref> of
        let parent = node.parent?;
        let parent_prop = self.arena.get(parent)?.content.proposition()?;
        let pred_type = self.st.propositions.get(parent_prop)?.pred_type;
        if node.role != *REF_ROLE || !matches!(pred_type, PredType::Name | PredType::Noun) {
            return None;
        }
        Some((key, parent))
    }
}
