//! Document-scoped storage for proposition tree nodes.
//!
//! Every [`NodeId`] carries the generation of the arena that issued it.
//! [`TreeArena::clear`] starts a new generation, after which ids from earlier
//! generations resolve to `None` instead of to reused slots.

use crate::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    generation: u32,
    index: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct TreeArena {
    generation: u32,
    nodes: Vec<TreeNode>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId {
            generation: self.generation,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Drop every node; ids handed out so far stop resolving.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing tree arena generation {} ({} nodes)",
            self.generation,
            self.nodes.len()
        );
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeContent;
    use layered_resolution::PropositionId;

    #[test]
    fn cleared_ids_do_not_resolve() {
        let mut arena = TreeArena::new();
        let id = arena.alloc(TreeNode::new(
            NodeContent::Proposition {
                sentence: 0,
                prop: PropositionId(0),
            },
            None,
            "",
        ));
        assert!(arena.get(id).is_some());
        arena.clear();
        assert!(arena.get(id).is_none());

        let fresh = arena.alloc(TreeNode::new(
            NodeContent::Proposition {
                sentence: 0,
                prop: PropositionId(1),
            },
            None,
            "",
        ));
        assert_eq!(fresh.index(), id.index());
        assert!(arena.get(id).is_none());
        assert!(arena.get(fresh).is_some());
    }
}
