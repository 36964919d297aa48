#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Proposition trees and the node chains that connect mentions through them.
//!
//! - [`PropTree`] - one proposition with its arguments expanded below it
//! - [`PropForest`] / [`populate_prop_forest`] - the trees of a sentence
//! - [`PropTreeLinks`] - cached shortest [`TreeNodeChain`]s between
//!   mention-bearing nodes
//!
//! All nodes live in a [`TreeArena`]. Clearing the arena invalidates every
//! [`NodeId`] it handed out.

mod arena;
mod forest;
mod links;
mod node;
mod tree;

pub use arena::{NodeId, TreeArena};
pub use forest::{populate_prop_forest, ForestTarget, PropForest, TreeKey};
pub use links::{PropTreeLinks, TneDictionary, TneElement, TneKind, TreeNodeChain, MAX_LINK_DISTANCE};
pub use node::{NodeContent, TreeNode};
pub use tree::{PropTree, TraversalOrder, MAX_TREE_DEPTH};

#[cfg(test)]
mod tests {
    mod forest;
    mod links;
}
