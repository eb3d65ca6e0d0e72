//! Algoscope Core
//!
//! Step recording and structural snapshots for algorithm visualization.
//!
//! # Architecture
//!
//! - **Step**: tagged events (compare, swap, focus, apply, ...) recorded once
//!   per run and replayed by index
//! - **BST**: clone-on-write insert/search/delete/traversals over an owned tree
//! - **Trie**: a stateful prefix tree whose mutations emit full snapshots
//! - **Layout**: pure coordinate assignment for tree and trie snapshots
//!
//! Nothing in this crate performs I/O. Every structure handed to a caller is
//! a fresh clone, so an in-flight animation never observes a half-applied
//! mutation.

mod step;
pub mod bst;
pub mod trie;
pub mod layout;

pub use step::{
    IdAllocator, NodeId, Operation, Snapshot, Step, StepKind, StepList, StepRecorder, StepValue,
};
pub use bst::{BinarySearchTree, TraversalOrder, TreeNode};
pub use trie::{Trie, TrieNode};
pub use layout::{layout_tree, layout_trie, LayoutConfig, TreeLayout, TrieLayout, ViewBox};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_steps_never_carry_arrays() {
        let mut tree = BinarySearchTree::new();
        let mut all = Vec::new();
        for v in [50, 30, 70, 20, 40, 60, 80] {
            all.extend(tree.insert(v).steps.iter().cloned());
        }
        all.extend(tree.delete(50).steps.iter().cloned());
        all.extend(tree.traverse(TraversalOrder::Inorder).steps.iter().cloned());

        assert!(all.iter().all(|s| s.array.is_none() && s.is_well_formed()));
    }

    #[test]
    fn apply_snapshot_round_trips_through_json() {
        let mut trie = Trie::new();
        let outcome = trie.insert("hi");
        let apply = outcome.steps.last().unwrap();

        let json = serde_json::to_string(apply).unwrap();
        let parsed: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, apply);
    }
}
