//! Binary search tree with clone-on-write mutation.
//!
//! Every operation borrows the caller's root immutably, works on a deep
//! clone, and hands back the new root together with the steps that explain
//! how it got there. A tree that is still being animated is never touched.
//!
//! Ordering rule: strict less-than goes left, everything else goes right.
//! Equal values are never stored twice.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::step::{IdAllocator, NodeId, Operation, Snapshot, Step, StepKind, StepList, StepRecorder};

/// Owned child pointer.
pub type Link = Option<Box<TreeNode>>;

/// A node of the search tree. Ownership is strictly tree-shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub value: i64,
    pub left: Link,
    pub right: Link,
}

impl TreeNode {
    /// Create a leaf.
    pub fn new(id: NodeId, value: i64) -> Self {
        Self {
            id,
            value,
            left: None,
            right: None,
        }
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.size()) + self.right.as_ref().map_or(0, |n| n.size())
    }

    /// Height of this subtree (a leaf has height 1).
    pub fn height(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |n| n.height());
        let right = self.right.as_ref().map_or(0, |n| n.height());
        1 + left.max(right)
    }

    /// The leftmost node of this subtree.
    pub fn min_node(&self) -> &TreeNode {
        let mut node = self;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        node
    }

    pub fn contains(&self, value: i64) -> bool {
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            cursor = match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        false
    }

    /// Values in in-order sequence.
    pub fn in_order_values(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.size());
        collect_in_order(self, &mut out);
        out
    }
}

fn collect_in_order(node: &TreeNode, out: &mut Vec<i64>) {
    if let Some(left) = node.left.as_deref() {
        collect_in_order(left, out);
    }
    out.push(node.value);
    if let Some(right) = node.right.as_deref() {
        collect_in_order(right, out);
    }
}

/// Traversal discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    Inorder,
    Preorder,
    Postorder,
    Levelorder,
}

impl TraversalOrder {
    pub fn operation(&self) -> Operation {
        match self {
            TraversalOrder::Inorder => Operation::Inorder,
            TraversalOrder::Preorder => Operation::Preorder,
            TraversalOrder::Postorder => Operation::Postorder,
            TraversalOrder::Levelorder => Operation::LevelOrder,
        }
    }
}

const INSERT_PSEUDOCODE: &[&str] = &[
    "if root is null: root = new Node(value)",
    "node = root",
    "if value == node.value: return",
    "if value < node.value: node = node.left",
    "else: node = node.right",
    "attach new Node(value) at empty slot",
];

const SEARCH_PSEUDOCODE: &[&str] = &[
    "node = root",
    "while node is not null:",
    "  if value == node.value: return found",
    "  node = value < node.value ? node.left : node.right",
    "return not found",
];

const DELETE_PSEUDOCODE: &[&str] = &[
    "find node with value",
    "if node is a leaf: remove it",
    "if node has one child: replace node with child",
    "successor = min(node.right)",
    "node.value = successor.value; delete successor from node.right",
    "value not present",
];

const INORDER_PSEUDOCODE: &[&str] = &["inorder(node.left)", "visit(node)", "inorder(node.right)"];
const PREORDER_PSEUDOCODE: &[&str] = &[
    "visit(node)",
    "preorder(node.left)",
    "preorder(node.right)",
];
const POSTORDER_PSEUDOCODE: &[&str] = &[
    "postorder(node.left)",
    "postorder(node.right)",
    "visit(node)",
];
const LEVELORDER_PSEUDOCODE: &[&str] = &[
    "queue = [root]",
    "node = queue.pop_front(); visit(node)",
    "queue.push_back(node.left, node.right)",
];

/// Pseudocode table indexed by a step's `pseudo_line`.
pub fn pseudocode(operation: Operation) -> &'static [&'static str] {
    match operation {
        Operation::Insert => INSERT_PSEUDOCODE,
        Operation::Search => SEARCH_PSEUDOCODE,
        Operation::Delete => DELETE_PSEUDOCODE,
        Operation::Inorder => INORDER_PSEUDOCODE,
        Operation::Preorder => PREORDER_PSEUDOCODE,
        Operation::Postorder => POSTORDER_PSEUDOCODE,
        Operation::LevelOrder => LEVELORDER_PSEUDOCODE,
        _ => &[],
    }
}

/// Result of [`insert`].
#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub root: Link,
    pub steps: StepList,
    /// Id of the attached node, `None` for a duplicate.
    pub inserted: Option<NodeId>,
}

/// Result of [`search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub found: bool,
    pub node: Option<NodeId>,
    pub steps: StepList,
}

/// Result of [`delete`].
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub root: Link,
    pub deleted: bool,
    pub steps: StepList,
}

/// Result of [`traverse`].
#[derive(Debug, Clone, Serialize)]
pub struct Traversal {
    pub order: TraversalOrder,
    pub values: Vec<i64>,
    pub steps: StepList,
}

fn focus(node: &TreeNode, operation: Operation, line: usize) -> Step {
    Step::on_node(StepKind::Focus, node.id)
        .with_value(node.value)
        .with_operation(operation)
        .with_pseudo_line(line)
}

/// Insert `value`, building the new node with `make_node`.
///
/// Emits one `focus` per visited node and exactly one terminal `apply`.
/// A duplicate flashes the existing node with `found` and changes nothing.
pub fn insert<F>(root: Option<&TreeNode>, make_node: F, value: i64) -> InsertOutcome
where
    F: FnOnce(i64) -> TreeNode,
{
    let mut working: Link = root.cloned().map(Box::new);
    let mut steps = StepRecorder::new();

    let inserted = insert_at(&mut working, value, make_node, &mut steps);

    let mut apply = Step::apply(Snapshot::tree(working.as_deref()))
        .with_operation(Operation::Insert)
        .with_pseudo_line(if root.is_none() { 0 } else { 5 });
    if let Some(id) = inserted {
        apply = apply.with_node(id).with_description(format!("inserted {}", value));
    }
    steps.push(apply);

    tracing::debug!(value, inserted = inserted.is_some(), steps = steps.len(), "bst insert");

    InsertOutcome {
        root: working,
        steps: steps.finish(),
        inserted,
    }
}

fn insert_at<F>(
    slot: &mut Link,
    value: i64,
    make_node: F,
    steps: &mut StepRecorder,
) -> Option<NodeId>
where
    F: FnOnce(i64) -> TreeNode,
{
    match slot {
        None => {
            let node = make_node(value);
            let id = node.id;
            *slot = Some(Box::new(node));
            Some(id)
        }
        Some(node) => {
            steps.push(focus(node, Operation::Insert, 1));
            match value.cmp(&node.value) {
                Ordering::Equal => {
                    steps.push(
                        Step::on_node(StepKind::Found, node.id)
                            .with_value(value)
                            .with_operation(Operation::Insert)
                            .with_pseudo_line(2)
                            .with_description(format!("{} is already in the tree", value)),
                    );
                    None
                }
                Ordering::Less => insert_at(&mut node.left, value, make_node, steps),
                Ordering::Greater => insert_at(&mut node.right, value, make_node, steps),
            }
        }
    }
}

/// Look `value` up. Never mutates and never emits `apply`.
pub fn search(root: Option<&TreeNode>, value: i64) -> SearchOutcome {
    let mut steps = StepRecorder::new();
    let mut cursor = root;

    while let Some(node) = cursor {
        steps.push(focus(node, Operation::Search, 1));
        cursor = match value.cmp(&node.value) {
            Ordering::Equal => {
                steps.push(
                    Step::on_node(StepKind::Found, node.id)
                        .with_value(value)
                        .with_operation(Operation::Search)
                        .with_pseudo_line(2),
                );
                return SearchOutcome {
                    found: true,
                    node: Some(node.id),
                    steps: steps.finish(),
                };
            }
            Ordering::Less => node.left.as_deref(),
            Ordering::Greater => node.right.as_deref(),
        };
    }

    steps.push(
        Step::marker(StepKind::NotFound)
            .with_value(value)
            .with_operation(Operation::Search)
            .with_pseudo_line(4),
    );
    SearchOutcome {
        found: false,
        node: None,
        steps: steps.finish(),
    }
}

/// Remove `value`.
///
/// A two-children node takes the value of its in-order successor, which is
/// then deleted from the right subtree. An absent value is reported through
/// `deleted = false` and a `notFound` step. Exactly one terminal `apply` is
/// emitted either way.
pub fn delete(root: Option<&TreeNode>, value: i64) -> DeleteOutcome {
    let mut working: Link = root.cloned().map(Box::new);
    let mut steps = StepRecorder::new();

    let deleted = delete_at(&mut working, value, &mut steps);
    if !deleted {
        steps.push(
            Step::marker(StepKind::NotFound)
                .with_value(value)
                .with_operation(Operation::Delete)
                .with_pseudo_line(5)
                .with_description(format!("{} is not in the tree", value)),
        );
    }
    steps.push(
        Step::apply(Snapshot::tree(working.as_deref())).with_operation(Operation::Delete));
            
            tracing::debug!(value, deleted, steps = steps.len(), "bst delete");
            
            DeleteOutcome {
            root: working,
            deleted,
            steps: steps.finish(),
            }
            }
            
            fn delete_at(slot: &mut Link, value: i64, steps: &mut StepRecorder) -> bool {
            let Some(node) = slot.as_mut() else {
            return false;
            };
            steps.push(focus(node, Operation::Delete, 0),
    );
    match value.cmp(&node.value) {
        Ordering::Less => return delete_at(&mut node.left, value, steps),
        Ordering::Greater => return delete_at(&mut node.right, value, steps),
        Ordering::Equal => {}
    }

    let Some(mut target) = slot.take() else {
        return false;
    };
    *slot = match (target.left.take(), target.right.take()) {
        (None, None) => {
            steps.push(
                Step::on_node(StepKind::Focus, target.id)
                    .with_operation(Operation::Delete)
                    .with_pseudo_line(1)
                    .with_description(format!("remove leaf {}", value)),
            );
            None
        }
        (Some(child), None) | (None, Some(child)) => {
            steps.push(
                Step::on_node(StepKind::Focus, child.id)
                    .with_value(child.value)
                    .with_operation(Operation::Delete)
                    .with_pseudo_line(2)
                    .with_description(format!("replace {} with its only child", value)),
            );
            Some(child)
        }
        (Some(left), Some(right)) => {
            let successor = right.min_node();
            steps.push(
                Step::on_node(StepKind::Focus, successor.id)
                    .with_value(successor.value)
                    .with_operation(Operation::Delete)
                    .with_pseudo_line(3)
                    .with_description(format!(
                        "in-order successor of {} is {}",
                        value, successor.value
                    )),
            );
            let successor_value = successor.value;
            target.value = successor_value;
            target.left = Some(left);
            target.right = Some(right);
            steps.push(
                Step::on_node(StepKind::Focus, target.id)
                    .with_value(successor_value)
                    .with_operation(Operation::Delete)
                    .with_pseudo_line(4),
            );
            delete_at(&mut target.right, successor_value, steps);
            Some(target)
        }
    };
    true
}

/// Walk the tree in the given order, emitting `focus` and `visit` steps.
pub fn traverse(root: Option<&TreeNode>, order: TraversalOrder) -> Traversal {
    let mut steps = StepRecorder::new();
    let mut values = Vec::new();
    let op = order.operation();

    let mut visit = |node: &TreeNode, line: usize, steps: &mut StepRecorder| {
        values.push(node.value);
        steps.push(
            Step::on_node(StepKind::Visit, node.id)
                .with_value(node.value)
                .with_operation(op)
                .with_pseudo_line(line),
        );
    };

    match order {
        TraversalOrder::Levelorder => {
            let mut queue: VecDeque<&TreeNode> = root.into_iter().collect();
            while let Some(node) = queue.pop_front() {
                steps.push(focus(node, op, 1));
                visit(node, 1, &mut steps);
                queue.extend(node.left.as_deref());
                queue.extend(node.right.as_deref());
            }
        }
        _ => {
            if let Some(node) = root {
                walk_depth_first(node, order, &mut steps, &mut visit);
            }
        }
    }

    Traversal {
        order,
        values,
        steps: steps.finish(),
    }
}

fn walk_depth_first<V>(
    node: &TreeNode,
    order: TraversalOrder,
    steps: &mut StepRecorder,
    visit: &mut V,
)
where
    V: FnMut(&TreeNode, usize, &mut StepRecorder),
{
    let op = order.operation();
    steps.push(focus(node, op, 0));
    if order == TraversalOrder::Preorder {
        visit(node, 0, steps);
    }
    if let Some(left) = node.left.as_deref() {
        walk_depth_first(left, order, steps, visit);
    }
    if order == TraversalOrder::Inorder {
        steps.push(focus(node, op, 1));
        visit(node, 1, steps);
    }
    if let Some(right) = node.right.as_deref() {
        walk_depth_first(right, order, steps, visit);
    }
    if order == TraversalOrder::Postorder {
        steps.push(focus(node, op, 2));
        visit(node, 2, steps);
    }
}

/// A tree session: the live root plus the id allocator feeding new nodes.
#[derive(Debug, Clone, Default)]
pub struct BinarySearchTree {
    root: Link,
    ids: IdAllocator,
}

impl BinarySearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.size())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Levels in the tree; an empty tree has height 0.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.height())
    }

    pub fn values(&self) -> Vec<i64> {
        self.root.as_ref().map(|n| n.in_order_values()).unwrap_or_default()
    }

    pub fn insert(&mut self, value: i64) -> InsertOutcome {
        let ids = &mut self.ids;
        let outcome = insert(self.root.as_deref(), |v| TreeNode::new(ids.allocate(), v), value);
        self.root = outcome.root.clone();
        outcome
    }

    pub fn search(&self, value: i64) -> SearchOutcome {
        search(self.root.as_deref(), value)
    }

    pub fn delete(&mut self, value: i64) -> DeleteOutcome {
        let outcome = delete(self.root.as_deref(), value);
        self.root = outcome.root.clone();
        outcome
    }

    pub fn traverse(&self, order: TraversalOrder) -> Traversal {
        traverse(self.root.as_deref(), order)
    }

    /// Drop every node. Ids keep counting up.
    pub fn clear(&mut self) {
        self.root = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build(values: &[i64]) -> BinarySearchTree {
        let mut tree = BinarySearchTree::new();
        for &v in values {
            tree.insert(v);
        }
        tree
    }

    #[test]
    fn height_counts_levels() {
        assert_eq!(BinarySearchTree::new().height(), 0);
        assert_eq!(build(&[50]).height(), 1);
        assert_eq!(build(&[50, 30, 70, 20]).height(), 3);
        assert_eq!(build(&[1, 2, 3, 4]).height(), 4);
    }

    #[test]
    fn insert_into_empty_tree() {
        let outcome = insert(None, |v| TreeNode::new(NodeId(7), v), 42);

        assert_eq!(outcome.steps.kinds(), vec![StepKind::Apply]);
        assert_eq!(outcome.inserted, Some(NodeId(7)));
        let root = outcome.root.unwrap();
        assert_eq!(root.value, 42);
        assert_eq!(root.id, NodeId(7));
    }

    #[test]
    fn insert_focuses_each_visited_node() {
        let tree = build(&[50, 30, 70]);
        let outcome = insert(tree.root(), |v| TreeNode::new(NodeId(99), v), 20);

        // 50 -> 30 -> empty left slot
        assert_eq!(outcome.steps.count_of(StepKind::Focus), 2);
        assert_eq!(outcome.steps.count_of(StepKind::Apply), 1);
        assert_eq!(outcome.steps.last().map(|s| s.kind), Some(StepKind::Apply));
    }

    #[test]
    fn insert_leaves_caller_tree_untouched() {
        let tree = build(&[50, 30]);
        let before = tree.root().cloned();

        let outcome = insert(tree.root(), |v| TreeNode::new(NodeId(10), v), 40);

        assert_eq!(tree.root().cloned(), before);
        assert_eq!(outcome.root.unwrap().in_order_values(), vec![30, 40, 50]);
    }

    #[test]
    fn duplicate_insert_is_a_flash() {
        let mut tree = build(&[50, 30, 70]);
        let size = tree.len();

        let outcome = tree.insert(30);

        assert!(outcome.inserted.is_none());
        assert_eq!(tree.len(), size);
        assert_eq!(outcome.steps.count_of(StepKind::Found), 1);
        assert_eq!(outcome.steps.count_of(StepKind::Apply), 1);
    }

    #[test]
    fn in_order_is_sorted() {
        let tree = build(&[50, 30, 70, 20, 40]);
        assert_eq!(tree.values(), vec![20, 30, 40, 50, 70]);
    }

    #[test]
    fn ids_are_preserved_by_clones() {
        let tree = build(&[50, 30, 70]);
        let root_id = tree.root().unwrap().id;

        let outcome = insert(tree.root(), |v| TreeNode::new(NodeId(100), v), 60);
        assert_eq!(outcome.root.unwrap().id, root_id);
    }

    #[test]
    fn search_hit_and_miss() {
        let tree = build(&[50, 30, 70, 20, 40]);

        let hit = tree.search(40);
        assert!(hit.found);
        assert_eq!(hit.steps.count_of(StepKind::Focus), 3);
        assert_eq!(hit.steps.count_of(StepKind::Apply), 0);

        let miss = tree.search(65);
        assert!(!miss.found);
        assert_eq!(miss.steps.last().map(|s| s.kind), Some(StepKind::NotFound));
    }

    #[test]
    fn delete_two_children_takes_successor() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80]);

        let outcome = tree.delete(50);

        assert!(outcome.deleted);
        let root = tree.root().unwrap();
        assert_eq!(root.value, 60);
        assert_eq!(tree.values(), vec![20, 30, 40, 60, 70, 80]);
        assert_eq!(tree.values().iter().filter(|&&v| v == 60).count(), 1);
        assert_eq!(outcome.steps.count_of(StepKind::Apply), 1);
    }

    #[test]
    fn delete_leaf_and_single_child() {
        let mut tree = build(&[50, 30, 20]);

        assert!(tree.delete(20).deleted);
        assert_eq!(tree.values(), vec![30, 50]);

        assert!(tree.delete(50).deleted);
        assert_eq!(tree.root().unwrap().value, 30);
    }

    #[test]
    fn delete_last_node_empties_tree() {
        let mut tree = build(&[5]);
        let outcome = tree.delete(5);

        assert!(tree.is_empty());
        let apply = outcome.steps.last().unwrap();
        assert_eq!(apply.snapshot, Some(Snapshot::Tree(None)));
    }

    #[test]
    fn delete_absent_value_reports_not_found() {
        let mut tree = build(&[50, 30]);
        let outcome = tree.delete(99);

        assert!(!outcome.deleted);
        assert_eq!(tree.values(), vec![30, 50]);
        assert_eq!(outcome.steps.count_of(StepKind::NotFound), 1);
        assert_eq!(outcome.steps.count_of(StepKind::Apply), 1);
    }

    #[test]
    fn delete_from_empty_tree() {
        let outcome = delete(None, 1);
        assert!(!outcome.deleted);
        assert!(outcome.root.is_none());
        assert_eq!(outcome.steps.kinds(), vec![StepKind::NotFound, StepKind::Apply]);
    }

    #[test]
    fn traversal_orders() {
        let tree = build(&[50, 30, 70, 20, 40]);

        assert_eq!(tree.traverse(TraversalOrder::Inorder).values, vec![20, 30, 40, 50, 70]);
        assert_eq!(tree.traverse(TraversalOrder::Preorder).values, vec![50, 30, 20, 40, 70]);
        assert_eq!(tree.traverse(TraversalOrder::Postorder).values, vec![20, 40, 30, 70, 50]);
        assert_eq!(tree.traverse(TraversalOrder::Levelorder).values, vec![50, 30, 70, 20, 40]);
    }

    #[test]
    fn traversal_emits_one_visit_per_node() {
        let tree = build(&[50, 30, 70, 20, 40]);
        for order in [
            TraversalOrder::Inorder,
            TraversalOrder::Preorder,
            TraversalOrder::Postorder,
            TraversalOrder::Levelorder,
        ] {
            let t = tree.traverse(order);
            assert_eq!(t.steps.count_of(StepKind::Visit), 5);
            assert_eq!(t.steps.count_of(StepKind::Apply), 0);
        }
    }

    #[test]
    fn pseudo_lines_are_in_range() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80]);
        let outcome = tree.delete(50);
        for step in &outcome.steps {
            if let (Some(op), Some(line)) = (step.operation, step.pseudo_line) {
                assert!(line < pseudocode(op).len());
            }
        }
    }

    proptest! {
        #[test]
        fn inserts_keep_in_order_sorted(values in prop::collection::vec(-1000i64..1000, 0..64)) {
            let tree = build(&values);
            let in_order = tree.values();
            prop_assert!(in_order.windows(2).all(|w| w[0] < w[1]));

            let mut expected = values.clone();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(in_order, expected);
        }

        #[test]
        fn deletes_remove_exactly_one_value(
            values in prop::collection::vec(0i64..200, 1..48),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut tree = build(&values);
            let target = values[pick.index(values.len())];

            let outcome = tree.delete(target);
            prop_assert!(outcome.deleted);
            prop_assert!(!tree.root().map_or(false, |r| r.contains(target)));
            prop_assert!(tree.values().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
