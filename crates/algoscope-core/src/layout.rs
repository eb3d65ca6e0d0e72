//! Layout engines mapping tree and trie snapshots to 2D coordinates.
//!
//! Both engines are pure: the same structure always yields the same
//! coordinates. After placement every coordinate is shifted so the smallest
//! one sits on the padding offset, and the view box covers the extent plus
//! padding on each side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bst::TreeNode;
use crate::step::NodeId;
use crate::trie::{levels, TrieNode};

/// Spacing used by the layout engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 50.0,
            vertical_gap: 70.0,
            padding: 30.0,
        }
    }
}

/// SVG-style view box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// View box for an empty structure.
    pub const EMPTY: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A positioned tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedTreeNode {
    pub id: NodeId,
    pub value: i64,
    pub x: f64,
    pub y: f64,
}

/// A positioned trie node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedTrieNode {
    pub id: NodeId,
    #[serde(rename = "char")]
    pub ch: Option<char>,
    pub is_end_of_word: bool,
    pub level: usize,
    pub x: f64,
    pub y: f64,
}

/// A parent-to-child segment with resolved endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: NodeId,
    pub to: NodeId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub nodes: Vec<PositionedTreeNode>,
    pub links: Vec<Connector>,
    pub view_box: ViewBox,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrieLayout {
    pub nodes: Vec<PositionedTrieNode>,
    pub edges: Vec<Connector>,
    pub view_box: ViewBox,
}

trait Placed {
    fn id(&self) -> NodeId;
    fn position(&self) -> (f64, f64);
    fn shift(&mut self, dx: f64, dy: f64);
}

impl Placed for PositionedTreeNode {
    fn id(&self) -> NodeId {
        self.id
    }
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
    fn shift(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl Placed for PositionedTrieNode {
    fn id(&self) -> NodeId {
        self.id
    }
    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
    fn shift(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// Shift nodes so the minimum lands on `padding`; return the padded box.
fn fit<P: Placed>(nodes: &mut [P], padding: f64) -> ViewBox {
    if nodes.is_empty() {
        return ViewBox::EMPTY;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for node in nodes.iter() {
        let (x, y) = node.position();
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let (dx, dy) = (padding - min_x, padding - min_y);
    for node in nodes.iter_mut() {
        node.shift(dx, dy);
    }

    ViewBox {
        x: 0.0,
        y: 0.0,
        width: (max_x - min_x) + 2.0 * padding,
        height: (max_y - min_y) + 2.0 * padding,
    }
}

fn connect<P: Placed>(nodes: &[P], pairs: &[(NodeId, NodeId)]) -> Vec<Connector> {
    let positions: HashMap<NodeId, (f64, f64)> =
        nodes.iter().map(|n| (n.id(), n.position())).collect();
    pairs
        .iter()
        .filter_map(|&(from, to)| {
            let (x1, y1) = *positions.get(&from)?;
            let (x2, y2) = *positions.get(&to)?;
            Some(Connector { from, to, x1, y1, x2, y2 })
        })
        .collect()
}

/// Lay out a search tree with default spacing.
pub fn layout_tree(root: Option<&TreeNode>) -> TreeLayout {
    layout_tree_with(root, &LayoutConfig::default())
}

/// x = in-order rank, y = depth.
pub fn layout_tree_with(root: Option<&TreeNode>, config: &LayoutConfig) -> TreeLayout {
    let Some(root) = root else {
        return TreeLayout::default();
    };

    let mut nodes = Vec::new();
    let mut pairs = Vec::new();
    let mut rank = 0usize;
    place_in_order(root, 0, &mut rank, config, &mut nodes, &mut pairs);

    let view_box = fit(&mut nodes, config.padding);
    let links = connect(&nodes, &pairs);
    TreeLayout { nodes, links, view_box }
}

fn place_in_order(
    node: &TreeNode,
    depth: usize,
    rank: &mut usize,
    config: &LayoutConfig,
    nodes: &mut Vec<PositionedTreeNode>,
    pairs: &mut Vec<(NodeId, NodeId)>,
) {
    if let Some(left) = node.left.as_deref() {
        pairs.push((node.id, left.id));
        place_in_order(left, depth + 1, rank, config, nodes, pairs);
    }
    nodes.push(PositionedTreeNode {
        id: node.id,
        value: node.value,
        x: *rank as f64 * config.horizontal_gap,
        y: depth as f64 * config.vertical_gap,
    });
    *rank += 1;
    if let Some(right) = node.right.as_deref() {
        pairs.push((node.id, right.id));
        place_in_order(right, depth + 1, rank, config, nodes, pairs);
    }
}

/// Lay out a trie with default spacing.
pub fn layout_trie(root: &TrieNode) -> TrieLayout {
    layout_trie_with(root, &LayoutConfig::default())
}

/// Nodes grouped by level, each level centered around x = 0.
pub fn layout_trie_with(root: &TrieNode, config: &LayoutConfig) -> TrieLayout {
    if root.is_prunable() {
        return TrieLayout::default();
    }

    let mut nodes = Vec::new();
    let mut pairs = Vec::new();
    for (level, members) in levels(root).into_iter().enumerate() {
        let center = (members.len() as f64 - 1.0) / 2.0;
        for (i, (node, parent)) in members.into_iter().enumerate() {
            if let Some(parent) = parent {
                pairs.push((parent, node.id));
            }
            nodes.push(PositionedTrieNode {
                id: node.id,
                ch: node.ch,
                is_end_of_word: node.is_end_of_word,
                level,
                x: (i as f64 - center) * config.horizontal_gap,
                y: level as f64 * config.vertical_gap,
            });
        }
    }

    let view_box = fit(&mut nodes, config.padding);
    let edges = connect(&nodes, &pairs);
    TrieLayout { nodes, edges, view_box }
}
