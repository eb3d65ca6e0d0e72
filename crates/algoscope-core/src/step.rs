//! Step events for algorithm replay.
//!
//! A [`Step`] is one observable moment of an algorithm run. Array algorithms
//! describe themselves through `indices` and `array`; tree and trie
//! algorithms through `node` and `snapshot`. Steps are recorded once into a
//! [`StepRecorder`], frozen into a [`StepList`], and replayed by index.

use serde::{Deserialize, Serialize};

use crate::bst::TreeNode;
use crate::trie::TrieNode;

/// A unique node identifier, stable across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out node ids in increasing order. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

/// Discriminant of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// Two or more array positions are being compared
    Compare,
    /// Two array positions exchanged values
    Swap,
    /// A value was written into a position (merge-style copy)
    Move,
    /// A value was rotated into its final cycle position
    Cycle,
    /// A search inspected a position
    Probe,
    /// The searched value was located
    Found,
    /// The searched value is absent
    NotFound,
    /// Terminal step of an array run
    Done,
    /// A node becomes the current node
    Focus,
    /// A node is logically visited (traversal output)
    Visit,
    /// A structural snapshot replaces the rendered structure
    Apply,
    /// A key was placed into its slot
    Insert,
}

/// The high-level operation a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Sort,
    Search,
    Insert,
    Delete,
    DeleteWord,
    SearchPrefix,
    Inorder,
    Preorder,
    Postorder,
    LevelOrder,
}

/// A value shown alongside a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Int(i64),
    Number(f64),
    Char(char),
    Text(String),
}

impl From<i64> for StepValue {
    fn from(v: i64) -> Self {
        StepValue::Int(v)
    }
}

impl From<f64> for StepValue {
    fn from(v: f64) -> Self {
        StepValue::Number(v)
    }
}

impl From<char> for StepValue {
    fn from(v: char) -> Self {
        StepValue::Char(v)
    }
}

impl From<&str> for StepValue {
    fn from(v: &str) -> Self {
        StepValue::Text(v.to_string())
    }
}

impl From<String> for StepValue {
    fn from(v: String) -> Self {
        StepValue::Text(v)
    }
}

/// A full copy of a structure, carried by `apply` steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "root", rename_all = "camelCase")]
pub enum Snapshot {
    Tree(Option<TreeNode>),
    Trie(TrieNode),
}

impl Snapshot {
    /// Deep-copy a tree root.
    pub fn tree(root: Option<&TreeNode>) -> Self {
        Snapshot::Tree(root.cloned())
    }

    /// Deep-copy a trie root.
    pub fn trie(root: &TrieNode) -> Self {
        Snapshot::Trie(root.clone())
    }
}

/// One replayable unit of algorithm progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StepValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo_line: Option<usize>,
}

impl Step {
    fn bare(kind: StepKind) -> Self {
        Self {
            kind,
            node: None,
            value: None,
            indices: Vec::new(),
            array: None,
            snapshot: None,
            description: None,
            operation: None,
            pseudo_line: None,
        }
    }

    /// A step with no payload (e.g. a `notFound` marker).
    pub fn marker(kind: StepKind) -> Self {
        Self::bare(kind)
    }

    /// An array step highlighting `indices` over a copy of `array`.
    pub fn on_array(kind: StepKind, indices: Vec<usize>, array: &[f64]) -> Self {
        Self {
            indices,
            array: Some(array.to_vec()),
            ..Self::bare(kind)
        }
    }

    /// Terminal step of an array run.
    pub fn done(array: &[f64]) -> Self {
        Self::on_array(StepKind::Done, Vec::new(), array)
    }

    /// A tree step referring to `node`.
    pub fn on_node(kind: StepKind, node: NodeId) -> Self {
        Self {
            node: Some(node),
            ..Self::bare(kind)
        }
    }

    /// Replace the rendered structure with `snapshot`.
    pub fn apply(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            ..Self::bare(StepKind::Apply)
        }
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_value(mut self, value: impl Into<StepValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_pseudo_line(mut self, line: usize) -> Self {
        self.pseudo_line = Some(line);
        self
    }

    /// Array payloads and node payloads are mutually exclusive, and only
    /// `apply` steps carry a snapshot.
    pub fn is_well_formed(&self) -> bool {
        let array_payload = self.array.is_some();
        let node_payload = self.node.is_some() || self.snapshot.is_some();
        let snapshot_ok = self.snapshot.is_none() || self.kind == StepKind::Apply;
        !(array_payload && node_payload) && snapshot_ok
    }
}

/// Push-only builder for a [`StepList`].
#[derive(Debug, Default)]
pub struct StepRecorder {
    steps: Vec<Step>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        debug_assert!(step.is_well_formed(), "malformed step: {:?}", step);
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Freeze the recording.
    pub fn finish(self) -> StepList {
        StepList { steps: self.steps }
    }
}

/// An ordered, immutable recording of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepList {
    steps: Vec<Step>,
}

impl StepList {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Kinds in order, handy for assertions and summaries.
    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    /// Number of steps of the given kind.
    pub fn count_of(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a StepList {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl FromIterator<Step> for StepList {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
