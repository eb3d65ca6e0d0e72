//! Visual state rebuilt by applying steps one at a time.

use serde::Serialize;

use algoscope_core::{NodeId, Snapshot, Step, StepKind};

/// What a rendering surface should currently show.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    /// Working array for array algorithms
    pub array: Vec<f64>,
    pub highlighted: Vec<usize>,
    pub focused: Option<NodeId>,
    /// Nodes visited so far, in visit order
    pub visited: Vec<NodeId>,
    /// Last structural snapshot applied
    pub structure: Option<Snapshot>,
    pub found_index: Option<usize>,
    pub found_node: Option<NodeId>,
    pub not_found: bool,
    pub finished: bool,
    pub pseudo_line: Option<usize>,
    pub description: Option<String>,
}

impl RenderState {
    /// Starting state for an array run.
    pub fn for_array(array: &[f64]) -> Self {
        Self {
            array: array.to_vec(),
            ..Self::default()
        }
    }

    /// Starting state for a tree or trie operation.
    pub fn for_structure(snapshot: Snapshot) -> Self {
        Self {
            structure: Some(snapshot),
            ..Self::default()
        }
    }

    /// Map one step onto the visual state.
    pub fn apply(&mut self, step: &Step) {
        if let Some(array) = &step.array {
            self.array.clone_from(array);
        }
        if step.pseudo_line.is_some() {
            self.pseudo_line = step.pseudo_line;
        }
        if step.description.is_some() {
            self.description.clone_from(&step.description);
        }

        match step.kind {
            StepKind::Compare
            | StepKind::Swap
            | StepKind::Move
            | StepKind::Cycle
            | StepKind::Insert
            | StepKind::Probe => {
                self.highlighted.clone_from(&step.indices);
            }
            StepKind::Found => {
                self.found_index = step.indices.first().copied();
                self.found_node = step.node;
                self.highlighted.clone_from(&step.indices);
                if step.node.is_some() {
                    self.focused = step.node;
                }
            }
            StepKind::NotFound => {
                self.not_found = true;
                self.highlighted.clear();
                self.focused = None;
            }
            StepKind::Done => {
                self.highlighted.clear();
                self.focused = None;
                self.finished = true;
            }
            StepKind::Focus => self.focused = step.node,
            StepKind::Visit => {
                if let Some(node) = step.node {
                    self.visited.push(node);
                }
                self.focused = step.node;
            }
            StepKind::Apply => {
                if let Some(snapshot) = &step.snapshot {
                    self.structure = Some(snapshot.clone());
                }
                if step.node.is_some() {
                    self.focused = step.node;
                }
            }
        }
    }
}
