//! Prefix tree with clone-on-write snapshots.
//!
//! The [`Trie`] owns the live root for one visualizer session. Every
//! mutating call works on a clone and only swaps it in once the operation is
//! complete, so snapshots already handed out stay valid.
//!
//! `delete` removes a whole prefix: the node reached by the prefix goes away
//! together with every word below it. `delete_word` removes one exact word.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::step::{IdAllocator, NodeId, Operation, Snapshot, Step, StepKind, StepList, StepRecorder};

/// A trie node. The root has no character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrieNode {
    pub id: NodeId,
    #[serde(rename = "char")]
    pub ch: Option<char>,
    pub children: BTreeMap<char, TrieNode>,
    pub is_end_of_word: bool,
}

impl TrieNode {
    pub fn root(id: NodeId) -> Self {
        Self {
            id,
            ch: None,
            children: BTreeMap::new(),
            is_end_of_word: false,
        }
    }

    pub fn new(id: NodeId, ch: char) -> Self {
        Self {
            id,
            ch: Some(ch),
            children: BTreeMap::new(),
            is_end_of_word: false,
        }
    }

    /// No children and not the end of a word.
    pub fn is_prunable(&self) -> bool {
        self.children.is_empty() && !self.is_end_of_word
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(TrieNode::node_count).sum::<usize>()
    }

    /// Follow `path` from this node.
    pub fn descend(&self, path: &[char]) -> Option<&TrieNode> {
        let mut node = self;
        for ch in path {
            node = node.children.get(ch)?;
        }
        Some(node)
    }

    fn descend_mut(&mut self, path: &[char]) -> Option<&mut TrieNode> {
        let mut node = self;
        for ch in path {
            node = node.children.get_mut(ch)?;
        }
        Some(node)
    }

    /// Every word stored under this node, depth-first in lexical order,
    /// each prefixed with `prefix`.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut buffer = prefix.to_string();
        walk_words(self, &mut buffer, &mut |_, word| words.push(word.to_string()));
        words
    }
}

fn walk_words<F>(node: &TrieNode, buffer: &mut String, on_word: &mut F)
where
    F: FnMut(&TrieNode, &str),
{
    if node.is_end_of_word {
        on_word(node, buffer);
    }
    for (ch, child) in &node.children {
        buffer.push(*ch);
        walk_words(child, buffer, on_word);
        buffer.pop();
    }
}

fn focus(node: &TrieNode, operation: Operation) -> Step {
    let step = Step::on_node(StepKind::Focus, node.id).with_operation(operation);
    match node.ch {
        Some(ch) => step.with_value(ch),
        None => step,
    }
}

/// Result of [`Trie::insert`].
#[derive(Debug, Clone, Serialize)]
pub struct TrieInsertOutcome {
    /// Whether a new word was added.
    pub inserted: bool,
    pub created_nodes: usize,
    pub steps: StepList,
}

/// Result of [`Trie::search`].
#[derive(Debug, Clone, Serialize)]
pub struct TrieSearchOutcome {
    pub found: bool,
    pub steps: StepList,
}

/// Result of [`Trie::search_prefix`].
#[derive(Debug, Clone, Serialize)]
pub struct PrefixSearchOutcome {
    pub found: bool,
    pub words: Vec<String>,
    pub steps: StepList,
}

/// Result of [`Trie::delete`] and [`Trie::delete_word`].
#[derive(Debug, Clone, Serialize)]
pub struct TrieDeleteOutcome {
    pub deleted: bool,
    /// Words that are no longer stored.
    pub removed: Vec<String>,
    pub steps: StepList,
}

/// A trie session.
#[derive(Debug, Clone)]
pub struct Trie {
    root: TrieNode,
    ids: IdAllocator,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        let mut ids = IdAllocator::new();
        let root = TrieNode::root(ids.allocate());
        Self { root, ids }
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Every stored word in lexical order.
    pub fn words(&self) -> Vec<String> {
        self.root.words_with_prefix("")
    }

    /// Number of stored words.
    pub fn len(&self) -> usize {
        let mut count = 0;
        walk_words(&self.root, &mut String::new(), &mut |_, _| count += 1);
        count
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_prunable()
    }

    /// Nodes in the trie, root included.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn contains(&self, word: &str) -> bool {
        let path: Vec<char> = word.chars().collect();
        self.root.descend(&path).is_some_and(|n| n.is_end_of_word)
    }

    /// Drop every word. The root keeps its id.
    pub fn clear(&mut self) {
        self.root.children.clear();
        self.root.is_end_of_word = false;
    }

    /// Insert `word`, emitting an `apply` for every node created.
    pub fn insert(&mut self, word: &str) -> TrieInsertOutcome {
        let path: Vec<char> = word.chars().collect();
        let mut working = self.root.clone();
        let mut steps = StepRecorder::new();
        let mut created_nodes = 0;

        for (depth, &ch) in path.iter().enumerate() {
            let Some(parent) = working.descend_mut(&path[..depth]) else {
                break;
            };
            steps.push(focus(parent, Operation::Insert));
            if parent.children.contains_key(&ch) {
                continue;
            }

            let id = self.ids.allocate();
            parent.children.insert(ch, TrieNode::new(id, ch));
            created_nodes += 1;
            steps.push(
                Step::apply(Snapshot::trie(&working))
                    .with_node(id)
                    .with_value(ch)
                    .with_operation(Operation::Insert)
                    .with_description(format!("create node '{}'", ch)),
            );
        }

        let mut inserted = false;
        if let Some(last) = working.descend_mut(&path) {
            steps.push(focus(last, Operation::Insert));
            if last.is_end_of_word {
                steps.push(
                    Step::on_node(StepKind::Found, last.id)
                        .with_value(word)
                        .with_operation(Operation::Insert)
                        .with_description(format!("\"{}\" is already stored", word)),
                );
            } else {
                last.is_end_of_word = true;
                inserted = true;
                let id = last.id;
                steps.push(
                    Step::apply(Snapshot::trie(&working))
                        .with_node(id)
                        .with_value(word)
                        .with_operation(Operation::Insert)
                        .with_description(format!("mark end of \"{}\"", word)),
                );
            }
        }

        tracing::debug!(word, inserted, created_nodes, "trie insert");

        self.root = working;
        TrieInsertOutcome {
            inserted,
            created_nodes,
            steps: steps.finish(),
        }
    }

    /// Exact-word lookup. Emits only `focus` steps plus a terminal verdict.
    pub fn search(&self, word: &str) -> TrieSearchOutcome {
        let mut steps = StepRecorder::new();
        let mut node = &self.root;
        steps.push(focus(node, Operation::Search));

        for ch in word.chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    steps.push(focus(node, Operation::Search));
                }
                None => {
                    steps.push(
                        Step::marker(StepKind::NotFound)
                            .with_value(word)
                            .with_operation(Operation::Search),
                    );
                    return TrieSearchOutcome {
                        found: false,
                        steps: steps.finish(),
                    };
                }
            }
        }

        let found = node.is_end_of_word;
        let verdict = if found {
            Step::on_node(StepKind::Found, node.id)
        } else {
            Step::marker(StepKind::NotFound)
        };
        steps.push(verdict.with_value(word).with_operation(Operation::Search));

        TrieSearchOutcome {
            found,
            steps: steps.finish(),
        }
    }

    /// Every word starting with `prefix`.
    pub fn search_prefix(&self, prefix: &str) -> PrefixSearchOutcome {
        let mut steps = StepRecorder::new();
        let mut node = &self.root;
        steps.push(focus(node, Operation::SearchPrefix));

        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    steps.push(focus(node, Operation::SearchPrefix));
                }
                None => {
                    steps.push(
                        Step::marker(StepKind::NotFound)
                            .with_value(prefix)
                            .with_operation(Operation::SearchPrefix),
                    );
                    return PrefixSearchOutcome {
                        found: false,
                        words: Vec::new(),
                        steps: steps.finish(),
                    };
                }
            }
        }

        let mut words = Vec::new();
        let mut buffer = prefix.to_string();
        walk_words(node, &mut buffer, &mut |end, word| {
            steps.push(
                Step::on_node(StepKind::Visit, end.id)
                    .with_value(word)
                    .with_operation(Operation::SearchPrefix),
            );
            words.push(word.to_string());
        });

        PrefixSearchOutcome {
            found: true,
            words,
            steps: steps.finish(),
        }
    }

    /// Remove the node reached by `prefix` and its entire subtree, then prune
    /// ancestors that no longer lead anywhere. `delete("")` clears the trie.
    pub fn delete(&mut self, prefix: &str) -> TrieDeleteOutcome {
        let path: Vec<char> = prefix.chars().collect();
        let mut working = self.root.clone();
        let mut steps = StepRecorder::new();

        let removed = match working.descend(&path) {
            Some(node) => node.words_with_prefix(prefix),
            None => Vec::new(),
        };

        let deleted = if path.is_empty() {
            steps.push(focus(&working, Operation::Delete));
            let had_content = !working.is_prunable();
            working.children.clear();
            working.is_end_of_word = false;
            had_content
        } else {
            remove_subtree(&mut working, &path, &mut steps)
        };

        if deleted {
            steps.push(
                Step::apply(Snapshot::trie(&working))
                    .with_operation(Operation::Delete)
                    .with_description(format!(
                        "removed {} word(s) under \"{}\"",
                        removed.len(),
                        prefix
                    )),
            );
            self.root = working;
        } else {
            steps.push(
                Step::marker(StepKind::NotFound)
                    .with_value(prefix)
                    .with_operation(Operation::Delete),
            );
        }

        tracing::debug!(prefix, deleted, removed = removed.len(), "trie prefix delete");

        TrieDeleteOutcome {
            deleted,
            removed: if deleted { removed } else { Vec::new() },
            steps: steps.finish(),
        }
    }

    /// Remove exactly `word`, keeping longer words that share its path.
    pub fn delete_word(&mut self, word: &str) -> TrieDeleteOutcome {
        let path: Vec<char> = word.chars().collect();
        let mut working = self.root.clone();
        let mut steps = StepRecorder::new();

        let deleted = unmark_word(&mut working, &path, &mut steps);
        if deleted {
            steps.push(
                Step::apply(Snapshot::trie(&working))
                    .with_operation(Operation::DeleteWord)
                    .with_description(format!("removed \"{}\"", word)),
            );
            self.root = working;
        } else {
            steps.push(
                Step::marker(StepKind::NotFound)
                    .with_value(word)
                    .with_operation(Operation::DeleteWord),
            );
        }

        tracing::debug!(word, deleted, "trie word delete");

        TrieDeleteOutcome {
            deleted,
            removed: if deleted { vec![word.to_string()] } else { Vec::new() },
            steps: steps.finish(),
        }
    }
}

fn remove_subtree(node: &mut TrieNode, rest: &[char], steps: &mut StepRecorder) -> bool {
    steps.push(focus(node, Operation::Delete));
    let Some((&ch, tail)) = rest.split_first() else {
        return false;
    };

    if tail.is_empty() {
        return match node.children.remove(&ch) {
            Some(child) => {
                steps.push(
                    focus(&child, Operation::Delete)
                        .with_description(format!("drop subtree at '{}'", ch)),
                );
                true
            }
            None => false,
        };
    }

    let Some(child) = node.children.get_mut(&ch) else {
        return false;
    };
    let removed = remove_subtree(child, tail, steps);
    if removed && child.is_prunable() {
        node.children.remove(&ch);
    }
    removed
}

fn unmark_word(node: &mut TrieNode, rest: &[char], steps: &mut StepRecorder) -> bool {
    steps.push(focus(node, Operation::DeleteWord));
    let Some((&ch, tail)) = rest.split_first() else {
        if !node.is_end_of_word {
            return false;
        }
        node.is_end_of_word = false;
        return true;
    };

    let Some(child) = node.children.get_mut(&ch) else {
        return false;
    };
    let removed = unmark_word(child, tail, steps);
    if removed && child.is_prunable() {
        node.children.remove(&ch);
    }
    removed
}

/// Nodes grouped by depth, children in lexical order.
pub(crate) fn levels(root: &TrieNode) -> Vec<Vec<(&TrieNode, Option<NodeId>)>> {
    let mut levels: Vec<Vec<(&TrieNode, Option<NodeId>)>> = Vec::new();
    let mut queue = VecDeque::from([(root, None, 0usize)]);
    while let Some((node, parent, depth)) = queue.pop_front() {
        if levels.len() <= depth {
            levels.push(Vec::new());
        }
        levels[depth].push((node, parent));
        for child in node.children.values() {
            queue.push_back((child, Some(node.id), depth + 1));
        }
    }
    levels
}
