//! Step tree for the guided flow builder
//!
//! A flow is a chain of steps. Each step is either a single node or a
//! parallel fork whose branches run side by side and rejoin at the fork's
//! `next`. Trees are immutable: every edit rebuilds only the steps between
//! the root and the edited position and shares everything else through `Rc`.
//!
//! Steps are addressed by a path of node and branch ids from the root. A
//! node whose id does not match the head of the path is skipped; a fork
//! whose branches do not match it is skipped as well. A path that cannot be
//! resolved makes every edit a no-op that returns the input tree.

use crate::converter::{ConvertedFlow, WizardConverter};
use crate::{new_entity_id, AutomationSystem, CanvasError, NodeType, Result};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Upper bound on branches per fork
pub const MAX_BRANCHES: usize = 5;

/// Lower bound on branches per fork
pub const MIN_BRANCHES: usize = 2;

/// Spine label used for forks in outlines
pub const FORK_MARKER: &str = "⑂";

/// An optional step; `None` is the empty chain
pub type Tree = Option<Rc<Step>>;

/// Payload of a node step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardNode {
    pub id: String,
    #[serde(default)]
    pub icon: String,
    pub node_type: NodeType,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phase_id: Option<String>,
}

impl WizardNode {
    pub fn new(node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: new_entity_id("wn"),
            icon: String::new(),
            node_type,
            label: label.into(),
            description: String::new(),
            phase_id: None,
        }
    }
}

/// One lane of a parallel fork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub label: String,
    pub first_step: Tree,
}

impl Branch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_entity_id("wb"),
            label: label.into(),
            first_step: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    Node { node: WizardNode, next: Tree },
    Parallel { branches: Vec<Branch>, next: Tree },
}

impl Step {
    pub fn node(node: WizardNode) -> Self {
        Step::Node { node, next: None }
    }

    pub fn parallel(branches: Vec<Branch>) -> Self {
        Step::Parallel {
            branches,
            next: None,
        }
    }

    pub fn next(&self) -> &Tree {
        match self {
            Step::Node { next, .. } | Step::Parallel { next, .. } => next,
        }
    }

    /// Same step with a different continuation
    pub fn with_next(&self, next: Tree) -> Step {
        match self {
            Step::Node { node, .. } => Step::Node {
                node: node.clone(),
                next,
            },
            Step::Parallel { branches, .. } => Step::Parallel {
                branches: branches.clone(),
                next,
            },
        }
    }

    pub fn as_node(&self) -> Option<&WizardNode> {
        match self {
            Step::Node { node, .. } => Some(node),
            Step::Parallel { .. } => None,
        }
    }

    pub fn branches(&self) -> &[Branch] {
        match self {
            Step::Node { .. } => &[],
            Step::Parallel { branches, .. } => branches,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Step::Parallel { .. })
    }
}

// ========== Resolution ==========

/// Step addressed by `path`. An empty path is the root; a path ending in a
/// branch id resolves to that branch's first step.
pub fn resolve<'a>(root: &'a Tree, path: &[String]) -> Option<&'a Rc<Step>> {
    let Some((head, rest)) = path.split_first() else {
        return root.as_ref();
    };
    let step = root.as_ref()?;

    match step.as_ref() {
        Step::Node { node, next } => {
            if node.id == *head {
                if rest.is_empty() {
                    Some(step)
                } else {
                    resolve(next, rest)
                }
            } else {
                resolve(next, path)
            }
        }
        Step::Parallel { branches, next } => match branches.iter().find(|b| b.id == *head) {
            Some(branch) => resolve(&branch.first_step, rest),
            None => resolve(next, path),
        },
    }
}

/// Node with `id` anywhere in the tree, branches included
pub fn find_node<'a>(root: &'a Tree, id: &str) -> Option<&'a WizardNode> {
    let step = root.as_ref()?;
    match step.as_ref() {
        Step::Node { node, next } => {
            if node.id == id {
                Some(node)
            } else {
                find_node(next, id)
            }
        }
        Step::Parallel { branches, next } => branches
            .iter()
            .find_map(|b| find_node(&b.first_step, id))
            .or_else(|| find_node(next, id)),
    }
}

/// Fork addressed the way [`remove_parallel`] addresses it
pub fn fork_at<'a>(root: &'a Tree, path: &[String]) -> Option<&'a Rc<Step>> {
    let addressed = if path.is_empty() {
        root.as_ref()
    } else {
        let step = resolve(root, path)?;
        // A trailing node id addresses the node before the fork
        match path.last().and_then(|last| step.as_node().filter(|n| n.id == *last)) {
            Some(_) => step.next().as_ref(),
            None => Some(step),
        }
    };
    addressed.filter(|s| s.is_parallel())
}

// ========== Path Rewriting ==========

/// Position a path edit applies to
enum Addressed<'a> {
    /// Empty path: the whole tree
    Root(&'a Tree),
    /// The node step whose id ends the path
    Node(&'a Rc<Step>),
    /// First step of the branch whose id ends the path
    BranchStart(&'a Tree),
}

type Edit<'e> = dyn FnMut(Addressed<'_>) -> Option<Tree> + 'e;

/// Rebuild the spine down to the addressed position; `None` when the path
/// does not resolve or the edit declines.
fn rewrite(tree: &Tree, path: &[String], edit: &mut Edit<'_>) -> Option<Tree> {
    match path.split_first() {
        None => edit(Addressed::Root(tree)),
        Some((head, rest)) => rewrite_from(tree, head, rest, edit),
    }
}

fn rewrite_from(tree: &Tree, head: &str, rest: &[String], edit: &mut Edit<'_>) -> Option<Tree> {
    let step = tree.as_ref()?;
    match step.as_ref() {
        Step::Node { node, next } => {
            let next = if node.id == head {
                if rest.is_empty() {
                    return edit(Addressed::Node(step));
                }
                rewrite(next, rest, edit)?
            } else {
                rewrite_from(next, head, rest, edit)?
            };
            Some(Some(Rc::new(Step::Node {
                node: node.clone(),
                next,
            })))
        }
        Step::Parallel { branches, next } => {
            if let Some(index) = branches.iter().position(|b| b.id == head) {
                let first = &branches[index].first_step;
                let first = if rest.is_empty() {
                    edit(Addressed::BranchStart(first))?
                } else {
                    rewrite(first, rest, edit)?
                };
                let mut branches = branches.clone();
                branches[index].first_step = first;
                return Some(Some(Rc::new(Step::Parallel {
                    branches,
                    next: next.clone(),
                })));
            }

            let next = rewrite_from(next, head, rest, edit)?;
            Some(Some(Rc::new(Step::Parallel {
                branches: branches.clone(),
                next,
            })))
        }
    }
}

/// Attach `tail` after the last step of the spine of `tree`
pub fn attach_at_end(tree: &Tree, tail: Tree) -> Tree {
    if tail.is_none() {
        return tree.clone();
    }
    match tree {
        None => tail,
        Some(step) => Some(Rc::new(step.with_next(attach_at_end(step.next(), tail)))),
    }
}

// ========== Structural Edits ==========

/// Append `step` at the end of the spine
pub fn append(root: &Tree, step: Step) -> Tree {
    attach_at_end(root, Some(Rc::new(step)))
}

/// Splice `step` in after the addressed position.
///
/// The chain that used to follow the position is reattached at the end of
/// the inserted step's spine. An empty path appends to the spine; a path
/// ending in a branch id appends to that branch.
pub fn insert_after(root: &Tree, path: &[String], step: Step) -> Tree {
    let inserted: Tree = Some(Rc::new(step));
    let mut edit = |at: Addressed<'_>| -> Option<Tree> {
        Some(match at {
            Addressed::Root(tree) => attach_at_end(tree, inserted.clone()),
            Addressed::BranchStart(first) => attach_at_end(first, inserted.clone()),
            Addressed::Node(node) => Some(Rc::new(
                node.with_next(attach_at_end(&inserted, node.next().clone())),
            )),
        })
    };
    rewrite(root, path, &mut edit).unwrap_or_else(|| root.clone())
}

/// Replace the continuation of the addressed node, dropping the old one.
///
/// An empty path appends to the spine; a branch id appends to that branch.
pub fn set_next(root: &Tree, path: &[String], next: Tree) -> Tree {
    let mut edit = |at: Addressed<'_>| -> Option<Tree> {
        Some(match at {
            Addressed::Root(tree) => attach_at_end(tree, next.clone()),
            Addressed::BranchStart(first) => attach_at_end(first, next.clone()),
            Addressed::Node(node) => Some(Rc::new(node.with_next(next.clone()))),
        })
    };
    rewrite(root, path, &mut edit).unwrap_or_else(|| root.clone())
}

/// Remove the node with `id`; its continuation takes its place
pub fn remove_node(root: &Tree, id: &str) -> Tree {
    remove_node_in(root, id).unwrap_or_else(|| root.clone())
}

fn remove_node_in(tree: &Tree, id: &str) -> Option<Tree> {
    let step = tree.as_ref()?;
    match step.as_ref() {
        Step::Node { node, next } => {
            if node.id == id {
                return Some(next.clone());
            }
            let next = remove_node_in(next, id)?;
            Some(Some(Rc::new(Step::Node {
                node: node.clone(),
                next,
            })))
        }
        Step::Parallel { branches, next } => {
            for (index, branch) in branches.iter().enumerate() {
                if let Some(first) = remove_node_in(&branch.first_step, id) {
                    let mut branches = branches.clone();
                    branches[index].first_step = first;
                    return Some(Some(Rc::new(Step::Parallel {
                        branches,
                        next: next.clone(),
                    })));
                }
            }
            let next = remove_node_in(next, id)?;
            Some(Some(Rc::new(Step::Parallel {
                branches: branches.clone(),
                next,
            })))
        }
    }
}

/// Remove a fork and all its branches; the fork's continuation is promoted.
///
/// `path` addresses the node whose `next` is the fork, or a branch whose
/// first step is the fork. An empty path removes a fork at the root.
pub fn remove_parallel(root: &Tree, path: &[String]) -> Tree {
    let mut edit = |at: Addressed<'_>| -> Option<Tree> {
        match at {
            Addressed::Root(tree) | Addressed::BranchStart(tree) => {
                let fork = tree.as_ref().filter(|s| s.is_parallel())?;
                Some(fork.next().clone())
            }
            Addressed::Node(node) => {
                let fork = node.next().as_ref().filter(|s| s.is_parallel())?;
                Some(Some(Rc::new(node.with_next(fork.next().clone()))))
            }
        }
    };
    rewrite(root, path, &mut edit).unwrap_or_else(|| root.clone())
}

/// Rebuild nodes for which `f` returns a replacement; `None` if nothing changed
fn map_nodes(tree: &Tree, f: &mut dyn FnMut(&WizardNode) -> Option<WizardNode>) -> Option<Tree> {
    let step = tree.as_ref()?;
    match step.as_ref() {
        Step::Node { node, next } => {
            let new_node = f(node);
            let new_next = map_nodes(next, f);
            if new_node.is_none() && new_next.is_none() {
                return None;
            }
            Some(Some(Rc::new(Step::Node {
                node: new_node.unwrap_or_else(|| node.clone()),
                next: new_next.unwrap_or_else(|| next.clone()),
            })))
        }
        Step::Parallel { branches, next } => {
            let mut changed = false;
            let mut new_branches = Vec::with_capacity(branches.len());
            for branch in branches {
                match map_nodes(&branch.first_step, f) {
                    Some(first) => {
                        changed = true;
                        new_branches.push(Branch {
                            first_step: first,
                            ..branch.clone()
                        });
                    }
                    None => new_branches.push(branch.clone()),
                }
            }
            let new_next = map_nodes(next, f);
            if !changed && new_next.is_none() {
                return None;
            }
            Some(Some(Rc::new(Step::Parallel {
                branches: new_branches,
                next: new_next.unwrap_or_else(|| next.clone()),
            })))
        }
    }
}

/// Edit the node with `id` in place. Its id is kept.
pub fn update_node(root: &Tree, id: &str, edit: impl FnOnce(&mut WizardNode)) -> Tree {
    let mut edit = Some(edit);
    let mut f = |node: &WizardNode| -> Option<WizardNode> {
        if node.id != id {
            return None;
        }
        let apply = edit.take()?;
        let mut updated = node.clone();
        apply(&mut updated);
        updated.id = node.id.clone();
        Some(updated)
    };
    map_nodes(root, &mut f).unwrap_or_else(|| root.clone())
}

/// Clear every reference to `phase_id`; nodes themselves stay
pub fn clear_phase(root: &Tree, phase_id: &str) -> Tree {
    let mut f = |node: &WizardNode| -> Option<WizardNode> {
        (node.phase_id.as_deref() == Some(phase_id)).then(|| WizardNode {
            phase_id: None,
            ..node.clone()
        })
    };
    map_nodes(root, &mut f).unwrap_or_else(|| root.clone())
}

// ========== Branch Management ==========

fn with_branches(fork: &Step, branches: Vec<Branch>) -> Tree {
    Some(Rc::new(Step::Parallel {
        branches,
        next: fork.next().clone(),
    }))
}

/// Add a branch to the fork addressed like [`remove_parallel`].
///
/// No-op when the fork already has [`MAX_BRANCHES`] branches.
pub fn add_branch(root: &Tree, fork_path: &[String], branch: Branch) -> Tree {
    let mut branch = Some(branch);
    let mut grow = |fork: &Rc<Step>| -> Option<Tree> {
        let existing = fork.branches();
        if !fork.is_parallel() || existing.len() >= MAX_BRANCHES {
            return None;
        }
        let mut branches = existing.to_vec();
        branches.push(branch.take()?);
        Some(with_branches(fork, branches))
    };
    let mut edit = |at: Addressed<'_>| -> Option<Tree> {
        match at {
            Addressed::Root(tree) | Addressed::BranchStart(tree) => grow(tree.as_ref()?),
            Addressed::Node(node) => {
                let fork = grow(node.next().as_ref()?)?;
                Some(Some(Rc::new(node.with_next(fork))))
            }
        }
    };
    rewrite(root, fork_path, &mut edit).unwrap_or_else(|| root.clone())
}

/// Rebuild the fork owning `branch_id`; `f` returns the new branch list
fn edit_fork_of(
    tree: &Tree,
    branch_id: &str,
    f: &mut dyn FnMut(&[Branch]) -> Option<Vec<Branch>>,
) -> Option<Tree> {
    let step = tree.as_ref()?;
    match step.as_ref() {
        Step::Node { node, next } => {
            let next = edit_fork_of(next, branch_id, f)?;
            Some(Some(Rc::new(Step::Node {
                node: node.clone(),
                next,
            })))
        }
        Step::Parallel { branches, next } => {
            if branches.iter().any(|b| b.id == branch_id) {
                return Some(with_branches(step, f(branches)?));
            }
            for (index, branch) in branches.iter().enumerate() {
                if let Some(first) = edit_fork_of(&branch.first_step, branch_id, f) {
                    let mut branches = branches.clone();
                    branches[index].first_step = first;
                    return Some(Some(Rc::new(Step::Parallel {
                        branches,
                        next: next.clone(),
                    })));
                }
            }
            let next = edit_fork_of(next, branch_id, f)?;
            Some(Some(Rc::new(Step::Parallel {
                branches: branches.clone(),
                next,
            })))
        }
    }
}

/// Drop a branch and its contents. No-op at [`MIN_BRANCHES`].
pub fn remove_branch(root: &Tree, branch_id: &str) -> Tree {
    let mut f = |branches: &[Branch]| -> Option<Vec<Branch>> {
        (branches.len() > MIN_BRANCHES).then(|| {
            branches
                .iter()
                .filter(|b| b.id != branch_id)
                .cloned()
                .collect()
        })
    };
    edit_fork_of(root, branch_id, &mut f).unwrap_or_else(|| root.clone())
}

pub fn rename_branch(root: &Tree, branch_id: &str, label: &str) -> Tree {
    let mut f = |branches: &[Branch]| -> Option<Vec<Branch>> {
        Some(
            branches
                .iter()
                .map(|b| {
                    if b.id == branch_id {
                        Branch {
                            label: label.to_string(),
                            ..b.clone()
                        }
                    } else {
                        b.clone()
                    }
                })
                .collect(),
        )
    };
    edit_fork_of(root, branch_id, &mut f).unwrap_or_else(|| root.clone())
}

// ========== Queries ==========

pub fn count_nodes(tree: &Tree) -> usize {
    match tree.as_deref() {
        None => 0,
        Some(Step::Node { next, .. }) => 1 + count_nodes(next),
        Some(Step::Parallel { branches, next }) => {
            branches.iter().map(|b| count_nodes(&b.first_step)).sum::<usize>() + count_nodes(next)
        }
    }
}

pub fn count_nodes_in_phase(tree: &Tree, phase_id: &str) -> usize {
    match tree.as_deref() {
        None => 0,
        Some(Step::Node { node, next }) => {
            usize::from(node.phase_id.as_deref() == Some(phase_id))
                + count_nodes_in_phase(next, phase_id)
        }
        Some(Step::Parallel { branches, next }) => {
            branches
                .iter()
                .map(|b| count_nodes_in_phase(&b.first_step, phase_id))
                .sum::<usize>()
                + count_nodes_in_phase(next, phase_id)
        }
    }
}

/// Rows a subtree occupies when branches are stacked; an empty chain takes one
pub fn subtree_height(tree: &Tree) -> usize {
    match tree.as_deref() {
        None => 1,
        Some(Step::Node { next, .. }) => subtree_height(next).max(1),
        Some(Step::Parallel { branches, next }) => {
            let stacked: usize = branches.iter().map(|b| subtree_height(&b.first_step)).sum();
            stacked.max(subtree_height(next))
        }
    }
}

/// Every branch in the tree: each fork's own branches, then nested ones
pub fn collect_branches(tree: &Tree) -> Vec<&Branch> {
    match tree.as_deref() {
        None | Some(Step::Node { next: None, .. }) => Vec::new(),
        Some(Step::Node { next, .. }) => collect_branches(next),
        Some(Step::Parallel { branches, next }) => {
            let mut all: Vec<&Branch> = branches.iter().collect();
            for branch in branches {
                all.extend(collect_branches(&branch.first_step));
            }
            all.extend(collect_branches(next));
            all
        }
    }
}

/// Labels along the spine; forks show as [`FORK_MARKER`]
pub fn spine_labels(tree: &Tree) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = tree;
    while let Some(step) = current {
        match step.as_ref() {
            Step::Node { node, .. } => labels.push(node.label.clone()),
            Step::Parallel { .. } => labels.push(FORK_MARKER.to_string()),
        }
        current = step.next();
    }
    labels
}

// ========== Guided Builder ==========

/// Color of phases created without one
pub const DEFAULT_PHASE_COLOR: &str = "#3b82f6";

/// A named stage used to group nodes visually
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardPhase {
    pub id: String,
    pub label: String,
    pub color: String,
}

impl WizardPhase {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self::with_id(new_entity_id("wp"), label, color)
    }

    pub fn with_id(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Everything the guided builder edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub phases: Vec<WizardPhase>,
    #[serde(rename = "rootStep")]
    pub root: Tree,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: "Marketing".to_string(),
            icon: "zap".to_string(),
            phases: Vec::new(),
            root: None,
        }
    }
}

/// Node fields as typed into the "what comes next" form
#[derive(Debug, Clone, Default)]
pub struct NodeDraft {
    pub node_type: NodeType,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub phase_id: Option<String>,
}

impl NodeDraft {
    pub fn new(node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            node_type,
            label: label.into(),
            ..Self::default()
        }
    }
}

fn same_tree(a: &Tree, b: &Tree) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Step-by-step flow construction around a focus path.
///
/// The focus addresses where the next confirmed node goes. Confirming a node
/// moves the focus onto it; forks leave the focus in front of them so the
/// caller can pick a branch with [`WizardBuilder::navigate_to`].
#[derive(Debug, Clone, Default)]
pub struct WizardBuilder {
    state: WizardState,
    focus: Vec<String>,
}

impl WizardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: WizardState) -> Self {
        Self {
            state,
            focus: Vec::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn into_state(self) -> WizardState {
        self.state
    }

    pub fn root(&self) -> &Tree {
        &self.state.root
    }

    pub fn focus(&self) -> &[String] {
        &self.focus
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.state.description = description.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.state.category = category.into();
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.state.icon = icon.into();
    }

    /// Splice `step` in at the focus. False when the focus is stale.
    fn insert_at_focus(&mut self, step: Step) -> bool {
        let updated = insert_after(&self.state.root, &self.focus, step);
        if same_tree(&updated, &self.state.root) {
            warn!(focus = ?self.focus, "focus does not resolve, step dropped");
            return false;
        }
        self.state.root = updated;
        true
    }

    /// Add a node at the focus and move the focus onto it.
    ///
    /// Returns the new node id, or `None` when the focus no longer resolves.
    pub fn confirm_node(&mut self, draft: NodeDraft) -> Result<Option<String>> {
        let label = draft.label.trim();
        if label.is_empty() {
            return Err(CanvasError::invalid("node label is required"));
        }

        let node = WizardNode {
            id: new_entity_id("wn"),
            icon: draft.icon,
            node_type: draft.node_type,
            label: label.to_string(),
            description: draft.description.trim().to_string(),
            phase_id: draft.phase_id,
        };
        let id = node.id.clone();
        if !self.insert_at_focus(Step::node(node)) {
            return Ok(None);
        }

        self.focus.push(id.clone());
        debug!(node = %id, depth = self.focus.len(), "wizard node confirmed");
        Ok(Some(id))
    }

    /// Open a fork at the focus. Blank labels become "Branch N".
    ///
    /// Returns the branch ids, or `None` when the focus no longer resolves.
    pub fn add_parallel(&mut self, labels: &[&str]) -> Result<Option<Vec<String>>> {
        if !(MIN_BRANCHES..=MAX_BRANCHES).contains(&labels.len()) {
            return Err(CanvasError::invalid(format!(
                "a fork needs {MIN_BRANCHES} to {MAX_BRANCHES} branches, got {}",
                labels.len()
            )));
        }

        let branches: Vec<Branch> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| match label.trim() {
                "" => Branch::new(format!("Branch {}", i + 1)),
                label => Branch::new(label),
            })
            .collect();
        let ids = branches.iter().map(|b| b.id.clone()).collect();

        if !self.insert_at_focus(Step::parallel(branches)) {
            return Ok(None);
        }
        debug!(branches = labels.len(), "wizard fork added");
        Ok(Some(ids))
    }

    /// Remove a node; the focus returns to the start
    pub fn remove_node(&mut self, id: &str) -> bool {
        let updated = remove_node(&self.state.root, id);
        if same_tree(&updated, &self.state.root) {
            return false;
        }
        self.state.root = updated;
        self.focus.clear();
        true
    }

    /// Remove the fork addressed by `path`; the focus moves to `path`
    pub fn remove_parallel(&mut self, path: &[String]) -> bool {
        let updated = remove_parallel(&self.state.root, path);
        if same_tree(&updated, &self.state.root) {
            return false;
        }
        self.state.root = updated;
        self.focus = path.to_vec();
        true
    }

    pub fn update_node(&mut self, id: &str, edit: impl FnOnce(&mut WizardNode)) -> bool {
        let updated = update_node(&self.state.root, id, edit);
        let changed = !same_tree(&updated, &self.state.root);
        self.state.root = updated;
        changed
    }

    pub fn add_branch(&mut self, fork_path: &[String]) -> bool {
        let Some(count) = fork_at(&self.state.root, fork_path).map(|f| f.branches().len()) else {
            return false;
        };
        let updated = add_branch(
            &self.state.root,
            fork_path,
            Branch::new(format!("Branch {}", count + 1)),
        );
        let changed = !same_tree(&updated, &self.state.root);
        self.state.root = updated;
        changed
    }

    pub fn remove_branch(&mut self, branch_id: &str) -> bool {
        let updated = remove_branch(&self.state.root, branch_id);
        let changed = !same_tree(&updated, &self.state.root);
        self.state.root = updated;
        changed
    }

    pub fn rename_branch(&mut self, branch_id: &str, label: &str) -> Result<bool> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CanvasError::invalid("branch label is required"));
        }
        let updated = rename_branch(&self.state.root, branch_id, label);
        let changed = !same_tree(&updated, &self.state.root);
        self.state.root = updated;
        Ok(changed)
    }

    pub fn navigate_back(&mut self) -> Option<String> {
        self.focus.pop()
    }

    pub fn navigate_to(&mut self, path: Vec<String>) {
        self.focus = path;
    }

    /// Close the current branch: drop the focused node and any branch ids
    /// trailing behind it.
    pub fn end_here(&mut self) {
        self.focus.pop();
        while let Some(last) = self.focus.last() {
            if find_node(&self.state.root, last).is_some() {
                break;
            }
            self.focus.pop();
        }
    }

    pub fn phases(&self) -> &[WizardPhase] {
        &self.state.phases
    }

    pub fn add_phase(&mut self, label: &str, color: Option<&str>) -> Result<String> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CanvasError::invalid("phase name is required"));
        }
        let phase = WizardPhase::new(label, color.unwrap_or(DEFAULT_PHASE_COLOR));
        let id = phase.id.clone();
        self.state.phases.push(phase);
        Ok(id)
    }

    /// Drop a phase and clear it from every node
    pub fn remove_phase(&mut self, phase_id: &str) -> bool {
        let before = self.state.phases.len();
        self.state.phases.retain(|p| p.id != phase_id);
        self.state.root = clear_phase(&self.state.root, phase_id);
        self.state.phases.len() != before
    }

    pub fn node_count(&self) -> usize {
        count_nodes(&self.state.root)
    }

    pub fn can_create(&self) -> bool {
        !self.state.name.trim().is_empty() && self.node_count() > 0
    }

    /// Canvas rendition of the current tree
    pub fn preview(&self) -> Option<ConvertedFlow> {
        WizardConverter::convert(&self.state)
    }

    /// Turn the flow into a draft system
    pub fn finish(&self) -> Result<AutomationSystem> {
        if !self.can_create() {
            return Err(CanvasError::invalid("a flow needs a name and at least one node"));
        }
        let system = WizardConverter::to_system(&self.state)
            .ok_or_else(|| CanvasError::invalid("flow is empty"))?;
        info!(name = %system.name, nodes = system.nodes.len(), "wizard finished");
        Ok(system)
    }
}
