//! Maps a guided-builder step tree onto canvas nodes, edges and phase groups
//!
//! Steps become nodes on a column grid. A fork stacks its branches by
//! subtree height starting at the fork's row; the branch tails all connect
//! into whatever follows the fork. An empty branch passes its predecessor
//! straight through to the merge.

use crate::step_tree::{subtree_height, Step, Tree, WizardPhase, WizardState};
use crate::{AutomationSystem, Edge, GraphModel, GraphNode, Group, GroupColor, Point, Rectangle, Viewport};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const COLUMN_SPACING: f64 = 340.0;
pub const ROW_SPACING: f64 = 160.0;
pub const X_OFFSET: f64 = 40.0;
pub const Y_OFFSET: f64 = 58.0;

/// Node footprint assumed when sizing groups and the preview viewport
const CARD_WIDTH: f64 = 230.0;
const CARD_HEIGHT: f64 = 92.0;

const GROUP_PAD_LEFT: f64 = 25.0;
const GROUP_PAD_RIGHT: f64 = 25.0;
const GROUP_PAD_TOP: f64 = 40.0;
const GROUP_PAD_BOTTOM: f64 = 16.0;

/// Preview area the initial zoom is fitted to
const PREVIEW_WIDTH: f64 = 760.0;
const PREVIEW_HEIGHT: f64 = 460.0;
const PREVIEW_MARGIN: f64 = 80.0;
const PREVIEW_PAN: f64 = 20.0;

/// Name given to flows finished without one
pub const DEFAULT_SYSTEM_NAME: &str = "New system";

/// Canvas content produced from a step tree
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFlow {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    pub viewport: Viewport,
}

impl ConvertedFlow {
    pub fn to_model(&self) -> GraphModel {
        GraphModel::from_parts(
            self.nodes.clone(),
            self.edges.clone(),
            self.groups.clone(),
            Vec::new(),
        )
    }

    /// Package as a draft system carrying the builder's metadata
    pub fn into_system(self, state: &WizardState) -> AutomationSystem {
        let name = state.name.trim();
        let mut system = AutomationSystem::new(if name.is_empty() {
            DEFAULT_SYSTEM_NAME
        } else {
            name
        });
        system.description = state.description.trim().to_string();
        system.category = state.category.clone();
        system.icon = state.icon.clone();
        system.nodes = self.nodes;
        system.connections = self.edges;
        system.groups = Some(self.groups);
        system.canvas_zoom = Some(self.viewport.zoom);
        system.canvas_pan = Some(self.viewport.pan);
        system
    }
}

pub struct WizardConverter;

impl WizardConverter {
    /// Convert the builder state. `None` when the tree holds no node, which
    /// includes forks whose branches are all empty.
    pub fn convert(state: &WizardState) -> Option<ConvertedFlow> {
        state.root.as_ref()?;

        let mut flattener = Flattener::default();
        flattener.flatten(&state.root, Vec::new(), 0, 0);
        let Flattener {
            nodes,
            edges,
            phase_of,
            ..
        } = flattener;
        if nodes.is_empty() {
            return None;
        }

        let groups = build_groups(&state.phases, &nodes, &phase_of);
        let viewport = preview_viewport(&nodes);
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            groups = groups.len(),
            "flow converted"
        );

        Some(ConvertedFlow {
            nodes,
            edges,
            groups,
            viewport,
        })
    }

    /// Convert straight to a draft system
    pub fn to_system(state: &WizardState) -> Option<AutomationSystem> {
        Self::convert(state).map(|flow| flow.into_system(state))
    }
}

fn grid_position(col: i64, row: usize) -> Point {
    Point::new(
        X_OFFSET + col as f64 * COLUMN_SPACING,
        Y_OFFSET + row as f64 * ROW_SPACING,
    )
}

#[derive(Default)]
struct Flattener {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    seen_edges: HashSet<(String, String)>,
    phase_of: HashMap<String, String>,
}

impl Flattener {
    fn connect(&mut self, from: &str, to: &str) {
        if self.seen_edges.insert((from.to_string(), to.to_string())) {
            self.edges.push(Edge::new(from, to));
        }
    }

    /// Place `step` and its continuation. Returns the ids that feed whatever
    /// comes next and the last column used.
    fn flatten(&mut self, step: &Tree, prev: Vec<String>, col: i64, row: usize) -> (Vec<String>, i64) {
        let Some(step) = step else {
            return (prev, col - 1);
        };

        match step.as_ref() {
            Step::Node { node, next } => {
                let placed = GraphNode::with_id(
                    node.id.clone(),
                    node.node_type,
                    node.label.clone(),
                    grid_position(col, row),
                )
                .with_description(node.description.clone())
                .with_icon(node.icon.clone());
                self.nodes.push(placed);

                if let Some(phase) = &node.phase_id {
                    self.phase_of.insert(node.id.clone(), phase.clone());
                }
                for from in &prev {
                    self.connect(from, &node.id);
                }

                self.flatten(next, vec![node.id.clone()], col + 1, row)
            }
            Step::Parallel { branches, next } => {
                let mut branch_row = row;
                let mut last_col = col - 1;
                let mut tails = Vec::new();

                for branch in branches {
                    let (branch_tails, branch_col) =
                        self.flatten(&branch.first_step, prev.clone(), col, branch_row);
                    for tail in branch_tails {
                        if !tails.contains(&tail) {
                            tails.push(tail);
                        }
                    }
                    last_col = last_col.max(branch_col);
                    branch_row += subtree_height(&branch.first_step);
                }

                self.flatten(next, tails, last_col + 1, row)
            }
        }
    }
}

fn padded_box(cluster: &[&GraphNode]) -> Rectangle {
    let min_x = cluster.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    let max_x = cluster.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = cluster.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
    let max_y = cluster.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max);

    Rectangle::new(
        min_x - GROUP_PAD_LEFT,
        min_y - GROUP_PAD_TOP,
        max_x - min_x + CARD_WIDTH + GROUP_PAD_LEFT + GROUP_PAD_RIGHT,
        max_y - min_y + CARD_HEIGHT + GROUP_PAD_TOP + GROUP_PAD_BOTTOM,
    )
}

/// One group per cluster of same-phase nodes.
///
/// A node joins the first cluster whose padded box would not take in the
/// center of a node from another phase; otherwise it opens a new cluster.
fn build_groups(
    phases: &[WizardPhase],
    nodes: &[GraphNode],
    phase_of: &HashMap<String, String>,
) -> Vec<Group> {
    let mut groups = Vec::new();

    for phase in phases {
        let mut members: Vec<&GraphNode> = nodes
            .iter()
            .filter(|n| phase_of.get(&n.id) == Some(&phase.id))
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        let foreign_centers: Vec<Point> = nodes
            .iter()
            .filter(|n| matches!(phase_of.get(&n.id), Some(p) if *p != phase.id))
            .map(|n| Point::new(n.x + CARD_WIDTH / 2.0, n.y + CARD_HEIGHT / 2.0))
            .collect();

        let mut clusters: Vec<Vec<&GraphNode>> = Vec::new();
        for node in members {
            let target = clusters.iter_mut().find(|cluster| {
                let mut candidate: Vec<&GraphNode> = cluster.to_vec();
                candidate.push(node);
                let area = padded_box(&candidate);
                !foreign_centers.iter().any(|c| {
                    c.x > area.x && c.x < area.right() && c.y > area.y && c.y < area.bottom()
                })
            });
            match target {
                Some(cluster) => cluster.push(node),
                None => clusters.push(vec![node]),
            }
        }

        for (index, cluster) in clusters.iter().enumerate() {
            let id = if index == 0 {
                format!("wg-{}", phase.id)
            } else {
                format!("wg-{}-{}", phase.id, index)
            };
            groups.push(Group::with_id(
                id,
                phase.label.clone(),
                padded_box(cluster),
                GroupColor::from_hex(&phase.color),
            ));
        }
    }

    groups
}

fn preview_viewport(nodes: &[GraphNode]) -> Viewport {
    let max_x = nodes.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max) + CARD_WIDTH;
    let max_y = nodes.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max) + CARD_HEIGHT;
    let zoom = (PREVIEW_WIDTH / (max_x + PREVIEW_MARGIN))
        .min(PREVIEW_HEIGHT / (max_y + PREVIEW_MARGIN))
        .min(1.0);
    Viewport::new(zoom, Point::new(PREVIEW_PAN, PREVIEW_PAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step_tree::{append, insert_after, Branch, Step, WizardNode};
    use crate::NodeType;
    use pretty_assertions::assert_eq;

    fn node(id: &str) -> WizardNode {
        WizardNode {
            id: id.to_string(),
            ..WizardNode::new(NodeType::Process, id.to_uppercase())
        }
    }

    fn phased(id: &str, phase: &str) -> WizardNode {
        WizardNode {
            phase_id: Some(phase.to_string()),
            ..node(id)
        }
    }

    fn branch(id: &str) -> Branch {
        Branch {
            id: id.to_string(),
            ..Branch::new(id)
        }
    }

    fn state_with(root: Tree) -> WizardState {
        WizardState {
            root,
            ..WizardState::default()
        }
    }

    fn edge_pairs(flow: &ConvertedFlow) -> Vec<(&str, &str)> {
        flow.edges.iter().map(|e| (e.from.as_str(), e.to.as_str())).collect()
    }

    fn position(flow: &ConvertedFlow, id: &str) -> Point {
        flow.nodes.iter().find(|n| n.id == id).map(|n| n.position()).unwrap()
    }

    #[test]
    fn test_empty_tree_converts_to_nothing() {
        assert!(WizardConverter::convert(&WizardState::default()).is_none());
    }

    #[test]
    fn test_linear_chain() {
        let mut root = append(&None, Step::node(node("a")));
        root = append(&root, Step::node(node("b")));

        let flow = WizardConverter::convert(&state_with(root)).unwrap();

        assert_eq!(edge_pairs(&flow), vec![("a", "b")]);
        assert_eq!(position(&flow, "a"), Point::new(40.0, 58.0));
        assert_eq!(position(&flow, "b"), Point::new(380.0, 58.0));
    }

    #[test]
    fn test_fork_stacks_branches_and_merges() {
        // a -> [p: b, q: c -> d] -> e
        let mut root = append(&None, Step::node(node("a")));
        root = append(&root, Step::parallel(vec![branch("p"), branch("q")]));
        root = append(&root, Step::node(node("e")));
        root = insert_after(&root, &["a".into(), "p".into()], Step::node(node("b")));
        root = insert_after(&root, &["a".into(), "q".into()], Step::node(node("c")));
        root = insert_after(&root, &["a".into(), "q".into(), "c".into()], Step::node(node("d")));

        let flow = WizardConverter::convert(&state_with(root)).unwrap();

        assert_eq!(position(&flow, "b"), Point::new(380.0, 58.0));
        assert_eq!(position(&flow, "c"), Point::new(380.0, 218.0));
        assert_eq!(position(&flow, "d"), Point::new(720.0, 218.0));
        // Merge lands after the longest branch
        assert_eq!(position(&flow, "e"), Point::new(1060.0, 58.0));
        assert_eq!(
            edge_pairs(&flow),
            vec![("a", "b"), ("a", "c"), ("c", "d"), ("b", "e"), ("d", "e")]
        );
    }

    #[test]
    fn test_empty_branch_passes_predecessor_through_once() {
        // a -> [p: empty, q: empty] -> e
        let mut root = append(&None, Step::node(node("a")));
        root = append(&root, Step::parallel(vec![branch("p"), branch("q")]));
        root = append(&root, Step::node(node("e")));

        let flow = WizardConverter::convert(&state_with(root)).unwrap();

        assert_eq!(edge_pairs(&flow), vec![("a", "e")]);
        assert_eq!(position(&flow, "e"), Point::new(380.0, 58.0));
    }

    #[test]
    fn test_fork_of_empty_branches_yields_single_node() {
        let mut root = append(&None, Step::node(node("a")));
        root = append(&root, Step::parallel(vec![branch("p"), branch("q"), branch("r")]));

        let flow = WizardConverter::convert(&state_with(root)).unwrap();

        assert_eq!(flow.nodes.len(), 1);
        assert!(flow.edges.is_empty());
    }

    #[test]
    fn test_root_fork_of_empty_branches_converts_to_nothing() {
        let root = append(&None, Step::parallel(vec![branch("p"), branch("q"), branch("r")]));
        let state = state_with(root);

        assert!(WizardConverter::convert(&state).is_none());
        assert!(WizardConverter::to_system(&state).is_none());
    }

    #[test]
    fn test_phase_split_around_foreign_node() {
        // a(A) -> b(B) -> c(A): the A group must not swallow b
        let mut root = append(&None, Step::node(phased("a", "A")));
        root = append(&root, Step::node(phased("b", "B")));
        root = append(&root, Step::node(phased("c", "A")));
        let state = WizardState {
            phases: vec![
                WizardPhase::with_id("A", "Collect", "#3b82f6"),
                WizardPhase::with_id("B", "Process", "#123456"),
            ],
            ..state_with(root)
        };

        let flow = WizardConverter::convert(&state).unwrap();
        let ids: Vec<&str> = flow.groups.iter().map(|g| g.id.as_str()).collect();

        assert_eq!(ids, vec!["wg-A", "wg-A-1", "wg-B"]);
        assert_eq!(flow.groups[0].color, GroupColor::Blue);
        assert_eq!(flow.groups[2].color, GroupColor::Purple);
        assert_eq!(flow.groups[0].bounds(), Rectangle::new(15.0, 18.0, 280.0, 148.0));
    }

    #[test]
    fn test_adjacent_same_phase_nodes_share_a_group() {
        let mut root = append(&None, Step::node(phased("a", "A")));
        root = append(&root, Step::node(phased("b", "A")));
        let state = WizardState {
            phases: vec![WizardPhase::with_id("A", "Collect", "#10b981")],
            ..state_with(root)
        };

        let flow = WizardConverter::convert(&state).unwrap();

        assert_eq!(flow.groups.len(), 1);
        assert_eq!(flow.groups[0].width, 340.0 + 230.0 + 50.0);
    }

    #[test]
    fn test_preview_viewport() {
        let root = append(&None, Step::node(node("a")));

        let flow = WizardConverter::convert(&state_with(root)).unwrap();

        // max_x = 270, max_y = 150: zoom is capped at 1
        assert_eq!(flow.viewport, Viewport::new(1.0, Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_into_system_defaults_name() {
        let root = append(&None, Step::node(node("a")));
        let state = WizardState {
            name: "   ".into(),
            ..state_with(root)
        };

        let system = WizardConverter::to_system(&state).unwrap();

        assert_eq!(system.name, DEFAULT_SYSTEM_NAME);
        assert_eq!(system.nodes.len(), 1);
        assert_eq!(system.canvas_zoom, Some(1.0));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut root = append(&None, Step::node(node("a")));
        root = append(&root, Step::parallel(vec![branch("p"), branch("q")]));
        let state = state_with(root);

        assert_eq!(WizardConverter::convert(&state), WizardConverter::convert(&state));
    }
}
