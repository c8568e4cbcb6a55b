// Property tests for the graph, layout, geometry, history and step-tree invariants

#[path = "fixtures/sample_graphs.rs"]
mod sample_graphs;

use flow_canvas::step_tree::{insert_after, remove_node};
use flow_canvas::{
    ConnectionGuard, ConnectionRejection, ConnectorPath, CurveStyle, Edge, GraphModel,
    HistoryManager, LayoutEngine, Port, Rectangle, RestoreSource, Step, Tree, WizardNode,
    NodeType, Point,
};
use proptest::prelude::*;
use sample_graphs::node;
use std::rc::Rc;

const N: usize = 8;

fn id(i: usize) -> String {
    format!("n{i}")
}

/// Edges that only run from lower to higher index, so always acyclic
fn forward_edges() -> impl Strategy<Value = Vec<Edge>> {
    prop::collection::vec((0..N, 0..N), 0..20).prop_map(|pairs| {
        let mut edges: Vec<Edge> = Vec::new();
        for (a, b) in pairs {
            let (lo, hi) = (a.min(b), a.max(b));
            let edge = Edge::new(id(lo), id(hi));
            if lo != hi && !edges.contains(&edge) {
                edges.push(edge);
            }
        }
        edges
    })
}

fn port() -> impl Strategy<Value = Port> {
    prop_oneof![
        Just(Port::Top),
        Just(Port::Right),
        Just(Port::Bottom),
        Just(Port::Left)
    ]
}

fn chain_tree(len: usize) -> (Tree, Vec<String>) {
    let ids: Vec<String> = (0..len).map(|i| format!("s{i}")).collect();
    let mut tree: Tree = None;
    for id in ids.iter().rev() {
        let node = WizardNode {
            id: id.clone(),
            ..WizardNode::new(NodeType::Process, id.to_uppercase())
        };
        tree = Some(Rc::new(Step::node(node).with_next(tree)));
    }
    (tree, ids)
}

proptest! {
    #[test]
    fn forward_edge_accepted_then_reverse_refused(
        edges in forward_edges(),
        a in 0..N,
        b in 0..N,
    ) {
        prop_assume!(a != b);
        let (lo, hi) = (a.min(b), a.max(b));
        let candidate = Edge::new(id(lo), id(hi));
        prop_assume!(!edges.contains(&candidate));

        prop_assert!(ConnectionGuard::validate(&edges, &candidate).is_ok());

        let mut with_candidate = edges.clone();
        with_candidate.push(candidate);
        prop_assert_eq!(
            ConnectionGuard::validate(&with_candidate, &Edge::new(id(hi), id(lo))),
            Err(ConnectionRejection::Cycle)
        );
    }

    #[test]
    fn layout_places_successors_in_later_layers(edges in forward_edges()) {
        let nodes: Vec<_> = (0..N).map(|i| node(&id(i), 0.0, 0.0)).collect();

        let layout = LayoutEngine::compute(&nodes, &edges);

        for edge in &edges {
            let from = layout.layer_of(&edge.from).unwrap();
            let to = layout.layer_of(&edge.to).unwrap();
            prop_assert!(to > from, "{} -> {} placed in layers {} -> {}", edge.from, edge.to, from, to);
        }
    }

    #[test]
    fn bezier_midpoint_is_half_way(
        ax in -500.0..500.0f64,
        ay in -500.0..500.0f64,
        bx in -500.0..500.0f64,
        by in -500.0..500.0f64,
        from_port in port(),
        to_port in port(),
    ) {
        let path = ConnectorPath::between(
            &Rectangle::node_box(Point::new(ax, ay)),
            from_port,
            &Rectangle::node_box(Point::new(bx, by)),
            to_port,
            CurveStyle::Bezier,
        );

        prop_assert!(path.midpoint().approx_eq(path.point_at(0.5), 1e-9));
    }

    #[test]
    fn undo_and_redo_are_inverse(moves in prop::collection::vec((0..3usize, -200.0..200.0f64), 1..10)) {
        let mut model = sample_graphs::create_chain();
        let mut history = HistoryManager::default();
        for (index, dx) in &moves {
            let before = model.snapshot();
            let target = model.nodes()[*index].clone();
            model
                .move_node(&target.id, Point::new(target.x + dx, target.y))
                .unwrap();
            history.record_if_changed(before, &model.snapshot());
        }
        prop_assume!(history.can_undo());
        let current = model.snapshot();

        let previous = history.undo(current.clone()).unwrap();
        model.restore(previous.clone(), RestoreSource::Undo);
        let next = history.redo(model.snapshot()).unwrap();
        prop_assert_eq!(&next, &current);

        model.restore(next, RestoreSource::Redo);
        let back = history.undo(model.snapshot()).unwrap();
        prop_assert_eq!(back, previous);
    }

    #[test]
    fn step_insert_then_remove_restores_tree(len in 0..6usize, at in 0..6usize) {
        let (tree, ids) = chain_tree(len);
        let path: Vec<String> = ids.iter().take(at.min(len)).cloned().collect();
        let inserted = WizardNode::new(NodeType::Ai, "Inserted");
        let inserted_id = inserted.id.clone();

        let grown = insert_after(&tree, &path, Step::node(inserted));
        prop_assert_ne!(&grown, &tree);

        prop_assert_eq!(remove_node(&grown, &inserted_id), tree);
    }
}

#[test]
fn test_rejected_cycle_keeps_edges() {
    let mut model: GraphModel = sample_graphs::create_chain();

    assert!(model.add_edge(Edge::new("c", "a")).is_err());

    let pairs: Vec<(&str, &str)> = model
        .edges()
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
}
