// Helper functions to generate test models and flows with various shapes

#![allow(dead_code)]

use flow_canvas::{
    Edge, GraphModel, GraphNode, Group, GroupColor, NodeDraft, NodeType, Note, NoteColor, Point,
    Rectangle, WizardBuilder, WizardState,
};

/// Node with a readable id at a fixed position
pub fn node(id: &str, x: f64, y: f64) -> GraphNode {
    GraphNode::with_id(id, NodeType::Process, id.to_uppercase(), Point::new(x, y))
}

/// Model with `ids` laid out left to right and no connections
pub fn create_nodes(ids: &[&str]) -> GraphModel {
    let mut model = GraphModel::new();
    for (i, id) in ids.iter().enumerate() {
        model.add_node(node(id, i as f64 * 300.0, 0.0)).unwrap();
    }
    model
}

/// A → B → C
pub fn create_chain() -> GraphModel {
    let mut model = create_nodes(&["a", "b", "c"]);
    model.add_edge(Edge::new("a", "b")).unwrap();
    model.add_edge(Edge::new("b", "c")).unwrap();
    model
}

/// A fans out to B and C, both joining into D
pub fn create_diamond() -> GraphModel {
    let mut model = create_nodes(&["a", "b", "c", "d"]);
    for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
        model.add_edge(Edge::new(from, to)).unwrap();
    }
    model
}

/// Chain plus a group around it and a note below
pub fn create_annotated_chain() -> GraphModel {
    let mut model = create_chain();
    model
        .add_group(Group::with_id(
            "g",
            "Pipeline",
            Rectangle::new(-20.0, -40.0, 900.0, 160.0),
            GroupColor::Blue,
        ))
        .unwrap();
    model.add_note(Note::with_id(
        "n",
        "runs nightly",
        Rectangle::new(0.0, 200.0, 200.0, 100.0),
        NoteColor::Yellow,
    ))
    .unwrap();
    model
}

/// Trigger, then a two-way fork with one node per branch, then a join step
pub fn create_forked_flow() -> WizardState {
    let mut builder = WizardBuilder::new();
    builder.set_name("Support triage");
    let start = builder
        .confirm_node(NodeDraft::new(NodeType::Trigger, "Ticket opened"))
        .unwrap()
        .unwrap();
    let branches = builder.add_parallel(&["Urgent", "Normal"]).unwrap().unwrap();

    for (branch, label) in branches.iter().zip(["Page on-call", "Queue"]) {
        builder.navigate_to(vec![start.clone(), branch.clone()]);
        builder
            .confirm_node(NodeDraft::new(NodeType::Process, label))
            .unwrap();
    }

    builder.navigate_to(Vec::new());
    builder
        .confirm_node(NodeDraft::new(NodeType::Output, "Close ticket"))
        .unwrap();
    builder.into_state()
}
