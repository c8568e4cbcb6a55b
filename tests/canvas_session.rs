// End-to-end editing scenarios driven through the session reducer

#[path = "fixtures/sample_graphs.rs"]
mod sample_graphs;

use assert_matches::assert_matches;
use flow_canvas::session::{EditTarget, Selection};
use flow_canvas::{
    AutomationSystem, CanvasError, Command, ConnectionRejection, EditorConfig, Edge, Point, Port,
    Session, Target, ValidatedModel, WizardConverter,
};
use pretty_assertions::assert_eq;
use sample_graphs::*;
use tempfile::TempDir;

fn edge_pairs(session: &Session) -> Vec<(String, String)> {
    session
        .model()
        .edges()
        .iter()
        .map(|e| (e.from.clone(), e.to.clone()))
        .collect()
}

#[test]
fn test_closing_a_loop_is_refused() {
    let mut model = create_chain();

    let err = model.add_edge(Edge::new("c", "a")).unwrap_err();

    assert_matches!(err, CanvasError::Rejected(ConnectionRejection::Cycle));
    assert_eq!(model.edge_count(), 2);
}

#[test]
fn test_refused_port_connection_leaves_history_alone() {
    let mut session = Session::with_model(create_chain(), EditorConfig::default());
    let before = edge_pairs(&session);

    for (node, port) in [("c", Port::Right), ("a", Port::Left)] {
        session.apply(Command::PointerDown {
            target: Target::Port {
                node: node.into(),
                port,
            },
            screen: Point::default(),
            shift: false,
        });
    }

    assert_eq!(edge_pairs(&session), before);
    assert!(!session.history().can_undo());
    assert_eq!(
        session.notice().map(|n| n.message.as_str()),
        Some("circular connection not allowed")
    );
}

#[test]
fn test_edit_session_undo_redo_round_trip() {
    let mut session = Session::with_model(create_diamond(), EditorConfig::default());
    let original = session.model().snapshot();

    session.apply(Command::AutoLayout);
    session.apply(Command::PointerDown {
        target: Target::Edge {
            from: "a".into(),
            to: "b".into(),
        },
        screen: Point::default(),
        shift: false,
    });
    session.apply(Command::DeleteSelection);
    let edited = session.model().snapshot();
    assert_eq!(session.history().undo_depth(), 2);

    session.apply(Command::Undo);
    session.apply(Command::Undo);
    assert_eq!(session.model().snapshot(), original);

    session.apply(Command::Redo);
    session.apply(Command::Redo);
    assert_eq!(session.model().snapshot(), edited);
}

#[test]
fn test_group_edit_and_delete() {
    let mut session = Session::with_model(create_annotated_chain(), EditorConfig::default());

    session.apply(Command::BeginEdit(EditTarget::Group("g".into())));
    session.apply(Command::CommitGroupEdit {
        id: "g".into(),
        label: "Nightly".into(),
        description: Some("batch".into()),
    });
    assert_eq!(session.model().get_group("g").unwrap().label, "Nightly");
    assert!(session.editing().is_none());

    session.apply(Command::PointerDown {
        target: Target::Group("g".into()),
        screen: Point::new(100.0, 100.0),
        shift: false,
    });
    session.apply(Command::PointerUp);
    assert_eq!(session.selection(), Some(&Selection::Group("g".into())));

    session.apply(Command::DeleteSelection);
    assert!(session.model().get_group("g").is_none());
    assert_eq!(session.model().node_count(), 3);
}

#[test]
fn test_note_resize_is_clamped_and_undoable() {
    let mut session = Session::with_model(create_annotated_chain(), EditorConfig::default());
    let start = session.model().get_note("n").unwrap().bounds();

    session.apply(Command::PointerDown {
        target: Target::NoteResize("n".into()),
        screen: Point::new(240.0, 340.0),
        shift: false,
    });
    session.apply(Command::PointerMove {
        screen: Point::new(-2000.0, -2000.0),
    });
    let outcome = session.apply(Command::PointerUp);

    let note = session.model().get_note("n").unwrap();
    assert!(outcome.recorded);
    assert!(note.width > 0.0 && note.width < start.width);

    session.apply(Command::Undo);
    assert_eq!(session.model().get_note("n").unwrap().bounds(), start);
}

#[test]
fn test_search_then_focus_centers_node() {
    let mut session = Session::with_model(create_chain(), EditorConfig::default());
    session.apply(Command::ScreenResized {
        width: 1000.0,
        height: 600.0,
    });

    session.apply(Command::OpenSearch);
    session.apply(Command::Search("b".into()));
    let hits: Vec<String> = session.search_results().iter().map(|n| n.id.clone()).collect();
    assert_eq!(hits, vec!["b".to_string()]);

    session.apply(Command::FocusNode("b".into()));
    let bounds = session.model().get_node("b").unwrap().bounds();
    let center = session
        .viewport()
        .canvas_to_screen(Point::new(bounds.center_x(), bounds.center_y()));
    assert!(center.approx_eq(Point::new(500.0, 300.0), 1e-6));
}

#[test]
fn test_converted_flow_is_valid_and_saves() {
    let state = create_forked_flow();
    let flow = WizardConverter::convert(&state).unwrap();
    assert_eq!(flow.nodes.len(), 4);
    assert_eq!(flow.edges.len(), 4);

    let model = flow.to_model();
    assert!(model.validate().is_valid());

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("triage.json");
    let system = WizardConverter::to_system(&state).unwrap();
    system.save(&path).unwrap();

    let loaded = AutomationSystem::load(&path).unwrap();
    assert_eq!(loaded.name, "Support triage");
    assert_eq!(loaded.to_model().snapshot(), model.snapshot());
    let viewport = loaded.viewport().unwrap();
    assert!((viewport.zoom - flow.viewport.zoom).abs() < 1e-9);
    assert!(viewport.pan.approx_eq(flow.viewport.pan, 1e-9));
}
