use anyhow::Result;
use flow_canvas::{
    AutomationSystem, Command, EditorConfig, Edge, NodeDraft, NodeType, Port, Session,
    WizardBuilder,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Flow Canvas - headless walkthrough");
    println!("==================================\n");

    let config = EditorConfig::load_or_default(&PathBuf::from("flow_canvas.json"))?;

    // Build a flow step by step
    let mut builder = WizardBuilder::new();
    builder.set_name("Lead intake");
    let collect = builder.add_phase("Collect", None)?;
    let mut form = NodeDraft::new(NodeType::Trigger, "Form submitted");
    form.phase_id = Some(collect);
    let start = builder.confirm_node(form)?.unwrap_or_default();
    builder.confirm_node(NodeDraft::new(NodeType::Ai, "Score lead"))?;
    let score = builder.focus().to_vec();
    if let Some(branches) = builder.add_parallel(&["Hot", "Cold"])? {
        for (branch, label) in branches.iter().zip(["Call sales", "Nurture email"]) {
            let mut path = score.clone();
            path.push(branch.clone());
            builder.navigate_to(path);
            builder.confirm_node(NodeDraft::new(NodeType::Output, label))?;
        }
    }
    println!("✓ Built flow with {} steps", builder.node_count());

    let system = builder.finish()?;
    println!("✓ Converted to canvas: {} nodes, {} connections", system.nodes.len(), system.connections.len());

    // Edit it on the canvas
    let mut session = Session::with_model(system.to_model(), config);
    let last = session.model().nodes().last().map(|n| n.id.clone()).unwrap_or_default();
    let outcome = session.apply(Command::Connect(Edge::with_ports(last, start, Port::Right, Port::Left)));
    if let Some(notice) = outcome.notice {
        println!("✗ Loop refused: {notice}");
    }

    session.apply(Command::AutoLayout);
    session.apply(Command::FitToScreen);
    session.apply(Command::Undo);
    println!("✓ Layout undone, history depth {}", session.history().undo_depth());

    session.apply(Command::Execute);
    let step = session.config().playback_step_ms;
    for _ in 0..6 {
        session.apply(Command::Tick(step));
    }
    if let Some(playback) = session.playback() {
        println!("✓ Playback reached {} nodes", playback.completed_nodes().len());
    }

    let mut saved = AutomationSystem::new(system.name.clone());
    saved.apply_model(session.model(), Some(session.viewport()));
    let path = std::env::temp_dir().join("flow_canvas_demo.json");
    saved.save(&path)?;
    println!("\n✅ Saved to {}", path.display());

    session.dispose();
    Ok(())
}
