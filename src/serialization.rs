use crate::{
    new_entity_id, CanvasEvent, Edge, GraphModel, GraphNode, Group, Note, Point, Viewport,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Publication state of a system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Active,
    #[default]
    Draft,
}

/// Interchange document for one automation flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSystem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub status: SystemStatus,
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub connections: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky_notes: Option<Vec<Note>>,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_pan: Option<Point>,
}

impl AutomationSystem {
    /// Empty draft with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_entity_id("user"),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            icon: String::new(),
            status: SystemStatus::Draft,
            webhook_url: String::new(),
            nodes: Vec::new(),
            connections: Vec::new(),
            groups: None,
            sticky_notes: None,
            execution_count: 0,
            canvas_zoom: None,
            canvas_pan: None,
        }
    }

    /// Editable model of this system's canvas.
    ///
    /// Collections are taken as stored; audit them with [`crate::Validator`].
    pub fn to_model(&self) -> GraphModel {
        GraphModel::from_parts(
            self.nodes.clone(),
            self.connections.clone(),
            self.groups.clone().unwrap_or_default(),
            self.sticky_notes.clone().unwrap_or_default(),
        )
    }

    /// Stored viewport, if both zoom and pan were saved
    pub fn viewport(&self) -> Option<Viewport> {
        Some(Viewport::new(self.canvas_zoom?, self.canvas_pan?))
    }

    /// Write the model and viewport back into this document
    pub fn apply_model(&mut self, model: &GraphModel, viewport: Option<&Viewport>) {
        self.nodes = model.nodes().to_vec();
        self.connections = model.edges().to_vec();
        self.groups = Some(model.groups().to_vec());
        self.sticky_notes = Some(model.notes().to_vec());
        if let Some(viewport) = viewport {
            self.canvas_zoom = Some(viewport.zoom);
            self.canvas_pan = Some(viewport.pan);
        }
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create system file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write system to: {}", path.display()))?;
        info!(path = %path.display(), nodes = self.nodes.len(), "system saved");
        Ok(())
    }

    /// Load from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open system file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let system: Self = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse system from: {}", path.display()))?;
        info!(path = %path.display(), nodes = system.nodes.len(), "system loaded");
        Ok(system)
    }
}

/// Append events to a JSON-lines log
pub fn append_events(path: &Path, events: &[CanvasEvent]) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for event in events {
        let json = serde_json::to_string(event)
            .with_context(|| format!("Failed to serialize event: {}", path.display()))?;
        writeln!(writer, "{}", json)
            .with_context(|| format!("Failed to write event to: {}", path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush event log: {}", path.display()))?;
    Ok(())
}

/// Read every event of a JSON-lines log. A missing file is an empty log.
pub fn load_events(path: &Path) -> Result<Vec<CanvasEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open event log: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!("Failed to read line {} from: {}", line_num + 1, path.display())
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let event: CanvasEvent = serde_json::from_str(&line).with_context(|| {
            format!(
                "Failed to parse event on line {} from: {}",
                line_num + 1,
                path.display()
            )
        })?;
        events.push(event);
    }

    Ok(events)
}
