use crate::{
    new_entity_id, CanvasError, CanvasEvent, ConnectionGuard, ConnectorPath, CurveStyle, Edge,
    EventType, GraphNode, Group, Layout, LayoutEngine, Note, Point, Rectangle, RestoreSource,
    Result, SnapItem, SnapRole, Snapshot, Viewport,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Offset applied to duplicated nodes on both axes
pub const DUPLICATE_OFFSET: f64 = 30.0;

/// Canvas containing all nodes, connections, groups and notes
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<GraphNode>,

    /// Directed connections, in creation order
    edges: Vec<Edge>,

    groups: Vec<Group>,

    notes: Vec<Note>,

    /// Event log of accepted mutations
    events: Vec<CanvasEvent>,

    /// Move and resize events of an open gesture, latest per entity
    gesture_events: Option<Vec<EventType>>,
}

impl GraphModel {
    /// Create a new empty canvas
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from loaded collections without checking them.
    ///
    /// Use [`crate::Validator`] to audit documents from outside the editor.
    pub fn from_parts(
        nodes: Vec<GraphNode>,
        edges: Vec<Edge>,
        groups: Vec<Group>,
        notes: Vec<Note>,
    ) -> Self {
        Self {
            nodes,
            edges,
            groups,
            notes,
            events: Vec::new(),
            gesture_events: None,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::from_parts(snapshot.nodes, snapshot.edges, snapshot.groups, snapshot.notes)
    }

    // ========== Node CRUD Operations ==========

    /// Add a node; returns its id
    pub fn add_node(&mut self, node: GraphNode) -> Result<String> {
        if node.label.trim().is_empty() {
            return Err(CanvasError::invalid("node label must not be blank"));
        }
        if self.get_node(&node.id).is_some() {
            return Err(CanvasError::invalid(format!("duplicate node id: {}", node.id)));
        }

        let id = node.id.clone();
        debug!(%id, node_type = ?node.node_type, "node added");
        self.log_event(EventType::NodeAdded {
            id: id.clone(),
            node_type: node.node_type,
        });
        self.nodes.push(node);
        Ok(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut GraphNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| CanvasError::NodeNotFound(id.to_string()))
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edit a node in place. A blank label rolls the edit back.
    pub fn update_node(&mut self, id: &str, edit: impl FnOnce(&mut GraphNode)) -> Result<()> {
        let node = self.node_mut(id)?;
        let original = node.clone();

        edit(node);
        node.id = original.id.clone();
        if node.label.trim().is_empty() {
            *node = original;
            return Err(CanvasError::invalid("node label must not be blank"));
        }

        self.log_event(EventType::NodeUpdated { id: id.to_string() });
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> Result<()> {
        self.node_mut(id)?.set_position(position);
        self.log_event(EventType::NodeMoved {
            id: id.to_string(),
            position,
        });
        Ok(())
    }

    /// Delete a node and every connection touching it
    pub fn remove_node(&mut self, id: &str) -> Result<usize> {
        self.remove_nodes(&[id.to_string()])
    }

    /// Delete several nodes at once; fails without change if any is missing
    pub fn remove_nodes(&mut self, ids: &[String]) -> Result<usize> {
        if let Some(missing) = ids.iter().find(|id| self.get_node(id).is_none()) {
            return Err(CanvasError::NodeNotFound(missing.clone()));
        }

        let before = self.edges.len();
        self.edges
            .retain(|e| !ids.iter().any(|id| e.involves(id)));
        let edges_removed = before - self.edges.len();
        self.nodes.retain(|n| !ids.contains(&n.id));

        debug!(count = ids.len(), edges_removed, "nodes removed");
        self.log_event(EventType::NodesRemoved {
            ids: ids.to_vec(),
            edges_removed,
        });
        Ok(edges_removed)
    }

    // ========== Connection Operations ==========

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Connections leaving a node
    pub fn outgoing_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.starts_from(id))
    }

    /// Connections entering a node
    pub fn incoming_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.ends_at(id))
    }

    /// Check a candidate without adding it
    pub fn can_connect(&self, edge: &Edge) -> Result<()> {
        for id in [&edge.from, &edge.to] {
            if self.get_node(id).is_none() {
                return Err(CanvasError::NodeNotFound(id.clone()));
            }
        }
        ConnectionGuard::validate(&self.edges, edge)?;
        Ok(())
    }

    /// Add a connection if the guard accepts it
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if let Err(err) = self.can_connect(&edge) {
            warn!(from = %edge.from, to = %edge.to, %err, "connection refused");
            return Err(err);
        }

        debug!(from = %edge.from, to = %edge.to, "connection added");
        self.log_event(EventType::EdgeAdded {
            from: edge.from.clone(),
            to: edge.to.clone(),
        });
        self.edges.push(edge);
        Ok(())
    }

    /// Add a set of connections as one unit; nothing is added on rejection
    pub fn add_edges(&mut self, batch: Vec<Edge>) -> Result<()> {
        for edge in &batch {
            for id in [&edge.from, &edge.to] {
                if self.get_node(id).is_none() {
                    return Err(CanvasError::NodeNotFound(id.clone()));
                }
            }
        }
        ConnectionGuard::validate_batch(&self.edges, &batch)?;

        for edge in batch {
            self.log_event(EventType::EdgeAdded {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Remove every connection from `from` to `to`, whatever its ports
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let before = self.edges.len();
        self.edges.retain(|e| !(e.from == from && e.to == to));
        if self.edges.len() == before {
            return Err(CanvasError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.log_event(EventType::EdgeRemoved {
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    pub fn set_edge_label(&mut self, from: &str, to: &str, label: Option<String>) -> Result<()> {
        let label = label.filter(|l| !l.trim().is_empty());
        let mut found = false;
        for edge in self.edges.iter_mut().filter(|e| e.from == from && e.to == to) {
            edge.label = label.clone();
            found = true;
        }
        if !found {
            return Err(CanvasError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Rendered path of a connection
    pub fn connector_path(&self, edge: &Edge, style: CurveStyle) -> Option<ConnectorPath> {
        let from = self.get_node(&edge.from)?;
        let to = self.get_node(&edge.to)?;
        Some(ConnectorPath::between(
            &from.bounds(),
            edge.from_port,
            &to.bounds(),
            edge.to_port,
            style,
        ))
    }

    // ========== Group Operations ==========

    pub fn add_group(&mut self, group: Group) -> Result<String> {
        if group.label.trim().is_empty() {
            return Err(CanvasError::invalid("group label must not be blank"));
        }
        if self.get_group(&group.id).is_some() {
            return Err(CanvasError::invalid(format!("duplicate group id: {}", group.id)));
        }

        let id = group.id.clone();
        self.log_event(EventType::GroupAdded { id: id.clone() });
        self.groups.push(group);
        Ok(id)
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| CanvasError::GroupNotFound(id.to_string()))
    }

    pub fn update_group(&mut self, id: &str, edit: impl FnOnce(&mut Group)) -> Result<()> {
        let group = self.group_mut(id)?;
        let original = group.clone();

        edit(group);
        group.id = original.id.clone();
        if group.label.trim().is_empty() {
            *group = original;
            return Err(CanvasError::invalid("group label must not be blank"));
        }
        // Re-apply the size bounds
        let (w, h) = (group.width, group.height);
        group.resize(w, h);

        self.log_event(EventType::GroupChanged { id: id.to_string() });
        Ok(())
    }

    pub fn move_group(&mut self, id: &str, position: Point) -> Result<()> {
        self.group_mut(id)?.set_position(position);
        self.log_event(EventType::GroupChanged { id: id.to_string() });
        Ok(())
    }

    pub fn resize_group(&mut self, id: &str, width: f64, height: f64) -> Result<()> {
        self.group_mut(id)?.resize(width, height);
        self.log_event(EventType::GroupChanged { id: id.to_string() });
        Ok(())
    }

    pub fn remove_group(&mut self, id: &str) -> Result<()> {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return Err(CanvasError::GroupNotFound(id.to_string()));
        }
        self.log_event(EventType::GroupRemoved { id: id.to_string() });
        Ok(())
    }

    // ========== Note Operations ==========

    pub fn add_note(&mut self, note: Note) -> Result<String> {
        if self.get_note(&note.id).is_some() {
            return Err(CanvasError::invalid(format!("duplicate note id: {}", note.id)));
        }

        let id = note.id.clone();
        self.log_event(EventType::NoteAdded { id: id.clone() });
        self.notes.push(note);
        Ok(id)
    }

    pub fn get_note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn note_mut(&mut self, id: &str) -> Result<&mut Note> {
        self.notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| CanvasError::NoteNotFound(id.to_string()))
    }

    pub fn update_note(&mut self, id: &str, edit: impl FnOnce(&mut Note)) -> Result<()> {
        let note = self.note_mut(id)?;
        let id_before = note.id.clone();
        edit(note);
        note.id = id_before;
        let (w, h) = (note.width, note.height);
        note.resize(w, h);

        self.log_event(EventType::NoteChanged { id: id.to_string() });
        Ok(())
    }

    pub fn move_note(&mut self, id: &str, position: Point) -> Result<()> {
        self.note_mut(id)?.set_position(position);
        self.log_event(EventType::NoteChanged { id: id.to_string() });
        Ok(())
    }

    pub fn resize_note(&mut self, id: &str, width: f64, height: f64) -> Result<()> {
        self.note_mut(id)?.resize(width, height);
        self.log_event(EventType::NoteChanged { id: id.to_string() });
        Ok(())
    }

    pub fn remove_note(&mut self, id: &str) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return Err(CanvasError::NoteNotFound(id.to_string()));
        }
        self.log_event(EventType::NoteRemoved { id: id.to_string() });
        Ok(())
    }

    // ========== Selection Operations ==========

    /// Copy nodes with fresh ids, offset by [`DUPLICATE_OFFSET`].
    ///
    /// Connections between two copied nodes are copied too, ports included.
    /// Returns the new ids in selection order.
    pub fn duplicate_nodes(&mut self, ids: &[String]) -> Result<Vec<String>> {
        let mut id_map: HashMap<&str, String> = HashMap::new();
        let mut copies = Vec::with_capacity(ids.len());

        for id in ids {
            let node = self
                .get_node(id)
                .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;
            let mut copy = node.clone();
            copy.id = new_entity_id("node");
            copy.x += DUPLICATE_OFFSET;
            copy.y += DUPLICATE_OFFSET;
            id_map.insert(id.as_str(), copy.id.clone());
            copies.push(copy);
        }

        let copied_edges: Vec<Edge> = self
            .edges
            .iter()
            .filter_map(|e| {
                let from = id_map.get(e.from.as_str())?;
                let to = id_map.get(e.to.as_str())?;
                Some(Edge {
                    from: from.clone(),
                    to: to.clone(),
                    ..e.clone()
                })
            })
            .collect();

        ConnectionGuard::validate_batch(&self.edges, &copied_edges)?;

        let new_ids: Vec<String> = copies.iter().map(|n| n.id.clone()).collect();
        self.nodes.extend(copies);
        self.edges.extend(copied_edges);

        debug!(count = new_ids.len(), "selection duplicated");
        self.log_event(EventType::SelectionDuplicated {
            source_ids: ids.to_vec(),
            new_ids: new_ids.clone(),
        });
        Ok(new_ids)
    }

    /// Case-insensitive substring search over labels and descriptions
    pub fn search(&self, query: &str) -> Vec<&GraphNode> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.nodes
            .iter()
            .filter(|n| {
                n.label.to_lowercase().contains(&query)
                    || n.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    // ========== Geometry ==========

    /// Bounding box of all nodes, groups and notes
    pub fn content_bounds(&self) -> Option<Rectangle> {
        self.nodes
            .iter()
            .map(GraphNode::bounds)
            .chain(self.groups.iter().map(Group::bounds))
            .chain(self.notes.iter().map(Note::bounds))
            .reduce(|acc, r| acc.union(&r))
    }

    /// Viewport that shows all content in a screen of the given size
    pub fn fit_viewport(&self, width: f64, height: f64) -> Viewport {
        Viewport::fit(self.content_bounds(), width, height)
    }

    /// Items a dragged entity can snap against
    pub fn snap_items(&self) -> Vec<SnapItem> {
        self.nodes
            .iter()
            .map(|n| SnapItem::new(n.id.clone(), n.bounds(), SnapRole::Full))
            .chain(
                self.notes
                    .iter()
                    .map(|n| SnapItem::new(n.id.clone(), n.bounds(), SnapRole::Full)),
            )
            .chain(
                self.groups
                    .iter()
                    .map(|g| SnapItem::new(g.id.clone(), g.bounds(), SnapRole::CenterOnly)),
            )
            .collect()
    }

    /// Rearrange every node by breadth-first layering
    pub fn apply_layout(&mut self) -> Layout {
        let layout = LayoutEngine::compute(&self.nodes, &self.edges);
        for node in &mut self.nodes {
            if let Some(position) = layout.position_of(&node.id) {
                node.set_position(position);
            }
        }

        info!(
            nodes = self.nodes.len(),
            layers = layout.layer_count(),
            "auto layout applied"
        );
        self.log_event(EventType::LayoutApplied {
            node_count: self.nodes.len(),
            layer_count: layout.layer_count(),
        });
        layout
    }

    // ========== Snapshots ==========

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            groups: self.groups.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Replace all editable state; the event log is kept
    pub fn restore(&mut self, snapshot: Snapshot, source: RestoreSource) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.groups = snapshot.groups;
        self.notes = snapshot.notes;
        self.log_event(EventType::StateRestored { source });
    }

    // ========== Event Logging ==========

    fn log_event(&mut self, event: EventType) {
        if let (Some(pending), Some(key)) = (self.gesture_events.as_mut(), gesture_key(&event)) {
            pending.retain(|e| gesture_key(e) != Some(key));
            pending.push(event);
            return;
        }
        self.events.push(CanvasEvent::new(event));
    }

    /// Hold back move and resize events until [`GraphModel::end_gesture`],
    /// keeping only the last one per entity
    pub fn begin_gesture(&mut self) {
        self.end_gesture();
        self.gesture_events = Some(Vec::new());
    }

    /// Log the held-back events of the open gesture, if any
    pub fn end_gesture(&mut self) {
        if let Some(pending) = self.gesture_events.take() {
            self.events.extend(pending.into_iter().map(CanvasEvent::new));
        }
    }

    pub fn events(&self) -> &[CanvasEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty() && self.notes.is_empty()
    }

}

/// Entity a coalescable gesture event refers to
fn gesture_key(event: &EventType) -> Option<(u8, &str)> {
    match event {
        EventType::NodeMoved { id, .. } => Some((0, id)),
        EventType::GroupChanged { id } => Some((1, id)),
        EventType::NoteChanged { id } => Some((2, id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectionRejection, GroupColor, NodeType, NoteColor, Port};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn model_abc() -> GraphModel {
        let mut model = GraphModel::new();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            model
                .add_node(GraphNode::with_id(
                    *id,
                    NodeType::Process,
                    id.to_uppercase(),
                    Point::new(i as f64 * 300.0, 0.0),
                ))
                .unwrap();
        }
        model
    }

    #[test]
    fn test_canvas_creation() {
        let model = GraphModel::new();
        assert_eq!(model.node_count(), 0);
        assert_eq!(model.edge_count(), 0);
        assert!(model.content_bounds().is_none());
    }

    #[test]
    fn test_node_crud() {
        let mut model = GraphModel::new();

        let id = model
            .add_node(GraphNode::new(NodeType::Ai, "Summarize", Point::new(10.0, 10.0)))
            .unwrap();
        assert_eq!(model.node_count(), 1);

        model
            .update_node(&id, |n| n.description = "Condense the transcript".into())
            .unwrap();
        assert_eq!(model.get_node(&id).unwrap().description, "Condense the transcript");

        model.move_node(&id, Point::new(50.0, 60.0)).unwrap();
        assert_eq!(model.get_node(&id).unwrap().position(), Point::new(50.0, 60.0));

        model.remove_node(&id).unwrap();
        assert_eq!(model.node_count(), 0);
    }

    #[test]
    fn test_blank_labels_are_refused() {
        let mut model = model_abc();

        assert_matches!(
            model.add_node(GraphNode::new(NodeType::Process, "  ", Point::default())),
            Err(CanvasError::InvalidSubmission(_))
        );
        assert_matches!(
            model.update_node("a", |n| n.label = String::new()),
            Err(CanvasError::InvalidSubmission(_))
        );
        assert_eq!(model.get_node("a").unwrap().label, "A");
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let mut model = model_abc();

        assert_matches!(model.move_node("zz", Point::default()), Err(CanvasError::NodeNotFound(_)));
        assert_matches!(model.add_edge(Edge::new("a", "zz")), Err(CanvasError::NodeNotFound(_)));
        assert_matches!(model.remove_group("zz"), Err(CanvasError::GroupNotFound(_)));
        assert_matches!(model.resize_note("zz", 1.0, 1.0), Err(CanvasError::NoteNotFound(_)));
        assert_matches!(model.remove_edge("a", "b"), Err(CanvasError::EdgeNotFound { .. }));
    }

    #[test]
    fn test_cycle_rejected_and_edges_unchanged() {
        let mut model = model_abc();
        model.add_edge(Edge::new("a", "b")).unwrap();
        model.add_edge(Edge::new("b", "c")).unwrap();

        let err = model.add_edge(Edge::new("c", "a")).unwrap_err();
        assert!(err.is_rejection());
        assert_matches!(err, CanvasError::Rejected(ConnectionRejection::Cycle));
        assert_eq!(model.edges(), &[Edge::new("a", "b"), Edge::new("b", "c")]);
    }

    #[test]
    fn test_batch_rejection_adds_nothing() {
        let mut model = model_abc();
        model.add_edge(Edge::new("a", "b")).unwrap();

        let result = model.add_edges(vec![Edge::new("b", "c"), Edge::new("c", "a")]);
        assert_matches!(result, Err(CanvasError::Rejected(ConnectionRejection::Cycle)));
        assert_eq!(model.edge_count(), 1);

        model
            .add_edges(vec![Edge::new("b", "c"), Edge::new("a", "c")])
            .unwrap();
        assert_eq!(model.edge_count(), 3);
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut model = model_abc();
        model.add_edge(Edge::new("a", "b")).unwrap();
        model.add_edge(Edge::new("b", "c")).unwrap();
        model.add_edge(Edge::new("a", "c")).unwrap();

        let removed = model.remove_node("b").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(model.edges(), &[Edge::new("a", "c")]);

        assert_matches!(
            model.remove_nodes(&["a".to_string(), "nope".to_string()]),
            Err(CanvasError::NodeNotFound(_))
        );
        assert_eq!(model.node_count(), 2);
    }

    #[test]
    fn test_duplicate_copies_internal_edges() {
        let mut model = model_abc();
        model
            .add_edge(Edge::with_ports("a", "b", Port::Bottom, Port::Top))
            .unwrap();
        model.add_edge(Edge::new("b", "c")).unwrap();

        let new_ids = model
            .duplicate_nodes(&["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(new_ids.len(), 2);
        assert_eq!(model.node_count(), 5);
        let copy_a = model.get_node(&new_ids[0]).unwrap();
        assert_eq!(copy_a.position(), Point::new(30.0, 30.0));
        assert_eq!(copy_a.label, "A");

        // Only a -> b is internal to the selection
        let copied: Vec<&Edge> = model.outgoing_edges(&new_ids[0]).collect();
        assert_eq!(copied.len(), 1);
        assert_eq!(copied[0].to, new_ids[1]);
        assert_eq!(copied[0].from_port, Port::Bottom);
        assert_eq!(model.edge_count(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut model = model_abc();
        model
            .update_node("c", |n| n.description = "Send the Weekly report".into())
            .unwrap();

        let hits: Vec<&str> = model.search("weekly").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(hits, vec!["c"]);
        assert!(model.search("   ").is_empty());
    }

    #[test]
    fn test_groups_and_notes() {
        let mut model = GraphModel::new();
        let g = model
            .add_group(Group::new("Intake", Rectangle::new(0.0, 0.0, 400.0, 200.0), GroupColor::Green))
            .unwrap();
        let s = model.add_note(Note::new("Remember", Rectangle::new(500.0, 0.0, 160.0, 100.0), NoteColor::Yellow)).unwrap();

        model.resize_group(&g, 5.0, 5.0).unwrap();
        assert_eq!(model.get_group(&g).unwrap().width, 120.0);

        model.update_note(&s, |n| n.text = "Updated".into()).unwrap();
        model.move_note(&s, Point::new(700.0, 10.0)).unwrap();

        assert_eq!(model.content_bounds(), Some(Rectangle::new(0.0, 0.0, 860.0, 110.0)));

        model.remove_note(&s).unwrap();
        model.remove_group(&g).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_apply_layout_positions_nodes() {
        let mut model = model_abc();
        model.add_edge(Edge::new("a", "b")).unwrap();
        model.add_edge(Edge::new("a", "c")).unwrap();

        let layout = model.apply_layout();

        assert_eq!(layout.layer_count(), 2);
        assert_eq!(model.get_node("a").unwrap().position(), Point::new(40.0, 40.0));
        assert_eq!(model.get_node("c").unwrap().position(), Point::new(380.0, 148.0));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut model = model_abc();
        let before = model.snapshot();

        model.add_edge(Edge::new("a", "b")).unwrap();
        model.restore(before.clone(), RestoreSource::Undo);

        assert_eq!(model.snapshot(), before);
        assert_matches!(
            model.events().last().map(|e| &e.event),
            Some(EventType::StateRestored { source: RestoreSource::Undo })
        );
    }

    #[test]
    fn test_event_logging() {
        let model = model_abc();

        assert_eq!(model.events().len(), 3);
        match &model.events()[0].event {
            EventType::NodeAdded { id, node_type } => {
                assert_eq!(id, "a");
                assert_eq!(*node_type, NodeType::Process);
            }
            _ => panic!("Expected NodeAdded event"),
        }
    }

    #[test]
    fn test_gesture_coalesces_move_events() {
        let mut model = model_abc();
        let group = model
            .add_group(Group::with_id("g", "Phase", Rectangle::new(0.0, 0.0, 400.0, 200.0), GroupColor::Blue))
            .unwrap();
        let logged = model.events().len();

        model.begin_gesture();
        for x in [10.0, 20.0, 30.0] {
            model.move_node("a", Point::new(x, 0.0)).unwrap();
            model.resize_group(&group, 400.0 + x, 200.0).unwrap();
        }
        assert_eq!(model.events().len(), logged);

        model.end_gesture();
        let tail: Vec<&EventType> = model.events()[logged..].iter().map(|e| &e.event).collect();
        assert_eq!(
            tail,
            vec![
                &EventType::NodeMoved {
                    id: "a".into(),
                    position: Point::new(30.0, 0.0),
                },
                &EventType::GroupChanged { id: "g".into() },
            ]
        );

        // Outside a gesture every move is logged
        model.move_node("b", Point::new(1.0, 1.0)).unwrap();
        assert_eq!(model.events().len(), logged + 3);
    }

    #[test]
    fn test_duplicate_group_and_note_ids_rejected() {
        let mut model = GraphModel::new();
        let bounds = Rectangle::new(0.0, 0.0, 300.0, 200.0);
        model
            .add_group(Group::with_id("g", "One", bounds, GroupColor::Red))
            .unwrap();
        model
            .add_note(Note::with_id("n", "first", bounds, NoteColor::Blue))
            .unwrap();

        let group = model.add_group(Group::with_id("g", "Two", bounds, GroupColor::Gray));
        let note = model.add_note(Note::with_id("n", "second", bounds, NoteColor::Green));

        assert_matches!(group, Err(CanvasError::InvalidSubmission(_)));
        assert_matches!(note, Err(CanvasError::InvalidSubmission(_)));
        assert_eq!(model.groups().len(), 1);
        assert_eq!(model.get_group("g").unwrap().label, "One");
        assert_eq!(model.get_note("n").unwrap().text, "first");
    }
}
