//! Editor session controller
//!
//! A [`Session`] owns the graph model together with everything the editor
//! tracks around it: history, selection, viewport, the active gesture and
//! transient overlays. Input arrives as [`Command`] values and each call to
//! [`Session::apply`] returns an [`Outcome`]. Drags and resizes record one
//! history entry when the pointer is released, and only if they changed
//! something.

use crate::config::EditorConfig;
use crate::execution::ExecutionPlayback;
use crate::{
    CanvasError, ConnectorPath, Edge, GraphModel, GraphNode, Group, HistoryManager, Note, Point,
    Port, Rectangle, RestoreSource, SnapEngine, SnapResult, Viewport,
};
use tracing::{debug, info, warn};

/// Pointer travel before a press on empty canvas turns into a pan
pub const PAN_THRESHOLD: f64 = 4.0;

/// Zoom applied when jumping to a search hit, if currently smaller
const FOCUS_MIN_ZOOM: f64 = 1.0;

/// Opens internal pages linked from nodes
pub trait PageNavigator {
    fn open(&mut self, route: &str);
}

/// What the pointer went down on
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Canvas,
    Node(String),
    Port { node: String, port: Port },
    Edge { from: String, to: String },
    Group(String),
    GroupResize(String),
    Note(String),
    NoteResize(String),
}

/// Single selected entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Node(String),
    Edge { from: String, to: String },
    Group(String),
    Note(String),
}

/// Entity whose edit form is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Node(String),
    Group(String),
    Note(String),
}

/// Pointer gesture state machine: idle, then one active gesture until release
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Panning {
        origin: Point,
        start_pan: Point,
        moved: bool,
    },
    DraggingNode {
        id: String,
        grab: Point,
    },
    DraggingGroup {
        id: String,
        grab: Point,
    },
    ResizingGroup {
        id: String,
        origin: Point,
        start_width: f64,
        start_height: f64,
    },
    DraggingNote {
        id: String,
        grab: Point,
    },
    ResizingNote {
        id: String,
        origin: Point,
        start_width: f64,
        start_height: f64,
    },
}

impl Gesture {
    /// Gestures that edit the model and are undone as one step
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Gesture::Idle | Gesture::Panning { .. })
    }
}

/// A connection started from a port and following the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConnection {
    pub from: String,
    pub port: Port,
    pub pointer: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub target: Target,
    pub screen: Point,
}

/// Transient message shown after a refused action
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub remaining_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PointerDown { target: Target, screen: Point, shift: bool },
    PointerMove { screen: Point },
    PointerUp,
    /// Treated like a release
    PointerLeave,
    Zoom { anchor: Point, factor: f64 },
    ScreenResized { width: f64, height: f64 },
    FitToScreen,
    Cancel,
    Undo,
    Redo,
    AddNode(GraphNode),
    AddGroup(Group),
    AddNote(Note),
    Connect(Edge),
    DeleteSelection,
    DuplicateSelection,
    SelectAll,
    BeginEdit(EditTarget),
    CommitNodeEdit {
        id: String,
        label: String,
        description: String,
        icon: String,
    },
    CommitGroupEdit {
        id: String,
        label: String,
        description: Option<String>,
    },
    CommitNoteEdit { id: String, text: String },
    SetEdgeLabel {
        from: String,
        to: String,
        label: Option<String>,
    },
    AutoLayout,
    OpenContextMenu { target: Target, screen: Point },
    OpenSearch,
    Search(String),
    FocusNode(String),
    ToggleShortcuts,
    ToggleFullscreen,
    ToggleSnap,
    OpenLinkedPage(String),
    Execute,
    /// Advance cosmetic timers
    Tick(u64),
}

impl Command {
    fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::Undo
                | Command::Redo
                | Command::AddNode(_)
                | Command::AddGroup(_)
                | Command::AddNote(_)
                | Command::Connect(_)
                | Command::DeleteSelection
                | Command::DuplicateSelection
                | Command::BeginEdit(_)
                | Command::CommitNodeEdit { .. }
                | Command::CommitGroupEdit { .. }
                | Command::CommitNoteEdit { .. }
                | Command::SetEdgeLabel { .. }
                | Command::AutoLayout
                | Command::OpenContextMenu { .. }
                | Command::OpenSearch
        )
    }
}

/// Result of applying one command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// The graph model changed
    pub model_changed: bool,
    /// A history entry was pushed
    pub recorded: bool,
    pub notice: Option<String>,
}

impl Outcome {
    fn model(recorded: bool) -> Self {
        Self {
            model_changed: true,
            recorded,
            notice: None,
        }
    }
}

pub struct Session {
    model: GraphModel,
    history: HistoryManager,
    snap: SnapEngine,
    config: EditorConfig,
    viewport: Viewport,
    screen: (f64, f64),
    gesture: Gesture,
    connecting: Option<PendingConnection>,
    selection: Option<Selection>,
    multi: Vec<String>,
    editing: Option<EditTarget>,
    context_menu: Option<ContextMenu>,
    search: Option<String>,
    shortcuts_open: bool,
    fullscreen: bool,
    guides: Option<SnapResult>,
    notice: Option<Notice>,
    playback: Option<ExecutionPlayback>,
    navigator: Option<Box<dyn PageNavigator>>,
    read_only: bool,
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_model(GraphModel::new(), config)
    }

    pub fn with_model(model: GraphModel, config: EditorConfig) -> Self {
        Self {
            model,
            history: HistoryManager::new(config.history_capacity),
            snap: SnapEngine {
                threshold: config.snap_threshold,
                enabled: config.snap_enabled,
            },
            config,
            viewport: Viewport::default(),
            screen: (800.0, 500.0),
            gesture: Gesture::Idle,
            connecting: None,
            selection: None,
            multi: Vec::new(),
            editing: None,
            context_menu: None,
            search: None,
            shortcuts_open: false,
            fullscreen: false,
            guides: None,
            notice: None,
            playback: None,
            navigator: None,
            read_only: false,
        }
    }

    pub fn with_navigator(mut self, navigator: Box<dyn PageNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        if self.read_only && command.is_edit() {
            debug!(?command, "ignored in read-only mode");
            return Outcome::default();
        }

        match command {
            Command::PointerDown {
                target,
                screen,
                shift,
            } => self.pointer_down(target, screen, shift),
            Command::PointerMove { screen } => self.pointer_move(screen),
            Command::PointerUp | Command::PointerLeave => self.pointer_up(),
            Command::Zoom { anchor, factor } => {
                self.viewport.zoom_at(anchor, factor);
                Outcome::default()
            }
            Command::ScreenResized { width, height } => {
                self.screen = (width, height);
                Outcome::default()
            }
            Command::FitToScreen => {
                self.viewport = self.model.fit_viewport(self.screen.0, self.screen.1);
                Outcome::default()
            }
            Command::Cancel => self.cancel(),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::AddNode(node) => self.commit(|m| m.add_node(node).map(drop)),
            Command::AddGroup(group) => self.commit(|m| m.add_group(group).map(drop)),
            Command::AddNote(note) => self.commit(|m| m.add_note(note).map(drop)),
            Command::Connect(edge) => self.connect(edge),
            Command::DeleteSelection => self.delete_selection(),
            Command::DuplicateSelection => self.duplicate_selection(),
            Command::SelectAll => {
                self.multi = self.model.nodes().iter().map(|n| n.id.clone()).collect();
                Outcome::default()
            }
            Command::BeginEdit(target) => {
                let exists = match &target {
                    EditTarget::Node(id) => self.model.get_node(id).is_some(),
                    EditTarget::Group(id) => self.model.get_group(id).is_some(),
                    EditTarget::Note(id) => self.model.get_note(id).is_some(),
                };
                if exists {
                    self.editing = Some(target);
                }
                Outcome::default()
            }
            Command::CommitNodeEdit {
                id,
                label,
                description,
                icon,
            } => self.commit_node_edit(id, label, description, icon),
            Command::CommitGroupEdit {
                id,
                label,
                description,
            } => {
                if label.trim().is_empty() {
                    return self.reject(CanvasError::invalid("group label is required"));
                }
                let outcome = self.commit(|m| {
                    m.update_group(&id, |g| {
                        g.label = label.trim().to_string();
                        g.description = description;
                    })
                });
                self.editing = None;
                outcome
            }
            Command::CommitNoteEdit { id, text } => {
                let outcome = self.commit(|m| m.update_note(&id, |n| n.text = text));
                self.editing = None;
                outcome
            }
            Command::SetEdgeLabel { from, to, label } => {
                let label = label.filter(|l| !l.trim().is_empty());
                self.commit(|m| m.set_edge_label(&from, &to, label))
            }
            Command::AutoLayout => self.commit(|m| {
                m.apply_layout();
                Ok(())
            }),
            Command::OpenContextMenu { target, screen } => {
                self.context_menu = Some(ContextMenu { target, screen });
                Outcome::default()
            }
            Command::OpenSearch => {
                self.search = Some(String::new());
                Outcome::default()
            }
            Command::Search(query) => {
                self.search = Some(query);
                Outcome::default()
            }
            Command::FocusNode(id) => self.focus_node(&id),
            Command::ToggleShortcuts => {
                if self.editing.is_none() && self.search.is_none() {
                    self.shortcuts_open = !self.shortcuts_open;
                }
                Outcome::default()
            }
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                Outcome::default()
            }
            Command::ToggleSnap => {
                self.snap.enabled = !self.snap.enabled;
                self.guides = None;
                Outcome::default()
            }
            Command::OpenLinkedPage(id) => self.open_linked_page(&id),
            Command::Execute => self.execute(),
            Command::Tick(delta_ms) => self.tick(delta_ms),
        }
    }

    // ========== Mutation Plumbing ==========

    /// Run a model edit and record the prior state if it changed anything
    fn commit(&mut self, edit: impl FnOnce(&mut GraphModel) -> crate::Result<()>) -> Outcome {
        let before = self.model.snapshot();
        match edit(&mut self.model) {
            Ok(()) => {
                let recorded = self.history.record_if_changed(before, &self.model.snapshot());
                Outcome {
                    model_changed: recorded,
                    recorded,
                    notice: None,
                }
            }
            Err(err) => self.reject(err),
        }
    }

    fn reject(&mut self, err: CanvasError) -> Outcome {
        let message = match &err {
            CanvasError::Rejected(reason) => reason.to_string(),
            other => other.to_string(),
        };
        warn!(%message, "action refused");
        self.notice = Some(Notice {
            message: message.clone(),
            remaining_ms: self.config.notice_ms,
        });
        Outcome {
            notice: Some(message),
            ..Outcome::default()
        }
    }

    fn connect(&mut self, edge: Edge) -> Outcome {
        self.commit(|m| m.add_edge(edge))
    }

    // ========== Pointer Gestures ==========

    fn begin_gesture(&mut self, gesture: Gesture) {
        self.history.begin_gesture(self.model.snapshot());
        self.model.begin_gesture();
        self.gesture = gesture;
    }

    fn pointer_down(&mut self, target: Target, screen: Point, shift: bool) -> Outcome {
        // A press without a release in between closes the previous gesture first
        let closed = self.gesture.is_tracked() && self.pointer_up().recorded;
        let mut outcome = self.press(target, screen, shift);
        outcome.recorded |= closed;
        outcome
    }

    fn press(&mut self, target: Target, screen: Point, shift: bool) -> Outcome {
        if self.context_menu.take().is_some() {
            return Outcome::default();
        }
        let canvas = self.viewport.screen_to_canvas(screen);

        if target == Target::Canvas {
            self.gesture = Gesture::Panning {
                origin: screen,
                start_pan: self.viewport.pan,
                moved: false,
            };
            self.selection = None;
            self.multi.clear();
            self.connecting = None;
            return Outcome::default();
        }
        if self.read_only {
            return Outcome::default();
        }

        match target {
            Target::Canvas => {}
            Target::Port { node, port } => return self.port_click(node, port, canvas),
            Target::Edge { from, to } => {
                self.selection = Some(Selection::Edge { from, to });
                self.multi.clear();
            }
            Target::Node(id) => {
                let Some(node) = self.model.get_node(&id) else {
                    return Outcome::default();
                };
                let grab = Point::new(canvas.x - node.x, canvas.y - node.y);
                if shift {
                    match self.multi.iter().position(|m| *m == id) {
                        Some(index) => {
                            self.multi.remove(index);
                        }
                        None => self.multi.push(id.clone()),
                    }
                } else {
                    if !self.multi.contains(&id) {
                        self.multi.clear();
                    }
                    self.selection = Some(Selection::Node(id.clone()));
                }
                self.begin_gesture(Gesture::DraggingNode { id, grab });
            }
            Target::Group(id) => {
                let Some(group) = self.model.get_group(&id) else {
                    return Outcome::default();
                };
                let grab = Point::new(canvas.x - group.x, canvas.y - group.y);
                self.selection = Some(Selection::Group(id.clone()));
                self.multi.clear();
                self.begin_gesture(Gesture::DraggingGroup { id, grab });
            }
            Target::GroupResize(id) => {
                let Some(group) = self.model.get_group(&id) else {
                    return Outcome::default();
                };
                let (start_width, start_height) = (group.width, group.height);
                self.begin_gesture(Gesture::ResizingGroup {
                    id,
                    origin: canvas,
                    start_width,
                    start_height,
                });
            }
            Target::Note(id) => {
                let Some(note) = self.model.get_note(&id) else {
                    return Outcome::default();
                };
                let grab = Point::new(canvas.x - note.x, canvas.y - note.y);
                self.selection = Some(Selection::Note(id.clone()));
                self.multi.clear();
                self.begin_gesture(Gesture::DraggingNote { id, grab });
            }
            Target::NoteResize(id) => {
                let Some(note) = self.model.get_note(&id) else {
                    return Outcome::default();
                };
                let (start_width, start_height) = (note.width, note.height);
                self.begin_gesture(Gesture::ResizingNote {
                    id,
                    origin: canvas,
                    start_width,
                    start_height,
                });
            }
        }
        Outcome::default()
    }

    /// First click starts a connection, the second one on another node ends it
    fn port_click(&mut self, node: String, port: Port, canvas: Point) -> Outcome {
        match self.connecting.take() {
            None => {
                self.connecting = Some(PendingConnection {
                    from: node,
                    port,
                    pointer: canvas,
                });
                Outcome::default()
            }
            // Releasing on the source just drops the connection
            Some(pending) if pending.from == node => Outcome::default(),
            Some(pending) => self.connect(Edge::with_ports(pending.from, node, pending.port, port)),
        }
    }

    fn snapped(&mut self, id: &str, proposed: Rectangle) -> Point {
        if !self.snap.enabled {
            self.guides = None;
            return proposed.origin();
        }
        let result = self.snap.snap(id, proposed, &self.model.snap_items());
        let position = Point::new(result.x, result.y);
        self.guides = result.has_guides().then_some(result);
        position
    }

    fn pointer_move(&mut self, screen: Point) -> Outcome {
        let canvas = self.viewport.screen_to_canvas(screen);
        if let Some(pending) = &mut self.connecting {
            pending.pointer = canvas;
        }

        let moved = match self.gesture.clone() {
            Gesture::Idle => return Outcome::default(),
            Gesture::Panning {
                origin,
                start_pan,
                moved,
            } => {
                let (dx, dy) = (screen.x - origin.x, screen.y - origin.y);
                if !moved && dx.abs() < PAN_THRESHOLD && dy.abs() < PAN_THRESHOLD {
                    return Outcome::default();
                }
                self.viewport.pan = Point::new(start_pan.x + dx, start_pan.y + dy);
                self.gesture = Gesture::Panning {
                    origin,
                    start_pan,
                    moved: true,
                };
                return Outcome::default();
            }
            Gesture::DraggingNode { id, grab } => {
                let raw = Point::new(canvas.x - grab.x, canvas.y - grab.y);
                let position = self.snapped(&id, Rectangle::node_box(raw));
                self.model.move_node(&id, position)
            }
            Gesture::DraggingGroup { id, grab } => self
                .model
                .move_group(&id, Point::new(canvas.x - grab.x, canvas.y - grab.y)),
            Gesture::ResizingGroup {
                id,
                origin,
                start_width,
                start_height,
            } => self.model.resize_group(
                &id,
                start_width + canvas.x - origin.x,
                start_height + canvas.y - origin.y,
            ),
            Gesture::DraggingNote { id, grab } => match self.model.get_note(&id).map(Note::bounds) {
                Some(bounds) => {
                    let raw = Point::new(canvas.x - grab.x, canvas.y - grab.y);
                    let position = self.snapped(&id, bounds.moved_to(raw));
                    self.model.move_note(&id, position)
                }
                None => Err(CanvasError::NoteNotFound(id)),
            },
            Gesture::ResizingNote {
                id,
                origin,
                start_width,
                start_height,
            } => self.model.resize_note(
                &id,
                start_width + canvas.x - origin.x,
                start_height + canvas.y - origin.y,
            ),
        };

        match moved {
            Ok(()) => Outcome::model(false),
            Err(err) => {
                // Target vanished mid-gesture
                warn!(%err, "gesture target missing, ending gesture");
                self.pointer_up();
                Outcome::default()
            }
        }
    }

    fn pointer_up(&mut self) -> Outcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.guides = None;
        if !gesture.is_tracked() {
            return Outcome::default();
        }

        self.model.end_gesture();
        let recorded = self.history.end_gesture(&self.model.snapshot());
        debug!(recorded, "gesture finished");
        Outcome {
            model_changed: false,
            recorded,
            notice: None,
        }
    }

    // ========== Cancel / History ==========

    /// Collapse the innermost transient state, one layer per call
    fn cancel(&mut self) -> Outcome {
        if self.context_menu.take().is_some() {
            return Outcome::default();
        }
        if self.search.take().is_some() {
            return Outcome::default();
        }
        if self.shortcuts_open {
            self.shortcuts_open = false;
            return Outcome::default();
        }
        if self.connecting.take().is_some() {
            return Outcome::default();
        }
        if self.gesture != Gesture::Idle {
            return self.pointer_up();
        }
        if self.editing.take().is_some() {
            return Outcome::default();
        }

        self.guides = None;
        if !self.multi.is_empty() {
            self.multi.clear();
            return Outcome::default();
        }
        self.fullscreen = false;
        Outcome::default()
    }

    fn undo(&mut self) -> Outcome {
        if self.editing.is_some() || self.gesture.is_tracked() {
            return Outcome::default();
        }
        match self.history.undo(self.model.snapshot()) {
            Some(previous) => {
                self.model.restore(previous, RestoreSource::Undo);
                self.prune_selection();
                Outcome::model(false)
            }
            None => Outcome::default(),
        }
    }

    fn redo(&mut self) -> Outcome {
        if self.editing.is_some() || self.gesture.is_tracked() {
            return Outcome::default();
        }
        match self.history.redo(self.model.snapshot()) {
            Some(next) => {
                self.model.restore(next, RestoreSource::Redo);
                self.prune_selection();
                Outcome::model(false)
            }
            None => Outcome::default(),
        }
    }

    /// Forget selected entities that no longer exist
    fn prune_selection(&mut self) {
        let model = &self.model;
        self.multi.retain(|id| model.get_node(id).is_some());
        let still_there = match &self.selection {
            None => true,
            Some(Selection::Node(id)) => model.get_node(id).is_some(),
            Some(Selection::Group(id)) => model.get_group(id).is_some(),
            Some(Selection::Note(id)) => model.get_note(id).is_some(),
            Some(Selection::Edge { from, to }) => {
                model.edges().iter().any(|e| e.from == *from && e.to == *to)
            }
        };
        if !still_there {
            self.selection = None;
        }
    }

    // ========== Selection Actions ==========

    fn delete_selection(&mut self) -> Outcome {
        if self.editing.is_some() || self.search.is_some() {
            return Outcome::default();
        }

        if !self.multi.is_empty() {
            let ids = std::mem::take(&mut self.multi);
            if matches!(&self.selection, Some(Selection::Node(id)) if ids.contains(id)) {
                self.selection = None;
            }
            return self.commit(|m| m.remove_nodes(&ids).map(drop));
        }

        match self.selection.take() {
            None => Outcome::default(),
            Some(Selection::Node(id)) => self.commit(|m| m.remove_node(&id).map(drop)),
            Some(Selection::Edge { from, to }) => self.commit(|m| m.remove_edge(&from, &to)),
            Some(Selection::Group(id)) => self.commit(|m| m.remove_group(&id)),
            Some(Selection::Note(id)) => self.commit(|m| m.remove_note(&id)),
        }
    }

    /// Copy the selected nodes; the copies become the selection
    fn duplicate_selection(&mut self) -> Outcome {
        let ids = if !self.multi.is_empty() {
            self.multi.clone()
        } else if let Some(Selection::Node(id)) = &self.selection {
            vec![id.clone()]
        } else {
            return Outcome::default();
        };

        let mut created = Vec::new();
        let outcome = self.commit(|m| {
            created = m.duplicate_nodes(&ids)?;
            Ok(())
        });
        if !created.is_empty() {
            self.selection = None;
            self.multi = created;
        }
        outcome
    }

    fn commit_node_edit(&mut self, id: String, label: String, description: String, icon: String) -> Outcome {
        let label = label.trim().to_string();
        if label.is_empty() {
            return self.reject(CanvasError::invalid("node label is required"));
        }
        let outcome = self.commit(|m| {
            m.update_node(&id, |n| {
                n.label = label;
                n.description = description.trim().to_string();
                n.icon = icon;
            })
        });
        self.editing = None;
        outcome
    }

    fn focus_node(&mut self, id: &str) -> Outcome {
        let Some(node) = self.model.get_node(id) else {
            return Outcome::default();
        };
        let bounds = node.bounds();
        let center = Point::new(bounds.center_x(), bounds.center_y());
        self.viewport = self
            .viewport
            .centered_on(center, self.screen.0, self.screen.1, FOCUS_MIN_ZOOM);
        self.selection = Some(Selection::Node(id.to_string()));
        Outcome::default()
    }

    fn open_linked_page(&mut self, id: &str) -> Outcome {
        let Some(route) = self.model.get_node(id).and_then(|n| n.linked_page.clone()) else {
            return Outcome::default();
        };
        match self.navigator.as_mut() {
            Some(navigator) => {
                info!(%route, "opening linked page");
                navigator.open(&route);
            }
            None => warn!(%route, "no page navigator installed"),
        }
        Outcome::default()
    }

    // ========== Timers ==========

    fn execute(&mut self) -> Outcome {
        if let Some(previous) = self.playback.as_mut() {
            previous.cancel();
        }
        self.playback = Some(ExecutionPlayback::start(
            self.model.nodes(),
            self.model.edges(),
            self.config.playback_step_ms,
        ));
        Outcome::default()
    }

    fn tick(&mut self, delta_ms: u64) -> Outcome {
        if let Some(notice) = &mut self.notice {
            notice.remaining_ms = notice.remaining_ms.saturating_sub(delta_ms);
            if notice.remaining_ms == 0 {
                self.notice = None;
            }
        }
        if let Some(playback) = &mut self.playback {
            playback.tick(delta_ms);
        }
        Outcome::default()
    }

    /// Stop every timer; later ticks change nothing
    pub fn dispose(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.cancel();
        }
        self.playback = None;
        self.notice = None;
        self.gesture = Gesture::Idle;
        self.model.end_gesture();
        self.history.abandon_gesture();
    }

    // ========== Accessors ==========

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn multi_selection(&self) -> &[String] {
        &self.multi
    }

    pub fn editing(&self) -> Option<&EditTarget> {
        self.editing.as_ref()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Nodes matching the open search, if any
    pub fn search_results(&self) -> Vec<&GraphNode> {
        match &self.search {
            Some(query) => self.model.search(query),
            None => Vec::new(),
        }
    }

    pub fn shortcuts_open(&self) -> bool {
        self.shortcuts_open
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap.enabled
    }

    pub fn guides(&self) -> Option<&SnapResult> {
        self.guides.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn playback(&self) -> Option<&ExecutionPlayback> {
        self.playback.as_ref()
    }

    pub fn pending_connection(&self) -> Option<&PendingConnection> {
        self.connecting.as_ref()
    }

    /// Rubber-band connector from the pending source port to the pointer
    pub fn pending_connector(&self) -> Option<ConnectorPath> {
        let pending = self.connecting.as_ref()?;
        let bounds = self.model.get_node(&pending.from)?.bounds();
        Some(ConnectorPath::pending(
            pending.port.anchor(&bounds),
            pending.port,
            pending.pointer,
        ))
    }

    /// Render geometry of every connection in the configured style
    pub fn connector_paths(&self) -> Vec<(&Edge, ConnectorPath)> {
        self.model
            .edges()
            .iter()
            .filter_map(|e| {
                self.model
                    .connector_path(e, self.config.curve_style)
                    .map(|path| (e, path))
            })
            .collect()
    }
}
