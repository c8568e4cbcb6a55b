// Flow Canvas - Core Library

pub mod canvas;
pub mod config;
pub mod connection;
pub mod connector;
pub mod converter;
pub mod error;
pub mod event;
pub mod execution;
pub mod geometry;
pub mod history;
pub mod layout;
pub mod node;
pub mod serialization;
pub mod session;
pub mod snap;
pub mod step_tree;
pub mod validation;

// Re-export main types for convenience
pub use canvas::GraphModel;
pub use config::EditorConfig;
pub use connection::Edge;
pub use connector::{ConnectorPath, CurveStyle};
pub use converter::{ConvertedFlow, WizardConverter};
pub use error::{CanvasError, ConnectionRejection, Result};
pub use event::{CanvasEvent, EventType, RestoreSource};
pub use execution::{ExecutionPlan, ExecutionPlayback, ExecutionStatus};
pub use geometry::{Point, Port, Rectangle, Viewport, NODE_HEIGHT, NODE_WIDTH};
pub use history::{HistoryManager, Snapshot};
pub use layout::{Layout, LayoutEngine};
pub use node::{
    new_entity_id, GraphNode, Group, GroupColor, NodeType, Note, NoteColor, ResourceLink,
    ResourceType,
};
pub use serialization::{AutomationSystem, SystemStatus};
pub use session::{Command, Outcome, PageNavigator, Session, Target};
pub use snap::{SnapEngine, SnapItem, SnapResult, SnapRole};
pub use step_tree::{
    Branch, NodeDraft, Step, Tree, WizardBuilder, WizardNode, WizardPhase, WizardState,
};
pub use validation::{
    ConnectionGuard, ValidatedModel, ValidationIssue, ValidationResult, ValidationSeverity,
    Validator,
};
