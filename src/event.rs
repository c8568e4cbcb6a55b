use crate::{NodeType, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A canvas event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl CanvasEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Create a new event with a specific timestamp
    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Accepted mutations recorded by the graph model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    NodeAdded {
        id: String,
        node_type: NodeType,
    },

    NodeUpdated {
        id: String,
    },

    NodeMoved {
        id: String,
        position: Point,
    },

    /// Nodes removed together with their incident edges
    NodesRemoved {
        ids: Vec<String>,
        edges_removed: usize,
    },

    EdgeAdded {
        from: String,
        to: String,
    },

    EdgeRemoved {
        from: String,
        to: String,
    },

    GroupAdded {
        id: String,
    },

    GroupChanged {
        id: String,
    },

    GroupRemoved {
        id: String,
    },

    NoteAdded {
        id: String,
    },

    NoteChanged {
        id: String,
    },

    NoteRemoved {
        id: String,
    },

    SelectionDuplicated {
        source_ids: Vec<String>,
        new_ids: Vec<String>,
    },

    LayoutApplied {
        node_count: usize,
        layer_count: usize,
    },

    /// Whole state replaced from a snapshot (undo, redo, load)
    StateRestored {
        source: RestoreSource,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RestoreSource {
    Undo,
    Redo,
    Load,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = CanvasEvent::new(EventType::NodeAdded {
            id: "node-1".to_string(),
            node_type: NodeType::Trigger,
        });

        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization() {
        let event = CanvasEvent::new(EventType::EdgeAdded {
            from: "a".to_string(),
            to: "b".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: CanvasEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
        assert_eq!(deserialized.timestamp, event.timestamp);
    }
}
