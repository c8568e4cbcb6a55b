//! Bounded linear undo/redo over full-state snapshots

use crate::{Edge, GraphNode, Group, Note};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

/// Full copy of the editable canvas state, one undo unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    capacity: usize,
    /// State captured when the current gesture began
    pending: Option<Snapshot>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity: capacity.max(1),
            pending: None,
        }
    }

    /// Push the state from before a mutation. Clears redo.
    pub fn record(&mut self, before: Snapshot) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
        debug!(depth = self.undo.len(), "history recorded");
    }

    /// Push `before` only if it differs from `current`
    pub fn record_if_changed(&mut self, before: Snapshot, current: &Snapshot) -> bool {
        if &before == current {
            return false;
        }
        self.record(before);
        true
    }

    /// Remember the state at the start of a drag or resize
    pub fn begin_gesture(&mut self, before: Snapshot) {
        self.pending = Some(before);
    }

    pub fn gesture_in_progress(&self) -> bool {
        self.pending.is_some()
    }

    /// Close the current gesture; records one entry if the state changed
    pub fn end_gesture(&mut self, current: &Snapshot) -> bool {
        match self.pending.take() {
            Some(before) => self.record_if_changed(before, current),
            None => false,
        }
    }

    /// Drop the pending gesture without recording
    pub fn abandon_gesture(&mut self) -> Option<Snapshot> {
        self.pending.take()
    }

    /// Step back. Returns the state to restore.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        info!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        Some(previous)
    }

    /// Step forward again. Returns the state to restore.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        info!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeType, Point};
    use pretty_assertions::assert_eq;

    fn state(labels: &[&str]) -> Snapshot {
        Snapshot {
            nodes: labels
                .iter()
                .map(|l| GraphNode::with_id(*l, NodeType::Process, *l, Point::default()))
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = HistoryManager::default();
        let s0 = state(&[]);
        let s1 = state(&["a"]);

        history.record(s0.clone());
        let restored = history.undo(s1.clone()).unwrap();
        assert_eq!(restored, s0);

        let again = history.redo(restored).unwrap();
        assert_eq!(again, s1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_oldest_entries_dropped() {
        let mut history = HistoryManager::new(3);
        for i in 0..5 {
            history.record(state(&[&i.to_string()]));
        }

        assert_eq!(history.undo_depth(), 3);
        let oldest_kept = {
            let mut last = None;
            let mut current = state(&["now"]);
            while let Some(s) = history.undo(current.clone()) {
                current = s.clone();
                last = Some(s);
            }
            last.unwrap()
        };
        assert_eq!(oldest_kept, state(&["2"]));
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut history = HistoryManager::default();
        history.record(state(&[]));
        history.undo(state(&["a"]));
        assert!(history.can_redo());

        history.record(state(&["b"]));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_gesture_without_change_records_nothing() {
        let mut history = HistoryManager::default();
        let s = state(&["a"]);

        history.begin_gesture(s.clone());
        assert!(!history.end_gesture(&s));
        assert!(!history.can_undo());

        history.begin_gesture(s.clone());
        assert!(history.end_gesture(&state(&["b"])));
        assert_eq!(history.undo_depth(), 1);
        assert!(!history.gesture_in_progress());
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut history = HistoryManager::default();
        assert!(history.undo(state(&["a"])).is_none());
        assert!(history.redo(state(&["a"])).is_none());
    }
}
