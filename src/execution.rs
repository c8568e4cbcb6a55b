//! Simulated execution playback
//!
//! Nodes light up in breadth-first waves from the entry nodes, one wave per
//! step interval. Playback is driven by explicit clock ticks so it can be
//! cancelled at any point; ticks after cancellation do nothing.

use crate::{Edge, GraphNode};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info};

/// Delay between two waves
pub const DEFAULT_STEP_MS: u64 = 600;

/// Pause after the last node before playback reports completion
pub const FINISH_DELAY_MS: u64 = 800;

/// How long the completed state stays visible before resetting
pub const RESET_DELAY_MS: u64 = 2500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNode {
    pub node_id: String,
    pub delay_ms: u64,
}

/// Order and timing of one playback run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub schedule: Vec<ScheduledNode>,
}

impl ExecutionPlan {
    /// Schedule every node: reachable ones by BFS depth, the rest afterwards
    /// one step apart.
    pub fn build(nodes: &[GraphNode], edges: &[Edge], step_ms: u64) -> Self {
        let has_incoming: HashSet<&str> = edges.iter().map(|e| e.to.as_str()).collect();
        let mut queue: VecDeque<(&str, u64)> = nodes
            .iter()
            .filter(|n| n.node_type.is_entry_point() || !has_incoming.contains(n.id.as_str()))
            .map(|n| (n.id.as_str(), 0))
            .collect();
        if queue.is_empty() {
            if let Some(first) = nodes.first() {
                queue.push_back((first.id.as_str(), 0));
            }
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut schedule = Vec::with_capacity(nodes.len());
        while let Some((id, depth)) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            schedule.push(ScheduledNode {
                node_id: id.to_string(),
                delay_ms: depth * step_ms,
            });
            for edge in edges.iter().filter(|e| e.from == id) {
                if !visited.contains(edge.to.as_str()) {
                    queue.push_back((edge.to.as_str(), depth + 1));
                }
            }
        }

        for node in nodes {
            if !visited.contains(node.id.as_str()) {
                let delay_ms = schedule.len() as u64 * step_ms;
                schedule.push(ScheduledNode {
                    node_id: node.id.clone(),
                    delay_ms,
                });
            }
        }

        Self { schedule }
    }

    /// Time at which the run counts as complete
    pub fn total_ms(&self) -> u64 {
        self.schedule.iter().map(|s| s.delay_ms).max().unwrap_or(0) + FINISH_DELAY_MS
    }

    pub fn len(&self) -> usize {
        self.schedule.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    /// Every node has run; the result stays visible until reset
    Complete,
    /// Lights cleared after completion
    Idle,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlayback {
    plan: ExecutionPlan,
    elapsed_ms: u64,
    /// Nodes already lit, in schedule order
    completed: Vec<String>,
    status: ExecutionStatus,
}

impl ExecutionPlayback {
    pub fn start(nodes: &[GraphNode], edges: &[Edge], step_ms: u64) -> Self {
        let plan = ExecutionPlan::build(nodes, edges, step_ms);
        info!(nodes = plan.len(), total_ms = plan.total_ms(), "execution playback started");
        let mut playback = Self {
            plan,
            elapsed_ms: 0,
            completed: Vec::new(),
            status: ExecutionStatus::Running,
        };
        // Entry nodes light up immediately
        playback.tick(0);
        playback
    }

    /// Advance the clock. Returns the nodes that lit up during this tick.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<String> {
        if matches!(self.status, ExecutionStatus::Cancelled | ExecutionStatus::Idle) {
            return Vec::new();
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);

        let lit: Vec<String> = self
            .plan
            .schedule
            .iter()
            .skip(self.completed.len())
            .take_while(|s| s.delay_ms <= self.elapsed_ms)
            .map(|s| s.node_id.clone())
            .collect();
        self.completed.extend(lit.iter().cloned());

        let total = self.plan.total_ms();
        if self.status == ExecutionStatus::Running && self.elapsed_ms >= total {
            self.status = ExecutionStatus::Complete;
            info!(elapsed_ms = self.elapsed_ms, "execution playback complete");
        }
        if self.status == ExecutionStatus::Complete && self.elapsed_ms >= total + RESET_DELAY_MS {
            self.status = ExecutionStatus::Idle;
            self.completed.clear();
            debug!("execution playback reset");
        }
        lit
    }

    /// Stop playback; later ticks are ignored
    pub fn cancel(&mut self) {
        if self.status != ExecutionStatus::Cancelled {
            debug!(lit = self.completed.len(), "execution playback cancelled");
        }
        self.status = ExecutionStatus::Cancelled;
        self.completed.clear();
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == ExecutionStatus::Running
    }

    pub fn is_completed(&self, node_id: &str) -> bool {
        self.completed.iter().any(|id| id == node_id)
    }

    pub fn completed_nodes(&self) -> &[String] {
        &self.completed
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeType, Point};
    use pretty_assertions::assert_eq;

    fn nodes(ids: &[&str]) -> Vec<GraphNode> {
        ids.iter()
            .map(|id| GraphNode::with_id(*id, NodeType::Process, *id, Point::default()))
            .collect()
    }

    fn delays(plan: &ExecutionPlan) -> Vec<(&str, u64)> {
        plan.schedule
            .iter()
            .map(|s| (s.node_id.as_str(), s.delay_ms))
            .collect()
    }

    #[test]
    fn test_plan_waves() {
        let plan = ExecutionPlan::build(
            &nodes(&["a", "b", "c", "d"]),
            &[Edge::new("a", "b"), Edge::new("a", "c"), Edge::new("c", "d")],
            DEFAULT_STEP_MS,
        );

        assert_eq!(delays(&plan), vec![("a", 0), ("b", 600), ("c", 600), ("d", 1200)]);
        assert_eq!(plan.total_ms(), 2000);
    }

    #[test]
    fn test_unreached_nodes_run_last() {
        // b and c only reach each other
        let plan = ExecutionPlan::build(
            &nodes(&["a", "b", "c"]),
            &[Edge::new("b", "c"), Edge::new("c", "b")],
            100,
        );

        assert_eq!(delays(&plan), vec![("a", 0), ("b", 100), ("c", 200)]);
    }

    #[test]
    fn test_ticks_light_nodes_in_order() {
        let graph = nodes(&["a", "b", "c"]);
        let edges = [Edge::new("a", "b"), Edge::new("b", "c")];
        let mut playback = ExecutionPlayback::start(&graph, &edges, DEFAULT_STEP_MS);

        assert_eq!(playback.completed_nodes(), &["a".to_string()]);
        assert_eq!(playback.tick(599), Vec::<String>::new());
        assert_eq!(playback.tick(1), vec!["b".to_string()]);
        assert_eq!(playback.tick(600), vec!["c".to_string()]);
        assert!(playback.is_running());

        playback.tick(800);
        assert_eq!(playback.status(), ExecutionStatus::Complete);
        assert!(playback.is_completed("c"));

        playback.tick(RESET_DELAY_MS);
        assert_eq!(playback.status(), ExecutionStatus::Idle);
        assert!(playback.completed_nodes().is_empty());
    }

    #[test]
    fn test_cancelled_playback_ignores_ticks() {
        let graph = nodes(&["a", "b"]);
        let mut playback = ExecutionPlayback::start(&graph, &[Edge::new("a", "b")], DEFAULT_STEP_MS);

        playback.cancel();

        assert!(playback.tick(10_000).is_empty());
        assert_eq!(playback.status(), ExecutionStatus::Cancelled);
        assert!(!playback.is_completed("b"));
    }

    #[test]
    fn test_empty_canvas() {
        let playback = ExecutionPlayback::start(&[], &[], DEFAULT_STEP_MS);
        assert!(playback.plan().is_empty());
        assert!(playback.is_running());
    }
}
