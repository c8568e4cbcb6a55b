use crate::{ConnectionRejection, Edge, GraphModel};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

// ========== Connection Guard ==========

/// Checks candidate edges against an existing edge set
pub struct ConnectionGuard;

impl ConnectionGuard {
    /// Check a single candidate against `edges`.
    ///
    /// Self-loops, exact duplicates (same endpoints and ports) and edges that
    /// would close a directed loop are refused.
    pub fn validate(edges: &[Edge], candidate: &Edge) -> Result<(), ConnectionRejection> {
        if candidate.from == candidate.to {
            return Err(ConnectionRejection::SelfLoop);
        }

        if edges.iter().any(|e| e.key() == candidate.key()) {
            return Err(ConnectionRejection::Duplicate);
        }

        if Self::would_create_cycle(edges, &candidate.from, &candidate.to) {
            return Err(ConnectionRejection::Cycle);
        }

        Ok(())
    }

    /// True when `from` is reachable from `to` over outgoing edges
    pub fn would_create_cycle(edges: &[Edge], from: &str, to: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack = vec![to];

        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                edges
                    .iter()
                    .filter(|e| e.starts_from(current))
                    .map(|e| e.to.as_str()),
            );
        }

        false
    }

    /// Validate a batch as one unit.
    ///
    /// Each member is checked against the existing edges plus the members
    /// accepted before it; the first rejection rejects the whole batch.
    pub fn validate_batch(edges: &[Edge], batch: &[Edge]) -> Result<(), ConnectionRejection> {
        let mut combined = edges.to_vec();

        for (index, candidate) in batch.iter().enumerate() {
            if let Err(rejection) = Self::validate(&combined, candidate) {
                warn!(
                    index,
                    from = %candidate.from,
                    to = %candidate.to,
                    %rejection,
                    "batch member rejected"
                );
                return Err(rejection);
            }
            combined.push(candidate.clone());
        }

        Ok(())
    }
}

// ========== Whole-Model Validation ==========

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,
    Warning,
    Error,
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub affected_nodes: Vec<String>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    Cycle,
    DuplicateEdge,
    DanglingEdge,
    NoEntryPoint,
    UnreachableNode,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Issues of one severity
    pub fn with_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Info)
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

/// Audits a whole model, typically one just loaded from disk.
///
/// Edits made through [`GraphModel`] cannot produce the errors reported
/// here; documents written elsewhere can.
pub struct Validator;

impl Validator {
    pub fn validate(model: &GraphModel) -> ValidationResult {
        let mut result = ValidationResult::new();
        let edges = model.edges();

        let dangling: Vec<&Edge> = edges
            .iter()
            .filter(|e| model.get_node(&e.from).is_none() || model.get_node(&e.to).is_none())
            .collect();
        if !dangling.is_empty() {
            let mut affected: Vec<String> = dangling
                .iter()
                .flat_map(|e| [e.from.clone(), e.to.clone()])
                .collect();
            affected.sort();
            affected.dedup();
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: format!("{} connection(s) reference missing nodes.", dangling.len()),
                affected_nodes: affected,
                issue_type: ValidationIssueType::DanglingEdge,
            });
        }

        let mut seen = HashSet::new();
        let duplicates: Vec<String> = edges
            .iter()
            .filter(|e| !seen.insert(e.key()))
            .map(|e| e.from.clone())
            .collect();
        if !duplicates.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: format!("{} duplicate connection(s).", duplicates.len()),
                affected_nodes: duplicates,
                issue_type: ValidationIssueType::DuplicateEdge,
            });
        }

        if let Some(cycle_nodes) = Self::detect_cycles(model) {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: format!(
                    "Cycle detected involving {} node(s). Flows must be acyclic.",
                    cycle_nodes.len()
                ),
                affected_nodes: cycle_nodes,
                issue_type: ValidationIssueType::Cycle,
            });
        }

        if !model.nodes().is_empty() && !model.nodes().iter().any(|n| n.node_type.is_entry_point())
        {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: "No trigger node. The flow has no explicit entry point.".to_string(),
                affected_nodes: vec![],
                issue_type: ValidationIssueType::NoEntryPoint,
            });
        }

        let unreachable = Self::find_unreachable_nodes(model);
        if !unreachable.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Info,
                message: format!(
                    "{} node(s) cannot be reached from any entry point.",
                    unreachable.len()
                ),
                affected_nodes: unreachable,
                issue_type: ValidationIssueType::UnreachableNode,
            });
        }

        result
    }

    /// Detect cycles in the connection graph using DFS
    fn detect_cycles(model: &GraphModel) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut cycle_nodes = Vec::new();

        for node in model.nodes() {
            if !visited.contains(node.id.as_str())
                && Self::dfs_detect_cycle(
                    model,
                    &node.id,
                    &mut visited,
                    &mut rec_stack,
                    &mut cycle_nodes,
                )
            {
                return Some(cycle_nodes);
            }
        }

        None
    }

    fn dfs_detect_cycle<'a>(
        model: &'a GraphModel,
        node_id: &'a str,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
        cycle_nodes: &mut Vec<String>,
    ) -> bool {
        visited.insert(node_id);
        rec_stack.insert(node_id);

        for edge in model.outgoing_edges(node_id) {
            let target = edge.to.as_str();

            if !visited.contains(target) {
                if Self::dfs_detect_cycle(model, target, visited, rec_stack, cycle_nodes) {
                    cycle_nodes.push(node_id.to_string());
                    return true;
                }
            } else if rec_stack.contains(target) {
                cycle_nodes.push(node_id.to_string());
                cycle_nodes.push(target.to_string());
                return true;
            }
        }

        rec_stack.remove(node_id);
        false
    }

    /// Nodes not reachable from a trigger or a node without incoming edges
    fn find_unreachable_nodes(model: &GraphModel) -> Vec<String> {
        let mut queue: Vec<&str> = model
            .nodes()
            .iter()
            .filter(|n| n.node_type.is_entry_point() || model.incoming_edges(&n.id).next().is_none())
            .map(|n| n.id.as_str())
            .collect();

        let mut reachable = HashSet::new();
        while let Some(node_id) = queue.pop() {
            if !reachable.insert(node_id) {
                continue;
            }
            queue.extend(model.outgoing_edges(node_id).map(|e| e.to.as_str()));
        }

        model
            .nodes()
            .iter()
            .filter(|n| !reachable.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect()
    }
}

/// Extension trait for GraphModel to add validation
pub trait ValidatedModel {
    fn validate(&self) -> ValidationResult;

    /// Highest severity per affected node
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity>;
}

impl ValidatedModel for GraphModel {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self)
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<String, ValidationSeverity> {
        let mut nodes = HashMap::new();

        for issue in &result.issues {
            for node_id in &issue.affected_nodes {
                nodes
                    .entry(node_id.clone())
                    .and_modify(|severity: &mut ValidationSeverity| {
                        *severity = (*severity).max(issue.severity);
                    })
                    .or_insert(issue.severity);
            }
        }

        nodes
    }
}
