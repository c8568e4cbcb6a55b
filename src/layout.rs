//! Breadth-first layered auto-layout
//!
//! Layer 0 holds the entry nodes (triggers and nodes without incoming
//! edges). Every other node sits one layer past its deepest predecessor, so
//! edges always point to a strictly higher layer. Nodes that no entry node
//! reaches get one trailing layer each, in model order.

use crate::{Edge, GraphNode, Point};
use std::collections::{HashMap, VecDeque};

/// Horizontal distance between layers
pub const LAYER_SPACING: f64 = 340.0;

/// Vertical distance between nodes of one layer
pub const ROW_SPACING: f64 = 108.0;

/// Top-left margin of the arranged graph
pub const LAYOUT_MARGIN: f64 = 40.0;

/// Result of a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Node ids per layer, in first-reached order
    pub layers: Vec<Vec<String>>,
    positions: HashMap<String, Point>,
}

impl Layout {
    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn layer_of(&self, id: &str) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.iter().any(|n| n == id))
    }

    pub fn positions(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(id, p)| (id.as_str(), *p))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

pub struct LayoutEngine;

impl LayoutEngine {
    /// Compute layer assignment and coordinates. Deterministic for a given input.
    pub fn compute(nodes: &[GraphNode], edges: &[Edge]) -> Layout {
        if nodes.is_empty() {
            return Layout::default();
        }

        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut has_incoming = vec![false; nodes.len()];
        for edge in edges {
            if let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
                successors[from].push(to);
                has_incoming[to] = true;
            }
        }

        let mut seeds: Vec<usize> = (0..nodes.len())
            .filter(|&i| nodes[i].node_type.is_entry_point() || !has_incoming[i])
            .collect();
        if seeds.is_empty() {
            seeds.push(0);
        }

        let mut depth: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut reached_order = Vec::with_capacity(nodes.len());
        let mut queue = VecDeque::new();
        for &seed in &seeds {
            if depth[seed].is_none() {
                depth[seed] = Some(0);
                reached_order.push(seed);
                queue.push_back(seed);
            }
        }

        // Depth can never legitimately reach the node count; the cap only
        // bounds the walk on documents that already contain a loop.
        let max_depth = nodes.len();
        while let Some(current) = queue.pop_front() {
            let Some(current_depth) = depth[current] else {
                continue;
            };
            let next_depth = current_depth + 1;
            if next_depth >= max_depth {
                continue;
            }

            for &succ in &successors[current] {
                match depth[succ] {
                    None => {
                        depth[succ] = Some(next_depth);
                        reached_order.push(succ);
                        queue.push_back(succ);
                    }
                    Some(d) if d < next_depth => {
                        depth[succ] = Some(next_depth);
                        queue.push_back(succ);
                    }
                    Some(_) => {}
                }
            }
        }

        let deepest = depth.iter().flatten().copied().max().unwrap_or(0);
        let mut layers: Vec<Vec<String>> = vec![Vec::new(); deepest + 1];
        for &i in &reached_order {
            if let Some(d) = depth[i] {
                layers[d].push(nodes[i].id.clone());
            }
        }
        for (i, node) in nodes.iter().enumerate() {
            if depth[i].is_none() {
                layers.push(vec![node.id.clone()]);
            }
        }

        let mut positions = HashMap::with_capacity(nodes.len());
        for (layer_index, layer) in layers.iter().enumerate() {
            for (row, id) in layer.iter().enumerate() {
                positions.insert(
                    id.clone(),
                    Point::new(
                        LAYOUT_MARGIN + layer_index as f64 * LAYER_SPACING,
                        LAYOUT_MARGIN + row as f64 * ROW_SPACING,
                    ),
                );
            }
        }

        Layout { layers, positions }
    }
}
