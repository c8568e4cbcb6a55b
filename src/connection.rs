use crate::Port;
use serde::{Deserialize, Serialize};

/// Directed connection between two canvas nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Source node (flow goes FROM this node)
    pub from: String,

    /// Destination node (flow goes TO this node)
    pub to: String,

    #[serde(default = "default_from_port")]
    pub from_port: Port,

    #[serde(default = "default_to_port")]
    pub to_port: Port,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_from_port() -> Port {
    Port::Right
}

fn default_to_port() -> Port {
    Port::Left
}

impl Edge {
    /// Create an edge using the default right → left ports
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::with_ports(from, to, Port::Right, Port::Left)
    }

    pub fn with_ports(
        from: impl Into<String>,
        to: impl Into<String>,
        from_port: Port,
        to_port: Port,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_port,
            to_port,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check if this edge involves a given node
    pub fn involves(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// Check if this edge starts from a given node
    pub fn starts_from(&self, node_id: &str) -> bool {
        self.from == node_id
    }

    /// Check if this edge ends at a given node
    pub fn ends_at(&self, node_id: &str) -> bool {
        self.to == node_id
    }

    /// Endpoints and ports; two edges with the same key are duplicates
    pub fn key(&self) -> (&str, &str, Port, Port) {
        (&self.from, &self.to, self.from_port, self.to_port)
    }

    /// Reverse the direction of this edge, swapping ports with it
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            from_port: self.to_port,
            to_port: self.from_port,
            label: self.label.clone(),
        }
    }
}
