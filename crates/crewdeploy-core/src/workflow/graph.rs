//! Node/edge workflow graph as submitted for tracing.
//!
//! ```json
//! {
//!   "name": "family-legacy-processing",
//!   "nodes": [
//!     { "id": "memory_upload", "type": "input", "config": { "schema": { ... } } },
//!     { "id": "analyze_memory", "type": "agent", "agent": "Memory Analyzer",
//!       "config": { "task": "Analyze uploaded memory and extract metadata" } },
//!     { "id": "output", "type": "output", "config": { "format": "json", "schema": { ... } } }
//!   ],
//!   "edges": [
//!     { "from": "memory_upload", "to": "analyze_memory" },
//!     { "from": "analyze_memory", "to": "output" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub nodes: Vec<Node>,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Type-specific node payload, tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Input { config: InputConfig },
    Agent { agent: String, config: AgentTaskConfig },
    Output { config: OutputConfig },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTaskConfig {
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub schema: serde_json::Value,
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Input,
    Agent,
    Output,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Input => write!(f, "input"),
            NodeType::Agent => write!(f, "agent"),
            NodeType::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Node {
    pub fn input(id: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Input {
                config: InputConfig { schema },
            },
        }
    }

    pub fn agent(id: impl Into<String>, agent: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Agent {
                agent: agent.into(),
                config: AgentTaskConfig { task: task.into() },
            },
        }
    }

    pub fn output(id: impl Into<String>, format: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Output {
                config: OutputConfig {
                    format: format.into(),
                    schema,
                },
            },
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Input { .. } => NodeType::Input,
            NodeKind::Agent { .. } => NodeType::Agent,
            NodeKind::Output { .. } => NodeType::Output,
        }
    }

    /// The bound agent name, for agent nodes.
    pub fn agent_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Agent { agent, .. } => Some(agent),
            _ => None,
        }
    }
}

impl WorkflowGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ids of nodes of the given type, in declaration order.
    pub fn ids_of_type(&self, node_type: NodeType) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.node_type() == node_type)
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Load a workflow graph from a JSON or YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        crate::document::from_path(path)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
