//! Workflow graph: the node/edge pipeline submitted for tracing.
//!
//! # Architecture
//!
//! ```text
//! Pipeline (typed, single path) ──to_graph──► WorkflowGraph (nodes + edges)
//!                                                 │
//!                                             validate()
//!                                                 │
//!                                          ValidationReport
//! ```

pub mod graph;
pub mod pipeline;
pub mod validator;

pub use graph::{AgentTaskConfig, Edge, InputConfig, Node, NodeKind, NodeType, OutputConfig, WorkflowGraph};
pub use pipeline::{AgentStage, InputStage, OutputStage, Pipeline};
pub use validator::{validate, validate_bindings};
