//! Invariant violations shared by crew and workflow validation.
//!
//! Validation never stops at the first problem: every check runs and each
//! failed invariant becomes one `Violation` in a `ValidationReport`.

use serde::Serialize;

use crate::error::DeployError;

/// A single violated configuration invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    // ── Crew ────────────────────────────────────────────────────────────
    #[error("crew has no agents")]
    NoAgents,

    #[error("crew has no tasks")]
    NoTasks,

    #[error("agent '{name}' is defined more than once")]
    DuplicateAgent { name: String },

    #[error("task #{task} is assigned to unknown agent '{agent}'")]
    UnknownTaskAgent { task: usize, agent: String },

    #[error("task #{task} context '{reference}' does not name an earlier task")]
    InvalidContext { task: usize, reference: String },

    #[error("max_rpm must be greater than zero")]
    ZeroRateLimit,

    // ── Workflow graph ──────────────────────────────────────────────────
    #[error("node id '{id}' is used more than once")]
    DuplicateNode { id: String },

    #[error("edge '{from}' -> '{to}' references unknown node '{missing}'")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("graph has no node of type 'input'")]
    MissingInput,

    #[error("graph has more than one node of type 'input': {}", .ids.join(", "))]
    MultipleInputs { ids: Vec<String> },

    #[error("graph has no node of type 'output'")]
    MissingOutput,

    #[error("graph has more than one node of type 'output': {}", .ids.join(", "))]
    MultipleOutputs { ids: Vec<String> },

    #[error("input node '{id}' has incoming edges")]
    InputHasIncoming { id: String },

    #[error("output node '{id}' has outgoing edges")]
    OutputHasOutgoing { id: String },

    #[error("node '{id}' has {incoming} incoming edges (expected 1)")]
    Merge { id: String, incoming: usize },

    #[error("node '{id}' has {outgoing} outgoing edges (expected 1)")]
    Branch { id: String, outgoing: usize },

    #[error("path revisits node '{id}' (cycle)")]
    Cycle { id: String },

    #[error("path from input stops at '{id}' before reaching the output node")]
    PathEndsEarly { id: String },

    #[error("nodes not on the input-to-output path: {}", .ids.join(", "))]
    Unreachable { ids: Vec<String> },

    #[error("agent node '{node}' is bound to unknown agent '{agent}'")]
    UnknownAgentBinding { node: String, agent: String },
}

/// The full list of violations found by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    /// Turn a non-empty report into a fatal `DeployError::Validation`.
    pub fn into_result(self) -> Result<(), DeployError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(DeployError::Validation(self.violations))
        }
    }
}
