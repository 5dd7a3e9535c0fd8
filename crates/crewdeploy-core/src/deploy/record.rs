//! Attempt results and the persisted deployment record.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::DeploymentState;
use super::store::ArtifactError;
use crate::config::Target;

/// Which of the two write endpoints an attempt went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStage {
    Primary,
    Fallback,
}

impl std::fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptStage::Primary => write!(f, "primary"),
            AttemptStage::Fallback => write!(f, "fallback"),
        }
    }
}

/// Why a single attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// The request never produced an HTTP response
    Transport { message: String },
    /// The service answered with a status other than 200/201
    RemoteRejection { status: u16 },
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Transport { message } => write!(f, "transport error: {}", message),
            AttemptFailure::RemoteRejection { status } => write!(f, "rejected with HTTP {}", status),
        }
    }
}

/// One outbound write request and what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub stage: AttemptStage,
    pub endpoint: String,
    pub status: Option<u16>,
    /// Parsed JSON when possible, otherwise the raw text; null without a response
    pub body: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<AttemptFailure>,
}

impl Attempt {
    pub fn accepted(&self) -> bool {
        self.failure.is_none()
    }
}

/// Only 200 and 201 count as a successful write.
pub fn is_accepted_status(status: u16) -> bool {
    status == 200 || status == 201
}

/// Parse a response body as JSON, keeping the raw text when it is not JSON.
pub fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

/// The durable record of a successful deployment. Written once, never
/// modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub target: Target,
    pub name: String,
    pub endpoint: String,
    pub status: u16,
    pub payload: serde_json::Value,
    pub response: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub fn from_attempt(target: Target, name: &str, payload: serde_json::Value, attempt: &Attempt) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target,
            name: name.to_string(),
            endpoint: attempt.endpoint.clone(),
            status: attempt.status.unwrap_or_default(),
            payload,
            response: attempt.body.clone(),
            recorded_at: Utc::now(),
        }
    }
}

/// Why the pipeline stopped before any write request.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingCredentials(Vec<String>),
    Unreachable(super::status::StatusReport),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCredentials(names) => {
                write!(f, "missing credentials: {}", names.join(", "))
            }
            SkipReason::Unreachable(report) => {
                write!(f, "service not reachable ({}): {}", report.reachability, report.detail)
            }
        }
    }
}

/// The local file an outcome was saved to, or why saving it failed. A
/// failed write never hides what happened remotely.
pub type Persisted = std::result::Result<PathBuf, ArtifactError>;

/// Terminal result of one deployment attempt.
#[derive(Debug, Clone)]
pub enum DeploymentOutcome {
    /// A write endpoint accepted the payload; `artifact` holds the record.
    Deployed {
        record: DeploymentRecord,
        artifact: Persisted,
        attempts: Vec<Attempt>,
        states: Vec<DeploymentState>,
    },
    /// Both endpoints failed; `artifact` holds the unsent payload.
    DeploymentFailed {
        primary: Attempt,
        fallback: Attempt,
        artifact: Persisted,
        states: Vec<DeploymentState>,
    },
    /// No write was attempted; `artifact` holds the unsent payload.
    Skipped { reason: SkipReason, artifact: Persisted },
}

impl DeploymentOutcome {
    pub fn is_deployed(&self) -> bool {
        matches!(self, DeploymentOutcome::Deployed { .. })
    }

    fn persisted(&self) -> &Persisted {
        match self {
            DeploymentOutcome::Deployed { artifact, .. }
            | DeploymentOutcome::DeploymentFailed { artifact, .. }
            | DeploymentOutcome::Skipped { artifact, .. } => artifact,
        }
    }

    /// The single local file this outcome produced, if it could be written.
    pub fn artifact(&self) -> Option<&Path> {
        self.persisted().as_ref().ok().map(PathBuf::as_path)
    }

    pub fn persistence_error(&self) -> Option<&ArtifactError> {
        self.persisted().as_ref().err()
    }

    /// Write attempts made, in order.
    pub fn attempts(&self) -> Vec<&Attempt> {
        match self {
            DeploymentOutcome::Deployed { attempts, .. } => attempts.iter().collect(),
            DeploymentOutcome::DeploymentFailed {
                primary, fallback, ..
            } => vec![primary, fallback],
            DeploymentOutcome::Skipped { .. } => Vec::new(),
        }
    }

    pub fn states(&self) -> &[DeploymentState] {
        match self {
            DeploymentOutcome::Deployed { states, .. }
            | DeploymentOutcome::DeploymentFailed { states, .. } => states,
            DeploymentOutcome::Skipped { .. } => &[],
        }
    }
}
