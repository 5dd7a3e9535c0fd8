//! Core error type for crew deployment.
//!
//! `DeployError` is used throughout the core domain and is always raised
//! before any network call. A failed request is not an error here: it is
//! recorded as an `AttemptFailure` inside the deployment outcome.

use crate::validation::Violation;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    #[error("Missing credentials: {}", .0.join(", "))]
    MissingCredential(Vec<String>),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DeployError {
    fn from(e: serde_json::Error) -> Self {
        DeployError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for DeployError {
    fn from(e: std::io::Error) -> Self {
        DeployError::Io(e.to_string())
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, DeployError>;
