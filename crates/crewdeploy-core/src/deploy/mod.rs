//! Deployment: status check, two-stage write and local persistence.
//!
//! # Architecture
//!
//! ```text
//! DeployPayload ──► StatusVerifier (GET status) ──► DeploymentClient
//!                                                     │  POST primary
//!                                                     │  POST fallback (once)
//!                                                     ▼
//!                                               ArtifactStore
//!                                     records/ (success)   pending/ (failure)
//! ```

pub mod client;
pub mod payload;
pub mod record;
pub mod state;
pub mod status;
pub mod store;

use std::time::Duration;

pub use client::DeploymentClient;
pub use payload::DeployPayload;
pub use record::{
    Attempt, AttemptFailure, AttemptStage, DeploymentOutcome, DeploymentRecord, Persisted, SkipReason,
};
pub use state::{DeploymentEvent, DeploymentState, StateTrail};
pub use status::{Reachability, StatusReport, StatusVerifier};
pub use store::{ArtifactError, ArtifactStore};

/// Build the HTTP client shared by the status check and the deployment
/// client.
pub fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
