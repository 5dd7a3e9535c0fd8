//! Crewdeploy Core: domain logic for deploying agent crews and workflow
//! graphs to a remote orchestration service.
//!
//! This crate contains the data models, builder, validator, credential and
//! configuration loading, and the deployment pipeline. It is used by:
//!
//! - the `crewdeploy` CLI
//! - integration tests that drive the pipeline against a local server
//!
//! # Flow
//!
//! ```text
//! CrewBuilder / WorkflowBuilder ──► validate ──► DeploymentPipeline
//!                                                   │ status check
//!                                                   │ primary POST, fallback POST
//!                                                   ▼
//!                                             ArtifactStore (record | pending payload)
//! ```

pub mod builder;
pub mod config;
pub mod credentials;
pub mod deploy;
pub mod document;
pub mod error;
pub mod export;
pub mod models;
pub mod orchestrator;
pub mod presets;
pub mod validation;
pub mod workflow;

pub use builder::{CrewBuilder, WorkflowBuilder};
pub use config::{DeployConfig, Endpoints, Target};
pub use credentials::{CredentialNames, CredentialSet, Credentials, Secret};
pub use deploy::{DeployPayload, DeploymentClient, DeploymentOutcome, StatusVerifier};
pub use error::{DeployError, Result};
pub use orchestrator::DeploymentPipeline;
pub use validation::{ValidationReport, Violation};
