//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses the
//! crewdeploy-core domain logic through a shared [`Context`].

pub mod check;
pub mod deploy;
pub mod export;
pub mod validate;

use std::path::{Path, PathBuf};

use crewdeploy_core::credentials::{self, CredentialSet};
use crewdeploy_core::models::Crew;
use crewdeploy_core::workflow::WorkflowGraph;
use crewdeploy_core::{presets, DeployConfig};

/// Configuration and credentials, loaded once per invocation.
pub struct Context {
    pub config: DeployConfig,
    pub credentials: CredentialSet,
}

impl Context {
    /// Apply the env file first so `${VAR}` references in the config can see it.
    pub fn load(
        config_path: Option<&Path>,
        env_file: Option<&Path>,
        output_dir: Option<PathBuf>,
    ) -> Result<Self, String> {
        credentials::load_env_file(env_file).map_err(|e| e.to_string())?;

        let mut config = DeployConfig::load(config_path).map_err(|e| e.to_string())?;
        if let Some(dir) = output_dir {
            config.output_dir = dir;
        }

        let credentials = CredentialSet::from_env(config.credentials.clone());
        let missing = credentials.missing();
        if !missing.is_empty() {
            tracing::debug!("[cli] Credentials not set: {}", missing.join(", "));
        }
        Ok(Self {
            config,
            credentials,
        })
    }
}

/// The crew from `path`, or the built-in one.
pub fn load_crew(path: Option<&Path>) -> Result<Crew, String> {
    match path {
        Some(p) => Crew::from_file(p).map_err(|e| e.to_string()),
        None => presets::build_crew().map_err(|e| e.to_string()),
    }
}

/// The workflow graph from `path`, or the built-in one.
pub fn load_workflow(path: Option<&Path>) -> Result<WorkflowGraph, String> {
    match path {
        Some(p) => WorkflowGraph::from_file(p).map_err(|e| e.to_string()),
        None => presets::build_workflow().map_err(|e| e.to_string()),
    }
}
