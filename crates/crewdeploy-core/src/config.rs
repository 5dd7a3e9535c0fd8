//! Deployment configuration.
//!
//! Loaded from a YAML file; every field has a default so an empty file (or
//! no file at all) is a valid configuration.
//!
//! ```yaml
//! output_dir: ".crewdeploy"
//! timeout_secs: 300
//!
//! crew:
//!   primary: "https://api.crewship.dev/v1/crews"
//!   fallback: "https://console.crewship.dev/api/v1/crews"
//!   status: "https://api.crewship.dev/v1/crews"
//!
//! workflow:
//!   primary: "${WORKFLOW_DEPLOY_URL}"
//!   fallback: "${WORKFLOW_FALLBACK_URL:-https://example.invalid/workflows}"
//!   status: "${WORKFLOW_DEPLOY_URL}"
//!
//! credentials:
//!   bearer_token: CREWSHIP_API_KEY
//!   api_key: CREW_AI_PAT
//!   enterprise_id: CREW_AI_ENTERPRISE
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialNames;
use crate::error::{DeployError, Result};

/// What is being deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Crew,
    Workflow,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Crew => write!(f, "crew"),
            Target::Workflow => write!(f, "workflow"),
        }
    }
}

/// The three URLs used for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Write endpoint tried first
    pub primary: String,
    /// Write endpoint tried once if the primary fails
    pub fallback: String,
    /// Read-only listing endpoint used by the pre-flight check
    pub status: String,
}

impl Endpoints {
    pub fn new(
        primary: impl Into<String>,
        fallback: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
            status: status.into(),
        }
    }

    /// The crew service hosts the deployment scripts have always used.
    pub fn crewship() -> Self {
        Self::new(
            "https://api.crewship.dev/v1/crews",
            "https://console.crewship.dev/api/v1/crews",
            "https://api.crewship.dev/v1/crews",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Directory for persisted records and pending payloads
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "Endpoints::crewship")]
    pub crew: Endpoints,

    /// Workflow deployment is only possible when this is configured
    #[serde(default)]
    pub workflow: Option<Endpoints>,

    #[serde(default)]
    pub credentials: CredentialNames,

    /// Project name written into the exported tracing configuration
    #[serde(default = "default_tracing_project")]
    pub tracing_project: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".crewdeploy")
}

fn default_timeout() -> u64 {
    300
}

fn default_tracing_project() -> String {
    "the-big-family-legacy".to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            timeout_secs: default_timeout(),
            crew: Endpoints::crewship(),
            workflow: None,
            credentials: CredentialNames::default(),
            tracing_project: default_tracing_project(),
        }
    }
}

impl DeployConfig {
    /// Parse from YAML after expanding `${VAR}` references.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let expanded = resolve_env_vars(yaml);
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }
        crate::document::from_yaml(&expanded)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::Io(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let config = Self::from_file(p)?;
                tracing::info!("[Config] Loaded configuration from '{}'", p.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn endpoints(&self, target: Target) -> Result<&Endpoints> {
        match target {
            Target::Crew => Ok(&self.crew),
            Target::Workflow => self.workflow.as_ref().ok_or_else(|| {
                DeployError::Configuration(
                    "no endpoints configured for target 'workflow'".to_string(),
                )
            }),
        }
    }
}

/// Resolve environment variable references in a string.
/// Supports `${ENV_VAR}` and `${ENV_VAR:-default}` syntax; unknown
/// variables without a default are left untouched.
pub fn resolve_env_vars(input: &str) -> String {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = PATTERN
        .get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));
    re.replace_all(input, |caps: &regex::Captures| {
        let var_expr = &caps[1];
        if let Some(idx) = var_expr.find(":-") {
            let var_name = &var_expr[..idx];
            let default_val = &var_expr[idx + 2..];
            std::env::var(var_name).unwrap_or_else(|_| default_val.to_string())
        } else {
            std::env::var(var_expr).unwrap_or_else(|_| format!("${{{}}}", var_expr))
        }
    })
    .to_string()
}
