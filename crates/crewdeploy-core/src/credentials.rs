//! Credential loading.
//!
//! Secrets are looked up by name once at process start (environment, after
//! an optional `.env` file) and carried in `Secret` wrappers that never print
//! their value. Nothing in this crate embeds a secret value.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// A secret string. `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(***)")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

/// Names of the secrets to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialNames {
    #[serde(default = "default_bearer_token")]
    pub bearer_token: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_enterprise_id")]
    pub enterprise_id: String,
}

fn default_bearer_token() -> String {
    "CREWSHIP_API_KEY".to_string()
}

fn default_api_key() -> String {
    "CREW_AI_PAT".to_string()
}

fn default_enterprise_id() -> String {
    "CREW_AI_ENTERPRISE".to_string()
}

impl Default for CredentialNames {
    fn default() -> Self {
        Self {
            bearer_token: default_bearer_token(),
            api_key: default_api_key(),
            enterprise_id: default_enterprise_id(),
        }
    }
}

impl CredentialNames {
    pub fn all(&self) -> [&str; 3] {
        [&self.bearer_token, &self.api_key, &self.enterprise_id]
    }
}

/// The complete set of secrets needed for remote calls.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub bearer_token: Secret,
    pub api_key: Secret,
    pub enterprise_id: Secret,
}

impl Credentials {
    pub fn new(
        bearer_token: impl Into<String>,
        api_key: impl Into<String>,
        enterprise_id: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: Secret::new(bearer_token),
            api_key: Secret::new(api_key),
            enterprise_id: Secret::new(enterprise_id),
        }
    }
}

/// Whatever the credential loader found, possibly incomplete.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    names: CredentialNames,
    values: HashMap<String, Secret>,
}

impl CredentialSet {
    /// Look up every named secret through `lookup`. Empty values count as
    /// missing.
    pub fn from_lookup<F>(names: CredentialNames, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = HashMap::new();
        for name in names.all() {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                values.insert(name.to_string(), Secret::new(value));
            }
        }
        Self { names, values }
    }

    pub fn from_env(names: CredentialNames) -> Self {
        Self::from_lookup(names, |name| std::env::var(name).ok())
    }

    pub fn from_map(names: CredentialNames, map: &HashMap<String, String>) -> Self {
        Self::from_lookup(names, |name| map.get(name).cloned())
    }

    pub fn names(&self) -> &CredentialNames {
        &self.names
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of required secrets that were not found, in a fixed order.
    pub fn missing(&self) -> Vec<String> {
        self.names
            .all()
            .into_iter()
            .filter(|name| !self.values.contains_key(*name))
            .map(str::to_string)
            .collect()
    }

    /// All secrets, or `DeployError::MissingCredential` listing what is absent.
    pub fn require(&self) -> Result<Credentials> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(DeployError::MissingCredential(missing));
        }
        let get = |name: &str| {
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| DeployError::MissingCredential(vec![name.to_string()]))
        };
        Ok(Credentials {
            bearer_token: get(&self.names.bearer_token)?,
            api_key: get(&self.names.api_key)?,
            enterprise_id: get(&self.names.enterprise_id)?,
        })
    }
}

/// Apply a `.env` file to the process environment. Variables already set
/// take priority. A missing file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    let result = match path {
        Some(p) => {
            if !p.exists() {
                tracing::debug!("[Credentials] No env file at '{}'", p.display());
                return Ok(());
            }
            dotenvy::from_path(p).map(|_| p.to_path_buf())
        }
        None => dotenvy::dotenv(),
    };

    match result {
        Ok(loaded) => {
            tracing::info!("[Credentials] Loaded environment from '{}'", loaded.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(DeployError::Configuration(format!(
            "Failed to load env file: {}",
            e
        ))),
    }
}
