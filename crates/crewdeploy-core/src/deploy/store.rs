//! ArtifactStore: durable JSON artifacts for deployment results.
//!
//! Storage layout under the configured output directory:
//!
//! ```text
//! <output_dir>/
//!   records/deployment-{target}-{datetime}-{id}.json   successful deployments
//!   pending/{target}-payload-{datetime}-{id}.json      payloads awaiting manual submission
//!   crew-config.json, workflow.json, ...               local export
//! ```
//!
//! Records and pending payloads are created with `create_new`, so an
//! existing artifact is never overwritten.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::record::DeploymentRecord;
use crate::config::Target;
use crate::error::DeployError;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn records_dir(&self) -> PathBuf {
        self.base_dir.join("records")
    }

    pub fn pending_dir(&self) -> PathBuf {
        self.base_dir.join("pending")
    }

    /// Persist a successful deployment record.
    pub async fn write_record(&self, record: &DeploymentRecord) -> Result<PathBuf, ArtifactError> {
        let filename = format!("deployment-{}-{}.json", record.target, unique_suffix());
        let path = self.records_dir().join(filename);
        self.create_json(&path, &serde_json::to_value(record)?).await?;
        tracing::info!("[ArtifactStore] Deployment record saved to '{}'", path.display());
        Ok(path)
    }

    /// Persist a payload that still needs to be submitted by hand. The file
    /// holds exactly the request body, so it can be posted as-is.
    pub async fn write_pending(
        &self,
        target: Target,
        payload: &serde_json::Value,
    ) -> Result<PathBuf, ArtifactError> {
        let filename = format!("{}-payload-{}.json", target, unique_suffix());
        let path = self.pending_dir().join(filename);
        self.create_json(&path, payload).await?;
        tracing::info!("[ArtifactStore] Pending payload saved to '{}'", path.display());
        Ok(path)
    }

    /// Write (or replace) an export file directly under the output directory.
    pub async fn write_export(&self, filename: &str, contents: &[u8]) -> Result<PathBuf, ArtifactError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| ArtifactError::Io(format!("Failed to create output dir: {}", e)))?;
        let path = self.base_dir.join(filename);
        fs::write(&path, contents)
            .await
            .map_err(|e| ArtifactError::Io(format!("Failed to write '{}': {}", path.display(), e)))?;
        Ok(path)
    }

    pub async fn write_export_json(
        &self,
        filename: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, ArtifactError> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_export(filename, json.as_bytes()).await
    }

    async fn create_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), ArtifactError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ArtifactError::Io(format!("Failed to create artifact dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(value)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| ArtifactError::Io(format!("Failed to create '{}': {}", path.display(), e)))?;

        file.write_all(json.as_bytes())
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))?;

        Ok(())
    }
}

fn unique_suffix() -> String {
    let datetime = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", datetime, &id[..8])
}

/// Error type for artifact writing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ArtifactError {
    fn from(e: serde_json::Error) -> Self {
        ArtifactError::Serialization(e.to_string())
    }
}

impl From<ArtifactError> for DeployError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::Io(msg) => DeployError::Io(msg),
            ArtifactError::Serialization(msg) => DeployError::Serialization(msg),
        }
    }
}
