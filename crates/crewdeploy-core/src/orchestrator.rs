//! Deployment pipeline: the full pre-flight + deploy sequence.
//!
//! 1. Validate the payload (fatal on violations)
//! 2. Resolve credentials; if any are missing, save the payload and skip
//! 3. Check the status endpoint unless told not to; if unreachable, save
//!    the payload and skip
//! 4. Hand over to [`DeploymentClient`]

use crate::config::{DeployConfig, Endpoints, Target};
use crate::credentials::CredentialSet;
use crate::deploy::{
    self, ArtifactStore, DeployPayload, DeploymentClient, DeploymentOutcome, SkipReason,
    StatusReport, StatusVerifier,
};
use crate::error::{DeployError, Result};

pub struct DeploymentPipeline {
    verifier: StatusVerifier,
    client: DeploymentClient,
    store: ArtifactStore,
    status_endpoint: String,
    skip_check: bool,
}

impl DeploymentPipeline {
    pub fn new(http: reqwest::Client, endpoints: Endpoints, store: ArtifactStore) -> Self {
        Self {
            verifier: StatusVerifier::new(http.clone()),
            status_endpoint: endpoints.status.clone(),
            client: DeploymentClient::new(http, endpoints, store.clone()),
            store,
            skip_check: false,
        }
    }

    /// Build a pipeline for `target` from the loaded configuration.
    pub fn from_config(config: &DeployConfig, target: Target) -> Result<Self> {
        let endpoints = config.endpoints(target)?.clone();
        let http = deploy::http_client(config.timeout_secs);
        Ok(Self::new(http, endpoints, ArtifactStore::new(&config.output_dir)))
    }

    /// Go straight to the write requests without the status check.
    pub fn skip_check(mut self, skip: bool) -> Self {
        self.skip_check = skip;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub async fn run(&self, payload: &DeployPayload, credentials: &CredentialSet) -> Result<DeploymentOutcome> {
        payload.validate().into_result()?;

        let creds = match credentials.require() {
            Ok(c) => c,
            Err(DeployError::MissingCredential(names)) => {
                tracing::warn!(
                    "[DeploymentPipeline] Missing credentials ({}); skipping deployment",
                    names.join(", ")
                );
                return self.skip(payload, SkipReason::MissingCredentials(names)).await;
            }
            Err(e) => return Err(e),
        };

        if self.skip_check {
            tracing::info!("[DeploymentPipeline] Status check skipped");
        } else {
            let report = self.verifier.check_reachable(&self.status_endpoint, &creds).await;
            if !report.reachable() {
                tracing::warn!(
                    "[DeploymentPipeline] Service not reachable ({}); skipping deployment",
                    report.detail
                );
                return self.skip(payload, SkipReason::Unreachable(report)).await;
            }
        }

        self.client.deploy(payload, &creds).await
    }

    /// Run only the status check.
    pub async fn check(&self, credentials: &CredentialSet) -> Result<StatusReport> {
        let creds = credentials.require()?;
        Ok(self.verifier.check_reachable(&self.status_endpoint, &creds).await)
    }

    async fn skip(&self, payload: &DeployPayload, reason: SkipReason) -> Result<DeploymentOutcome> {
        let body = payload.to_json()?;
        let artifact = self.store.write_pending(payload.target(), &body).await;
        if let Err(e) = &artifact {
            tracing::error!("[DeploymentPipeline] Could not save pending payload: {}", e);
        }
        Ok(DeploymentOutcome::Skipped { reason, artifact })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialNames;
    use crate::presets;
    use std::collections::HashMap;

    fn unreachable_endpoints() -> Endpoints {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}/v1/crews", addr);
        Endpoints::new(url.clone(), url.clone(), url)
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_without_requests() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = DeploymentPipeline::new(
            reqwest::Client::new(),
            unreachable_endpoints(),
            ArtifactStore::new(dir.path()),
        );
        let creds = CredentialSet::from_map(CredentialNames::default(), &HashMap::new());
        let payload: DeployPayload = presets::build_crew().unwrap().into();

        let outcome = pipeline.run(&payload, &creds).await.unwrap();
        match &outcome {
            DeploymentOutcome::Skipped {
                reason: SkipReason::MissingCredentials(names),
                ..
            } => assert_eq!(names.len(), 3),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(outcome.artifact().unwrap()).unwrap()).unwrap();
        assert_eq!(saved, payload.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = DeploymentPipeline::new(
            reqwest::Client::new(),
            unreachable_endpoints(),
            ArtifactStore::new(dir.path()),
        );
        let mut graph = presets::build_workflow().unwrap();
        graph.edges.pop();
        let creds = CredentialSet::from_map(CredentialNames::default(), &HashMap::new());

        let err = pipeline.run(&graph.into(), &creds).await.unwrap_err();
        assert!(matches!(err, DeployError::Validation(_)));
        assert!(!pipeline.store().pending_dir().exists());
    }

    #[test]
    fn test_workflow_target_needs_endpoints() {
        let config = DeployConfig::default();
        assert!(DeploymentPipeline::from_config(&config, Target::Crew).is_ok());
        assert!(matches!(
            DeploymentPipeline::from_config(&config, Target::Workflow),
            Err(DeployError::Configuration(_))
        ));
    }
}
