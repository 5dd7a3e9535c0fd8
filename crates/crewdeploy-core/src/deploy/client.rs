//! Deployment Client: pushes a crew or workflow to the remote service.
//!
//! At most two write requests per `deploy` call, strictly one after the
//! other:
//!
//! POST {primary}
//! Headers:
//!   Authorization: Bearer {token}
//!   Content-Type: application/json
//!   X-API-Key: {api_key}
//!
//! POST {fallback}   (only if the primary did not return 200/201)
//! Headers:
//!   Authorization: Bearer {token}
//!   Content-Type: application/json
//!
//! Each call saves one artifact: the deployment record on success, or the
//! unsent payload when both endpoints fail.

use super::payload::DeployPayload;
use super::record::{
    is_accepted_status, parse_body, Attempt, AttemptFailure, AttemptStage, DeploymentOutcome,
    DeploymentRecord,
};
use super::state::{DeploymentEvent, StateTrail};
use super::store::ArtifactStore;
use crate::config::Endpoints;
use crate::credentials::Credentials;
use crate::error::{DeployError, Result};

pub struct DeploymentClient {
    client: reqwest::Client,
    endpoints: Endpoints,
    store: ArtifactStore,
}

impl DeploymentClient {
    pub fn new(client: reqwest::Client, endpoints: Endpoints, store: ArtifactStore) -> Self {
        Self {
            client,
            endpoints,
            store,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Deploy `payload`, falling back once to the secondary endpoint.
    ///
    /// Returns `Err` only for problems found before any request is sent.
    /// Remote failures are reported through `DeploymentOutcome::DeploymentFailed`,
    /// and a local write failure travels inside the outcome's `artifact`.
    pub async fn deploy(&self, payload: &DeployPayload, credentials: &Credentials) -> Result<DeploymentOutcome> {
        let mut trail = StateTrail::new();

        let report = payload.validate();
        if !report.is_valid() {
            trail.advance(DeploymentEvent::ValidationFailed);
            tracing::warn!(
                "[DeploymentClient] '{}' failed validation with {} violation(s)",
                payload.name(),
                report.len()
            );
            return Err(DeployError::Validation(report.violations));
        }
        trail.advance(DeploymentEvent::ValidationPassed);

        let target = payload.target();
        let body = payload.to_json()?;

        trail.advance(DeploymentEvent::RequestSent);
        tracing::info!(
            "[DeploymentClient] Deploying {} '{}' to {}",
            target,
            payload.name(),
            self.endpoints.primary
        );
        let primary = self.send(AttemptStage::Primary, &body, credentials).await;

        if primary.accepted() {
            trail.advance(DeploymentEvent::Accepted);
            return self.succeed(payload, body, vec![primary], trail).await;
        }

        trail.advance(DeploymentEvent::Rejected);
        tracing::warn!(
            "[DeploymentClient] Primary endpoint failed ({}), trying {}",
            primary.failure.as_ref().map(|f| f.to_string()).unwrap_or_default(),
            self.endpoints.fallback
        );
        let fallback = self.send(AttemptStage::Fallback, &body, credentials).await;

        if fallback.accepted() {
            trail.advance(DeploymentEvent::Accepted);
            return self.succeed(payload, body, vec![primary, fallback], trail).await;
        }

        trail.advance(DeploymentEvent::Rejected);
        tracing::error!(
            "[DeploymentClient] Fallback endpoint failed ({}); saving payload for manual deployment",
            fallback.failure.as_ref().map(|f| f.to_string()).unwrap_or_default()
        );
        let artifact = self.store.write_pending(target, &body).await;
        if let Err(e) = &artifact {
            tracing::error!("[DeploymentClient] Could not save pending payload: {}", e);
        }

        Ok(DeploymentOutcome::DeploymentFailed {
            primary,
            fallback,
            artifact,
            states: trail.into_states(),
        })
    }

    async fn succeed(
        &self,
        payload: &DeployPayload,
        body: serde_json::Value,
        attempts: Vec<Attempt>,
        trail: StateTrail,
    ) -> Result<DeploymentOutcome> {
        let accepted = attempts.last().ok_or_else(|| {
            DeployError::Configuration("no accepted attempt to record".to_string())
        })?;
        let record = DeploymentRecord::from_attempt(payload.target(), payload.name(), body, accepted);
        tracing::info!(
            "[DeploymentClient] Deployed '{}' via {} endpoint (HTTP {})",
            payload.name(),
            accepted.stage,
            record.status
        );
        let artifact = self.store.write_record(&record).await;
        if let Err(e) = &artifact {
            tracing::error!(
                "[DeploymentClient] '{}' was deployed but the record could not be saved: {}",
                payload.name(),
                e
            );
        }

        Ok(DeploymentOutcome::Deployed {
            record,
            artifact,
            attempts,
            states: trail.into_states(),
        })
    }

    /// Issue one POST. Never retries.
    async fn send(&self, stage: AttemptStage, body: &serde_json::Value, credentials: &Credentials) -> Attempt {
        let endpoint = match stage {
            AttemptStage::Primary => &self.endpoints.primary,
            AttemptStage::Fallback => &self.endpoints.fallback,
        };

        let mut request = self
            .client
            .post(endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", credentials.bearer_token.expose()),
            )
            .header("Content-Type", "application/json");

        if stage == AttemptStage::Primary {
            request = request.header("X-API-Key", credentials.api_key.expose());
        }

        let response = match request.json(body).send().await {
            Ok(r) => r,
            Err(e) => {
                return Attempt {
                    stage,
                    endpoint: endpoint.clone(),
                    status: None,
                    body: serde_json::Value::Null,
                    failure: Some(AttemptFailure::Transport {
                        message: e.to_string(),
                    }),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => parse_body(&text),
            Err(e) => serde_json::Value::String(format!("<unreadable body: {}>", e)),
        };
        tracing::info!("[DeploymentClient] {} endpoint answered HTTP {}", stage, status);

        Attempt {
            stage,
            endpoint: endpoint.clone(),
            status: Some(status),
            body,
            failure: if is_accepted_status(status) {
                None
            } else {
                Some(AttemptFailure::RemoteRejection { status })
            },
        }
    }
}
