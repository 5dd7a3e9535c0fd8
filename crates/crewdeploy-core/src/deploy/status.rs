//! Pre-flight status check against the read-only listing endpoint.
//!
//! GET {status_url}
//! Headers:
//!   Authorization: Bearer {token}
//!   Content-Type: application/json
//!
//! One request, no retries.

use serde::Serialize;

use super::record::parse_body;
use crate::credentials::Credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    /// HTTP 200
    Authorized,
    /// HTTP 4xx
    Unauthorized,
    /// Network error, 5xx, or any other status
    Unavailable,
}

impl std::fmt::Display for Reachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reachability::Authorized => write!(f, "authorized"),
            Reachability::Unauthorized => write!(f, "unauthorized"),
            Reachability::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub endpoint: String,
    pub reachability: Reachability,
    pub status: Option<u16>,
    pub detail: String,
    pub body: serde_json::Value,
}

impl StatusReport {
    pub fn reachable(&self) -> bool {
        self.reachability == Reachability::Authorized
    }
}

/// Classify an HTTP status from the listing endpoint.
pub fn classify_status(status: u16) -> Reachability {
    match status {
        200 => Reachability::Authorized,
        400..=499 => Reachability::Unauthorized,
        _ => Reachability::Unavailable,
    }
}

pub struct StatusVerifier {
    client: reqwest::Client,
}

impl StatusVerifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn check_reachable(&self, endpoint: &str, credentials: &Credentials) -> StatusReport {
        tracing::info!("[StatusVerifier] Checking {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", credentials.bearer_token.expose()),
            )
            .header("Content-Type", "application/json")
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("[StatusVerifier] Connection error: {}", e);
                return StatusReport {
                    endpoint: endpoint.to_string(),
                    reachability: Reachability::Unavailable,
                    status: None,
                    detail: format!("connection error: {}", e),
                    body: serde_json::Value::Null,
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => parse_body(&text),
            Err(e) => serde_json::Value::String(format!("<unreadable body: {}>", e)),
        };
        let reachability = classify_status(status);
        let detail = match reachability {
            Reachability::Authorized => "API key valid".to_string(),
            Reachability::Unauthorized => format!("credentials rejected with HTTP {}", status),
            Reachability::Unavailable => format!("service answered HTTP {}", status),
        };

        tracing::info!("[StatusVerifier] HTTP {} -> {}", status, reachability);

        StatusReport {
            endpoint: endpoint.to_string(),
            reachability,
            status: Some(status),
            detail,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), Reachability::Authorized);
        assert_eq!(classify_status(401), Reachability::Unauthorized);
        assert_eq!(classify_status(403), Reachability::Unauthorized);
        assert_eq!(classify_status(404), Reachability::Unauthorized);
        assert_eq!(classify_status(500), Reachability::Unavailable);
        assert_eq!(classify_status(503), Reachability::Unavailable);
        assert_eq!(classify_status(204), Reachability::Unavailable);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let verifier = StatusVerifier::new(reqwest::Client::new());
        let creds = Credentials::new("t", "k", "e");
        let report = verifier
            .check_reachable(&format!("http://{}/v1/crews", addr), &creds)
            .await;
        assert!(!report.reachable());
        assert_eq!(report.reachability, Reachability::Unavailable);
        assert_eq!(report.status, None);
    }
}
