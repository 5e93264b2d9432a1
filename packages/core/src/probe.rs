//! Connectivity Prober
//!
//! Diagnostics only: checks that the classification server answers at all.
//! A probe never returns an error, every failure becomes a [`ProbeOutcome`].

use crate::error::{BODY_PREVIEW_CHARS, truncate};
use crate::settings::endpoint_root;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    Timeout,
    Connection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx from the server root
    Reachable {
        target: String,
        status: u16,
        latency_ms: u64,
        body: String,
    },
    /// Server answered, but not with 2xx
    ReachableWithError {
        target: String,
        status: u16,
        latency_ms: u64,
        body: String,
    },
    /// No HTTP response within the deadline
    Unreachable {
        target: String,
        reason: UnreachableReason,
        message: String,
        latency_ms: u64,
    },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, ProbeOutcome::Unreachable { .. })
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Reachable { status, .. }
            | ProbeOutcome::ReachableWithError { status, .. } => Some(*status),
            ProbeOutcome::Unreachable { .. } => None,
        }
    }

    pub fn latency(&self) -> Duration {
        let ms = match self {
            ProbeOutcome::Reachable { latency_ms, .. }
            | ProbeOutcome::ReachableWithError { latency_ms, .. }
            | ProbeOutcome::Unreachable { latency_ms, .. } => *latency_ms,
        };
        Duration::from_millis(ms)
    }

    /// Human readable log lines for a settings screen or terminal
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            ProbeOutcome::Reachable {
                target,
                status,
                latency_ms,
                body,
            } => {
                lines.push(format!("Checking connection to: {}", target));
                lines.push(format!("STATUS: {} ({}ms)", status, latency_ms));
                lines.push("Backend is reachable!".to_string());
                if !body.is_empty() {
                    lines.push(format!("Response: {}", body));
                }
            }
            ProbeOutcome::ReachableWithError {
                target,
                status,
                latency_ms,
                body,
            } => {
                lines.push(format!("Checking connection to: {}", target));
                lines.push(format!("STATUS: {} ({}ms)", status, latency_ms));
                lines.push("Backend reachable but returned error status.".to_string());
                if !body.is_empty() {
                    lines.push(format!("Response: {}", body));
                }
            }
            ProbeOutcome::Unreachable {
                target,
                reason,
                message,
                ..
            } => {
                lines.push(format!("Checking connection to: {}", target));
                match reason {
                    UnreachableReason::Timeout => {
                        lines.push(format!("TIMEOUT: {}", message));
                    }
                    UnreachableReason::Connection => {
                        lines.push(format!("PROBLEM: {}", message));
                    }
                }
                lines.push("Troubleshooting:".to_string());
                lines.push("1. Ensure the classification server is running.".to_string());
                lines.push("2. Ensure the IP address matches your machine.".to_string());
                lines.push(
                    "3. Ensure your phone and computer are on the same Wi-Fi.".to_string(),
                );
            }
        }
        lines
    }
}

#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    timeout: Duration,
}

impl Prober {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET` the root of `endpoint` (the endpoint minus `/predict`)
    pub async fn probe(&self, endpoint: &str) -> ProbeOutcome {
        let target = match endpoint_root(endpoint) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(endpoint = %endpoint, error = %e, "Probe skipped, invalid endpoint");
                return ProbeOutcome::Unreachable {
                    target: endpoint.to_string(),
                    reason: UnreachableReason::Connection,
                    message: e.to_string(),
                    latency_ms: 0,
                };
            }
        };

        let started = Instant::now();
        let request = async {
            let response = self.client.get(&target).send().await?;
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(root = %target, error = %e, "Failed to read probe response body");
                String::new()
            });
            Ok::<_, reqwest::Error>((status, body))
        };
        let result = tokio::time::timeout(self.timeout, request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(Ok((status, body))) if status.is_success() => ProbeOutcome::Reachable {
                target,
                status: status.as_u16(),
                latency_ms,
                body: truncate(&body, BODY_PREVIEW_CHARS),
            },
            Ok(Ok((status, body))) => ProbeOutcome::ReachableWithError {
                target,
                status: status.as_u16(),
                latency_ms,
                body: truncate(&body, BODY_PREVIEW_CHARS),
            },
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::Unreachable {
                target,
                reason: UnreachableReason::Timeout,
                message: e.to_string(),
                latency_ms,
            },
            Ok(Err(e)) => ProbeOutcome::Unreachable {
                target,
                reason: UnreachableReason::Connection,
                message: e.to_string(),
                latency_ms,
            },
            Err(_) => ProbeOutcome::Unreachable {
                message: format!(
                    "Connection to {} timed out after {}ms",
                    target,
                    self.timeout.as_millis()
                ),
                target,
                reason: UnreachableReason::Timeout,
                latency_ms,
            },
        };

        match &outcome {
            ProbeOutcome::Reachable { target, status, .. } => {
                tracing::info!(root = %target, status, latency_ms, "Backend is reachable");
            }
            ProbeOutcome::ReachableWithError { target, status, body, .. } => {
                tracing::warn!(root = %target, status, latency_ms, body = %body, "Backend reachable but returned error status");
            }
            ProbeOutcome::Unreachable { target, reason, message, .. } => {
                tracing::error!(root = %target, reason = ?reason, error = %message, latency_ms, "Backend unreachable");
            }
        }

        outcome
    }
}
