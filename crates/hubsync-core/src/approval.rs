//! Approval polling
//!
//! After an upload that requires moderation the poller probes the version
//! endpoint of the target repository at a fixed interval until a terminal
//! status shows up or the deadline passes.

use crate::client::HubClient;
use crate::error::{HubError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Fields inspected for a moderation status, in order
const STATUS_FIELDS: [&str; 3] = ["approval_status", "status", "state"];

/// Status of a moderation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Error,
    TimedOut,
}

impl ApprovalStatus {
    /// Approved, rejected and error end the polling loop
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApprovalStatus::Approved | ApprovalStatus::Rejected | ApprovalStatus::Error
        )
    }

    /// Classify a probe payload
    ///
    /// A payload without any status field counts as approved: the version is
    /// already visible in the target repository.
    pub fn from_payload(json: &serde_json::Value) -> Self {
        let status = STATUS_FIELDS
            .iter()
            .find_map(|field| json.get(*field).and_then(|v| v.as_str()));

        match status.map(|s| s.to_ascii_lowercase()) {
            None => ApprovalStatus::Approved,
            Some(s) => match s.as_str() {
                "approved" | "completed" | "published" => ApprovalStatus::Approved,
                "rejected" | "denied" => ApprovalStatus::Rejected,
                "failed" | "error" => ApprovalStatus::Error,
                _ => ApprovalStatus::Pending,
            },
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
            ApprovalStatus::Error => write!(f, "error"),
            ApprovalStatus::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// Time source and suspension point of the polling loop
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio's timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls an approval endpoint until it reaches a terminal status
pub struct ApprovalPoller<'a> {
    client: &'a dyn HubClient,
    clock: &'a dyn Clock,
}

impl<'a> ApprovalPoller<'a> {
    pub fn new(client: &'a dyn HubClient, clock: &'a dyn Clock) -> Self {
        Self { client, clock }
    }

    /// Single probe; 404 means the version has not reached the repository yet
    pub async fn probe(&self, endpoint: &str) -> Result<ApprovalStatus> {
        match self.client.get(endpoint).await? {
            Some(response) => Ok(ApprovalStatus::from_payload(&response.json)),
            None => Ok(ApprovalStatus::Pending),
        }
    }

    /// Poll until terminal, returning [`ApprovalStatus::TimedOut`] once the
    /// deadline passed. Without a timeout the loop is unbounded.
    ///
    /// The deadline is measured from the start of this loop.
    pub async fn wait(
        &self,
        endpoint: &str,
        timeout: Option<Duration>,
        interval: Duration,
    ) -> Result<ApprovalStatus> {
        if interval.is_zero() {
            return Err(HubError::InvalidInput(
                "approval interval must be greater than 0".to_string(),
            ));
        }

        let start = self.clock.now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let status = self.probe(endpoint).await?;

            if status.is_terminal() {
                tracing::info!(
                    "Approval of {} finished as {} after {} attempt(s)",
                    endpoint,
                    status,
                    attempt
                );
                return Ok(status);
            }

            if let Some(timeout) = timeout
                && self.clock.now().duration_since(start) >= timeout
            {
                tracing::warn!(
                    "Approval of {} still {} after {:?}, giving up",
                    endpoint,
                    status,
                    timeout
                );
                return Ok(ApprovalStatus::TimedOut);
            }

            tracing::debug!(
                "Approval of {} is {} (attempt {}), retrying in {:?}",
                endpoint,
                status,
                attempt,
                interval
            );
            self.clock.sleep(interval).await;
        }
    }

    /// Like [`ApprovalPoller::wait`], but an elapsed deadline is an error
    pub async fn poll(
        &self,
        endpoint: &str,
        timeout: Option<Duration>,
        interval: Duration,
    ) -> Result<ApprovalStatus> {
        match self.wait(endpoint, timeout, interval).await? {
            ApprovalStatus::TimedOut => Err(HubError::ApprovalTimeout {
                endpoint: endpoint.to_string(),
                timeout: timeout.unwrap_or_default(),
            }),
            status => Ok(status),
        }
    }
}
