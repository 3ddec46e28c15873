//! Result record of one reconciliation

use crate::action::ActionType;
use crate::approval::ApprovalStatus;
use serde::{Deserialize, Serialize};

/// Outcome handed to the reporter
///
/// `deleted` is only meaningful for absent state and overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub deleted: bool,
    pub endpoint: String,
    pub action: ActionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalStatus>,
}

/// Accumulates the outcome along one control path
#[derive(Debug, Clone)]
pub struct OutcomeBuilder {
    outcome: ReconcileOutcome,
}

impl OutcomeBuilder {
    pub fn new(endpoint: impl Into<String>, version: Option<String>) -> Self {
        Self {
            outcome: ReconcileOutcome {
                changed: false,
                deleted: false,
                endpoint: endpoint.into(),
                action: ActionType::NoOp,
                version,
                collection: None,
                task: None,
                approval: None,
            },
        }
    }

    pub fn action(mut self, action: ActionType) -> Self {
        self.outcome.action = action;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.outcome.endpoint = endpoint.into();
        self
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.outcome.changed = changed;
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.outcome.deleted = deleted;
        self
    }

    pub fn task(mut self, task: Option<serde_json::Value>) -> Self {
        self.outcome.task = task;
        self
    }

    pub fn collection(mut self, collection: Option<serde_json::Value>) -> Self {
        self.outcome.collection = collection;
        self
    }

    pub fn approval(mut self, approval: ApprovalStatus) -> Self {
        self.outcome.approval = Some(approval);
        self
    }

    pub fn build(self) -> ReconcileOutcome {
        self.outcome
    }
}
