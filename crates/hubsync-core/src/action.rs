//! Planned action for a collection

use crate::lookup::ObservedResource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Nothing to change
    NoOp,
    /// Report the existing collection
    Describe,
    /// Upload a new version
    Create,
    /// Delete the existing version, then upload
    Overwrite,
    /// Delete the existing collection or version
    Delete,
}

impl ActionType {
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            ActionType::Create | ActionType::Overwrite | ActionType::Delete
        )
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::NoOp => write!(f, "no-op"),
            ActionType::Describe => write!(f, "describe"),
            ActionType::Create => write!(f, "create"),
            ActionType::Overwrite => write!(f, "overwrite"),
            ActionType::Delete => write!(f, "delete"),
        }
    }
}

/// Decision taken by the reconciler, carrying what executing it needs
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NoOp {
        existing: Option<ObservedResource>,
    },
    Describe {
        existing: ObservedResource,
    },
    Create {
        artifact: PathBuf,
    },
    Overwrite {
        existing: ObservedResource,
        artifact: PathBuf,
    },
    Delete {
        existing: ObservedResource,
    },
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::NoOp { .. } => ActionType::NoOp,
            Action::Describe { .. } => ActionType::Describe,
            Action::Create { .. } => ActionType::Create,
            Action::Overwrite { .. } => ActionType::Overwrite,
            Action::Delete { .. } => ActionType::Delete,
        }
    }

    /// Human readable summary for logs
    pub fn description(&self) -> String {
        match self {
            Action::NoOp { existing: Some(e) } => format!("{} is up to date", e.href),
            Action::NoOp { existing: None } => "nothing to delete".to_string(),
            Action::Describe { existing } => format!("report {}", existing.href),
            Action::Create { artifact } => format!("upload {}", artifact.display()),
            Action::Overwrite { existing, artifact } => {
                format!("replace {} with {}", existing.href, artifact.display())
            }
            Action::Delete { existing } => format!("delete {}", existing.href),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.action_type(), self.description())
    }
}
