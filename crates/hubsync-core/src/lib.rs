//! hubsync core
//!
//! Idempotent reconciliation of a single Ansible collection against an
//! Automation Hub / Galaxy NG server.
//!
//! # Flow
//!
//! ```text
//! DesiredState ──▶ resolve_version ──▶ LookupAdapter ──▶ plan ──▶ execute
//!                                       (4.7.0 split)     │         │
//!                                                         │         ├─ delete
//!                                                         │         ├─ upload ──▶ ApprovalPoller
//!                                                         ▼         ▼
//!                                                      ReconcileOutcome
//! ```
//!
//! The transport is abstracted behind [`HubClient`]; see the `hubsync-http`
//! crate for the HTTP implementation.

pub mod action;
pub mod approval;
pub mod client;
pub mod desired;
pub mod error;
pub mod lookup;
pub mod outcome;
pub mod reconcile;
pub mod version;

// Re-exports
pub use action::{Action, ActionType};
pub use approval::{ApprovalPoller, ApprovalStatus, Clock, TokioClock};
pub use client::{ApiResponse, DeleteResponse, HubClient, Method, OnMissing};
pub use desired::{DesiredState, State};
pub use error::{HubError, Result};
pub use lookup::{
    LegacyLookup, Lookup, LookupAdapter, LookupShape, ObservedResource, RequestSpec,
    STRUCTURED_URL_MIN_VERSION, StructuredLookup,
};
pub use outcome::{OutcomeBuilder, ReconcileOutcome};
pub use reconcile::{Reconciler, UPLOAD_ENDPOINT_PREFIX, UPLOAD_ITEM_TYPE, plan, reconcile};
pub use version::{ServerVersion, resolve_version, version_from_path};
