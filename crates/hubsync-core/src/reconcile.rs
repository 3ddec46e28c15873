//! Desired-vs-observed reconciliation of one collection
//!
//! Every run starts from scratch: resolve the version, probe the server,
//! [`plan`] one [`Action`], execute it and return a single
//! [`ReconcileOutcome`]. Nothing is cached between runs.

use crate::action::Action;
use crate::approval::{ApprovalPoller, ApprovalStatus, Clock, TokioClock};
use crate::client::HubClient;
use crate::desired::DesiredState;
use crate::error::{HubError, Result};
use crate::lookup::{LookupAdapter, ObservedResource};
use crate::outcome::{OutcomeBuilder, ReconcileOutcome};
use crate::version::{ServerVersion, resolve_version};
use std::path::Path;

/// Upload endpoint, relative to the v3 API root
pub const UPLOAD_ENDPOINT_PREFIX: &str = "artifacts/collections";
pub const UPLOAD_ITEM_TYPE: &str = "collections";

/// Select the action for desired state and what the server reported
///
/// | state   | existing | path | overwrite | action     |
/// |---------|----------|------|-----------|------------|
/// | absent  | no       |      |           | no-op      |
/// | absent  | yes      |      |           | delete     |
/// | present | no       | yes  |           | create     |
/// | present | yes      | yes  | true      | overwrite  |
/// | present | yes      | yes  | false     | no-op      |
/// | present | yes      | no   |           | describe   |
/// | present | no       | no   |           | NotFound   |
pub fn plan(
    desired: &DesiredState,
    version: Option<&str>,
    existing: Option<ObservedResource>,
) -> Result<Action> {
    if !desired.is_present() {
        return Ok(match existing {
            Some(existing) => Action::Delete { existing },
            None => Action::NoOp { existing: None },
        });
    }

    match (&desired.path, existing) {
        (Some(artifact), Some(existing)) if desired.overwrite_existing => Ok(Action::Overwrite {
            existing,
            artifact: artifact.clone(),
        }),
        (Some(_), Some(existing)) => Ok(Action::NoOp {
            existing: Some(existing),
        }),
        (Some(artifact), None) => Ok(Action::Create {
            artifact: artifact.clone(),
        }),
        (None, Some(existing)) => Ok(Action::Describe { existing }),
        (None, None) => Err(HubError::NotFound {
            namespace: desired.namespace.clone(),
            name: desired.name.clone(),
            version: version.map(str::to_string),
        }),
    }
}

/// Reconciles one collection against the server
pub struct Reconciler<'a> {
    client: &'a dyn HubClient,
    clock: &'a dyn Clock,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn HubClient, clock: &'a dyn Clock) -> Self {
        Self { client, clock }
    }

    pub async fn reconcile(&self, desired: &DesiredState) -> Result<ReconcileOutcome> {
        desired.validate()?;
        let version = resolve_version(desired)?;

        // Local precondition, checked before touching the server
        if desired.is_present()
            && let Some(path) = &desired.path
            && !path.exists()
        {
            return Err(HubError::ArtifactFileMissing {
                namespace: desired.namespace.clone(),
                name: desired.name.clone(),
                path: path.display().to_string(),
            });
        }

        let server_version = ServerVersion::parse(&self.client.server_version().await?);
        let adapter = LookupAdapter::for_server(&server_version, &desired.repository);
        tracing::debug!(
            "Server version {} uses {} collection endpoints",
            server_version,
            adapter.shape_name()
        );

        let lookup = adapter
            .lookup(
                self.client,
                &desired.namespace,
                &desired.name,
                version.as_deref(),
            )
            .await?;

        let action = plan(desired, version.as_deref(), lookup.existing)?;
        tracing::info!("{}.{}: {}", desired.namespace, desired.name, action);

        let builder =
            OutcomeBuilder::new(&lookup.endpoint, version.clone()).action(action.action_type());

        let builder = match action {
            Action::NoOp { existing } => builder.collection(existing.map(|e| e.json)),
            Action::Describe { existing } => builder.collection(Some(existing.json)),
            Action::Delete { existing } => {
                let response = self.client.delete(&existing.href).await?;
                builder.changed(true).deleted(true).task(response.task)
            }
            Action::Create { artifact } => {
                let version = version.as_deref().ok_or(HubError::MissingVersion)?;
                self.publish(desired, &adapter, version, &artifact, builder)
                    .await?
            }
            Action::Overwrite { existing, artifact } => {
                let version = version.as_deref().ok_or(HubError::MissingVersion)?;
                let response = self.client.delete(&existing.href).await?;
                let builder = builder.deleted(true).task(response.task);

                // Not atomic: a failed upload leaves the version deleted
                self.publish(desired, &adapter, version, &artifact, builder)
                    .await
                    .inspect_err(|e| {
                        tracing::warn!(
                            "Deleted {} but re-upload failed, the version is now absent: {}",
                            existing.href,
                            e
                        )
                    })?
            }
        };

        Ok(builder.build())
    }

    /// Upload, optionally wait for approval, then re-read the version
    async fn publish(
        &self,
        desired: &DesiredState,
        adapter: &LookupAdapter,
        version: &str,
        artifact: &Path,
        builder: OutcomeBuilder,
    ) -> Result<OutcomeBuilder> {
        let endpoint = adapter
            .request_for(&desired.namespace, &desired.name, Some(version))
            .endpoint;
        // Resolved before the upload so a bad value cannot fail after the remote changed
        let interval = desired.interval_duration()?;

        tracing::info!(
            "Uploading {} as {}.{} {}",
            artifact.display(),
            desired.namespace,
            desired.name,
            version
        );
        self.client
            .upload(artifact, UPLOAD_ENDPOINT_PREFIX, desired.wait, UPLOAD_ITEM_TYPE)
            .await?;

        let mut builder = builder.changed(true).endpoint(&endpoint);

        if desired.auto_approve {
            let status = ApprovalPoller::new(self.client, self.clock)
                .poll(
                    &endpoint,
                    desired.timeout_duration(),
                    interval,
                )
                .await?;

            if status != ApprovalStatus::Approved {
                return Err(HubError::ApprovalFailed { endpoint, status });
            }
            builder = builder.approval(status);
        }

        let refreshed = self.client.get(&endpoint).await?;
        Ok(builder.collection(refreshed.map(|r| r.json)))
    }
}

/// Reconcile with tokio's wall clock
pub async fn reconcile(client: &dyn HubClient, desired: &DesiredState) -> Result<ReconcileOutcome> {
    Reconciler::new(client, &TokioClock).reconcile(desired).await
}
