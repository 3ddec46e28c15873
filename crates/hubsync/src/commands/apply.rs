use crate::ConnectionArgs;
use anyhow::Context;
use hubsync_core::{DesiredState, ReconcileOutcome};
use std::path::Path;

pub async fn handle(
    file: &Path,
    connection: ConnectionArgs,
) -> anyhow::Result<ReconcileOutcome> {
    let desired = load_desired(file)?;
    super::run(desired, connection).await
}

/// Artifact paths in the file are relative to the file itself
fn load_desired(file: &Path) -> anyhow::Result<DesiredState> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut desired: DesiredState = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if let Some(path) = &desired.path
        && path.is_relative()
        && let Some(base) = file.parent()
    {
        desired.path = Some(base.join(path));
    }

    Ok(desired)
}
