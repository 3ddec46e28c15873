use crate::CollectionArgs;
use hubsync_core::{DesiredState, ReconcileOutcome};

pub async fn handle(args: CollectionArgs) -> anyhow::Result<ReconcileOutcome> {
    let desired = DesiredState {
        namespace: args.namespace,
        name: args.name,
        version: args.version,
        path: args.path,
        repository: args.repository,
        auto_approve: !args.no_auto_approve,
        overwrite_existing: args.overwrite_existing,
        wait: !args.no_wait,
        interval: args.interval,
        timeout: args.timeout,
        state: args.state,
    };

    super::run(desired, args.connection).await
}
