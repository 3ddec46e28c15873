pub mod apply;
pub mod collection;

use crate::ConnectionArgs;
use anyhow::Context;
use hubsync_config::{ConnectionOverrides, HubConfig};
use hubsync_core::{DesiredState, ReconcileOutcome};
use hubsync_http::{Auth, HttpHubClient, HubConnection};

/// Merge config file, environment and flags into a client
pub fn connect(args: ConnectionArgs) -> anyhow::Result<HttpHubClient> {
    let mut config = HubConfig::load(args.config.as_deref())?;
    config.apply_overrides(ConnectionOverrides {
        host: args.host,
        token: args.token,
        username: args.username,
        password: args.password,
        validate_certs: args.no_verify_ssl.then_some(false),
    });
    let resolved = config.resolve()?;

    let auth = match (resolved.token, resolved.username, resolved.password) {
        (Some(token), _, _) => Auth::Token(token),
        (None, Some(username), Some(password)) => Auth::Basic { username, password },
        (None, Some(_), None) | (None, None, Some(_)) => {
            tracing::warn!("Basic auth needs both username and password, connecting anonymously");
            Auth::Anonymous
        }
        (None, None, None) => Auth::Anonymous,
    };

    let connection = HubConnection {
        host: resolved.host,
        auth,
        validate_certs: resolved.validate_certs,
        request_timeout: resolved.request_timeout,
        import_poll_interval: resolved.import_poll_interval,
    };
    if !connection.validate_certs {
        tracing::warn!("TLS certificate verification disabled");
    }

    HttpHubClient::new(connection).context("Failed to create Automation Hub client")
}

/// Reconcile one desired state against the configured server
pub async fn run(
    desired: DesiredState,
    connection: ConnectionArgs,
) -> anyhow::Result<ReconcileOutcome> {
    // Local checks first so bad input never needs a server
    desired.validate()?;
    let client = connect(connection)?;

    tracing::info!(
        "Reconciling {}.{} ({}) on {}",
        desired.namespace,
        desired.name,
        desired.state,
        client.host()
    );

    let outcome = hubsync_core::reconcile(&client, &desired).await?;
    Ok(outcome)
}
