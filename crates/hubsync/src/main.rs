mod commands;
mod report;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hubsync")]
#[command(about = "Keep Ansible collections on Automation Hub in the state you declare", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one collection described by flags
    Collection(CollectionArgs),
    /// Reconcile the collection described in a YAML file
    Apply {
        /// Desired state file
        file: PathBuf,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
pub struct CollectionArgs {
    /// Collection namespace
    #[arg(long)]
    pub namespace: String,
    /// Collection name
    #[arg(long)]
    pub name: String,
    /// Collection version (derived from --path when omitted)
    #[arg(long)]
    pub version: Option<String>,
    /// Artifact to publish (<namespace>-<name>-<version>.tar.gz)
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Repository the version must end up in
    #[arg(long, default_value = hubsync_core::desired::DEFAULT_REPOSITORY)]
    pub repository: String,
    /// present or absent
    #[arg(long, default_value = "present")]
    pub state: hubsync_core::State,
    /// Do not wait for the server-side import of an upload
    #[arg(long)]
    pub no_wait: bool,
    /// Seconds between approval checks
    #[arg(long, default_value_t = hubsync_core::desired::DEFAULT_INTERVAL_SECS)]
    pub interval: f64,
    /// Give up waiting for approval after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Do not wait for the uploaded version to be approved
    #[arg(long)]
    pub no_auto_approve: bool,
    /// Replace the version if it already exists
    #[arg(long)]
    pub overwrite_existing: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Automation Hub URL [env: AH_HOST]
    #[arg(long)]
    pub host: Option<String>,
    /// API token [env: AH_API_TOKEN]
    #[arg(long)]
    pub token: Option<String>,
    /// Basic auth user [env: AH_USERNAME]
    #[arg(long)]
    pub username: Option<String>,
    /// Basic auth password [env: AH_PASSWORD]
    #[arg(long)]
    pub password: Option<String>,
    /// Skip TLS certificate verification [env: AH_VERIFY_SSL=false]
    #[arg(long)]
    pub no_verify_ssl: bool,
    /// Config file [env: HUBSYNC_CONFIG_PATH]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Version => {
            println!("hubsync {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Collection(args) => commands::collection::handle(args).await,
        Commands::Apply { file, connection } => commands::apply::handle(&file, connection).await,
    };

    match result {
        Ok(outcome) => report::success(&outcome),
        Err(e) => {
            report::failure(&e);
            std::process::exit(1);
        }
    }
}
