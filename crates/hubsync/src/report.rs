//! Result output: JSON on stdout, human summary on stderr

use colored::Colorize;
use hubsync_core::{ActionType, ReconcileOutcome};

pub fn success(outcome: &ReconcileOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    eprintln!("{}", summary(outcome));
    Ok(())
}

pub fn failure(err: &anyhow::Error) {
    let msg = format!("{:#}", err);
    eprintln!("{} {}", "Error:".red().bold(), msg);

    let body = serde_json::json!({ "failed": true, "msg": msg });
    println!("{}", body);
}

fn summary(outcome: &ReconcileOutcome) -> String {
    let label = if outcome.action == ActionType::Delete {
        "deleted".red().bold()
    } else if outcome.action.is_change() {
        "changed".yellow().bold()
    } else {
        "ok".green().bold()
    };

    let mut line = format!("{} {} {}", label, outcome.action, outcome.endpoint.cyan());
    if let Some(version) = &outcome.version {
        line.push_str(&format!(" ({})", version));
    }
    if let Some(approval) = outcome.approval {
        line.push_str(&format!(" [{}]", approval));
    }
    line
}
