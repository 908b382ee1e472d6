//! CLI entry point: load the desired-state document, resolve settings,
//! connect to the device, reconcile, and apply.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mtsync_config::Settings;
use mtsync_core::action::Action;
use mtsync_device::Connection;
use mtsync_error::Result;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One-shot reconciler for a RouterOS-class device's REST configuration.
#[derive(Parser, Debug)]
#[command(name = "mtsync", version, about)]
struct Args {
    /// Hostname/IP to connect to.
    #[arg(long)]
    hostname: Option<String>,

    /// Username to authenticate as.
    #[arg(long)]
    username: Option<String>,

    /// Password to authenticate with.
    #[arg(long)]
    password: Option<String>,

    /// File to read the desired state from; reads stdin if omitted.
    #[arg(long)]
    desired_file: Option<PathBuf>,

    /// Whether to ignore SSL/TLS certificate errors.
    #[arg(long, default_value_t = false)]
    ignore_certificate_errors: bool,
}

/// Collection paths for which RouterOS does not support `/move`; reorder
/// actions against these are always skipped. No canonical list is known
/// ahead of time — extend as real devices surface more of them.
fn non_movable_paths() -> BTreeSet<String> {
    BTreeSet::new()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn read_desired_tree(path: Option<&PathBuf>) -> Result<Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            mtsync_error::MtsyncError::input_malformed(format!(
                "failed to read {}: {e}",
                path.display()
            ))
        })?,
        None => {
            info!("waiting on stdin for desired configuration");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| mtsync_error::MtsyncError::input_malformed(e.to_string()))?;
            buf
        }
    };

    serde_json::from_str(&text)
        .map_err(|e| mtsync_error::MtsyncError::input_malformed(format!("invalid JSON: {e}")))
}

fn log_diff(actions: &[Action]) {
    for action in actions {
        info!(path = %action.path, kind = ?action.kind, "planned action");
        for line in action.diff() {
            info!("  {line}");
        }
    }
}

async fn run(args: Args) -> Result<()> {
    info!("loading desired configuration");
    let mut desired_tree = read_desired_tree(args.desired_file.as_ref())?;

    let metadata = match &mut desired_tree {
        Value::Object(map) => map.remove("metadata"),
        _ => None,
    };

    info!("loading settings");
    let mut settings = Settings::new();
    settings.apply_environment_variables();
    settings.apply_arguments(
        args.hostname,
        args.username,
        args.password,
        args.ignore_certificate_errors,
    );
    if let Some(Value::Object(metadata)) = metadata {
        settings.apply_metadata(&metadata);
    }

    if !settings.valid() {
        return Err(mtsync_error::MtsyncError::SettingsInvalid {
            hostname_empty: settings.hostname.as_deref().unwrap_or_default().is_empty(),
            username_empty: settings.username.as_deref().unwrap_or_default().is_empty(),
        });
    }
    info!("settings loaded");

    let connection = Connection::new(&settings)?;
    let non_movable = non_movable_paths();

    info!("analyzing desired configuration against current device state");
    let actions = mtsync_core::analyze(&connection, String::new(), desired_tree, &non_movable).await?;

    log_diff(&actions);

    info!(count = actions.len(), "applying actions");
    mtsync_core::execute(&connection, actions).await?;

    info!("done");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "mtsync failed");
            ExitCode::FAILURE
        }
    }
}
