//! Annule un enlèvement FedEx depuis la ligne de commande.
//!
//! ```text
//! fdx-cancel-pickup --schedule-date 2024-01-01 --confirmation 123 --location AB
//! ```

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use fdxconfig::Config;
use fdxpickup::{CancelPickupRequest, cancel_pickup};
use fdxsoap::{FedexClient, FedexError, JsonLinesAuditSink};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Cancel a scheduled FedEx pickup.
///
/// Credentials come from `<config>/config.yaml` or `FDX_CONFIG__FEDEX__*`
/// environment variables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory (defaults to $FDX_CONFIG, ./.fdx, then ~/.fdx)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Date of the pickup (YYYY-MM-DD)
    #[arg(long)]
    schedule_date: String,

    /// Pickup confirmation number
    #[arg(long)]
    confirmation: String,

    /// FedEx location code that confirmed the pickup
    #[arg(long)]
    location: String,

    /// Carrier code (FDXE when omitted)
    #[arg(long)]
    carrier_code: Option<String>,

    #[arg(long)]
    remarks: Option<String>,

    /// Caller identity recorded in the audit log
    #[arg(long)]
    user_id: Option<String>,

    #[arg(long)]
    app_name: Option<String>,

    /// Append every exchange to this JSON lines file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Log raw FedEx responses
    #[arg(long)]
    debug: bool,

    /// Print the request document and exit without calling FedEx
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error); overrides host.logger.min_level
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = args
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let config = Config::load_config(&config_dir).context("Failed to load configuration")?;

    let level = match &args.log_level {
        Some(level) => level.clone(),
        None => config.get_log_min_level()?.to_lowercase(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut builder = CancelPickupRequest::builder()
        .schedule_date(args.schedule_date)
        .pickup_confirmation_number(args.confirmation)
        .location(args.location);
    if let Some(code) = args.carrier_code {
        builder = builder.carrier_code(code);
    }
    if let Some(remarks) = args.remarks {
        builder = builder.remarks(remarks);
    }
    if let Some(user_id) = args.user_id {
        builder = builder.user_id(user_id);
    }
    if let Some(app_name) = args.app_name {
        builder = builder.app_name(app_name);
    }
    let request = builder.build()?;

    let mut client = FedexClient::from_config(&config)?;
    if args.debug {
        client = client.with_debug(true);
    }
    if let Some(path) = args.audit_log {
        info!(path = %path.display(), "Auditing exchanges");
        client = client.with_audit_sink(Arc::new(JsonLinesAuditSink::new(path)));
    }

    if args.dry_run {
        println!("{}", client.build_request(&request)?);
        return Ok(());
    }

    info!(
        endpoint = client.endpoint(),
        environment = %client.credentials().environment(),
        "Cancelling pickup"
    );

    let reply = cancel_pickup(&client, &request).map_err(|e| match e {
        FedexError::Carrier { message } => anyhow!("FedEx refused the cancellation: {message}"),
        other => anyhow::Error::new(other),
    })?;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
