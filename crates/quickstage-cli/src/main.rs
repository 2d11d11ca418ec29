//! `QuickStage` CLI
//!
//! Issue admission tickets, validate scanned payloads, and inspect the
//! ticket table and scan audit log.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use quickstage_cli::issue_cmd::{self, IssueArgs};
use quickstage_cli::log_cmd::{self, LogArgs};
use quickstage_cli::prompt::resolve_secret;
use quickstage_cli::scan_cmd::{self, ScanArgs};
use quickstage_cli::ticket_cmd::{self, TicketAction};
use quickstage_core::config::load_config;
use quickstage_core::tracing_init::{filter_for, init_tracing};
use quickstage_gate::{Database, ScanValidator, TicketIssuer};

#[derive(Parser, Debug)]
#[command(name = "quickstage")]
#[command(version, about = "Admission ticket issuance and scan validation", long_about = None)]
struct Cli {
    /// Config file layered over the global settings
    #[arg(long, global = true, env = "QUICKSTAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides configuration)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Admin secret used to sign and verify tickets
    #[arg(long, global = true, env = "QUICKSTAGE_ADMIN_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Never prompt for the admin secret
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Log level for `QuickStage` crates (overrides configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue signed tickets
    Issue(IssueArgs),
    /// Validate scanned payloads
    Scan(ScanArgs),
    /// Inspect issued tickets
    Tickets {
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Show the scan audit log
    Logs(LogArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.db_path {
        config.storage.database_path = Some(path);
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    config.log.json |= cli.log_json;

    init_tracing(
        &filter_for(
            &["quickstage", "quickstage_cli", "quickstage_gate", "quickstage_core"],
            &config.log.level,
        ),
        config.log.json,
    );

    let db_path = config.resolved_database_path()?;
    info!(version = env!("CARGO_PKG_VERSION"), path = %db_path.display(), "Starting quickstage");
    let db = Database::open(&db_path).await?;
    let store_timeout = config.scanner.store_timeout();
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Issue(args) => {
            let secret = resolve_secret(cli.secret, cli.non_interactive)?;
            let issuer = TicketIssuer::new(db).with_store_timeout(store_timeout);
            issue_cmd::run(
                &issuer,
                secret.as_ref(),
                &args,
                config.tickets.default_usage_ceiling,
                &mut out,
            )
            .await?;
        }
        Commands::Scan(args) => {
            let secret = resolve_secret(cli.secret, cli.non_interactive)?;
            let validator = ScanValidator::new(db).with_store_timeout(store_timeout);
            scan_cmd::run(&validator, secret.as_ref(), args, &mut out).await?;
        }
        Commands::Tickets { action } => ticket_cmd::run(&db, action, &mut out).await?,
        Commands::Logs(args) => log_cmd::run(&db, &args, &mut out).await?,
    }

    Ok(())
}
