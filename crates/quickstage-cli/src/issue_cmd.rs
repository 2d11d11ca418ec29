//! `quickstage issue`: create signed tickets.
//!
//! User-facing output uses writeln! to stdout, one payload per line, so the
//! output can be piped straight into a code renderer.

use std::io::Write;
use std::num::NonZeroU32;

use clap::Args;
use quickstage_crypto::AdminSecret;
use quickstage_gate::{TicketIssuer, TicketStore};

/// Arguments for `quickstage issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Valid scans each ticket admits (defaults to the configured ceiling)
    #[arg(short = 'u', long)]
    pub max_usage: Option<NonZeroU32>,

    /// Number of tickets to issue
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Print `<id>\t<payload>` instead of the bare payload
    #[arg(long)]
    pub with_id: bool,
}

/// Execute `quickstage issue`.
pub async fn run<S: TicketStore>(
    issuer: &TicketIssuer<S>,
    secret: Option<&AdminSecret>,
    args: &IssueArgs,
    default_usage: u32,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let usage = match args.max_usage {
        Some(n) => n,
        None => NonZeroU32::new(default_usage)
            .ok_or_else(|| anyhow::anyhow!("Configured default_usage_ceiling must be positive"))?,
    };

    if secret.is_none() {
        writeln!(out, "No admin secret set; nothing issued.")?;
        return Ok(());
    }

    let tickets = issuer.issue_batch(secret, usage, args.count).await?;
    for ticket in &tickets {
        let Some(payload) = ticket.payload() else {
            continue;
        };
        if args.with_id {
            writeln!(out, "{}\t{payload}", ticket.id)?;
        } else {
            writeln!(out, "{payload}")?;
        }
    }

    if tickets.len() < args.count {
        tracing::warn!(
            requested = args.count,
            issued = tickets.len(),
            "Store ignored some ticket inserts"
        );
    }
    Ok(())
}
