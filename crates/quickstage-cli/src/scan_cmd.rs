//! `quickstage scan`: validate decoded payloads.
//!
//! Payloads come from the command line or, when none are given, one per
//! line on stdin (the output of whatever decodes the camera frames). Each
//! result is printed and then acknowledged, returning the gate to idle
//! for the next code.

use std::io::Write;

use clap::Args;
use quickstage_crypto::AdminSecret;
use quickstage_gate::{ScanLogStore, ScanValidator, TicketStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Arguments for `quickstage scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Payloads to validate; read from stdin when omitted
    pub payloads: Vec<String>,
}

/// Counts of what happened during a scan session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanTally {
    pub admitted: usize,
    pub rejected: usize,
    /// Payloads dropped without a result (no admin secret).
    pub skipped: usize,
}

/// Validate one payload, print the result and acknowledge it.
pub async fn scan_one<S: TicketStore + ScanLogStore>(
    validator: &ScanValidator<S>,
    secret: Option<&AdminSecret>,
    payload: &str,
    tally: &mut ScanTally,
    out: &mut impl Write,
) -> std::io::Result<()> {
    match validator.validate(payload, secret).await {
        Some(outcome) if outcome.is_valid() => {
            tally.admitted += 1;
            writeln!(out, "ADMIT   #{}  {}", outcome.ticket_id(), outcome.message())?;
        }
        Some(outcome) => {
            tally.rejected += 1;
            writeln!(out, "REJECT  {}", outcome.message())?;
        }
        None => {
            tally.skipped += 1;
            writeln!(out, "SKIP    no admin secret set")?;
        }
    }
    validator.reset();
    Ok(())
}

/// Validate every non-empty line of `input`.
pub async fn scan_stream<S, R>(
    validator: &ScanValidator<S>,
    secret: Option<&AdminSecret>,
    input: R,
    out: &mut impl Write,
) -> anyhow::Result<ScanTally>
where
    S: TicketStore + ScanLogStore,
    R: AsyncBufRead + Unpin,
{
    let mut tally = ScanTally::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }
        scan_one(validator, secret, payload, &mut tally, out).await?;
    }
    Ok(tally)
}

/// Execute `quickstage scan`.
pub async fn run<S: TicketStore + ScanLogStore>(
    validator: &ScanValidator<S>,
    secret: Option<&AdminSecret>,
    args: ScanArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let tally = if args.payloads.is_empty() {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        scan_stream(validator, secret, stdin, out).await?
    } else {
        let mut tally = ScanTally::default();
        for payload in &args.payloads {
            scan_one(validator, secret, payload, &mut tally, out).await?;
        }
        tally
    };

    writeln!(
        out,
        "\n{} admitted, {} rejected, {} skipped",
        tally.admitted, tally.rejected, tally.skipped
    )?;
    Ok(())
}
