//! `quickstage logs`: the scan audit trail.

use std::io::Write;

use clap::Args;
use quickstage_gate::Database;
use quickstage_gate::storage::ScanLog;

use crate::fmt::format_millis;

/// Arguments for `quickstage logs`.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Only entries for this ticket ID (-1 for unresolved payloads)
    #[arg(short, long, allow_negative_numbers = true)]
    pub ticket: Option<i64>,

    /// Maximum number of entries to show
    #[arg(short, long, default_value_t = 50)]
    pub limit: u32,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Execute `quickstage logs`.
pub async fn run(db: &Database, args: &LogArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let logs = db.recent_scan_logs(args.ticket, args.limit).await?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &logs)?;
        writeln!(out)?;
        return Ok(());
    }

    if logs.is_empty() {
        writeln!(out, "No scans recorded.")?;
        return Ok(());
    }

    writeln!(out, "{:<23}  {:>6}  {:<6}  MESSAGE", "SCANNED", "TICKET", "VALID")?;
    for log in &logs {
        write_row(out, log)?;
    }
    let total = db.count_scan_logs(args.ticket).await?;
    writeln!(out, "\nShowing {} of {total} scan(s)", logs.len())?;
    Ok(())
}

fn write_row(out: &mut impl Write, log: &ScanLog) -> std::io::Result<()> {
    let ticket = if log.ticket_id < 0 {
        "-".to_string()
    } else {
        log.ticket_id.to_string()
    };
    writeln!(
        out,
        "{:<23}  {:>6}  {:<6}  {}",
        format_millis(log.scanned_at),
        ticket,
        if log.is_valid { "yes" } else { "no" },
        log.message,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quickstage_gate::ScanLogStore;
    use quickstage_gate::storage::NewScanLog;

    async fn db_with_logs() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        for (ticket_id, scanned_at, is_valid, message) in [
            (-1, 10, false, "Invalid format"),
            (1, 20, true, "Success"),
            (1, 30, false, "Usage limit exceeded"),
        ] {
            db.insert_scan_log(&NewScanLog {
                ticket_id,
                scanned_at,
                is_valid,
                message: message.to_string(),
            })
            .await
            .unwrap();
        }
        db
    }

    async fn output(db: &Database, args: &LogArgs) -> String {
        let mut out = Vec::new();
        run(db, args, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn table_lists_most_recent_first_with_limit() {
        let db = db_with_logs().await;
        let text = output(
            &db,
            &LogArgs {
                ticket: None,
                limit: 2,
                json: false,
            },
        )
        .await;

        let rows: Vec<&str> = text.lines().skip(1).take(2).collect();
        assert!(rows[0].ends_with("Usage limit exceeded"));
        assert!(rows[1].ends_with("Success"));
        assert!(text.contains("Showing 2 of 3 scan(s)"));
    }

    #[tokio::test]
    async fn filter_by_unresolved_ticket() {
        let db = db_with_logs().await;
        let text = output(
            &db,
            &LogArgs {
                ticket: Some(-1),
                limit: 50,
                json: true,
            },
        )
        .await;

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["message"], "Invalid format");
    }
}
