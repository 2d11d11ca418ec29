//! `quickstage tickets list` / `quickstage tickets show`: inspect issued tickets.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::Write;

use clap::Subcommand;
use quickstage_gate::{Database, TicketStore};

use crate::fmt::{format_millis, truncate};

/// Ticket subcommand actions.
#[derive(Subcommand, Debug)]
pub enum TicketAction {
    /// List tickets, newest first, with usage counts
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the scannable payload of one ticket
    Show {
        /// Ticket ID
        id: i64,
    },
}

/// Execute a ticket subcommand.
pub async fn run(db: &Database, action: TicketAction, out: &mut impl Write) -> anyhow::Result<()> {
    match action {
        TicketAction::List { json } => {
            let tickets = db.list_ticket_usage().await?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &tickets)?;
                writeln!(out)?;
            } else if tickets.is_empty() {
                writeln!(out, "No tickets issued.")?;
            } else {
                writeln!(
                    out,
                    "{:>6}  {:<14}  {:>4}  {:>4}  CREATED",
                    "ID", "SIGNATURE", "USED", "MAX"
                )?;
                for t in &tickets {
                    writeln!(
                        out,
                        "{:>6}  {:<14}  {:>4}  {:>4}  {}",
                        t.ticket.id,
                        truncate(&t.ticket.signature, 14),
                        t.valid_uses,
                        t.ticket.max_usage,
                        format_millis(t.ticket.created_at),
                    )?;
                }
                writeln!(out, "\n{} ticket(s)", tickets.len())?;
            }
        }
        TicketAction::Show { id } => match db.get_ticket(id).await? {
            Some(ticket) => match ticket.payload() {
                Some(payload) => writeln!(out, "{payload}")?,
                None => writeln!(out, "Ticket {id} is still pending a signature.")?,
            },
            None => writeln!(out, "Ticket {id} not found.")?,
        },
    }
    Ok(())
}
