//! Shared tracing/logging initialization.
//!
//! The CLI and any embedding service use the same pattern for setting up
//! `tracing_subscriber` with an env-filter and optional JSON output.
//! Logs always go to stderr so stdout stays free for payloads and tables.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"quickstage_gate=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Build the default filter string for a set of crates at one level,
/// e.g. `filter_for(&["quickstage", "quickstage_gate"], "debug")`.
pub fn filter_for(crates: &[&str], level: &str) -> String {
    crates
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_joins_every_crate() {
        assert_eq!(
            filter_for(&["quickstage", "quickstage_gate"], "debug"),
            "quickstage=debug,quickstage_gate=debug"
        );
    }

    #[test]
    fn filter_for_no_crates_is_empty() {
        assert_eq!(filter_for(&[], "info"), "");
    }
}
