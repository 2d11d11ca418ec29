//! Admin secret acquisition.

use anyhow::Result;
use dialoguer::Password;
use quickstage_crypto::AdminSecret;

/// Resolve the admin secret for this session.
///
/// A non-empty value from `--secret` / `QUICKSTAGE_ADMIN_SECRET` wins.
/// Otherwise the operator is prompted, unless running non-interactively,
/// in which case no secret is set and secret-gated commands become no-ops.
pub fn resolve_secret(
    provided: Option<String>,
    non_interactive: bool,
) -> Result<Option<AdminSecret>> {
    if let Some(secret) = provided.filter(|s| !s.is_empty()) {
        return Ok(Some(AdminSecret::from(secret)));
    }
    if non_interactive {
        return Ok(None);
    }

    let secret: String = Password::new().with_prompt("Admin secret").interact()?;
    Ok(Some(AdminSecret::from(secret)))
}
