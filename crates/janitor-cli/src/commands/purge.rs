//! Purge command implementation.

use crate::cli::PurgeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use janitor_core::Janitor;
use janitor_domain::{Scope, StateStore};
use tokio_util::sync::CancellationToken;

/// Refuse to purge without `--yes`, unless nothing would be deleted.
pub fn confirm(args: &PurgeArgs, dry_run: bool) -> Result<()> {
    if args.yes || dry_run {
        Ok(())
    } else {
        Err(CliError::NotPermitted(
            "purge deletes every resource in scope regardless of age; pass --yes to confirm or --dry-run to preview".into(),
        ))
    }
}

/// Execute the purge command.
pub async fn execute_purge<S: StateStore>(
    janitor: &mut Janitor<S>,
    scopes: &[Scope],
    cancel: &CancellationToken,
    formatter: &Formatter,
) -> Result<()> {
    let report = janitor.purge(scopes, cancel).await;
    println!("{}", formatter.format_report(&report)?);
    super::finish(&report)
}
