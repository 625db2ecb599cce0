//! Command implementations.

pub mod list;
pub mod purge;
pub mod sweep;
pub mod watch;

pub use self::list::execute_list;
pub use self::purge::execute_purge;
pub use self::sweep::execute_sweep;
pub use self::watch::execute_watch;

use crate::error::{CliError, Result};
use janitor_core::ScanReport;
use tokio_util::sync::CancellationToken;

/// Cancel `cancel` on the first Ctrl+C.
///
/// Calls already in flight finish; the scan then saves what it has.
pub fn cancel_on_ctrl_c(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, saving state and stopping");
            cancel.cancel();
        }
    });
}

/// Map a finished run to the command result.
pub fn finish(report: &ScanReport) -> Result<()> {
    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Failed(report.error_count()))
    }
}
