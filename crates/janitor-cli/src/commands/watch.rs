//! Watch command implementation.

use crate::error::Result;
use crate::output::Formatter;
use janitor_core::{Janitor, JanitorWorker};
use janitor_domain::{Scope, StateStore};
use tokio_util::sync::CancellationToken;

/// Execute the watch command.
///
/// Without `cycles` the worker runs until Ctrl+C. With `cycles` it stops
/// after that many sweeps, or at the first sweep that reports errors.
pub async fn execute_watch<S: StateStore>(
    janitor: Janitor<S>,
    scopes: Vec<Scope>,
    cycles: Option<usize>,
    cancel: CancellationToken,
    formatter: &Formatter,
) -> Result<()> {
    let mut worker = JanitorWorker::new(janitor, scopes)?;

    match cycles {
        Some(cycles) => {
            super::cancel_on_ctrl_c(&cancel);
            let report = worker.run_cycles(cycles, &cancel).await?;
            println!("{}", formatter.format_report(&report)?);
        }
        None => worker.run(cancel).await?,
    }

    println!("{}", worker.metrics().summary());
    Ok(())
}
