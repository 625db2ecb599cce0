//! Sweep command implementation.

use crate::error::Result;
use crate::output::Formatter;
use janitor_core::Janitor;
use janitor_domain::{Scope, StateStore};
use tokio_util::sync::CancellationToken;

/// Execute the sweep command.
pub async fn execute_sweep<S: StateStore>(
    janitor: &mut Janitor<S>,
    scopes: &[Scope],
    cancel: &CancellationToken,
    formatter: &Formatter,
) -> Result<()> {
    let report = janitor.scan(scopes, cancel).await;
    println!("{}", formatter.format_report(&report)?);
    super::finish(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::CliError;
    use janitor_core::JanitorConfig;
    use janitor_store::MemoryStateStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweep_without_types_succeeds() {
        let store = Arc::new(MemoryStateStore::new());
        let mut janitor = Janitor::new(JanitorConfig::default(), Vec::new(), store);
        let scopes = [janitor.scope("111111111111", "us-east-1")];
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let result = execute_sweep(&mut janitor, &scopes, &CancellationToken::new(), &formatter).await;
        assert!(result.is_ok());
        assert_eq!(janitor.metrics().scan_count, 1);
    }

    #[tokio::test]
    async fn test_sweep_reports_state_errors() {
        let store = Arc::new(MemoryStateStore::new());
        store.fail_loads(true);
        let mut janitor = Janitor::new(JanitorConfig::default(), Vec::new(), store);
        let scopes = [
            janitor.scope("111111111111", "us-east-1"),
            janitor.scope("111111111111", "us-west-2"),
        ];
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let result = execute_sweep(&mut janitor, &scopes, &CancellationToken::new(), &formatter).await;
        assert!(matches!(result, Err(CliError::Failed(2))));
    }
}
