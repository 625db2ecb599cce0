//! AWS account identity

use crate::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Fetch the current AWS account ID from credentials via STS GetCallerIdentity
///
/// This operation requires no special permissions - it always succeeds if
/// credentials are valid. Used when no account is given on the command line.
pub async fn current_account_id(ctx: &AwsContext) -> Result<String> {
    let identity = ctx
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(account.to_string())
}
