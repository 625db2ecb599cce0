//! List command implementation.

use crate::error::Result;
use crate::output::{Formatter, Listed};
use janitor_core::Janitor;
use janitor_domain::{Scope, StateStore};

/// Execute the list command.
///
/// Nothing is marked, deleted or persisted.
pub async fn execute_list<S: StateStore>(
    janitor: &Janitor<S>,
    scopes: &[Scope],
    formatter: &Formatter,
) -> Result<()> {
    let mut listed = Vec::new();
    for scope in scopes {
        for (resource_type, key) in janitor.inventory(scope).await? {
            listed.push(Listed {
                scope: scope.key(),
                resource_type,
                key: key.into_inner(),
            });
        }
    }

    println!("{}", formatter.format_inventory(&listed)?);
    Ok(())
}
