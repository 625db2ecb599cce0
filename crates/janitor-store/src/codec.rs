//! Ledger wire format
//!
//! A ledger is stored as a pretty-printed JSON object mapping each resource
//! key to its first-seen time in RFC 3339 UTC:
//!
//! ```json
//! {
//!   "arn:aws:sqs:us-east-1:111111111111:jobs": "2024-05-01T00:00:00Z"
//! }
//! ```
//!
//! Keys are written in sorted order, so encoding the same ledger twice
//! yields identical bytes.

use crate::error::StoreError;
use janitor_domain::SetSnapshot;

/// Serialize a snapshot
pub fn encode(snapshot: &SetSnapshot) -> Result<Vec<u8>, StoreError> {
    let mut bytes = serde_json::to_vec_pretty(snapshot)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse bytes produced by [`encode`]
///
/// Whitespace-only input decodes to an empty snapshot.
pub fn decode(bytes: &[u8]) -> Result<SetSnapshot, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(SetSnapshot::new());
    }
    Ok(serde_json::from_slice(bytes)?)
}
