//! AWS integration for the janitor
//!
//! Resource type adapters, the S3 ledger store and the plumbing they share.
//!
//! # Adapters
//!
//! - [`SqsQueues`] (`sqs-queues`): aged from each queue's `CreatedTimestamp`
//! - [`EventBridgeRules`] (`eventbridge-rules`): rules on the default bus,
//!   aged from first observation; service-managed rules are never touched
//!
//! Resource keys are ARNs, so the same resource always files under the same
//! ledger entry regardless of which process observed it.

#![warn(missing_docs)]

pub mod account;
pub mod arn;
pub mod context;
pub mod error;
pub mod eventbridge;
pub mod registry;
pub mod s3_store;
pub mod sqs;

pub use account::current_account_id;
pub use context::AwsContext;
pub use error::AwsError;
pub use eventbridge::EventBridgeRules;
pub use s3_store::{S3Location, S3StateStore};
pub use sqs::SqsQueues;
