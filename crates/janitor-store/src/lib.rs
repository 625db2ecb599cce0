//! Janitor Storage Layer
//!
//! Implements the `StateStore` trait for local use and provides the codec
//! and load/save lifecycle shared by every backend.
//!
//! # Architecture
//!
//! - [`MemoryStateStore`] for tests and throwaway runs
//! - [`FileStateStore`] for one JSON file per account/region on local disk
//! - [`ledger`] turns stored bytes into a [`janitor_domain::Set`] and back
//!
//! The S3 backend lives in janitor-aws next to the other AWS clients.
//!
//! # Examples
//!
//! ```no_run
//! use janitor_store::{ledger, FileStateStore};
//! use janitor_domain::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), janitor_store::StoreError> {
//! let store = FileStateStore::new("/var/lib/aws-janitor");
//! let set = ledger::load_set(&store, "111111111111/us-east-1", chrono::Duration::hours(24), Arc::new(SystemClock)).await?;
//! ledger::save_set(&store, "111111111111/us-east-1", &set).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod codec;
mod error;
pub mod file;
pub mod ledger;
pub mod memory;

pub use error::StoreError;
pub use file::FileStateStore;
pub use memory::MemoryStateStore;
