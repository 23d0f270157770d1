//! Shared types for marketplace stock sync
//!
//! Catalog entries, raw feed records, reconciled updates and the unified
//! error type used by every pipeline stage.

pub mod error;
pub mod models;

pub use error::{Result, SyncError};
pub use models::{CatalogEntry, FeedRecord, RawQuantity, ReconciledUpdate};
