//! Store Module
//!
//! Durable keyed byte storage in a single SQLite table.
//!
//! ## Responsibilities
//! - Create the record table on open (idempotent)
//! - Replace-on-write upserts, point lookups, idempotent deletes
//! - Lazy key scans in ascending key order
//! - Auto-commit or batched (explicit commit) transactions
//! - Reclaim space (`VACUUM`) on close
//!
//! ## Table Layout
//! ```text
//! ┌──────────────────────┬─────────────────────────────────────┐
//! │ id TEXT PRIMARY KEY  │ value BLOB NOT NULL                 │
//! │                      │ ┌────────────┬────────────────────┐ │
//! │                      │ │ Header (1) │ Payload            │ │
//! │                      │ └────────────┴────────────────────┘ │
//! └──────────────────────┴─────────────────────────────────────┘
//! ```

mod record;
mod scan;
mod table;

pub use record::{Location, Record, MEMORY_MARKER};
pub use scan::KeyScan;
pub use table::RecordStore;
