//! # SQLite-DBM
//!
//! A dict-style embedded key-value store backed by a single SQLite file:
//! - Pluggable value codecs (MessagePack, JSON, bincode, plain text)
//! - Optional zstd compression with a "smart" keep-the-smaller mode
//! - Self-describing records, readable under any handle configuration
//! - Auto-commit or batched writes for bulk loads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Dbm<V> Facade                         │
//! │    contains / get / set / delete / iter / len / clear       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │ Compressor  │
//!   │ value⇄bytes │          │ header+zstd │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ RecordStore │
//!                           │  (SQLite)   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sqlite_dbm::{Config, Dbm, Dumper};
//!
//! let config = Config::builder().dumper(Dumper::PlainText).build();
//! let mut db: Dbm<String> = Dbm::open("./test.sqlite", config)?;
//! db.set("foo", &"bar".to_string())?;
//! assert_eq!(db.get("foo")?, "bar");
//! db.delete("foo")?;
//! assert_eq!(db.len()?, 0);
//! db.close()?;
//! # Ok::<(), sqlite_dbm::DbmError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod compression;
pub mod store;
pub mod dbm;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbmError, Result};
pub use config::{Config, Dumper, NativeProtocol};
pub use codec::Codec;
pub use compression::Compressor;
pub use store::{Location, Record, RecordStore, MEMORY_MARKER};
pub use dbm::Dbm;

use serde::de::DeserializeOwned;
use serde::Serialize;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SQLite-DBM
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open or create a store; shorthand for [`Dbm::open`]
pub fn open<V>(location: impl Into<Location>, config: Config) -> Result<Dbm<V>>
where
    V: Serialize + DeserializeOwned,
{
    Dbm::open(location, config)
}
