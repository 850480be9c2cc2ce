//! Record Store
//!
//! Owns the SQLite connection and the single record table.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{DbmError, Result};

use super::{KeyScan, Location, Record};

/// SQL text for one table, rendered once at open
struct Statements {
    create: String,
    upsert: String,
    fetch: String,
    contains: String,
    delete: String,
    count: String,
    clear: String,
    scan_first: String,
    scan_after: String,
}

impl Statements {
    // The identifier is quoted so keyword names like `order` are usable
    fn for_table(table: &str) -> Self {
        Self {
            create: format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" (\
                     id    TEXT PRIMARY KEY, \
                     value BLOB NOT NULL\
                 )"
            ),
            upsert: format!("REPLACE INTO \"{table}\" (id, value) VALUES (?1, ?2)"),
            fetch: format!("SELECT value FROM \"{table}\" WHERE id = ?1"),
            contains: format!("SELECT 1 FROM \"{table}\" WHERE id = ?1"),
            delete: format!("DELETE FROM \"{table}\" WHERE id = ?1"),
            count: format!("SELECT COUNT(*) FROM \"{table}\""),
            clear: format!("DELETE FROM \"{table}\""),
            scan_first: format!("SELECT id FROM \"{table}\" ORDER BY id LIMIT ?1"),
            scan_after: format!("SELECT id FROM \"{table}\" WHERE id > ?1 ORDER BY id LIMIT ?2"),
        }
    }
}

/// Durable keyed byte storage
///
/// ## Transactions
/// - `auto_commit = true`: every write is its own SQLite transaction and is
///   durable when the call returns.
/// - `auto_commit = false`: the first write opens a transaction (`BEGIN`);
///   later writes join it until `commit()`. Reads on this connection see the
///   pending writes, other connections do not. Dropping the store without
///   committing rolls them back.
///
/// ## Concurrency
/// One connection, used from one thread at a time. Cross-process safety is
/// whatever SQLite's file locking provides; lock contention surfaces as
/// `DbmError::Sqlite` and is not retried.
pub struct RecordStore {
    conn: Connection,
    location: Location,
    table: String,
    auto_commit: bool,
    scan_batch_size: usize,
    sql: Statements,
}

impl RecordStore {
    /// Open (or create) the database and ensure the table exists
    pub fn open(location: &Location, config: &Config) -> Result<Self> {
        config.validate()?;

        let conn = match location {
            Location::File(path) => Connection::open(path)?,
            Location::Memory => Connection::open_in_memory()?,
        };

        let store = Self {
            conn,
            location: location.clone(),
            table: config.table_name.clone(),
            auto_commit: config.auto_commit,
            scan_batch_size: config.scan_batch_size,
            sql: Statements::for_table(&config.table_name),
        };
        store.ensure_schema()?;

        debug!(
            location = %store.location,
            table = %store.table,
            auto_commit = store.auto_commit,
            "opened record store"
        );

        Ok(store)
    }

    /// Create the record table if it does not exist
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(&self.sql.create)?;
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert or fully replace the record for `id`
    pub fn upsert(&mut self, id: &str, value: &[u8]) -> Result<()> {
        self.begin_if_batching()?;
        self.conn
            .prepare_cached(&self.sql.upsert)?
            .execute(params![id, value])?;
        trace!(id, bytes = value.len(), "upsert");
        Ok(())
    }

    /// Remove the record for `id`; returns whether one existed
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.begin_if_batching()?;
        let removed = self
            .conn
            .prepare_cached(&self.sql.delete)?
            .execute(params![id])?;
        trace!(id, removed, "delete");
        Ok(removed > 0)
    }

    /// Remove every record; returns how many were removed
    pub fn clear(&mut self) -> Result<usize> {
        self.begin_if_batching()?;
        let removed = self.conn.execute(&self.sql.clear, [])?;
        debug!(table = %self.table, removed, "cleared table");
        Ok(removed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Point lookup by exact key
    pub fn fetch(&self, id: &str) -> Result<Option<Record>> {
        let value: Option<Vec<u8>> = self
            .conn
            .prepare_cached(&self.sql.fetch)?
            .query_row(params![id], |row| row.get(0))
            .optional()?;

        Ok(value.map(|value| Record {
            id: id.to_string(),
            value,
        }))
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        let found = self
            .conn
            .prepare_cached(&self.sql.contains)?
            .exists(params![id])?;
        Ok(found)
    }

    /// Total number of records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .prepare_cached(&self.sql.count)?
            .query_row([], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| DbmError::Corruption(format!("negative row count: {}", count)))
    }

    /// Lazily scan all keys in ascending order
    ///
    /// Each call starts a fresh scan.
    pub fn scan_ids(&self) -> KeyScan<'_> {
        KeyScan::new(self)
    }

    /// One page of keys strictly after `after`
    pub(super) fn fetch_page(&self, after: Option<&str>) -> Result<Vec<String>> {
        let limit = i64::try_from(self.scan_batch_size).unwrap_or(i64::MAX);

        let ids = match after {
            None => self
                .conn
                .prepare_cached(&self.sql.scan_first)?
                .query_map(params![limit], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?,
            Some(after) => self
                .conn
                .prepare_cached(&self.sql.scan_after)?
                .query_map(params![after, limit], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?,
        };

        Ok(ids)
    }

    // =========================================================================
    // Transactions and Lifecycle
    // =========================================================================

    /// Flush buffered writes; a no-op when nothing is pending
    pub fn commit(&mut self) -> Result<()> {
        if self.has_pending() {
            self.conn.execute_batch("COMMIT")?;
            debug!(location = %self.location, "committed pending writes");
        }
        Ok(())
    }

    /// Whether writes are waiting for `commit()`
    pub fn has_pending(&self) -> bool {
        !self.conn.is_autocommit()
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Switch commit policy; turning auto-commit on flushes pending writes
    pub fn set_auto_commit(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            self.commit()?;
        }
        self.auto_commit = enabled;
        Ok(())
    }

    /// Commit pending writes, rebuild the file to reclaim space, and close
    pub fn compact_and_close(mut self) -> Result<()> {
        self.commit()?;
        self.conn.execute_batch("VACUUM")?;
        debug!(location = %self.location, "vacuumed, closing");
        self.conn.close().map_err(|(_, e)| DbmError::Sqlite(e))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub(super) fn scan_batch_size(&self) -> usize {
        self.scan_batch_size
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open a transaction for batched writes unless one is already open
    fn begin_if_batching(&mut self) -> Result<()> {
        if !self.auto_commit && self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}
