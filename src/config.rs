//! Configuration for SQLite-DBM
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::{DbmError, Result};

/// Highest accepted compression level (0 disables compression)
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

/// Default table holding the records
pub const DEFAULT_TABLE_NAME: &str = "kv";

/// Main configuration for a store handle
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transaction Configuration
    // -------------------------------------------------------------------------
    /// Commit after every write. When false, writes accumulate in one open
    /// transaction until `commit()` (bulk-load mode).
    pub auto_commit: bool,

    // -------------------------------------------------------------------------
    // Value Pipeline Configuration
    // -------------------------------------------------------------------------
    /// Which codec turns values into bytes
    pub dumper: Dumper,

    /// Struct layout used by the native codec
    pub native_protocol: NativeProtocol,

    /// 0 disables compression, 1-9 trade speed for ratio
    pub compression_level: u8,

    /// Keep the raw encoding whenever compression does not make it smaller
    pub smart_compress: bool,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Name of the single record table
    pub table_name: String,

    /// Number of keys fetched per page while scanning
    pub scan_batch_size: usize,
}

/// Value codec selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dumper {
    /// MessagePack; any serde value including non-string map keys
    #[default]
    Native,

    /// JSON; strings, numbers, booleans, null, sequences, string-keyed maps
    Interchange,

    /// bincode; fast but schema- and version-bound
    RawHost,

    /// UTF-8 text; the value must be a string
    PlainText,
}

impl Dumper {
    pub const ALL: [Dumper; 4] = [
        Dumper::Native,
        Dumper::Interchange,
        Dumper::RawHost,
        Dumper::PlainText,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dumper::Native => "native",
            Dumper::Interchange => "json",
            Dumper::RawHost => "raw",
            Dumper::PlainText => "text",
        }
    }
}

impl fmt::Display for Dumper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dumper {
    type Err = DbmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "msgpack" => Ok(Dumper::Native),
            "json" | "interchange" => Ok(Dumper::Interchange),
            "raw" | "bincode" => Ok(Dumper::RawHost),
            "text" | "plain" | "str" => Ok(Dumper::PlainText),
            other => Err(DbmError::Config(format!("Unknown dumper: {:?}", other))),
        }
    }
}

/// Layout of structs under the native codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NativeProtocol {
    /// Structs as positional arrays (smaller)
    #[default]
    Compact,

    /// Structs as maps keyed by field name (tolerates field reordering)
    Named,
}

impl fmt::Display for NativeProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeProtocol::Compact => f.write_str("compact"),
            NativeProtocol::Named => f.write_str("named"),
        }
    }
}

impl FromStr for NativeProtocol {
    type Err = DbmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" | "array" => Ok(NativeProtocol::Compact),
            "named" | "map" => Ok(NativeProtocol::Named),
            other => Err(DbmError::Config(format!(
                "Unknown native protocol: {:?}",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_commit: true,
            dumper: Dumper::Native,
            native_protocol: NativeProtocol::Compact,
            compression_level: MAX_COMPRESSION_LEVEL,
            smart_compress: true,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            scan_batch_size: 256,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check every field; called when a store is opened
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(DbmError::Config(format!(
                "Compression level {} out of range 0-{}",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }

        if !is_valid_identifier(&self.table_name) {
            return Err(DbmError::Config(format!(
                "Invalid table name: {:?}",
                self.table_name
            )));
        }

        if self.scan_batch_size == 0 {
            return Err(DbmError::Config(
                "Scan batch size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Table names are spliced into SQL, so only plain identifiers are allowed
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Commit after every write (default) or batch until `commit()`
    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.config.auto_commit = enabled;
        self
    }

    /// Set the value codec
    pub fn dumper(mut self, dumper: Dumper) -> Self {
        self.config.dumper = dumper;
        self
    }

    /// Set the struct layout for the native codec
    pub fn native_protocol(mut self, protocol: NativeProtocol) -> Self {
        self.config.native_protocol = protocol;
        self
    }

    /// Set the compression level (0 disables)
    pub fn compression_level(mut self, level: u8) -> Self {
        self.config.compression_level = level;
        self
    }

    /// Enable or disable smart compression
    pub fn smart_compress(mut self, enabled: bool) -> Self {
        self.config.smart_compress = enabled;
        self
    }

    /// Set the record table name
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.config.table_name = name.into();
        self
    }

    /// Set how many keys each scan page fetches
    pub fn scan_batch_size(mut self, size: usize) -> Self {
        self.config.scan_batch_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
