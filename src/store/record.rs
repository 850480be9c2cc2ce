//! Record and location types

use std::fmt;
use std::path::{Path, PathBuf};

use crate::compression::Compressor;

/// Filename marker for an ephemeral, memory-only database
pub const MEMORY_MARKER: &str = ":memory:";

/// One persisted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Caller-chosen key, unique within the table
    pub id: String,

    /// Stored value: header byte followed by the payload
    pub value: Vec<u8>,
}

impl Record {
    /// Whether the payload is compressed (read from the header byte)
    pub fn compressed(&self) -> bool {
        Compressor::is_compressed(&self.value)
    }
}

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A database file, created if missing
    File(PathBuf),

    /// An in-memory database that vanishes with its connection
    Memory,
}

impl Location {
    pub fn is_memory(&self) -> bool {
        matches!(self, Location::Memory)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory => f.write_str(MEMORY_MARKER),
        }
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self {
        if s == MEMORY_MARKER {
            Location::Memory
        } else {
            Location::File(PathBuf::from(s))
        }
    }
}

impl From<String> for Location {
    fn from(s: String) -> Self {
        Location::from(s.as_str())
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::File(path.to_path_buf())
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::File(path)
    }
}

impl From<&PathBuf> for Location {
    fn from(path: &PathBuf) -> Self {
        Location::File(path.clone())
    }
}
