//! Compression support for stored values
//!
//! Every stored value carries a one-byte header saying how the payload that
//! follows is encoded, so records stay readable no matter how the handle
//! reading them is configured.
//!
//! ```text
//! ┌────────────┬──────────────────────────────┐
//! │ Header (1) │ Payload (codec bytes or zstd)│
//! └────────────┴──────────────────────────────┘
//! ```

use tracing::trace;

use crate::config::Config;
use crate::error::{DbmError, Result};

/// Header byte: payload is the raw codec output
pub const HEADER_RAW: u8 = 0x00;

/// Header byte: payload is a zstd frame
pub const HEADER_ZSTD: u8 = 0x01;

/// Header size in bytes
pub const HEADER_SIZE: usize = 1;

/// Compression policy applied on the write path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressor {
    level: u8,
    smart: bool,
}

impl Compressor {
    /// `level` 0 disables compression; 1-9 map onto zstd levels
    pub fn new(level: u8, smart: bool) -> Self {
        Self { level, smart }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.compression_level, config.smart_compress)
    }

    /// A compressor that never compresses
    pub fn disabled() -> Self {
        Self::new(0, false)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_smart(&self) -> bool {
        self.smart
    }

    pub fn is_enabled(&self) -> bool {
        self.level > 0
    }

    /// Wrap codec output into a stored value (header + payload)
    pub fn pack(&self, raw: Vec<u8>) -> Result<Vec<u8>> {
        if !self.is_enabled() {
            return Ok(frame(HEADER_RAW, &raw));
        }

        let compressed = zstd::encode_all(raw.as_slice(), i32::from(self.level))?;

        if self.smart && compressed.len() >= raw.len() {
            trace!(
                raw = raw.len(),
                compressed = compressed.len(),
                "compression did not help, storing raw"
            );
            return Ok(frame(HEADER_RAW, &raw));
        }

        Ok(frame(HEADER_ZSTD, &compressed))
    }

    /// Recover codec output from a stored value
    ///
    /// Branches on the stored header only; the handle's own settings play
    /// no part, so records written under any configuration can be read.
    pub fn unpack(stored: &[u8]) -> Result<Vec<u8>> {
        let (&header, payload) = stored
            .split_first()
            .ok_or_else(|| DbmError::Corruption("empty stored value".to_string()))?;

        match header {
            HEADER_RAW => Ok(payload.to_vec()),
            HEADER_ZSTD => zstd::decode_all(payload)
                .map_err(|e| DbmError::Corruption(format!("zstd: {}", e))),
            other => Err(DbmError::Corruption(format!(
                "unknown value header: 0x{:02x}",
                other
            ))),
        }
    }

    /// Whether a stored value holds a compressed payload
    pub fn is_compressed(stored: &[u8]) -> bool {
        stored.first() == Some(&HEADER_ZSTD)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn frame(header: u8, payload: &[u8]) -> Vec<u8> {
    let mut stored = Vec::with_capacity(HEADER_SIZE + payload.len());
    stored.push(header);
    stored.extend_from_slice(payload);
    stored
}
